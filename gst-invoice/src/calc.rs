use crate::model::LineItem;

/// Amounts for a single line. Not rounded; formatting rounds for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineAmounts {
    pub taxable: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Discount is an absolute amount taken off before tax. A discount larger than the
/// gross amount yields a negative taxable value, which is kept as is.
pub fn line_amounts(item: &LineItem) -> LineAmounts {
    let taxable = item.quantity * item.rate - item.discount;
    let tax = taxable * item.tax_percent / 100.0;
    LineAmounts {
        taxable,
        tax,
        total: taxable + tax,
    }
}

pub fn invoice_totals(items: &[LineItem]) -> InvoiceTotals {
    items
        .iter()
        .map(line_amounts)
        .fold(InvoiceTotals::default(), |acc, line| InvoiceTotals {
            subtotal: acc.subtotal + line.taxable,
            tax: acc.tax + line.tax,
            total: acc.total + line.total,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, rate: f64, tax_percent: f64, discount: f64) -> LineItem {
        LineItem {
            description: "Software Development (20 hrs)".to_string(),
            hsn_sac: "998313".to_string(),
            quantity,
            rate,
            tax_percent,
            discount,
        }
    }

    #[test]
    fn single_line_amounts() {
        let a = line_amounts(&item(20.0, 1000.0, 18.0, 0.0));
        assert_eq!(a.taxable, 20000.0);
        assert_eq!(a.tax, 3600.0);
        assert_eq!(a.total, 23600.0);
    }

    #[test]
    fn totals_for_single_item_match_line() {
        let t = invoice_totals(&[item(20.0, 1000.0, 18.0, 0.0)]);
        assert_eq!(
            t,
            InvoiceTotals {
                subtotal: 20000.0,
                tax: 3600.0,
                total: 23600.0
            }
        );
    }

    #[test]
    fn totals_sum_across_items_with_discount() {
        let items = vec![item(2.0, 500.0, 18.0, 100.0), item(1.0, 1000.0, 5.0, 0.0)];
        let t = invoice_totals(&items);
        assert!((t.subtotal - 1900.0).abs() < 1e-9);
        assert!((t.tax - (162.0 + 50.0)).abs() < 1e-9);
        assert!((t.total - 2112.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_discount_goes_negative() {
        let a = line_amounts(&item(1.0, 100.0, 10.0, 150.0));
        assert_eq!(a.taxable, -50.0);
        assert_eq!(a.tax, -5.0);
        assert_eq!(a.total, -55.0);
    }

    #[test]
    fn empty_list_totals_are_zero() {
        assert_eq!(invoice_totals(&[]), InvoiceTotals::default());
    }

    #[test]
    fn totals_are_repeatable() {
        let items = vec![item(3.0, 333.33, 12.0, 1.5), item(0.5, 99.99, 28.0, 0.0)];
        assert_eq!(invoice_totals(&items), invoice_totals(&items));
    }
}
