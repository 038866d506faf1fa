//! CGST + SGST for supplies within one state, IGST across states.

use crate::model::{Invoice, LineItem, DEFAULT_TAX_PERCENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxKind {
    Cgst,
    Sgst,
    Igst,
}

impl TaxKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaxKind::Cgst => "CGST",
            TaxKind::Sgst => "SGST",
            TaxKind::Igst => "IGST",
        }
    }
}

/// `display_rate` is informational only; `amount` comes from the aggregated tax.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxLine {
    pub kind: TaxKind,
    pub display_rate: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxBreakdown {
    pub lines: Vec<TaxLine>,
    /// Line items carry different tax percents, so the label rate (taken from the
    /// first item) does not describe the whole invoice.
    pub mixed_rates: bool,
}

impl TaxBreakdown {
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    pub fn is_intra_state(&self) -> bool {
        self.lines.iter().any(|l| l.kind == TaxKind::Cgst)
    }
}

pub fn breakdown_for(invoice: &Invoice, total_tax: f64) -> TaxBreakdown {
    breakdown(invoice.is_same_state(), invoice.items(), total_tax)
}

pub fn breakdown(same_state: bool, items: &[LineItem], total_tax: f64) -> TaxBreakdown {
    let label_rate = items
        .first()
        .map(|i| i.tax_percent)
        .unwrap_or(DEFAULT_TAX_PERCENT);

    let mixed_rates = items
        .iter()
        .skip(1)
        .any(|i| i.tax_percent != label_rate);
    if mixed_rates {
        tracing::warn!(
            label_rate,
            "line items use different tax rates; breakdown label shows the first item's rate"
        );
    }

    let lines = if same_state {
        let half = total_tax / 2.0;
        vec![
            TaxLine {
                kind: TaxKind::Cgst,
                display_rate: label_rate / 2.0,
                amount: half,
            },
            TaxLine {
                kind: TaxKind::Sgst,
                display_rate: label_rate / 2.0,
                amount: half,
            },
        ]
    } else {
        vec![TaxLine {
            kind: TaxKind::Igst,
            display_rate: label_rate,
            amount: total_tax,
        }]
    };

    TaxBreakdown { lines, mixed_rates }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(tax_percent: f64) -> LineItem {
        LineItem {
            tax_percent,
            ..LineItem::default()
        }
    }

    #[test]
    fn same_state_splits_in_half() {
        let b = breakdown(true, &[item(18.0)], 3600.0);
        assert!(b.is_intra_state());
        assert_eq!(b.lines.len(), 2);
        assert_eq!(b.lines[0].kind, TaxKind::Cgst);
        assert_eq!(b.lines[1].kind, TaxKind::Sgst);
        assert_eq!(b.lines[0].amount, 1800.0);
        assert_eq!(b.lines[1].amount, 1800.0);
        assert_eq!(b.lines[0].display_rate, 9.0);
        assert_eq!(b.total(), 3600.0);
    }

    #[test]
    fn different_states_use_igst() {
        let b = breakdown(false, &[item(18.0)], 3600.0);
        assert_eq!(b.lines.len(), 1);
        assert_eq!(b.lines[0].kind, TaxKind::Igst);
        assert_eq!(b.lines[0].amount, 3600.0);
        assert_eq!(b.lines[0].display_rate, 18.0);
    }

    #[test]
    fn no_items_falls_back_to_eighteen_for_label() {
        let b = breakdown(false, &[], 0.0);
        assert_eq!(b.lines[0].display_rate, 18.0);
        assert_eq!(b.lines[0].amount, 0.0);
        assert!(!b.mixed_rates);
    }

    #[test]
    fn zero_rate_first_item_is_shown_as_zero() {
        let b = breakdown(true, &[item(0.0)], 0.0);
        assert_eq!(b.lines[0].display_rate, 0.0);
    }

    #[test]
    fn differing_rates_are_flagged() {
        let b = breakdown(false, &[item(18.0), item(5.0)], 100.0);
        assert!(b.mixed_rates);
        assert_eq!(b.lines[0].display_rate, 18.0);

        let same = breakdown(false, &[item(12.0), item(12.0)], 100.0);
        assert!(!same.mixed_rates);
    }
}
