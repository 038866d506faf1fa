//! Read-only view of a submitted invoice with every computed value, rendered either
//! as terminal text or as a laid-out surface for PDF export.

use std::fmt;
use std::sync::Arc;

use crate::calc::{invoice_totals, line_amounts, InvoiceTotals, LineAmounts};
use crate::format::{format_date, format_money, format_number, format_rate};
use crate::layout::{Canvas, Rgb, Surface, TextMetrics, TextStyle};
use crate::model::{Invoice, LineItem};
use crate::qr::QrImage;
use crate::tax::{breakdown_for, TaxBreakdown};
use crate::upi::upi_payment_link;
use crate::words::amount_in_words;

pub const QR_NOTE: &str =
    "Scan the QR code with any UPI app (GPay, PhonePe, Paytm, etc.) to pay instantly.";
pub const MIXED_RATES_NOTE: &str =
    "Items use different tax rates; the rate shown is the first item's.";
pub const FOOTER_NOTE: &str = "This is a computer-generated invoice. Thank you for your business!";

#[derive(Debug, Clone, PartialEq)]
pub struct LineRow {
    pub item: LineItem,
    pub amounts: LineAmounts,
}

#[derive(Debug, Clone)]
pub struct InvoicePreview {
    invoice: Arc<Invoice>,
    rows: Vec<LineRow>,
    totals: InvoiceTotals,
    breakdown: TaxBreakdown,
    amount_words: String,
    upi_link: String,
    qr: Option<QrImage>,
}

impl InvoicePreview {
    pub fn new(invoice: Arc<Invoice>) -> Self {
        let rows = invoice
            .items()
            .iter()
            .map(|item| LineRow {
                item: item.clone(),
                amounts: line_amounts(item),
            })
            .collect();
        let totals = invoice_totals(invoice.items());
        let breakdown = breakdown_for(&invoice, totals.tax);
        let amount_words = amount_in_words(totals.total);
        let upi_link = upi_payment_link(invoice.payment(), invoice.invoice_number(), totals.total);

        tracing::debug!(
            invoice_number = %invoice.invoice_number(),
            subtotal = totals.subtotal,
            tax = totals.tax,
            total = totals.total,
            "computed invoice totals"
        );

        Self {
            invoice,
            rows,
            totals,
            breakdown,
            amount_words,
            upi_link,
            qr: None,
        }
    }

    pub fn with_qr(self, qr: Option<QrImage>) -> Self {
        Self { qr, ..self }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn rows(&self) -> &[LineRow] {
        &self.rows
    }

    pub fn totals(&self) -> InvoiceTotals {
        self.totals
    }

    pub fn breakdown(&self) -> &TaxBreakdown {
        &self.breakdown
    }

    pub fn amount_words(&self) -> &str {
        &self.amount_words
    }

    pub fn upi_link(&self) -> &str {
        &self.upi_link
    }

    pub fn qr(&self) -> Option<&QrImage> {
        self.qr.as_ref()
    }

    /// Lays the invoice out at `width_mm`; the height grows with the content.
    pub fn layout(&self, metrics: &dyn TextMetrics, width_mm: f32) -> Surface {
        const MARGIN_X: f32 = 15.0;
        const MARGIN_TOP: f32 = 12.0;
        const MARGIN_BOTTOM: f32 = 12.0;
        const SECTION_GAP: f32 = 7.0;
        const COLUMN_GAP: f32 = 8.0;

        let title = TextStyle::new(22.0, true, Rgb::BLUE);
        let subtitle = TextStyle::new(8.5, false, Rgb::GRAY);
        let label = TextStyle::new(8.5, true, Rgb::GRAY_DARK);
        let number = TextStyle::new(13.0, true, Rgb::BLUE);
        let heading = TextStyle::new(10.0, true, Rgb::GRAY_DARK);
        let strong = TextStyle::new(9.5, true, Rgb::BLACK);
        let body = TextStyle::new(8.5, false, Rgb::GRAY);
        let cell = TextStyle::new(7.0, false, Rgb::BLACK);
        let cell_head = TextStyle::new(7.0, true, Rgb::WHITE);
        let grand = TextStyle::new(11.0, true, Rgb::BLUE);
        let small = TextStyle::new(7.0, false, Rgb::GRAY);

        let inv = &self.invoice;
        let meta = inv.meta();
        let currency = if metrics.has_glyph('₹') { "₹" } else { "Rs. " };
        let money = |v: f64| format!("{currency}{}", format_money(v));

        let mut c = Canvas::new(metrics, width_mm);
        let left = MARGIN_X;
        let right = width_mm - MARGIN_X;
        let content_w = right - left;
        let half_w = (content_w - COLUMN_GAP) / 2.0;
        let mut y = MARGIN_TOP;

        // Header
        c.text(left, y + title.line_height() * 0.75, &title, "TAX INVOICE");
        c.text(left, y + title.line_height() + subtitle.line_height(), &subtitle, "GST Compliant Invoice");

        let mut yr = y + label.line_height();
        c.text_right(right, yr, &label, "Invoice #");
        yr += number.line_height();
        c.text_right(right, yr, &number, &meta.invoice_number);
        yr += body.line_height() * 1.3;
        c.text_right(right, yr, &body, &format!("Date: {}", format_date(meta.issue_date)));
        if let Some(due) = meta.due_date {
            yr += body.line_height();
            c.text_right(right, yr, &body, &format!("Due: {}", format_date(due)));
        }
        y = (y + title.line_height() + subtitle.line_height() * 1.5).max(yr + 2.0) + 3.0;
        c.rule(left, right, y, 3.0, Rgb::BLUE);
        y += SECTION_GAP;

        // Parties
        let party_top = y;
        let bar_w = 1.2;
        let text_x = |col_x: f32| col_x + bar_w + 3.0;
        let text_w = half_w - bar_w - 3.0;

        let sup = inv.supplier();
        let lx = text_x(left);
        let mut yl = c.paragraph(lx, party_top, text_w, &label, "FROM (Supplier)");
        yl = c.paragraph(lx, yl + 1.0, text_w, &strong, &sup.business_name);
        for (style, value) in [
            (&body, sup.name.clone()),
            (&body, sup.address.clone()),
            (&body, sup.state.to_string()),
            (&label, format!("GSTIN: {}", sup.gstin)),
            (&body, sup.email.clone()),
            (&body, sup.phone.clone()),
        ] {
            yl = c.paragraph(lx, yl, text_w, style, &value);
        }

        let rec = inv.recipient();
        let rx = text_x(left + half_w + COLUMN_GAP);
        let mut yrr = c.paragraph(rx, party_top, text_w, &label, "TO (Recipient)");
        yrr = c.paragraph(rx, yrr + 1.0, text_w, &strong, &rec.name);
        for (style, value) in [
            (&body, rec.address.clone()),
            (&body, rec.state.to_string()),
            (&label, format!("GSTIN: {}", rec.gstin)),
            (&body, rec.email.clone()),
            (&body, rec.phone.clone()),
        ] {
            yrr = c.paragraph(rx, yrr, text_w, style, &value);
        }

        let party_bottom = yl.max(yrr) + 1.0;
        c.rect(left, party_top, bar_w, party_bottom - party_top, Rgb::BLUE);
        c.rect(left + half_w + COLUMN_GAP, party_top, bar_w, party_bottom - party_top, Rgb::GRAY_MID);
        y = party_bottom + SECTION_GAP;

        // Items table
        const COLS: [(&str, f32, bool); 9] = [
            ("Description", 40.0, false),
            ("HSN/SAC", 17.0, false),
            ("Qty", 13.0, true),
            ("Rate", 19.0, true),
            ("Discount", 18.0, true),
            ("Taxable", 20.0, true),
            ("Tax %", 12.0, true),
            ("Tax Amt", 19.0, true),
            ("Total", 22.0, true),
        ];
        let design_total: f32 = COLS.iter().map(|c| c.1).sum();
        let scale = content_w / design_total;
        let mut col_x = Vec::with_capacity(COLS.len() + 1);
        let mut acc = left;
        for col in COLS {
            col_x.push(acc);
            acc += col.1 * scale;
        }
        col_x.push(right);
        let pad = 1.2;

        let head_h = cell_head.line_height() + 3.0;
        c.rect(left, y, content_w, head_h, Rgb::BLUE);
        let head_base = y + head_h / 2.0 + cell_head.size_pt * 0.35 * 0.5;
        for (i, (name, _, right_aligned)) in COLS.iter().enumerate() {
            if *right_aligned {
                c.text_right(col_x[i + 1] - pad, head_base, &cell_head, name);
            } else {
                c.text(col_x[i] + pad, head_base, &cell_head, name);
            }
        }
        y += head_h;

        for row in &self.rows {
            let item = &row.item;
            let a = &row.amounts;
            let row_top = y + 1.5;
            let desc_bottom = c.paragraph(col_x[0] + pad, row_top, col_x[1] - col_x[0] - 2.0 * pad, &cell, &item.description);
            let code_bottom = c.paragraph(col_x[1] + pad, row_top, col_x[2] - col_x[1] - 2.0 * pad, &cell, &item.hsn_sac);
            let base = row_top + cell.line_height() * 0.7;
            let values = [
                format_number(item.quantity),
                money(item.rate),
                money(item.discount),
                money(a.taxable),
                format_rate(item.tax_percent),
                money(a.tax),
                money(a.total),
            ];
            for (offset, value) in values.iter().enumerate() {
                let col = offset + 2;
                let style = if col == 8 {
                    TextStyle::new(cell.size_pt, true, Rgb::BLACK)
                } else {
                    TextStyle::new(cell.size_pt, false, Rgb::BLACK)
                };
                c.text_right(col_x[col + 1] - pad, base, &style, value);
            }
            y = desc_bottom.max(code_bottom).max(row_top + cell.line_height()) + 1.5;
            c.rule(left, right, y, 0.5, Rgb::GRAY_MID);
        }
        y += SECTION_GAP;

        // Tax breakdown and totals
        let summary_top = y;
        let box_pad = 3.0;

        let mut yl = c.paragraph(left, summary_top, half_w, &heading, "Tax Breakdown") + 1.5;
        let tax_box_top = yl;
        let tax_mark = c.mark();
        yl += box_pad;
        for line in &self.breakdown.lines {
            yl += body.line_height();
            let text = format!("{} ({})", line.kind.label(), format_rate(line.display_rate));
            c.text(left + box_pad, yl - 1.0, &body, &text);
            c.text_right(left + half_w - box_pad, yl - 1.0, &body, &money(line.amount));
        }
        yl += box_pad;
        c.rect_behind(tax_mark, left, tax_box_top, half_w, yl - tax_box_top, Rgb::GRAY_LIGHT);
        if self.breakdown.mixed_rates {
            yl = c.paragraph(left, yl + 1.0, half_w, &small, MIXED_RATES_NOTE);
        }

        let tx = left + half_w + COLUMN_GAP;
        let totals_mark = c.mark();
        let mut yt = summary_top + box_pad;
        for (name, value) in [("Subtotal:", self.totals.subtotal), ("Total Tax:", self.totals.tax)] {
            yt += body.line_height() * 1.2;
            c.text(tx + box_pad, yt - 1.0, &body, name);
            c.text_right(right - box_pad, yt - 1.0, &strong, &money(value));
        }
        yt += 2.0;
        c.rule(tx + box_pad, right - box_pad, yt, 1.5, Rgb::BLUE);
        yt += grand.line_height();
        c.text(tx + box_pad, yt - 1.0, &grand, "Grand Total:");
        c.text_right(right - box_pad, yt - 1.0, &grand, &money(self.totals.total));
        yt += box_pad;
        c.rect_behind(totals_mark, tx, summary_top, half_w, yt - summary_top, Rgb::BLUE_LIGHT);
        yt = c.paragraph(tx, yt + 1.5, half_w, &small, &self.amount_words);

        y = yl.max(yt) + SECTION_GAP;

        // Payment
        c.rule(left, right, y, 1.5, Rgb::GRAY_MID);
        y += SECTION_GAP - 2.0;
        y = c.paragraph(left, y, content_w, &heading, "Payment Information") + 2.0;
        let pay_top = y;
        let payment = inv.payment();
        let mut yp = c.paragraph(left, pay_top, half_w, &body, &format!("UPI ID: {}", payment.upi_id));
        yp = c.paragraph(left, yp, half_w, &body, &format!("Payee: {}", payment.payee_name));
        yp = c.paragraph(left, yp + 2.0, half_w, &small, QR_NOTE);

        let mut yq = pay_top;
        if let Some(qr) = &self.qr {
            const QR_SIDE: f32 = 40.0;
            let qx = tx + (half_w - QR_SIDE) / 2.0;
            c.image(qx, yq, QR_SIDE, QR_SIDE, qr.clone());
            c.rule(qx, qx + QR_SIDE, yq, 1.0, Rgb::GRAY_MID);
            c.rule(qx, qx + QR_SIDE, yq + QR_SIDE, 1.0, Rgb::GRAY_MID);
            yq += QR_SIDE + small.line_height();
            c.text_center(tx, right, yq, &small, "UPI Payment QR Code");
        }
        y = yp.max(yq) + SECTION_GAP;

        // Footer
        c.rule(left, right, y, 0.5, Rgb::GRAY_MID);
        y += SECTION_GAP;
        c.text_right(right, y, &label, "Authorized Signature");
        y += 10.0;
        c.rule(right - 48.0, right, y, 0.5, Rgb::GRAY);
        y += 7.0;
        c.text_center(left, right, y, &small, FOOTER_NOTE);

        let height = y + MARGIN_BOTTOM;
        tracing::debug!(height_mm = height, elements = c.mark(), "invoice surface laid out");
        c.finish(height)
    }
}

/// Terminal rendering of the preview.
impl fmt::Display for InvoicePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inv = &self.invoice;
        let meta = inv.meta();
        let s = inv.supplier();
        let r = inv.recipient();

        writeln!(f, "TAX INVOICE (GST Compliant Invoice)")?;
        writeln!(f, "Invoice #: {}", meta.invoice_number)?;
        writeln!(f, "Date: {}", format_date(meta.issue_date))?;
        if let Some(due) = meta.due_date {
            writeln!(f, "Due: {}", format_date(due))?;
        }
        writeln!(f)?;

        writeln!(f, "FROM (Supplier)")?;
        for line in [&s.business_name, &s.name, &s.address] {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "  {}", s.state)?;
        writeln!(f, "  GSTIN: {}", s.gstin)?;
        writeln!(f, "  {} | {}", s.email, s.phone)?;
        writeln!(f)?;

        writeln!(f, "TO (Recipient)")?;
        for line in [&r.name, &r.address] {
            writeln!(f, "  {line}")?;
        }
        writeln!(f, "  {}", r.state)?;
        writeln!(f, "  GSTIN: {}", r.gstin)?;
        writeln!(f, "  {} | {}", r.email, r.phone)?;
        writeln!(f)?;

        // Descriptions are printed in full; long ones push the numeric columns right.
        writeln!(
            f,
            "{:<3} {:<30} {:>8} {:>6} {:>12} {:>10} {:>12} {:>6} {:>11} {:>12}",
            "#", "Description", "HSN/SAC", "Qty", "Rate", "Discount", "Taxable", "Tax %", "Tax Amt", "Total"
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            writeln!(
                f,
                "{:<3} {:<30} {:>8} {:>6} {:>12} {:>10} {:>12} {:>6} {:>11} {:>12}",
                i + 1,
                row.item.description,
                row.item.hsn_sac,
                format_number(row.item.quantity),
                format_money(row.item.rate),
                format_money(row.item.discount),
                format_money(row.amounts.taxable),
                format_rate(row.item.tax_percent),
                format_money(row.amounts.tax),
                format_money(row.amounts.total),
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Tax Breakdown")?;
        for line in &self.breakdown.lines {
            writeln!(
                f,
                "  {} ({}): ₹{}",
                line.kind.label(),
                format_rate(line.display_rate),
                format_money(line.amount)
            )?;
        }
        if self.breakdown.mixed_rates {
            writeln!(f, "  Note: {MIXED_RATES_NOTE}")?;
        }
        writeln!(f)?;

        writeln!(f, "Subtotal:    ₹{}", format_money(self.totals.subtotal))?;
        writeln!(f, "Total Tax:   ₹{}", format_money(self.totals.tax))?;
        writeln!(f, "Grand Total: ₹{}", format_money(self.totals.total))?;
        writeln!(f, "{}", self.amount_words)?;
        writeln!(f)?;

        writeln!(f, "Payment Information")?;
        writeln!(f, "  UPI ID: {}", inv.payment().upi_id)?;
        writeln!(f, "  Payee: {}", inv.payment().payee_name)?;
        writeln!(f, "  UPI link: {}", self.upi_link)?;
        let qr_state = if self.qr.is_some() { "embedded in PDF" } else { "unavailable" };
        writeln!(f, "  QR code: {qr_state}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormUpdate, InvoiceForm};
    use crate::layout::{Element, EstimatedMetrics};
    use crate::model::{ItemField, RecipientField};
    use crate::states::IndianState;
    use crate::tax::TaxKind;
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2025, Month::March, 14).unwrap()
    }

    fn sample_preview() -> InvoicePreview {
        let invoice = InvoiceForm::new(today()).submit().unwrap();
        InvoicePreview::new(Arc::new(invoice))
    }

    #[test]
    fn computes_all_values_for_sample() {
        let p = sample_preview();
        assert_eq!(p.totals().subtotal, 20000.0);
        assert_eq!(p.totals().tax, 3600.0);
        assert_eq!(p.totals().total, 23600.0);
        assert_eq!(p.breakdown().lines[0].kind, TaxKind::Igst);
        assert_eq!(p.amount_words(), "Twenty Three Thousand Six Hundred Rupees Only");
        assert!(p.upi_link().ends_with("&am=23600.00&cu=INR"));
        assert!(p.qr().is_none());
    }

    #[test]
    fn same_state_shows_cgst_and_sgst() {
        let mut form = InvoiceForm::new(today());
        form.update(FormUpdate::Recipient(RecipientField::State(IndianState::Karnataka)))
            .unwrap();
        let p = InvoicePreview::new(Arc::new(form.submit().unwrap()));
        let text = p.to_string();
        assert!(text.contains("CGST (9%): ₹1,800.00"));
        assert!(text.contains("SGST (9%): ₹1,800.00"));
        assert!(!text.contains("IGST"));
    }

    #[test]
    fn text_preview_lists_items_and_totals() {
        let text = sample_preview().to_string();
        assert!(text.contains("Invoice #: INV-2025-001"));
        assert!(text.contains("Date: 14/3/2025"));
        assert!(text.contains("IGST (18%): ₹3,600.00"));
        assert!(text.contains("Grand Total: ₹23,600.00"));
        assert!(text.contains("Software Development (20 hrs)"));
        assert!(text.contains("QR code: unavailable"));
        assert!(!text.contains("Due:"));
    }

    #[test]
    fn mixed_rates_note_is_shown() {
        let mut form = InvoiceForm::new(today());
        form.add_item();
        for field in [
            ItemField::Description("Hosting".into()),
            ItemField::HsnSac("998315".into()),
            ItemField::Rate(100.0),
            ItemField::TaxPercent(5.0),
        ] {
            form.update(FormUpdate::Item { index: 1, field }).unwrap();
        }
        let p = InvoicePreview::new(Arc::new(form.submit().unwrap()));
        assert!(p.breakdown().mixed_rates);
        assert!(p.to_string().contains(MIXED_RATES_NOTE));

        let surface = p.layout(&EstimatedMetrics, 210.0);
        let texts: Vec<&str> = surface.texts().collect();
        let start = texts
            .iter()
            .position(|t| t.starts_with("Items use different"))
            .unwrap();
        let mut joined = String::new();
        for line in &texts[start..] {
            if joined.len() >= MIXED_RATES_NOTE.len() {
                break;
            }
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(line);
        }
        assert_eq!(joined, MIXED_RATES_NOTE);
    }

    #[test]
    fn layout_contains_sections_and_uses_ascii_currency_for_builtin_font() {
        let surface = sample_preview().layout(&EstimatedMetrics, 210.0);
        let texts: Vec<&str> = surface.texts().collect();
        assert!(texts.contains(&"TAX INVOICE"));
        assert!(texts.contains(&"INV-2025-001"));
        assert!(texts.contains(&"Rs. 23,600.00"));
        assert!(texts.contains(&"Authorized Signature"));
        assert!(!texts.iter().any(|t| t.contains('₹')));
        assert_eq!(surface.width_mm, 210.0);
        assert!(surface.height_mm > 100.0 && surface.height_mm < 297.0);
        assert!(!surface.elements.iter().any(|e| matches!(e, Element::Image { .. })));
    }

    #[test]
    fn layout_grows_with_items() {
        let mut form = InvoiceForm::new(today());
        for i in 0..40 {
            form.add_item();
            form.update(FormUpdate::Item {
                index: i + 1,
                field: ItemField::Description(format!("Consulting session number {i}")),
            })
            .unwrap();
            form.update(FormUpdate::Item {
                index: i + 1,
                field: ItemField::HsnSac("998311".into()),
            })
            .unwrap();
        }
        let p = InvoicePreview::new(Arc::new(form.submit().unwrap()));
        let surface = p.layout(&EstimatedMetrics, 210.0);
        assert!(surface.height_mm > 297.0);
    }

    #[test]
    fn qr_image_is_placed_when_present() {
        let qr = QrImage {
            png_base64: "iVBORw0KGgo=".to_string(),
            side_px: 10,
        };
        let p = sample_preview().with_qr(Some(qr.clone()));
        assert_eq!(p.qr(), Some(&qr));
        let surface = p.layout(&EstimatedMetrics, 210.0);
        assert!(surface.elements.iter().any(|e| matches!(e, Element::Image { .. })));
        assert!(surface.texts().any(|t| t == "UPI Payment QR Code"));
    }

    #[test]
    fn long_descriptions_are_printed_in_full() {
        let description = "Backend API development including payment gateway integration and load testing";
        let mut form = InvoiceForm::new(today());
        form.update(FormUpdate::Item {
            index: 0,
            field: ItemField::Description(description.into()),
        })
        .unwrap();
        let text = InvoicePreview::new(Arc::new(form.submit().unwrap())).to_string();
        assert!(text.contains(description));
        assert!(!text.contains('…'));
    }
}
