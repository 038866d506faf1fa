//! Editable invoice draft: the records behind the entry form and their submission.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::{InvoiceError, Result, ValidationErrors};
use crate::format::{iso_date, parse_date};
use crate::model::{
    DetailsField, Invoice, InvoiceDetails, InvoiceMeta, ItemField, LineItem, PaymentField,
    PaymentInfo, Recipient, RecipientField, Supplier, SupplierField,
};
use crate::states::IndianState;

pub const MIN_QUANTITY: f64 = 0.01;
pub const MAX_TAX_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceForm {
    supplier: Supplier,
    recipient: Recipient,
    #[serde(rename = "invoice")]
    details: InvoiceDetails,
    items: Vec<LineItem>,
    payment: PaymentInfo,
}

/// A single field change, addressed by record and typed field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormUpdate {
    Supplier(SupplierField),
    Recipient(RecipientField),
    Details(DetailsField),
    /// `index` is zero-based.
    Item { index: usize, field: ItemField },
    Payment(PaymentField),
}

impl InvoiceForm {
    /// Form pre-filled with example freelancer data, dated `today`.
    pub fn new(today: Date) -> Self {
        Self {
            supplier: Supplier {
                name: "Harsh Sharma".to_string(),
                business_name: "Harsh Freelance Services".to_string(),
                address: "Bangalore, Karnataka".to_string(),
                state: IndianState::Karnataka,
                gstin: "29ABCDE1234F2Z5".to_string(),
                email: "harsh@example.com".to_string(),
                phone: "+91 9876543210".to_string(),
            },
            recipient: Recipient {
                name: "Client Co".to_string(),
                address: "Mumbai, Maharashtra".to_string(),
                state: IndianState::Maharashtra,
                gstin: "27PQRST6789L1Z2".to_string(),
                email: "client@example.com".to_string(),
                phone: "+91 9876543211".to_string(),
            },
            details: InvoiceDetails {
                invoice_number: "INV-2025-001".to_string(),
                invoice_date: iso_date(today),
                due_date: String::new(),
            },
            items: vec![LineItem {
                description: "Software Development (20 hrs)".to_string(),
                hsn_sac: "998313".to_string(),
                quantity: 20.0,
                rate: 1000.0,
                tax_percent: 18.0,
                discount: 0.0,
            }],
            payment: PaymentInfo {
                upi_id: "harsh@okaxis".to_string(),
                payee_name: "Harsh Sharma".to_string(),
            },
        }
    }

    /// Empty form; both parties start in `home_state`.
    pub fn blank(today: Date, home_state: IndianState) -> Self {
        Self {
            supplier: Supplier {
                name: String::new(),
                business_name: String::new(),
                address: String::new(),
                state: home_state,
                gstin: String::new(),
                email: String::new(),
                phone: String::new(),
            },
            recipient: Recipient {
                name: String::new(),
                address: String::new(),
                state: home_state,
                gstin: String::new(),
                email: String::new(),
                phone: String::new(),
            },
            details: InvoiceDetails {
                invoice_number: String::new(),
                invoice_date: iso_date(today),
                due_date: String::new(),
            },
            items: vec![LineItem::default()],
            payment: PaymentInfo {
                upi_id: String::new(),
                payee_name: String::new(),
            },
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let form: InvoiceForm = serde_json::from_str(raw).map_err(|e| InvoiceError::InvalidValue {
            field: "draft".to_string(),
            value: e.to_string(),
        })?;
        if form.items.is_empty() {
            return Err(InvoiceError::LastLineItem);
        }
        Ok(form)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| InvoiceError::InvalidValue {
            field: "draft".to_string(),
            value: e.to_string(),
        })
    }

    pub fn supplier(&self) -> &Supplier {
        &self.supplier
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn details(&self) -> &InvoiceDetails {
        &self.details
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn payment(&self) -> &PaymentInfo {
        &self.payment
    }

    /// Appends a default line item and returns the new item count.
    pub fn add_item(&mut self) -> usize {
        self.items.push(LineItem::default());
        tracing::debug!(items = self.items.len(), "line item added");
        self.items.len()
    }

    /// Removes the item at zero-based `index`. The last remaining item cannot be removed.
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem> {
        let len = self.items.len();
        if index >= len {
            return Err(InvoiceError::LineItemOutOfRange { index, len });
        }
        if len == 1 {
            return Err(InvoiceError::LastLineItem);
        }
        let removed = self.items.remove(index);
        tracing::debug!(index, items = self.items.len(), "line item removed");
        Ok(removed)
    }

    pub fn update(&mut self, update: FormUpdate) -> Result<()> {
        match update {
            FormUpdate::Supplier(f) => self.supplier = self.supplier.clone().with(f),
            FormUpdate::Recipient(f) => self.recipient = self.recipient.clone().with(f),
            FormUpdate::Details(f) => self.details = self.details.clone().with(f),
            FormUpdate::Payment(f) => self.payment = self.payment.clone().with(f),
            FormUpdate::Item { index, field } => {
                let len = self.items.len();
                let slot = self
                    .items
                    .get_mut(index)
                    .ok_or(InvoiceError::LineItemOutOfRange { index, len })?;
                *slot = slot.clone().with(field);
            }
        }
        Ok(())
    }

    /// Checks required fields, numeric ranges and dates, then packages the draft.
    pub fn submit(&self) -> Result<Invoice> {
        let mut errors = ValidationErrors::new();

        let s = &self.supplier;
        require(&mut errors, "supplier.name", &s.name);
        require(&mut errors, "supplier.businessName", &s.business_name);
        require(&mut errors, "supplier.address", &s.address);
        require(&mut errors, "supplier.gstin", &s.gstin);
        require_email(&mut errors, "supplier.email", &s.email);
        require(&mut errors, "supplier.phone", &s.phone);

        let r = &self.recipient;
        require(&mut errors, "recipient.name", &r.name);
        require(&mut errors, "recipient.address", &r.address);
        require(&mut errors, "recipient.gstin", &r.gstin);
        require_email(&mut errors, "recipient.email", &r.email);
        require(&mut errors, "recipient.phone", &r.phone);

        let d = &self.details;
        require(&mut errors, "invoice.invoiceNumber", &d.invoice_number);
        let issue_date = if d.invoice_date.trim().is_empty() {
            errors.push("invoice.invoiceDate", "is required");
            None
        } else {
            let parsed = parse_date(&d.invoice_date);
            if parsed.is_none() {
                errors.push("invoice.invoiceDate", "must be a date (YYYY-MM-DD)");
            }
            parsed
        };
        let due_date = if d.due_date.trim().is_empty() {
            None
        } else {
            let parsed = parse_date(&d.due_date);
            if parsed.is_none() {
                errors.push("invoice.dueDate", "must be a date (YYYY-MM-DD)");
            }
            parsed
        };

        if self.items.is_empty() {
            errors.push("items", "at least one line item is required");
        }
        for (i, item) in self.items.iter().enumerate() {
            let n = i + 1;
            require(&mut errors, &format!("items.{n}.description"), &item.description);
            require(&mut errors, &format!("items.{n}.hsnSac"), &item.hsn_sac);
            check_range(&mut errors, &format!("items.{n}.quantity"), item.quantity, MIN_QUANTITY, None);
            check_range(&mut errors, &format!("items.{n}.rate"), item.rate, 0.0, None);
            check_range(
                &mut errors,
                &format!("items.{n}.taxPercent"),
                item.tax_percent,
                0.0,
                Some(MAX_TAX_PERCENT),
            );
            check_range(&mut errors, &format!("items.{n}.discount"), item.discount, 0.0, None);
        }

        require(&mut errors, "payment.upiId", &self.payment.upi_id);
        require(&mut errors, "payment.payeeName", &self.payment.payee_name);

        errors.into_result()?;

        // both present once validation passed
        let issue_date = issue_date.ok_or(InvoiceError::InvalidValue {
            field: "invoice.invoiceDate".to_string(),
            value: d.invoice_date.clone(),
        })?;

        tracing::info!(
            invoice_number = %d.invoice_number,
            items = self.items.len(),
            "invoice submitted"
        );

        Ok(Invoice::new(
            self.supplier.clone(),
            self.recipient.clone(),
            InvoiceMeta {
                invoice_number: d.invoice_number.clone(),
                issue_date,
                due_date,
            },
            self.items.clone(),
            self.payment.clone(),
        ))
    }
}

fn require(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "is required");
    }
}

fn require_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    let v = value.trim();
    if v.is_empty() {
        errors.push(field, "is required");
    } else if !v.contains('@') || v.starts_with('@') || v.ends_with('@') {
        errors.push(field, "must be an email address");
    }
}

fn check_range(errors: &mut ValidationErrors, field: &str, value: f64, min: f64, max: Option<f64>) {
    if !value.is_finite() {
        errors.push(field, "must be a number");
        return;
    }
    if value < min {
        errors.push(field, format!("must be at least {min}"));
    }
    if let Some(max) = max {
        if value > max {
            errors.push(field, format!("must be at most {max}"));
        }
    }
}

impl FormUpdate {
    /// Parses a `record.field` key such as `supplier.state`, `invoice.dueDate` or
    /// `item.2.rate` (item positions are one-based here).
    pub fn parse(key: &str, value: &str) -> Result<Self> {
        let unknown = || InvoiceError::UnknownField(key.to_string());
        let parts: Vec<&str> = key.trim().split('.').collect();

        match parts.as_slice() {
            [record, field] => {
                let field = normalize(field);
                let text = value.to_string();
                match normalize(record).as_str() {
                    "supplier" => Ok(FormUpdate::Supplier(match field.as_str() {
                        "name" => SupplierField::Name(text),
                        "businessname" => SupplierField::BusinessName(text),
                        "address" => SupplierField::Address(text),
                        "state" => SupplierField::State(value.parse()?),
                        "gstin" => SupplierField::Gstin(text),
                        "email" => SupplierField::Email(text),
                        "phone" => SupplierField::Phone(text),
                        _ => return Err(unknown()),
                    })),
                    "recipient" => Ok(FormUpdate::Recipient(match field.as_str() {
                        "name" => RecipientField::Name(text),
                        "address" => RecipientField::Address(text),
                        "state" => RecipientField::State(value.parse()?),
                        "gstin" => RecipientField::Gstin(text),
                        "email" => RecipientField::Email(text),
                        "phone" => RecipientField::Phone(text),
                        _ => return Err(unknown()),
                    })),
                    "invoice" => Ok(FormUpdate::Details(match field.as_str() {
                        "number" | "invoicenumber" => DetailsField::InvoiceNumber(text),
                        "date" | "invoicedate" => DetailsField::InvoiceDate(text),
                        "duedate" | "due" => DetailsField::DueDate(text),
                        _ => return Err(unknown()),
                    })),
                    "payment" => Ok(FormUpdate::Payment(match field.as_str() {
                        "upiid" | "upi" => PaymentField::UpiId(text),
                        "payeename" | "payee" => PaymentField::PayeeName(text),
                        _ => return Err(unknown()),
                    })),
                    _ => Err(unknown()),
                }
            }
            [record, position, field] if matches!(normalize(record).as_str(), "item" | "items") => {
                let position: usize = position.parse().map_err(|_| unknown())?;
                if position == 0 {
                    return Err(unknown());
                }
                let number = || parse_number(key, value);
                let field = match normalize(field).as_str() {
                    "description" => ItemField::Description(value.to_string()),
                    "hsnsac" | "hsn" | "sac" => ItemField::HsnSac(value.to_string()),
                    "quantity" | "qty" => ItemField::Quantity(number()?),
                    "rate" => ItemField::Rate(number()?),
                    "taxpercent" | "tax" => ItemField::TaxPercent(number()?),
                    "discount" => ItemField::Discount(number()?),
                    _ => return Err(unknown()),
                };
                Ok(FormUpdate::Item {
                    index: position - 1,
                    field,
                })
            }
            _ => Err(unknown()),
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InvoiceError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        })
}
