use serde::{Deserialize, Serialize};
use time::Date;

use crate::states::IndianState;

pub const DEFAULT_TAX_PERCENT: f64 = 18.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub name: String,
    pub business_name: String,
    pub address: String,
    pub state: IndianState,
    pub gstin: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub name: String,
    pub address: String,
    pub state: IndianState,
    pub gstin: String,
    pub email: String,
    pub phone: String,
}

/// Invoice number and dates as typed into the form (`YYYY-MM-DD`, due date may be empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    pub invoice_number: String,
    pub invoice_date: String,
    #[serde(default)]
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceMeta {
    pub invoice_number: String,
    pub issue_date: Date,
    pub due_date: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub hsn_sac: String,
    pub quantity: f64,
    pub rate: f64,
    #[serde(default = "default_tax_percent")]
    pub tax_percent: f64,
    #[serde(default)]
    pub discount: f64,
}

fn default_tax_percent() -> f64 {
    DEFAULT_TAX_PERCENT
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            description: String::new(),
            hsn_sac: String::new(),
            quantity: 1.0,
            rate: 0.0,
            tax_percent: DEFAULT_TAX_PERCENT,
            discount: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub upi_id: String,
    pub payee_name: String,
}

/// A submitted invoice. Only produced by form submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    supplier: Supplier,
    recipient: Recipient,
    meta: InvoiceMeta,
    items: Vec<LineItem>,
    payment: PaymentInfo,
}

impl Invoice {
    pub(crate) fn new(
        supplier: Supplier,
        recipient: Recipient,
        meta: InvoiceMeta,
        items: Vec<LineItem>,
        payment: PaymentInfo,
    ) -> Self {
        Self {
            supplier,
            recipient,
            meta,
            items,
            payment,
        }
    }

    pub fn supplier(&self) -> &Supplier {
        &self.supplier
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn meta(&self) -> &InvoiceMeta {
        &self.meta
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn payment(&self) -> &PaymentInfo {
        &self.payment
    }

    pub fn invoice_number(&self) -> &str {
        &self.meta.invoice_number
    }

    pub fn is_same_state(&self) -> bool {
        self.supplier.state == self.recipient.state
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SupplierField {
    Name(String),
    BusinessName(String),
    Address(String),
    State(IndianState),
    Gstin(String),
    Email(String),
    Phone(String),
}

impl Supplier {
    pub fn with(self, field: SupplierField) -> Self {
        match field {
            SupplierField::Name(v) => Self { name: v, ..self },
            SupplierField::BusinessName(v) => Self {
                business_name: v,
                ..self
            },
            SupplierField::Address(v) => Self { address: v, ..self },
            SupplierField::State(v) => Self { state: v, ..self },
            SupplierField::Gstin(v) => Self { gstin: v, ..self },
            SupplierField::Email(v) => Self { email: v, ..self },
            SupplierField::Phone(v) => Self { phone: v, ..self },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecipientField {
    Name(String),
    Address(String),
    State(IndianState),
    Gstin(String),
    Email(String),
    Phone(String),
}

impl Recipient {
    pub fn with(self, field: RecipientField) -> Self {
        match field {
            RecipientField::Name(v) => Self { name: v, ..self },
            RecipientField::Address(v) => Self { address: v, ..self },
            RecipientField::State(v) => Self { state: v, ..self },
            RecipientField::Gstin(v) => Self { gstin: v, ..self },
            RecipientField::Email(v) => Self { email: v, ..self },
            RecipientField::Phone(v) => Self { phone: v, ..self },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsField {
    InvoiceNumber(String),
    InvoiceDate(String),
    DueDate(String),
}

impl InvoiceDetails {
    pub fn with(self, field: DetailsField) -> Self {
        match field {
            DetailsField::InvoiceNumber(v) => Self {
                invoice_number: v,
                ..self
            },
            DetailsField::InvoiceDate(v) => Self {
                invoice_date: v,
                ..self
            },
            DetailsField::DueDate(v) => Self { due_date: v, ..self },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Description(String),
    HsnSac(String),
    Quantity(f64),
    Rate(f64),
    TaxPercent(f64),
    Discount(f64),
}

impl LineItem {
    pub fn with(self, field: ItemField) -> Self {
        match field {
            ItemField::Description(v) => Self {
                description: v,
                ..self
            },
            ItemField::HsnSac(v) => Self { hsn_sac: v, ..self },
            ItemField::Quantity(v) => Self { quantity: v, ..self },
            ItemField::Rate(v) => Self { rate: v, ..self },
            ItemField::TaxPercent(v) => Self {
                tax_percent: v,
                ..self
            },
            ItemField::Discount(v) => Self { discount: v, ..self },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentField {
    UpiId(String),
    PayeeName(String),
}

impl PaymentInfo {
    pub fn with(self, field: PaymentField) -> Self {
        match field {
            PaymentField::UpiId(v) => Self { upi_id: v, ..self },
            PaymentField::PayeeName(v) => Self {
                payee_name: v,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier() -> Supplier {
        Supplier {
            name: "Harsh Sharma".to_string(),
            business_name: "Harsh Freelance Services".to_string(),
            address: "Bangalore, Karnataka".to_string(),
            state: IndianState::Karnataka,
            gstin: "29ABCDE1234F2Z5".to_string(),
            email: "harsh@example.com".to_string(),
            phone: "+91 9876543210".to_string(),
        }
    }

    #[test]
    fn field_update_returns_new_record_and_keeps_the_rest() {
        let before = supplier();
        let after = before.clone().with(SupplierField::State(IndianState::Goa));

        assert_eq!(after.state, IndianState::Goa);
        assert_eq!(after.name, before.name);
        assert_eq!(after.gstin, before.gstin);
        assert_eq!(before.state, IndianState::Karnataka);
    }

    #[test]
    fn new_line_item_uses_form_defaults() {
        let item = LineItem::default();
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.rate, 0.0);
        assert_eq!(item.tax_percent, 18.0);
        assert_eq!(item.discount, 0.0);
    }

    #[test]
    fn line_item_json_is_camel_case_with_defaults() {
        let item: LineItem = serde_json::from_str(
            r#"{"description":"Design","hsnSac":"998391","quantity":2,"rate":500}"#,
        )
        .unwrap();
        assert_eq!(item.hsn_sac, "998391");
        assert_eq!(item.tax_percent, 18.0);
        assert_eq!(item.discount, 0.0);

        let updated = item.with(ItemField::Discount(50.0));
        assert_eq!(updated.discount, 50.0);
    }
}
