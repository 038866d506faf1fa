use std::fmt;

use thiserror::Error;

/// One failed field constraint collected during form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(InvoiceError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("At least one line item is required")]
    LastLineItem,

    #[error("Line item {} does not exist (invoice has {len} items)", .index + 1)]
    LineItemOutOfRange { index: usize, len: usize },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    #[error("Invoice preview is not available; submit the form first")]
    MissingRenderTarget,

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("QR code generation failed: {0}")]
    QrEncoding(String),

    #[error("PDF export failed: {0}")]
    Export(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_validation_errors_pass() {
        let result: Result<()> = ValidationErrors::new().into_result();
        assert!(result.is_ok());
    }

    #[test]
    fn collected_violations_are_reported_together() {
        let mut errors = ValidationErrors::new();
        errors.push("supplier.name", "is required");
        errors.push("items.1.quantity", "must be at least 0.01");

        assert!(errors.contains_field("supplier.name"));
        assert_eq!(
            errors.to_string(),
            "supplier.name: is required; items.1.quantity: must be at least 0.01"
        );
        match errors.into_result() {
            Err(InvoiceError::Validation(v)) => assert_eq!(v.violations().len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
