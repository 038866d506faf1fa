use crate::model::PaymentInfo;

pub const UPI_CURRENCY: &str = "INR";

/// Builds the `upi://pay` deep link scanned by UPI apps.
///
/// Payee address, payee name and invoice number are percent-encoded; the amount
/// always carries exactly two decimals.
pub fn upi_payment_link(payment: &PaymentInfo, invoice_number: &str, amount: f64) -> String {
    format!(
        "upi://pay?pa={}&pn={}&tn=Invoice%20{}&am={:.2}&cu={}",
        urlencoding::encode(&payment.upi_id),
        urlencoding::encode(&payment.payee_name),
        urlencoding::encode(invoice_number),
        amount,
        UPI_CURRENCY
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> PaymentInfo {
        PaymentInfo {
            upi_id: "harsh@okaxis".to_string(),
            payee_name: "Harsh Sharma".to_string(),
        }
    }

    #[test]
    fn builds_encoded_link() {
        let link = upi_payment_link(&payment(), "INV-2025-001", 23600.0);
        assert_eq!(
            link,
            "upi://pay?pa=harsh%40okaxis&pn=Harsh%20Sharma&tn=Invoice%20INV-2025-001&am=23600.00&cu=INR"
        );
    }

    #[test]
    fn invoice_number_is_encoded() {
        let link = upi_payment_link(&payment(), "INV/2025 #7&x", 1.0);
        assert!(link.contains("tn=Invoice%20INV%2F2025%20%237%26x&"));
    }

    #[test]
    fn amount_always_has_two_decimals() {
        assert!(upi_payment_link(&payment(), "A", 1500.5).contains("&am=1500.50&"));
        assert!(upi_payment_link(&payment(), "A", 10.0).contains("&am=10.00&"));
        assert!(upi_payment_link(&payment(), "A", 3.14159).contains("&am=3.14&"));
    }
}
