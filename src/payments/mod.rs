mod razorpay;

pub use razorpay::*;

use serde::{Deserialize, Serialize};

/// Every checkout is charged in rupees.
pub const CURRENCY: &str = "INR";

/// A gateway-side reservation of an amount. Never stored locally; the
/// browser holds the id until it posts the signed confirmation back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Minor units (paise)
    pub amount: u64,
    pub currency: String,
}

/// Receipt label for a new gateway order, unique per millisecond.
pub fn receipt_label() -> String {
    format!("receipt_{}", chrono::Utc::now().timestamp_millis())
}

/// Convert minor units (paise) to major units (rupees).
pub fn minor_to_major(amount: u64) -> f64 {
    amount as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_to_major() {
        assert_eq!(minor_to_major(149900), 1499.0);
        assert_eq!(minor_to_major(100), 1.0);
        assert_eq!(minor_to_major(150), 1.5);
    }

    #[test]
    fn test_receipt_label_format() {
        let label = receipt_label();
        let millis = label.strip_prefix("receipt_").unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
    }
}
