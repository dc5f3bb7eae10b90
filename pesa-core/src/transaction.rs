//! Normalized transaction records built from M-PESA notifications

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::CategoryId;

/// Money movement as stated by the notification text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "received")]
    Received,
    #[serde(rename = "sent")]
    Sent,
    #[serde(rename = "paid")]
    Paid,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Received => "received",
            Direction::Sent => "sent",
            Direction::Paid => "paid",
        }
    }

    /// True for money leaving the account
    pub fn is_outflow(&self) -> bool {
        !matches!(self, Direction::Received)
    }
}

/// Where a transaction's timestamp came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TimestampSource {
    /// Parsed from the message's own date and time
    #[default]
    #[serde(rename = "message")]
    Message,
    /// The message date did not parse; processing time was substituted
    #[serde(rename = "processing-time")]
    ProcessingTime,
}

/// A single mobile-money transaction, normalized from one notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Always non-negative; see `direction` for the sign
    pub amount: Decimal,
    pub direction: Direction,
    /// Sender, recipient or business (may embed a paybill number)
    pub counterparty: String,
    /// Human-readable label derived from the message shape
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub timestamp_source: TimestampSource,
    /// Account balance after the transaction, as reported by the message
    pub balance: Decimal,
    /// Assigned after categorization
    pub category: Option<CategoryId>,
    /// M-PESA transaction code, e.g. "QAB1CD2EF3"
    #[serde(default)]
    pub code: Option<String>,
    /// Counterparty phone number, when the message carries one
    #[serde(default)]
    pub phone: Option<String>,
    /// Transaction cost charged by the provider
    #[serde(default)]
    pub cost: Option<Decimal>,
}

impl Transaction {
    /// Create an uncategorized transaction. Negative inputs are replaced by
    /// their absolute value; the direction carries the sign.
    pub fn new(
        amount: Decimal,
        direction: Direction,
        counterparty: impl Into<String>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
        balance: Decimal,
    ) -> Self {
        Self {
            amount: amount.abs(),
            direction,
            counterparty: counterparty.into(),
            description: description.into(),
            timestamp,
            timestamp_source: TimestampSource::Message,
            balance: balance.abs(),
            category: None,
            code: None,
            phone: None,
            cost: None,
        }
    }

    /// The only mutation allowed after build.
    pub fn assign_category(&mut self, category: CategoryId) {
        self.category = Some(category);
    }

    pub fn is_categorized(&self) -> bool {
        self.category.is_some()
    }

    /// True when the timestamp is the processing time rather than the message's
    pub fn timestamp_estimated(&self) -> bool {
        self.timestamp_source == TimestampSource::ProcessingTime
    }

    /// Amount with the direction's sign applied (outflows negative)
    pub fn signed_amount(&self) -> Decimal {
        if self.direction.is_outflow() {
            -self.amount
        } else {
            self.amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample() -> Transaction {
        Transaction::new(
            dec!(500.00),
            Direction::Sent,
            "JANE DOE",
            "Sent",
            Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
            dec!(1800.00),
        )
    }

    #[test]
    fn test_new_transaction_is_uncategorized() {
        let txn = sample();
        assert!(!txn.is_categorized());
        assert!(!txn.timestamp_estimated());
        assert_eq!(txn.signed_amount(), dec!(-500.00));
    }

    #[test]
    fn test_negative_inputs_become_absolute() {
        let txn = Transaction::new(
            dec!(-20.00),
            Direction::Received,
            "JOHN",
            "Received",
            Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
            dec!(-1.00),
        );
        assert_eq!(txn.amount, dec!(20.00));
        assert_eq!(txn.balance, dec!(1.00));
        assert_eq!(txn.direction, Direction::Received);
    }

    #[test]
    fn test_assign_category() {
        let mut txn = sample();
        txn.assign_category(CategoryId(4));
        assert_eq!(txn.category, Some(CategoryId(4)));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["direction"], "sent");
        assert_eq!(json["timestamp_source"], "message");
        assert_eq!(json["amount"], "500.00");
    }
}
