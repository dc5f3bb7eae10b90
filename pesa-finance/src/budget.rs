//! Low-balance check against the configured budget threshold.

use rust_decimal::Decimal;
use tracing::info;

use pesa_core::{BudgetSettings, Notification, Transaction};

pub const ALERT_SUBJECT: &str = "M-PESA balance below budget";

/// `enabled AND threshold set AND balance < threshold`.
pub fn should_notify(balance: Decimal, settings: &BudgetSettings) -> bool {
    settings.notifications_enabled && settings.threshold.is_some_and(|threshold| balance < threshold)
}

/// Decide, from the transaction's own resulting balance, whether to alert.
///
/// Call once per inserted transaction; the result is the whole decision.
pub fn evaluate(txn: &Transaction, settings: &BudgetSettings) -> Option<Notification> {
    if !should_notify(txn.balance, settings) {
        return None;
    }
    let threshold = settings.threshold?;

    info!(
        balance = %txn.balance,
        threshold = %threshold,
        recipient = %settings.notify_target,
        "balance below budget threshold"
    );

    let body = format!(
        "Your M-PESA balance is Ksh{:.2}, below your budget threshold of Ksh{:.2}.\n\
         Latest transaction: {} Ksh{:.2} ({}) on {}.",
        txn.balance,
        threshold,
        txn.direction.as_str(),
        txn.amount,
        txn.counterparty,
        txn.timestamp.format("%Y-%m-%d %H:%M UTC"),
    );

    Some(Notification {
        target: settings.notify_target.clone(),
        subject: ALERT_SUBJECT.to_string(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pesa_core::Direction;
    use rust_decimal_macros::dec;

    fn settings(threshold: Option<Decimal>, enabled: bool) -> BudgetSettings {
        BudgetSettings {
            threshold,
            notifications_enabled: enabled,
            notify_target: "me@example.com".to_string(),
        }
    }

    #[test]
    fn test_should_notify_table() {
        assert!(should_notify(dec!(500), &settings(Some(dec!(1000)), true)));
        assert!(!should_notify(dec!(500), &settings(Some(dec!(1000)), false)));
        assert!(!should_notify(dec!(0), &settings(None, true)));
        assert!(!should_notify(dec!(1000), &settings(Some(dec!(1000)), true)));
        assert!(!should_notify(dec!(1500), &settings(Some(dec!(1000)), true)));
    }

    #[test]
    fn test_evaluate_builds_payload() {
        let txn = Transaction::new(
            dec!(500.00),
            Direction::Sent,
            "JANE WANJIKU",
            "Sent",
            Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
            dec!(500.00),
        );
        let note = evaluate(&txn, &settings(Some(dec!(1000.00)), true)).unwrap();
        assert_eq!(note.target, "me@example.com");
        assert_eq!(note.subject, ALERT_SUBJECT);
        assert!(note.body.contains("Ksh500.00"));
        assert!(note.body.contains("Ksh1000.00"));
        assert!(note.body.contains("JANE WANJIKU"));

        assert!(evaluate(&txn, &settings(Some(dec!(1000.00)), false)).is_none());
    }
}
