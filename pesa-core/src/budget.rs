//! Budget threshold settings and the notification payload they produce

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of the user's budget configuration, passed per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BudgetSettings {
    /// Balance floor; `None` disables the check
    pub threshold: Option<Decimal>,
    pub notifications_enabled: bool,
    /// Recipient handed to the messaging collaborator (email, phone, ...)
    #[serde(default)]
    pub notify_target: String,
}

impl BudgetSettings {
    pub fn with_threshold(threshold: Decimal, notify_target: impl Into<String>) -> Self {
        Self {
            threshold: Some(threshold),
            notifications_enabled: true,
            notify_target: notify_target.into(),
        }
    }
}

/// A message the caller should hand to the messaging collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub target: String,
    pub subject: String,
    pub body: String,
}
