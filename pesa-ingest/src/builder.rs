//! Transaction builder: per-shape mapping from captures to a `Transaction`.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use pesa_core::{DEFAULT_TIMEZONE, Direction, Transaction};

use crate::error::ParseError;
use crate::normalize::{parse_amount, parse_timestamp};
use crate::parsers::match_shape;
use crate::types::{MatchedShape, MessageShape};

/// Capture names each shape uses for its counterparty.
fn counterparty_field(shape: MessageShape) -> &'static str {
    match shape {
        MessageShape::Received => "sender",
        MessageShape::SentToPerson => "recipient",
        MessageShape::SentToPaybill | MessageShape::PaidToBusiness => "business",
    }
}

/// Build a transaction from a matched shape.
///
/// `tz` is the zone message times are written in; `now` stands in for an
/// unparseable message time.
pub fn build_transaction(
    matched: &MatchedShape,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Transaction, ParseError> {
    let caps = &matched.captures;

    let amount = parse_amount(caps.require("amount")?)?;
    let balance = parse_amount(caps.require("balance")?)?;
    let name = caps.require(counterparty_field(matched.shape))?;
    let (timestamp, timestamp_source) =
        parse_timestamp(caps.require("date")?, caps.require("time")?, tz, now);

    let (direction, counterparty, description) = match matched.shape {
        MessageShape::Received => (Direction::Received, name.to_string(), "Received".to_string()),
        MessageShape::SentToPerson => (Direction::Sent, name.to_string(), "Sent".to_string()),
        MessageShape::SentToPaybill => {
            let paybill = caps.require("paybill")?;
            let account = caps.require("account")?;
            (
                Direction::Paid,
                format!("{name} Paybill {paybill}"),
                format!("Paybill payment to {name} for account {account}"),
            )
        }
        MessageShape::PaidToBusiness => (Direction::Paid, name.to_string(), "Paid".to_string()),
    };

    let mut txn = Transaction::new(amount, direction, counterparty, description, timestamp, balance);
    txn.timestamp_source = timestamp_source;
    txn.code = caps.get("code").map(str::to_string);
    txn.phone = caps.get("phone").map(str::to_string);
    txn.cost = caps.get("cost").and_then(|raw| match parse_amount(raw) {
        Ok(cost) => Some(cost),
        Err(_) => {
            warn!(raw, "unreadable transaction cost; leaving it unset");
            None
        }
    });
    Ok(txn)
}

/// Shape matcher and builder bound to the zone messages are stamped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageParser {
    tz: Tz,
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl MessageParser {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Match `raw` against the known shapes and build its transaction.
    pub fn parse(&self, raw: &str, now: DateTime<Utc>) -> Result<Transaction, ParseError> {
        let matched = match_shape(raw)?;
        build_transaction(&matched, self.tz, now)
    }
}
