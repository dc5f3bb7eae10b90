//! Message pipeline: raw text → shape match → transaction → category → budget check.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pesa_core::{BudgetSettings, CategoryRule, Notification, Transaction};
use pesa_ingest::{MessageParser, ParseError};

use crate::budget;
use crate::category_rules::categorize;
use crate::store::LedgerStore;

/// A categorized transaction and the budget decision made for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Processed {
    pub transaction: Transaction,
    /// Present when the caller should dispatch a low-balance alert
    pub notification: Option<Notification>,
}

impl Processed {
    pub fn notify(&self) -> bool {
        self.notification.is_some()
    }
}

/// Parse one notification with the default (Nairobi) parser at the current time.
pub fn process_message(
    raw: &str,
    rules: &[CategoryRule],
    settings: &BudgetSettings,
) -> Result<Processed, ParseError> {
    process_message_at(&MessageParser::default(), raw, rules, settings, Utc::now())
}

/// Pure pipeline run. `rules` and `settings` are read-only snapshots; `now`
/// is used only if the message timestamp does not parse.
pub fn process_message_at(
    parser: &MessageParser,
    raw: &str,
    rules: &[CategoryRule],
    settings: &BudgetSettings,
    now: DateTime<Utc>,
) -> Result<Processed, ParseError> {
    let mut transaction = parser.parse(raw, now)?;
    let category = categorize(&mut transaction, rules);
    let notification = budget::evaluate(&transaction, settings);

    debug!(
        direction = transaction.direction.as_str(),
        amount = %transaction.amount,
        counterparty = %transaction.counterparty,
        %category,
        notify = notification.is_some(),
        "processed message"
    );

    Ok(Processed {
        transaction,
        notification,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub id: u64,
    pub outcome: Processed,
}

/// Run the pipeline against `store`'s rules and settings and insert the result.
///
/// Unparseable messages are not stored; the `ParseError` is returned inside
/// the `anyhow::Error` so callers can `downcast_ref` it.
pub fn ingest<S: LedgerStore + ?Sized>(
    store: &mut S,
    parser: &MessageParser,
    raw: &str,
    now: DateTime<Utc>,
) -> Result<Ingested> {
    let rules = store.list_category_rules().context("loading category rules")?;
    let settings = store.budget_settings().context("loading budget settings")?;

    let outcome = process_message_at(parser, raw, &rules, &settings, now)?;
    let id = store
        .insert_transaction(outcome.transaction.clone())
        .context("storing transaction")?;

    info!(id, notify = outcome.notify(), "ingested M-PESA message");
    Ok(Ingested { id, outcome })
}
