//! pesa-finance: category rules, budget threshold evaluation, and the
//! message-to-ledger pipeline with its storage and messaging seams.

pub mod budget;
pub mod category_rules;
pub mod notify;
pub mod pipeline;
pub mod store;

pub use budget::{evaluate, should_notify};
pub use category_rules::{categorize, like_match, resolve_category};
pub use notify::{Messenger, dispatch_detached};
pub use pipeline::{Ingested, Processed, ingest, process_message, process_message_at};
pub use store::{Ledger, LedgerStore, StoredTransaction};
