//! pesa-core: domain types shared by the M-PESA ingestion and budgeting crates

pub mod budget;
pub mod category;
pub mod time;
pub mod transaction;

pub use budget::{BudgetSettings, Notification};
pub use category::{Category, CategoryBook, CategoryError, CategoryId, CategoryRule};
pub use time::{DEFAULT_TIMEZONE, local_to_utc};
pub use transaction::{Direction, TimestampSource, Transaction};
