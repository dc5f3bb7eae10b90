//! Time utilities: message-local wall clock to UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// M-PESA notifications are stamped in East Africa Time.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Africa::Nairobi;

/// Interpret a naive wall-clock time in `tz`, returning UTC.
///
/// `None` for local times that do not exist or are ambiguous (DST transitions).
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}
