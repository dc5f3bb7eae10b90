//! Person-to-person sends.
//!
//!   QAC2DE3FG4 Confirmed. Ksh500.00 sent to JANE WANJIKU 0722000111 on 5/3/24
//!   at 11:00 AM. New M-PESA balance is Ksh1,800.00. Transaction cost, Ksh7.00.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::ShapeCaptures;

pub const LAYOUT: [&str; 6] = ["amount", "recipient", "phone", "date", "time", "balance"];

// Structurally also satisfied by paybill messages; the matcher guards it
// with the keyword check.
static SENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)ksh\s?(?P<amount>[\d,]+(?:\.\d+)?)\s+sent\s+to\s+",
        r"(?P<recipient>.+?)(?:\s+(?P<phone>\d{10}))?\.?\s+",
        r"on\s+(?P<date>\S+)\s+at\s+(?P<time>\d{1,2}:\d{2}\s*[ap]m)",
        r".*?balance\s+is\s+ksh\s?(?P<balance>[\d,]+(?:\.\d+)?)"
    ))
    .expect("sent pattern compiles")
});

pub fn extract(text: &str) -> Option<ShapeCaptures> {
    SENT_RE
        .captures(text)
        .and_then(|caps| super::collect(&caps, &LAYOUT))
}
