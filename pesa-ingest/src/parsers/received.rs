//! "You have received" notifications.
//!
//!   QAB1CD2EF3 Confirmed. You have received Ksh1,500.00 from JOHN DOE 0712345678
//!   on 5/3/24 at 10:15 AM New M-PESA balance is Ksh2,300.00.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::ShapeCaptures;

pub const LAYOUT: [&str; 6] = ["amount", "sender", "phone", "date", "time", "balance"];

static RECEIVED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)received\s+ksh\s?(?P<amount>[\d,]+(?:\.\d+)?)\s+",
        r"from\s+(?P<sender>.+?)(?:\s+(?P<phone>\d{10}))?\.?\s+",
        r"on\s+(?P<date>\S+)\s+at\s+(?P<time>\d{1,2}:\d{2}\s*[ap]m)",
        r".*?balance\s+is\s+ksh\s?(?P<balance>[\d,]+(?:\.\d+)?)"
    ))
    .expect("received pattern compiles")
});

pub fn extract(text: &str) -> Option<ShapeCaptures> {
    RECEIVED_RE
        .captures(text)
        .and_then(|caps| super::collect(&caps, &LAYOUT))
}
