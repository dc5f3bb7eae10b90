//! Till / merchant payments. The amount follows the business name here.
//!
//!   QAE4FG5HI6 Confirmed. You paid to JAVA HOUSE Ksh250.00 on 6/3/24 at
//!   2:30 PM. New M-PESA balance is Ksh550.00.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::ShapeCaptures;

pub const LAYOUT: [&str; 5] = ["business", "amount", "date", "time", "balance"];

static PAID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)paid\s+to\s+(?P<business>.+?)\.?\s+",
        r"ksh\s?(?P<amount>[\d,]+(?:\.\d+)?)\s+",
        r"on\s+(?P<date>\S+)\s+at\s+(?P<time>\d{1,2}:\d{2}\s*[ap]m)",
        r".*?balance\s+is\s+ksh\s?(?P<balance>[\d,]+(?:\.\d+)?)"
    ))
    .expect("paid pattern compiles")
});

pub fn extract(text: &str) -> Option<ShapeCaptures> {
    PAID_RE
        .captures(text)
        .and_then(|caps| super::collect(&caps, &LAYOUT))
}
