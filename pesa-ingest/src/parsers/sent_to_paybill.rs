//! Bill payments routed through a paybill number.
//!
//!   QAD3EF4GH5 Confirmed. Ksh1,000.00 sent to KPLC PREPAID Paybill 888880 for
//!   account 54301234567 on 6/3/24 at 1:00 PM New M-PESA balance is Ksh800.00.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::ShapeCaptures;

pub const LAYOUT: [&str; 7] = ["amount", "business", "paybill", "account", "date", "time", "balance"];

static PAYBILL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)ksh\s?(?P<amount>[\d,]+(?:\.\d+)?)\s+sent\s+to\s+",
        r"(?P<business>.+?)\s+paybill\s+(?:no\.?\s*)?(?P<paybill>\d+)\s+",
        r"for\s+account\s+(?P<account>.+?)\s+",
        r"on\s+(?P<date>\S+)\s+at\s+(?P<time>\d{1,2}:\d{2}\s*[ap]m)",
        r".*?balance\s+is\s+ksh\s?(?P<balance>[\d,]+(?:\.\d+)?)"
    ))
    .expect("paybill pattern compiles")
});

pub fn extract(text: &str) -> Option<ShapeCaptures> {
    PAYBILL_RE
        .captures(text)
        .and_then(|caps| super::collect(&caps, &LAYOUT))
}
