//! Ordered shape matcher over the known M-PESA notification layouts.
//!
//! Each shape lives in its own module with a case-insensitive regex and a
//! capture layout. Shapes are tried in `SHAPE_ORDER`; the first structural
//! match wins.

pub mod paid_to_business;
pub mod received;
pub mod sent_to_paybill;
pub mod sent_to_person;

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::ParseError;
use crate::types::{MatchedShape, MessageShape, ShapeCaptures};

/// Paybill must precede the generic send: a paybill message is a textual
/// superset of "sent to <name>".
pub const SHAPE_ORDER: [MessageShape; 4] = [
    MessageShape::Received,
    MessageShape::SentToPaybill,
    MessageShape::SentToPerson,
    MessageShape::PaidToBusiness,
];

const PAYBILL_KEYWORD: &str = "paybill";

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?P<code>[A-Z0-9]{10})\s+confirmed\b").expect("code pattern compiles")
});

static COST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)transaction\s+cost,?\s*ksh\s?(?P<cost>[\d,]+(?:\.\d+)?)")
        .expect("cost pattern compiles")
});

/// Layout fields a shape may legitimately leave out.
const OPTIONAL_FIELDS: [&str; 1] = ["phone"];

/// Copy the named groups of `layout` out of `caps`, trimming padding and
/// sentence punctuation.
///
/// `None` when a required field is absent or nothing but punctuation, so the
/// text is not taken as this shape.
pub(crate) fn collect(caps: &Captures<'_>, layout: &[&'static str]) -> Option<ShapeCaptures> {
    let mut out = ShapeCaptures::new();
    for name in layout {
        let value = caps
            .name(name)
            .map(|m| m.as_str().trim().trim_end_matches(['.', ',']).trim())
            .unwrap_or_default();
        if !value.is_empty() {
            out.insert(name, value);
        } else if !OPTIONAL_FIELDS.contains(name) {
            return None;
        }
    }
    Some(out)
}

fn extract(shape: MessageShape, text: &str, lower: &str) -> Option<ShapeCaptures> {
    match shape {
        MessageShape::Received => received::extract(text),
        // The keyword check keeps the two "sent to" shapes disjoint even where
        // either regex alone could be satisfied.
        MessageShape::SentToPaybill if lower.contains(PAYBILL_KEYWORD) => {
            sent_to_paybill::extract(text)
        }
        MessageShape::SentToPerson if !lower.contains(PAYBILL_KEYWORD) => {
            sent_to_person::extract(text)
        }
        MessageShape::SentToPaybill | MessageShape::SentToPerson => None,
        MessageShape::PaidToBusiness => paid_to_business::extract(text),
    }
}

/// Captures shared by all shapes: the leading transaction code and a
/// trailing transaction cost.
fn add_common(text: &str, captures: &mut ShapeCaptures) {
    if let Some(caps) = CODE_RE.captures(text) {
        captures.insert("code", caps["code"].to_ascii_uppercase());
    }
    if let Some(caps) = COST_RE.captures(text) {
        captures.insert("cost", &caps["cost"]);
    }
}

/// Find the first shape in `SHAPE_ORDER` that structurally matches `text`.
pub fn match_shape(text: &str) -> Result<MatchedShape, ParseError> {
    let lower = text.to_lowercase();
    for shape in SHAPE_ORDER {
        if let Some(mut captures) = extract(shape, text, &lower) {
            add_common(text, &mut captures);
            debug!(%shape, fields = captures.len(), "matched notification shape");
            return Ok(MatchedShape { shape, captures });
        }
    }
    debug!("no notification shape matched");
    Err(ParseError::NoMatchingShape)
}

/// Which shape `text` would be parsed as, if any.
pub fn identify_shape(text: &str) -> Option<MessageShape> {
    match_shape(text).ok().map(|m| m.shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIVED: &str = "QAB1CD2EF3 Confirmed. You have received Ksh1,500.00 from JOHN DOE 0712345678 on 5/3/24 at 10:15 AM New M-PESA balance is Ksh2,300.00.";
    const SENT: &str = "QAC2DE3FG4 Confirmed. Ksh500.00 sent to JANE WANJIKU 0722000111 on 5/3/24 at 11:00 AM. New M-PESA balance is Ksh1,800.00. Transaction cost, Ksh7.00.";
    const PAYBILL: &str = "QAD3EF4GH5 Confirmed. Ksh1,000.00 sent to KPLC PREPAID Paybill 888880 for account 54301234567 on 6/3/24 at 1:00 PM New M-PESA balance is Ksh800.00. Transaction cost, Ksh0.00.";
    const PAID: &str = "QAE4FG5HI6 Confirmed. You paid to JAVA HOUSE Ksh250.00 on 6/3/24 at 2:30 PM. New M-PESA balance is Ksh550.00.";

    #[test]
    fn test_each_shape_is_identified() {
        assert_eq!(identify_shape(RECEIVED), Some(MessageShape::Received));
        assert_eq!(identify_shape(SENT), Some(MessageShape::SentToPerson));
        assert_eq!(identify_shape(PAYBILL), Some(MessageShape::SentToPaybill));
        assert_eq!(identify_shape(PAID), Some(MessageShape::PaidToBusiness));
    }

    #[test]
    fn test_paybill_is_not_captured_as_generic_send() {
        // The person regex alone would accept this text with a mangled name.
        assert!(sent_to_person::extract(PAYBILL).is_some());

        let matched = match_shape(PAYBILL).unwrap();
        assert_eq!(matched.shape, MessageShape::SentToPaybill);
        assert_eq!(matched.captures.get("business"), Some("KPLC PREPAID"));
        assert_eq!(matched.captures.get("paybill"), Some("888880"));
        assert_eq!(matched.captures.get("account"), Some("54301234567"));
    }

    #[test]
    fn test_paybill_keyword_without_paybill_layout_is_rejected() {
        // Mentions paybill, but has no "for account" section: neither send shape applies.
        let text = "Ksh100.00 sent to PAYBILL HELPDESK 0700000000 on 6/3/24 at 1:00 PM New M-PESA balance is Ksh800.00.";
        assert_eq!(match_shape(text), Err(ParseError::NoMatchingShape));
    }

    #[test]
    fn test_common_captures() {
        let matched = match_shape(SENT).unwrap();
        assert_eq!(matched.captures.get("code"), Some("QAC2DE3FG4"));
        assert_eq!(matched.captures.get("cost"), Some("7.00"));

        let matched = match_shape(RECEIVED).unwrap();
        assert_eq!(matched.captures.get("cost"), None);
    }

    #[test]
    fn test_punctuation_only_name_is_no_match() {
        let text = "You have received Ksh10.00 from . on 5/3/24 at 10:00 AM New M-PESA balance is Ksh10.00.";
        assert!(received::extract(text).is_none());
        assert_eq!(match_shape(text), Err(ParseError::NoMatchingShape));
    }

    #[test]
    fn test_missing_phone_is_still_a_match() {
        let text = "Ksh50.00 sent to MAMA MBOGA on 5/3/24 at 9:00 AM. New M-PESA balance is Ksh950.00.";
        let matched = match_shape(text).unwrap();
        assert_eq!(matched.shape, MessageShape::SentToPerson);
        assert_eq!(matched.captures.get("recipient"), Some("MAMA MBOGA"));
        assert_eq!(matched.captures.get("phone"), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let lower = RECEIVED.to_lowercase();
        assert_eq!(identify_shape(&lower), Some(MessageShape::Received));
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(match_shape(""), Err(ParseError::NoMatchingShape));
        assert_eq!(
            match_shape("Your M-PESA PIN has been changed."),
            Err(ParseError::NoMatchingShape)
        );
    }
}
