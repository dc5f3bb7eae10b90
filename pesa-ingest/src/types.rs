use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ParseError;

/// One recognized notification layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageShape {
    Received,
    SentToPerson,
    SentToPaybill,
    PaidToBusiness,
}

impl MessageShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageShape::Received => "received",
            MessageShape::SentToPerson => "sent-to-person",
            MessageShape::SentToPaybill => "sent-to-paybill",
            MessageShape::PaidToBusiness => "paid-to-business",
        }
    }
}

impl fmt::Display for MessageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field values extracted by a shape, keyed by the shape's capture names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeCaptures {
    fields: BTreeMap<&'static str, String>,
}

impl ShapeCaptures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<String>) {
        self.fields.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A capture the shape's layout guarantees; absence is a shape-definition bug.
    pub fn require(&self, name: &'static str) -> Result<&str, ParseError> {
        self.get(name).ok_or(ParseError::InvalidCapture(name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Output of the shape matcher: which shape matched, and what it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedShape {
    pub shape: MessageShape,
    pub captures: ShapeCaptures,
}
