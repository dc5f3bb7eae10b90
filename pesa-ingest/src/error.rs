use thiserror::Error;

/// Why a raw notification could not become a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text matches none of the known notification shapes.
    #[error("message does not match any known M-PESA notification shape")]
    NoMatchingShape,
    /// A captured amount is not a two-decimal number after separator removal.
    #[error("malformed amount: {0:?}")]
    MalformedAmount(String),
    /// A shape matched but a field its layout requires was not captured.
    #[error("matched shape is missing required capture `{0}`")]
    InvalidCapture(&'static str),
}

impl ParseError {
    /// True when the caller should report "could not parse" rather than a fault
    pub fn is_unparseable(&self) -> bool {
        matches!(self, ParseError::NoMatchingShape)
    }
}
