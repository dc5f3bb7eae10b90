//! pesa-ingest: M-PESA notification shapes, field normalization and transaction building.

pub mod builder;
pub mod error;
pub mod normalize;
pub mod parsers;
pub mod types;

pub use builder::{MessageParser, build_transaction};
pub use error::ParseError;
pub use parsers::{SHAPE_ORDER, identify_shape, match_shape};
pub use types::{MatchedShape, MessageShape, ShapeCaptures};
