//! Error types for fedstore-vocab.
//!
//! Uses `thiserror` for structured, matchable variants covering codec
//! failures and invalid conversions between item representations.

use thiserror::Error;

use crate::types::ObjectType;

/// Errors produced by the vocabulary crate.
#[derive(Debug, Error)]
pub enum VocabError {
    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON object carried no `type` property.
    #[error("object has no type property")]
    MissingType,

    /// A JSON object carried a `type` this vocabulary does not know.
    #[error("unknown object type: '{0}'")]
    UnknownType(String),

    /// A JSON value was neither an IRI string nor an object.
    #[error("value is neither an IRI nor an object")]
    NotAnItem,

    /// An item could not be converted to the requested representation.
    #[error("cannot convert {from} to {to}")]
    Conversion { from: ObjectType, to: &'static str },
}
