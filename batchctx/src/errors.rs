//! Error types for execution context serialization.
//!
//! Decoding problems are reported as [`DecodeError`] values carrying a kind and
//! the location inside the document. The serializer wraps the terminal one in
//! [`CodecError::Decode`] together with the name of the strategy that produced it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The main error type for serializer operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A required input was absent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A strategy could not decode the payload.
    #[error("Decode failure ({strategy}): {source}")]
    Decode {
        /// Name of the strategy that failed.
        strategy: &'static str,
        /// The underlying decode error.
        #[source]
        source: DecodeError,
    },

    /// A value could not be written in the requested format.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Serialization/deserialization error from the JSON layer.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Wraps a decode error with the strategy that raised it.
    #[must_use]
    pub const fn decode(strategy: &'static str, source: DecodeError) -> Self {
        Self::Decode { strategy, source }
    }

    /// Returns the decode error kind, if this is a decode failure.
    #[must_use]
    pub const fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            Self::Decode { source, .. } => Some(source.kind),
            _ => None,
        }
    }
}

/// Category of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorKind {
    /// The payload is not valid JSON or not valid UTF-8.
    Malformed,
    /// A value that must carry a type identifier does not.
    MissingTypeId,
    /// A type identifier does not fit the value it is attached to.
    InvalidTypeId,
    /// A type identifier is not on the trusted list.
    UntrustedTypeId,
    /// An object carries a field the schema does not know.
    UnknownField,
    /// A required field is absent.
    MissingField,
    /// A field has the wrong shape.
    InvalidValue,
    /// A job parameter type tag is not one of the known tags.
    UnrecognizedTag,
    /// An epoch value does not map to a representable date.
    InvalidTimestamp,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Malformed => "malformed document",
            Self::MissingTypeId => "missing type id",
            Self::InvalidTypeId => "invalid type id",
            Self::UntrustedTypeId => "untrusted type id",
            Self::UnknownField => "unknown field",
            Self::MissingField => "missing field",
            Self::InvalidValue => "invalid value",
            Self::UnrecognizedTag => "unrecognized tag",
            Self::InvalidTimestamp => "invalid timestamp",
        };
        f.write_str(name)
    }
}

/// Error raised when a document cannot be decoded into an execution context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {path}: {message}")]
pub struct DecodeError {
    /// The failure category.
    pub kind: DecodeErrorKind,
    /// Location inside the document, e.g. `$.params.value[1]`.
    pub path: String,
    /// Human-readable detail.
    pub message: String,
}

impl DecodeError {
    /// Creates a new decode error at the document root.
    #[must_use]
    pub fn new(kind: DecodeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: "$".to_string(),
            message: message.into(),
        }
    }

    /// Sets the location of the error.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Creates a malformed-document error from a JSON parse failure.
    #[must_use]
    pub fn malformed(err: &serde_json::Error) -> Self {
        Self::new(
            DecodeErrorKind::Malformed,
            format!("{err} (line {}, column {})", err.line(), err.column()),
        )
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "kind".to_string(),
            serde_json::to_value(self.kind).unwrap_or(serde_json::Value::Null),
        );
        map.insert("path".to_string(), serde_json::Value::String(self.path.clone()));
        map.insert(
            "message".to_string(),
            serde_json::Value::String(self.message.clone()),
        );
        map
    }
}

/// Error raised when a job parameter type tag is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized job parameter type: '{tag}'")]
pub struct UnrecognizedTagError {
    /// The offending tag.
    pub tag: String,
}

impl UnrecognizedTagError {
    /// Creates a new unrecognized tag error.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl From<UnrecognizedTagError> for DecodeError {
    fn from(err: UnrecognizedTagError) -> Self {
        Self::new(DecodeErrorKind::UnrecognizedTag, err.to_string())
    }
}

/// Result type alias for serializer operations.
pub type Result<T> = std::result::Result<T, CodecError>;
