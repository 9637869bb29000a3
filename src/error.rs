//! Errors raised while encoding or decoding processes.

use thiserror::Error;

/// Error returned by every encode/decode operation of this crate.
///
/// Structural errors are never recovered from locally: a decode either
/// returns a complete graph or one of these.
#[derive(Debug, Error)]
pub enum SerializerError {
  /// The payload names a format version no decoder exists for.
  #[error("unsupported serializer format version {0}")]
  UnsupportedFormatVersion(i128),

  /// The payload is not valid JSON or lacks a required field.
  #[error("malformed payload: {0}")]
  MalformedPayload(String),

  /// A transition placeholder points outside the flattened step sequence.
  #[error("transition target index {index} is out of range for {step_count} flattened steps")]
  CorruptGraphReference { index: i64, step_count: usize },

  /// A leaf value converter failed, or no converter claims the value.
  #[error("cannot convert value of type '{type_name}': {cause}")]
  ValueConversion { type_name: String, cause: String },

  /// A transition targets a step that is not part of what is being written.
  #[error("transition of step '{step}' targets a step outside the serialized graph")]
  DanglingTarget { step: String },

  /// The encoded JSON would nest deeper than the decoders can read.
  #[error("payload nesting depth {depth} exceeds the readable maximum {max}")]
  NestingTooDeep { depth: usize, max: usize },

  /// Two converters claim the same type.
  #[error("a converter for type '{0}' is already registered")]
  DuplicateConverter(String),

  /// Writing JSON text failed.
  #[error("failed to write JSON: {0}")]
  Json(#[source] serde_json::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl SerializerError {
  pub(crate) fn malformed(reason: impl std::fmt::Display) -> Self {
    SerializerError::MalformedPayload(reason.to_string())
  }

  pub(crate) fn conversion(type_name: impl Into<String>, cause: impl Into<String>) -> Self {
    SerializerError::ValueConversion {
      type_name: type_name.into(),
      cause: cause.into(),
    }
  }
}

pub type Result<T> = std::result::Result<T, SerializerError>;
