//! On-disk format versions and the dispatcher between them.
//!
//! | tag | layout                                                     |
//! |-----|------------------------------------------------------------|
//! | 1   | process written directly, targets as identity references   |
//! | 2   | `Steps` + `Process`, chapters' direct steps flattened       |
//! | 3   | `Steps` + `Process`, nested chapters flattened recursively  |
//!
//! Decoding accepts every tag above; encoding writes [FormatVersion::CURRENT]
//! unless a legacy version is asked for explicitly.

mod v1;
mod v2;
mod v3;
#[cfg(test)]
mod format_test;

use std::fmt;

use serde::Deserialize;
use serde_json::Number;
use tracing::{debug, instrument};

use crate::converters::ConverterRegistry;
use crate::error::{Result, SerializerError};
use crate::flatten::{self, Traversal};
use crate::types::{Process, StepRef};

pub use crate::wire::VERSION_FIELD;

/// Known payload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
  V1,
  V2,
  V3,
}

impl FormatVersion {
  /// Version written by [crate::ProcessSerializer::encode].
  pub const CURRENT: FormatVersion = FormatVersion::V3;

  pub const ALL: [FormatVersion; 3] = [FormatVersion::V1, FormatVersion::V2, FormatVersion::V3];

  /// Integer stored under [VERSION_FIELD].
  pub fn tag(self) -> i64 {
    match self {
      FormatVersion::V1 => 1,
      FormatVersion::V2 => 2,
      FormatVersion::V3 => 3,
    }
  }

  pub fn from_tag(tag: i64) -> Result<Self> {
    match tag {
      1 => Ok(FormatVersion::V1),
      2 => Ok(FormatVersion::V2),
      3 => Ok(FormatVersion::V3),
      other => Err(SerializerError::UnsupportedFormatVersion(other.into())),
    }
  }

  /// Encodes `process` in this format.
  pub(crate) fn encode(
    self,
    process: &Process,
    converters: &ConverterRegistry,
    pretty: bool,
  ) -> Result<Vec<u8>> {
    match self {
      FormatVersion::V1 => v1::encode(process, converters, pretty),
      FormatVersion::V2 => v2::encode(process, converters, pretty),
      FormatVersion::V3 => v3::encode(process, converters, pretty),
    }
  }

  /// Decodes a payload already known to carry this format's tag.
  pub(crate) fn decode(self, payload: &[u8], converters: &ConverterRegistry) -> Result<Process> {
    match self {
      FormatVersion::V1 => v1::decode(payload, converters),
      FormatVersion::V2 => v2::decode(payload, converters),
      FormatVersion::V3 => v3::decode(payload, converters),
    }
  }
}

impl fmt::Display for FormatVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "v{}", self.tag())
  }
}

#[derive(Deserialize)]
struct VersionEnvelope {
  #[serde(rename = "$serializerVersion")]
  version: Option<Number>,
}

/// Reads the format tag of `payload` without building any of its content.
pub fn peek_version(payload: &[u8]) -> Result<FormatVersion> {
  let envelope: VersionEnvelope = serde_json::from_slice(payload).map_err(SerializerError::malformed)?;
  let tag = envelope
    .version
    .ok_or_else(|| SerializerError::malformed(format!("missing '{VERSION_FIELD}'")))?;
  match (tag.as_i64(), tag.as_u64()) {
    (Some(tag), _) => FormatVersion::from_tag(tag),
    (None, Some(tag)) => Err(SerializerError::UnsupportedFormatVersion(tag.into())),
    (None, None) => Err(SerializerError::malformed(format!(
      "'{VERSION_FIELD}' must be an integer, found {tag}"
    ))),
  }
}

/// Reads the tag of `payload` and runs the matching decoder.
#[instrument(level = "trace", skip_all, fields(bytes = payload.len()))]
pub fn decode(payload: &[u8], converters: &ConverterRegistry) -> Result<Process> {
  let version = peek_version(payload)?;
  debug!(%version, "decoding process");
  version.decode(payload, converters)
}

/// Fails if a step listed in a payload's `Steps` array is not owned by any
/// chapter of the decoded graph.
pub(crate) fn ensure_owned(
  process: &Process,
  ordered: &[StepRef],
  traversal: Traversal,
) -> Result<()> {
  let index = flatten::collect_process(process, traversal);
  match ordered.iter().find(|s| index.position(s).is_none()) {
    Some(step) => Err(SerializerError::malformed(format!(
      "step '{}' is not part of any chapter",
      step.borrow().name
    ))),
    None => Ok(()),
  }
}

pub(crate) fn expect_tag(found: i64, version: FormatVersion) -> Result<()> {
  if found == version.tag() {
    Ok(())
  } else {
    Err(SerializerError::malformed(format!(
      "expected {VERSION_FIELD} {} but found {found}",
      version.tag()
    )))
  }
}
