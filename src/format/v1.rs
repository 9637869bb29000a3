//! Format 1: the process written directly, every transition target as an
//! identity reference.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{FormatVersion, expect_tag};
use crate::converters::ConverterRegistry;
use crate::error::{Result, SerializerError};
use crate::identity::{IdentityReader, IdentityWriter, TargetReading, TargetWriting};
use crate::types::Process;
use crate::wire::{self, ProcessRecord};

#[derive(Serialize, Deserialize)]
struct Envelope {
  #[serde(rename = "$serializerVersion")]
  version: i64,
  #[serde(flatten)]
  process: ProcessRecord,
}

pub(super) fn encode(
  process: &Process,
  converters: &ConverterRegistry,
  pretty: bool,
) -> Result<Vec<u8>> {
  let mut writer = IdentityWriter::new(converters, TargetWriting::Native);
  let record = writer.process(process)?;
  writer.finish()?;
  wire::to_bytes(
    &Envelope {
      version: FormatVersion::V1.tag(),
      process: record,
    },
    pretty,
  )
}

pub(super) fn decode(payload: &[u8], converters: &ConverterRegistry) -> Result<Process> {
  let envelope: Envelope = serde_json::from_slice(payload).map_err(SerializerError::malformed)?;
  expect_tag(envelope.version, FormatVersion::V1)?;
  let mut reader = IdentityReader::new(converters, TargetReading::Native);
  let process = reader.process(envelope.process)?;
  let placeholders = reader.finish()?;
  debug_assert!(placeholders.is_empty());
  debug!(chapters = process.chapters.len(), "decoded v1 process");
  Ok(process)
}
