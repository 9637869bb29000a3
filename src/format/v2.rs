//! Format 2: the direct steps of the top-level chapters are flattened into
//! `Steps` and their targets written as placeholders. Steps inside
//! behavior-owned chapters keep identity-reference targets, so a top-level
//! step cannot target a nested one in this format.

use tracing::debug;

use super::{FormatVersion, ensure_owned, expect_tag};
use crate::converters::ConverterRegistry;
use crate::error::{Result, SerializerError};
use crate::flatten::{self, Traversal};
use crate::identity::{IdentityReader, IdentityWriter, TargetReading, TargetWriting};
use crate::resolve;
use crate::types::{Process, StepRef};
use crate::wire::{self, FlatProcessPayload};

pub(super) fn encode(
  process: &Process,
  converters: &ConverterRegistry,
  pretty: bool,
) -> Result<Vec<u8>> {
  let flat = flatten::flatten(process, Traversal::DirectSteps)?;
  let mut writer = IdentityWriter::new(converters, TargetWriting::Indexed(&flat));
  let steps = flat
    .steps()
    .iter()
    .map(|s| writer.step(s))
    .collect::<Result<Vec<_>>>()?;
  let record = writer.process(process)?;
  writer.finish()?;
  wire::to_bytes(
    &FlatProcessPayload {
      version: FormatVersion::V2.tag(),
      steps,
      process: record,
    },
    pretty,
  )
}

pub(super) fn decode(payload: &[u8], converters: &ConverterRegistry) -> Result<Process> {
  let payload: FlatProcessPayload =
    serde_json::from_slice(payload).map_err(SerializerError::malformed)?;
  expect_tag(payload.version, FormatVersion::V2)?;
  let mut reader = IdentityReader::new(converters, TargetReading::Indexed);
  let ordered = payload
    .steps
    .into_iter()
    .map(|s| reader.step(s))
    .collect::<Result<Vec<StepRef>>>()?;
  let process = reader.process(payload.process)?;
  let pending = reader.finish()?;
  resolve::resolve(&ordered, pending)?;
  ensure_owned(&process, &ordered, Traversal::DirectSteps)?;
  debug!(steps = ordered.len(), "decoded v2 process");
  Ok(process)
}
