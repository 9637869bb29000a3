//! Format 3 (current): every step of the forest, including those in
//! behavior-owned chapters, is flattened into `Steps`; all transition targets
//! are placeholders into that array.

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
  let flat = flatten::flatten(process, Traversal::Recursive)?;
  let mut writer = IdentityWriter::new(converters, TargetWriting::Indexed(&flat));
  let steps = flat
    .steps()
    .iter()
    .map(|s| writer.step(s))
    .collect::<Result<Vec<_>>>()?;
  let record = writer.process(process)?;
  writer.finish()?;
  debug!(steps = steps.len(), "encoded v3 process");
  wire::to_bytes(
    &FlatProcessPayload {
      version: FormatVersion::V3.tag(),
      steps,
      process: record,
    },
    pretty,
  )
}

pub(super) fn decode(payload: &[u8], converters: &ConverterRegistry) -> Result<Process> {
  let payload: FlatProcessPayload =
    serde_json::from_slice(payload).map_err(SerializerError::malformed)?;
  expect_tag(payload.version, FormatVersion::V3)?;
  let mut reader = IdentityReader::new(converters, TargetReading::Indexed);
  let ordered = payload
    .steps
    .into_iter()
    .map(|s| reader.step(s))
    .collect::<Result<Vec<StepRef>>>()?;
  let process = reader.process(payload.process)?;
  let pending = reader.finish()?;
  resolve::resolve(&ordered, pending)?;
  ensure_owned(&process, &ordered, Traversal::Recursive)?;
  debug!(steps = ordered.len(), "decoded v3 process");
  Ok(process)
}
