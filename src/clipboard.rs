//! Serialization of graph fragments for copy/paste.
//!
//! - A single step is written as a bare step object. Every transition target
//!   inside it, including those of steps in its nested chapters, is written
//!   as `null`; on read, targets are ignored.
//! - A chapter is written like a format-3 process with `Chapter` in place of
//!   `Process`. Targets between steps of the chapter survive the round trip,
//!   targets leaving the chapter become `null`.

use tracing::{debug, instrument};

use crate::converters::ConverterRegistry;
use crate::error::{Result, SerializerError};
use crate::flatten::{self, Traversal};
use crate::format::{self, FormatVersion};
use crate::identity::{IdentityReader, IdentityWriter, TargetReading, TargetWriting};
use crate::resolve;
use crate::types::{Chapter, StepRef};
use crate::wire::{self, ChapterPayload, StepNode};

/// Writes `step` on its own, with all transition targets erased.
#[instrument(level = "trace", skip_all)]
pub fn encode_step(step: &StepRef, converters: &ConverterRegistry, pretty: bool) -> Result<Vec<u8>> {
  let mut writer = IdentityWriter::new(converters, TargetWriting::Erased);
  let node = writer.step(step)?;
  writer.finish()?;
  wire::to_bytes(&node, pretty)
}

/// Reads a step written by [encode_step]. The result has no transition targets.
#[instrument(level = "trace", skip_all, fields(bytes = payload.len()))]
pub fn decode_step(payload: &[u8], converters: &ConverterRegistry) -> Result<StepRef> {
  let node: StepNode = serde_json::from_slice(payload).map_err(SerializerError::malformed)?;
  if let StepNode::Ref(reference) = &node {
    return Err(SerializerError::malformed(format!(
      "expected a step definition, found a reference to '{}'",
      reference.id
    )));
  }
  let mut reader = IdentityReader::new(converters, TargetReading::Discard);
  let step = reader.step(node)?;
  reader.finish()?;
  debug!(step = %step.borrow().name, "decoded step");
  Ok(step)
}

/// Writes `chapter` with its nested chapters, keeping targets inside it.
#[instrument(level = "trace", skip_all, fields(chapter = %chapter.name))]
pub fn encode_chapter(
  chapter: &Chapter,
  converters: &ConverterRegistry,
  pretty: bool,
) -> Result<Vec<u8>> {
  let flat = flatten::flatten_chapter(chapter)?;
  let mut writer = IdentityWriter::new(converters, TargetWriting::Indexed(&flat));
  let steps = flat
    .steps()
    .iter()
    .map(|s| writer.step(s))
    .collect::<Result<Vec<_>>>()?;
  let record = writer.chapter(chapter)?;
  writer.finish()?;
  wire::to_bytes(
    &ChapterPayload {
      version: FormatVersion::CURRENT.tag(),
      steps,
      chapter: record,
    },
    pretty,
  )
}

/// Reads a chapter written by [encode_chapter].
#[instrument(level = "trace", skip_all, fields(bytes = payload.len()))]
pub fn decode_chapter(payload: &[u8], converters: &ConverterRegistry) -> Result<Chapter> {
  let version = format::peek_version(payload)?;
  if version != FormatVersion::CURRENT {
    return Err(SerializerError::UnsupportedFormatVersion(version.tag().into()));
  }
  let payload: ChapterPayload =
    serde_json::from_slice(payload).map_err(SerializerError::malformed)?;
  let mut reader = IdentityReader::new(converters, TargetReading::Indexed);
  let ordered = payload
    .steps
    .into_iter()
    .map(|s| reader.step(s))
    .collect::<Result<Vec<StepRef>>>()?;
  let chapter = reader.chapter(payload.chapter)?;
  let pending = reader.finish()?;
  resolve::resolve(&ordered, pending)?;
  let index = flatten::collect_chapter(&chapter, Traversal::Recursive);
  if let Some(stray) = ordered.iter().find(|s| index.position(s).is_none()) {
    return Err(SerializerError::malformed(format!(
      "step '{}' is not part of the chapter",
      stray.borrow().name
    )));
  }
  debug!(steps = ordered.len(), "decoded chapter");
  Ok(chapter)
}
