//! Public entry point: encode and decode processes, chapters and steps.

use tracing::{debug, instrument};

use crate::clipboard;
use crate::converters::ConverterRegistry;
use crate::error::Result;
use crate::format::{self, FormatVersion};
use crate::types::{Chapter, Process, StepRef};

/// Output options of a [ProcessSerializer].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerOptions {
  /// Indent JSON output.
  pub pretty: bool,
}

impl SerializerOptions {
  pub fn pretty() -> Self {
    Self { pretty: true }
  }
}

/// Encodes processes in the current format and decodes every supported one.
///
/// Each call runs to completion on the calling thread; the process must not
/// be mutated while it is being encoded.
#[derive(Debug, Default)]
pub struct ProcessSerializer {
  converters: ConverterRegistry,
  options: SerializerOptions,
}

impl ProcessSerializer {
  pub fn new(converters: ConverterRegistry) -> Self {
    Self {
      converters,
      options: SerializerOptions::default(),
    }
  }

  pub fn with_options(mut self, options: SerializerOptions) -> Self {
    self.options = options;
    self
  }

  pub fn converters(&self) -> &ConverterRegistry {
    &self.converters
  }

  pub fn options(&self) -> SerializerOptions {
    self.options
  }

  /// Encodes `process` in [FormatVersion::CURRENT].
  pub fn encode(&self, process: &Process) -> Result<Vec<u8>> {
    self.encode_as(process, FormatVersion::CURRENT)
  }

  /// Encodes `process` in a specific format, e.g. for tools that still read an older one.
  #[instrument(level = "trace", skip(self, process), fields(process = %process.name))]
  pub fn encode_as(&self, process: &Process, version: FormatVersion) -> Result<Vec<u8>> {
    let bytes = version.encode(process, &self.converters, self.options.pretty)?;
    debug!(%version, bytes = bytes.len(), "encoded process");
    Ok(bytes)
  }

  /// Decodes a process written in any supported format.
  pub fn decode(&self, payload: &[u8]) -> Result<Process> {
    format::decode(payload, &self.converters)
  }

  /// Format version of `payload`, read without decoding the graph.
  pub fn peek_version(&self, payload: &[u8]) -> Result<FormatVersion> {
    format::peek_version(payload)
  }

  /// Encodes one step on its own; its transition targets are written as `null`.
  pub fn encode_step(&self, step: &StepRef) -> Result<Vec<u8>> {
    clipboard::encode_step(step, &self.converters, self.options.pretty)
  }

  /// Decodes a step written by [ProcessSerializer::encode_step].
  pub fn decode_step(&self, payload: &[u8]) -> Result<StepRef> {
    clipboard::decode_step(payload, &self.converters)
  }

  /// Encodes one chapter; targets leaving it are written as `null`.
  pub fn encode_chapter(&self, chapter: &Chapter) -> Result<Vec<u8>> {
    clipboard::encode_chapter(chapter, &self.converters, self.options.pretty)
  }

  /// Decodes a chapter written by [ProcessSerializer::encode_chapter].
  pub fn decode_chapter(&self, payload: &[u8]) -> Result<Chapter> {
    clipboard::decode_chapter(payload, &self.converters)
  }
}
