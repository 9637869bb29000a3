//! Process save/load to disk (JSON).

use std::path::Path;

use tracing::instrument;

use crate::error::Result;
use crate::serializer::ProcessSerializer;
use crate::types::Process;

/// Default filename for a saved process.
pub const PROCESS_FILENAME: &str = "process.json";

/// Saves `process` to `path` in the current format. Creates the parent directory if needed.
#[instrument(level = "trace", skip(path, serializer, process))]
pub fn save_process(path: &Path, serializer: &ProcessSerializer, process: &Process) -> Result<()> {
  let bytes = serializer.encode(process)?;
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, bytes)?;
  Ok(())
}

/// Loads a process from `path`, whatever supported format it was written in.
#[instrument(level = "trace", skip(path, serializer))]
pub fn load_process(path: &Path, serializer: &ProcessSerializer) -> Result<Process> {
  let bytes = std::fs::read(path)?;
  serializer.decode(&bytes)
}
