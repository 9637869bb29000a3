//! Rebuilding transition targets from placeholders.

use tracing::{debug, instrument};

use crate::error::{Result, SerializerError};
use crate::flatten::FlattenedStepIndex;
use crate::types::StepRef;

/// A transition read with a placeholder target: transition `transition` of
/// `step` should point at the step at `placeholder` in the ordered sequence.
#[derive(Debug, Clone)]
pub struct PendingTarget {
  pub step: StepRef,
  pub transition: usize,
  pub placeholder: FlattenedStepIndex,
}

/// Looks up the step a placeholder stands for. [FlattenedStepIndex::NO_TARGET]
/// yields `None`; any other index must be in range.
pub fn lookup(steps: &[StepRef], placeholder: FlattenedStepIndex) -> Result<Option<StepRef>> {
  if placeholder.is_no_target() {
    return Ok(None);
  }
  usize::try_from(placeholder.raw())
    .ok()
    .and_then(|i| steps.get(i))
    .cloned()
    .map(Some)
    .ok_or(SerializerError::CorruptGraphReference {
      index: placeholder.raw(),
      step_count: steps.len(),
    })
}

/// Points every pending transition at its step in `steps`.
///
/// All placeholders are checked before any transition is touched, so a
/// corrupt index leaves the graph as it was.
#[instrument(level = "trace", skip_all, fields(steps = steps.len(), pending = pending.len()))]
pub fn resolve(steps: &[StepRef], pending: Vec<PendingTarget>) -> Result<()> {
  let targets = pending
    .iter()
    .map(|p| lookup(steps, p.placeholder))
    .collect::<Result<Vec<_>>>()?;
  for (p, target) in pending.iter().zip(&targets) {
    let mut step = p.step.borrow_mut();
    if p.transition >= step.transitions.len() {
      return Err(SerializerError::malformed(format!(
        "step '{}' has no transition {}",
        step.name, p.transition
      )));
    }
    step.transitions[p.transition].set_target(target.as_ref());
  }
  debug!(resolved = targets.len(), "resolved transition targets");
  Ok(())
}
