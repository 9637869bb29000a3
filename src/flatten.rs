//! Flattening of the step forest into one ordered, deduplicated sequence.
//!
//! Steps are collected chapter by chapter in declaration order. With
//! [Traversal::Recursive], the chapters owned by the behaviors of a chapter's
//! steps are visited right after that chapter's own steps, depth-first.
//! Every transition target is then replaced by its position in the sequence
//! ([FlattenedStepIndex]), kept in a table parallel to the steps; the live
//! graph is never modified.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, SerializerError};
use crate::types::{Chapter, Process, StepKey, StepRef, step_key};

/// Position of a step in the flattened sequence; [FlattenedStepIndex::NO_TARGET]
/// stands for a terminal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedStepIndex(i64);

impl FlattenedStepIndex {
  pub const NO_TARGET: FlattenedStepIndex = FlattenedStepIndex(-1);

  pub fn at(position: usize) -> Self {
    Self(position as i64)
  }

  pub fn from_raw(raw: i64) -> Self {
    Self(raw)
  }

  pub fn raw(self) -> i64 {
    self.0
  }

  pub fn is_no_target(self) -> bool {
    self == Self::NO_TARGET
  }
}

impl fmt::Display for FlattenedStepIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Which chapters contribute steps to the flattened sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
  /// Only the steps listed directly in the visited chapters.
  DirectSteps,
  /// Also the steps of chapters owned by behaviors, recursively.
  Recursive,
}

/// What to do with a target that is not part of the flattened sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingPolicy {
  /// Fail with [SerializerError::DanglingTarget].
  Reject,
  /// Write the target as [FlattenedStepIndex::NO_TARGET].
  Erase,
}

/// Ordered, identity-deduplicated step sequence.
#[derive(Debug, Default)]
pub struct StepIndex {
  steps: Vec<StepRef>,
  positions: HashMap<StepKey, usize>,
}

impl StepIndex {
  /// Appends `step` unless it is already indexed. Returns true if it was added.
  fn insert(&mut self, step: &StepRef) -> bool {
    let key = step_key(step);
    if self.positions.contains_key(&key) {
      return false;
    }
    self.positions.insert(key, self.steps.len());
    self.steps.push(Rc::clone(step));
    true
  }

  pub fn position(&self, step: &StepRef) -> Option<usize> {
    self.positions.get(&step_key(step)).copied()
  }

  pub fn steps(&self) -> &[StepRef] {
    &self.steps
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

/// Result of flattening: the step sequence plus, for step `i` and its
/// transition `j`, the placeholder `targets[i][j]`.
#[derive(Debug)]
pub struct Flattened {
  index: StepIndex,
  targets: Vec<Vec<FlattenedStepIndex>>,
}

impl Flattened {
  pub fn steps(&self) -> &[StepRef] {
    self.index.steps()
  }

  pub fn position(&self, step: &StepRef) -> Option<usize> {
    self.index.position(step)
  }

  /// Placeholders of the transitions of the step at `position`.
  pub fn targets_of(&self, position: usize) -> &[FlattenedStepIndex] {
    self.targets.get(position).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Placeholder of transition `transition` of `step`, if the step was flattened.
  pub fn placeholder(&self, step: &StepRef, transition: usize) -> Option<FlattenedStepIndex> {
    let position = self.position(step)?;
    self.targets_of(position).get(transition).copied()
  }

  pub fn len(&self) -> usize {
    self.index.len()
  }

  pub fn is_empty(&self) -> bool {
    self.index.is_empty()
  }
}

/// Collects the steps of `process` in flattening order.
pub fn collect_process(process: &Process, traversal: Traversal) -> StepIndex {
  let mut index = StepIndex::default();
  for chapter in &process.chapters {
    visit_chapter(chapter, traversal, &mut index);
  }
  index
}

/// Collects the steps of a single chapter in flattening order.
pub fn collect_chapter(chapter: &Chapter, traversal: Traversal) -> StepIndex {
  let mut index = StepIndex::default();
  visit_chapter(chapter, traversal, &mut index);
  index
}

fn visit_chapter(chapter: &Chapter, traversal: Traversal, index: &mut StepIndex) {
  let added: Vec<&StepRef> = chapter.steps.iter().filter(|s| index.insert(s)).collect();
  if traversal == Traversal::DirectSteps {
    return;
  }
  // Steps seen in an earlier chapter have had their sub-chapters visited already.
  for step in added {
    let step = step.borrow();
    for behavior in &step.behaviors {
      for sub in &behavior.chapters {
        visit_chapter(sub, traversal, index);
      }
    }
  }
}

/// Flattens a process. Targets outside the sequence are rejected.
#[instrument(level = "trace", skip(process), fields(process = %process.name))]
pub fn flatten(process: &Process, traversal: Traversal) -> Result<Flattened> {
  let flattened = assign_targets(collect_process(process, traversal), DanglingPolicy::Reject)?;
  debug!(steps = flattened.len(), ?traversal, "flattened process");
  Ok(flattened)
}

/// Flattens a chapter recursively. Targets leaving the chapter are erased.
#[instrument(level = "trace", skip(chapter), fields(chapter = %chapter.name))]
pub fn flatten_chapter(chapter: &Chapter) -> Result<Flattened> {
  let flattened = assign_targets(
    collect_chapter(chapter, Traversal::Recursive),
    DanglingPolicy::Erase,
  )?;
  debug!(steps = flattened.len(), "flattened chapter");
  Ok(flattened)
}

/// Computes the placeholder table for an already collected sequence.
pub fn assign_targets(index: StepIndex, policy: DanglingPolicy) -> Result<Flattened> {
  let mut targets = Vec::with_capacity(index.len());
  for step in index.steps() {
    let step = step.borrow();
    let mut row = Vec::with_capacity(step.transitions.len());
    for transition in &step.transitions {
      let Some(weak) = transition.raw_target() else {
        row.push(FlattenedStepIndex::NO_TARGET);
        continue;
      };
      let position = weak.upgrade().and_then(|target| index.position(&target));
      match (position, policy) {
        (Some(p), _) => row.push(FlattenedStepIndex::at(p)),
        (None, DanglingPolicy::Erase) => row.push(FlattenedStepIndex::NO_TARGET),
        (None, DanglingPolicy::Reject) => {
          return Err(SerializerError::DanglingTarget {
            step: step.name.clone(),
          });
        }
      }
    }
    targets.push(row);
  }
  Ok(Flattened { index, targets })
}
