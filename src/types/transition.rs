//! Directed edge from a step to an optional successor.

use std::rc::Rc;

use super::{Condition, StepRef, WeakStepRef};

/// Outgoing edge of a step. `target` is `None` for a terminal transition.
#[derive(Debug, Default, Clone)]
pub struct Transition {
  pub conditions: Vec<Condition>,
  target: Option<WeakStepRef>,
}

impl Transition {
  /// Terminal transition without conditions.
  pub fn new() -> Self {
    Self::default()
  }

  /// Transition leading to `target`.
  pub fn to(target: &StepRef) -> Self {
    Self {
      conditions: Vec::new(),
      target: Some(Rc::downgrade(target)),
    }
  }

  pub fn with_condition(mut self, condition: Condition) -> Self {
    self.conditions.push(condition);
    self
  }

  /// The successor step, if set and still alive.
  pub fn target(&self) -> Option<StepRef> {
    self.target.as_ref().and_then(|t| t.upgrade())
  }

  /// True if a target is set, even one that has since been dropped.
  pub fn has_target(&self) -> bool {
    self.target.is_some()
  }

  /// True if the target is exactly `step`.
  pub fn targets(&self, step: &StepRef) -> bool {
    self.target().is_some_and(|t| Rc::ptr_eq(&t, step))
  }

  pub fn set_target(&mut self, target: Option<&StepRef>) {
    self.target = target.map(Rc::downgrade);
  }

  pub fn clear_target(&mut self) {
    self.target = None;
  }

  pub(crate) fn raw_target(&self) -> Option<&WeakStepRef> {
    self.target.as_ref()
  }
}
