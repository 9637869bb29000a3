//! A node of the process graph.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{Behavior, Transition};

/// Shared handle to a [Step]. Two handles name the same step only if they
/// point at the same allocation ([same_step]).
pub type StepRef = Rc<RefCell<Step>>;

/// Non-owning handle to a [Step], held by transition targets.
pub type WeakStepRef = Weak<RefCell<Step>>;

/// Identity key of a step (its allocation address).
pub(crate) type StepKey = *const RefCell<Step>;

pub(crate) fn step_key(step: &StepRef) -> StepKey {
  Rc::as_ptr(step)
}

/// Returns true if both handles refer to the same step.
pub fn same_step(a: &StepRef, b: &StepRef) -> bool {
  Rc::ptr_eq(a, b)
}

/// A step: behaviors that run while it is active plus the transitions out of it.
#[derive(Debug, Default)]
pub struct Step {
  pub name: String,
  pub description: String,
  pub behaviors: Vec<Behavior>,
  pub transitions: Vec<Transition>,
}

impl Step {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      ..Default::default()
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn with_behavior(mut self, behavior: Behavior) -> Self {
    self.behaviors.push(behavior);
    self
  }

  pub fn with_transition(mut self, transition: Transition) -> Self {
    self.transitions.push(transition);
    self
  }

  /// Wraps the step in a shared handle.
  pub fn into_ref(self) -> StepRef {
    Rc::new(RefCell::new(self))
  }
}
