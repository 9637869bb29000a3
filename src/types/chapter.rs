//! Ordered group of steps.

use std::rc::Rc;

use super::StepRef;

/// Ordered collection of steps. Appears at the top of a process or inside a behavior.
#[derive(Debug, Default)]
pub struct Chapter {
  pub name: String,
  pub steps: Vec<StepRef>,
}

impl Chapter {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
    }
  }

  /// Appends a handle to `step` (the step itself is shared, not copied).
  pub fn with_step(mut self, step: &StepRef) -> Self {
    self.steps.push(Rc::clone(step));
    self
  }
}
