//! Condition guarding a transition.

use super::{Properties, Value};

/// A condition that must hold before its transition is taken.
/// `kind` names the condition type (e.g. `"TimeoutCondition"`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
  pub kind: String,
  pub properties: Properties,
}

impl Condition {
  pub fn new(kind: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      properties: Properties::new(),
    }
  }

  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.properties.insert(key.into(), value.into());
    self
  }
}
