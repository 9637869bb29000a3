//! Behavior attached to a step.

use super::{Chapter, Properties, Value};

/// A behavior attached to a step. `kind` names the behavior type
/// (e.g. `"PlayAudio"`). Behaviors that group other steps own `chapters`.
#[derive(Debug, Default)]
pub struct Behavior {
  pub kind: String,
  pub properties: Properties,
  pub chapters: Vec<Chapter>,
}

impl Behavior {
  pub fn new(kind: impl Into<String>) -> Self {
    Self {
      kind: kind.into(),
      ..Default::default()
    }
  }

  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.properties.insert(key.into(), value.into());
    self
  }

  pub fn with_chapter(mut self, chapter: Chapter) -> Self {
    self.chapters.push(chapter);
    self
  }
}
