//! Serialized shapes of the graph.
//!
//! Steps carry `"$id"` where they are defined and appear as `{"$ref": id}`
//! everywhere else. A transition target is `null`, a step reference, or a
//! placeholder `{"PositionIndex": n}` into the payload's `Steps` array.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::flatten::FlattenedStepIndex;

/// Top-level field holding the format version of a payload.
pub const VERSION_FIELD: &str = "$serializerVersion";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessRecord {
  pub name: String,
  #[serde(default)]
  pub chapters: Vec<ChapterRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChapterRecord {
  pub name: String,
  #[serde(default)]
  pub steps: Vec<StepNode>,
}

/// A step at a position that owns it: either its definition or a reference
/// to a definition earlier in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepNode {
  Ref(StepReference),
  Def(Box<StepRecord>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepReference {
  #[serde(rename = "$ref")]
  pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StepRecord {
  #[serde(rename = "$id")]
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub behaviors: Vec<BehaviorRecord>,
  #[serde(default)]
  pub transitions: Vec<TransitionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BehaviorRecord {
  #[serde(rename = "$type")]
  pub kind: String,
  #[serde(default)]
  pub properties: BTreeMap<String, Json>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub chapters: Vec<ChapterRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConditionRecord {
  #[serde(rename = "$type")]
  pub kind: String,
  #[serde(default)]
  pub properties: BTreeMap<String, Json>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransitionRecord {
  #[serde(default)]
  pub conditions: Vec<ConditionRecord>,
  #[serde(default)]
  pub target_step: Option<TargetRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetRecord {
  Placeholder(PlaceholderRecord),
  Step(StepNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "PascalCase")]
pub struct PlaceholderRecord {
  pub position_index: FlattenedStepIndex,
}

/// Envelope of the flattened process formats (2 and 3).
#[derive(Debug, Serialize, Deserialize)]
pub struct FlatProcessPayload {
  #[serde(rename = "$serializerVersion")]
  pub version: i64,
  #[serde(rename = "Steps")]
  pub steps: Vec<StepNode>,
  #[serde(rename = "Process")]
  pub process: ProcessRecord,
}

/// Envelope of a copied chapter.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChapterPayload {
  #[serde(rename = "$serializerVersion")]
  pub version: i64,
  #[serde(rename = "Steps")]
  pub steps: Vec<StepNode>,
  #[serde(rename = "Chapter")]
  pub chapter: ChapterRecord,
}

/// Deepest array/object nesting that serde_json reads back under its default
/// recursion limit.
pub const MAX_NESTING_DEPTH: usize = 127;

/// Serializes `value` as compact or pretty JSON text.
///
/// Fails with [crate::SerializerError::NestingTooDeep] rather than produce a
/// payload the decoders could not read back.
pub fn to_bytes<T: Serialize>(value: &T, pretty: bool) -> crate::Result<Vec<u8>> {
  let bytes = if pretty {
    serde_json::to_vec_pretty(value)
  } else {
    serde_json::to_vec(value)
  }
  .map_err(crate::SerializerError::Json)?;
  let depth = nesting_depth(&bytes);
  if depth > MAX_NESTING_DEPTH {
    return Err(crate::SerializerError::NestingTooDeep {
      depth,
      max: MAX_NESTING_DEPTH,
    });
  }
  Ok(bytes)
}

/// Deepest array/object nesting of a JSON text. Brackets inside strings are skipped.
pub(crate) fn nesting_depth(json: &[u8]) -> usize {
  let mut depth = 0usize;
  let mut deepest = 0;
  let mut in_string = false;
  let mut escaped = false;
  for &b in json {
    if in_string {
      match b {
        _ if escaped => escaped = false,
        b'\\' => escaped = true,
        b'"' => in_string = false,
        _ => {}
      }
      continue;
    }
    match b {
      b'"' => in_string = true,
      b'{' | b'[' => {
        depth += 1;
        deepest = deepest.max(depth);
      }
      b'}' | b']' => depth = depth.saturating_sub(1),
      _ => {}
    }
  }
  deepest
}
