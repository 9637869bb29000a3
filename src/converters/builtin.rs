//! Converters for the built-in typed leaves.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use super::ValueConverter;
use crate::types::{AnimationCurve, Color, Keyframe, Value, Vector2, Vector3, Vector4};

fn to_json<T: Serialize>(leaf: &T) -> Result<Json, String> {
  serde_json::to_value(leaf).map_err(|e| e.to_string())
}

fn from_json<T: DeserializeOwned>(json: Json) -> Result<T, String> {
  serde_json::from_value(json).map_err(|e| e.to_string())
}

fn mismatch(expected: &str, value: &Value) -> String {
  format!("expected {expected}, got {}", value.type_name())
}

macro_rules! leaf_converter {
  ($converter:ident, $leaf:ident, $variant:ident, $name:literal) => {
    #[doc = concat!("Converter for [Value::", stringify!($variant), "] (`\"$type\": \"", $name, "\"`).")]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct $converter;

    impl ValueConverter for $converter {
      fn type_name(&self) -> &'static str {
        $name
      }

      fn can_write(&self, value: &Value) -> bool {
        matches!(value, Value::$variant(_))
      }

      fn write(&self, value: &Value) -> Result<Json, String> {
        match value {
          Value::$variant(leaf) => to_json(leaf),
          other => Err(mismatch($name, other)),
        }
      }

      fn read(&self, json: Json) -> Result<Value, String> {
        from_json::<$leaf>(json).map(Value::$variant)
      }
    }
  };
}

leaf_converter!(Vector2Converter, Vector2, Vector2, "Vector2");
leaf_converter!(Vector3Converter, Vector3, Vector3, "Vector3");
leaf_converter!(Vector4Converter, Vector4, Vector4, "Vector4");
leaf_converter!(ColorConverter, Color, Color, "Color");
leaf_converter!(KeyframeConverter, Keyframe, Keyframe, "Keyframe");

/// Converter for [Value::Curve]. Keys must be in time order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationCurveConverter;

impl ValueConverter for AnimationCurveConverter {
  fn type_name(&self) -> &'static str {
    "AnimationCurve"
  }

  fn can_write(&self, value: &Value) -> bool {
    matches!(value, Value::Curve(_))
  }

  fn write(&self, value: &Value) -> Result<Json, String> {
    match value {
      Value::Curve(curve) if curve.is_ordered() => to_json(curve),
      Value::Curve(_) => Err("keyframes are not in time order".to_string()),
      other => Err(mismatch("AnimationCurve", other)),
    }
  }

  fn read(&self, json: Json) -> Result<Value, String> {
    let curve: AnimationCurve = from_json(json)?;
    if !curve.is_ordered() {
      return Err("keyframes are not in time order".to_string());
    }
    Ok(Value::Curve(curve))
  }
}
