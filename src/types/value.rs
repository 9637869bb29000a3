//! Property values attached to behaviors and conditions.

use std::collections::BTreeMap;

use super::{AnimationCurve, Color, Keyframe, Vector2, Vector3, Vector4};

/// Named property bag of a behavior or condition.
pub type Properties = BTreeMap<String, Value>;

/// A property value.
///
/// Plain JSON-shaped variants are written natively; the typed leaves go
/// through the registered [crate::converters::ValueConverter]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
  List(Vec<Value>),
  Map(BTreeMap<String, Value>),
  Vector2(Vector2),
  Vector3(Vector3),
  Vector4(Vector4),
  Color(Color),
  Keyframe(Keyframe),
  Curve(AnimationCurve),
}

impl Value {
  /// Name of the variant, used in conversion error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Bool(_) => "bool",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Text(_) => "text",
      Value::List(_) => "list",
      Value::Map(_) => "map",
      Value::Vector2(_) => "Vector2",
      Value::Vector3(_) => "Vector3",
      Value::Vector4(_) => "Vector4",
      Value::Color(_) => "Color",
      Value::Keyframe(_) => "Keyframe",
      Value::Curve(_) => "AnimationCurve",
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self {
    Value::Bool(v)
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self {
    Value::Int(v)
  }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self {
    Value::Float(v)
  }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self {
    Value::Text(v.to_string())
  }
}

impl From<String> for Value {
  fn from(v: String) -> Self {
    Value::Text(v)
  }
}

impl From<Vector3> for Value {
  fn from(v: Vector3) -> Self {
    Value::Vector3(v)
  }
}

impl From<Color> for Value {
  fn from(v: Color) -> Self {
    Value::Color(v)
  }
}

impl From<AnimationCurve> for Value {
  fn from(v: AnimationCurve) -> Self {
    Value::Curve(v)
  }
}
