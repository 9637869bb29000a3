//! Primitive leaf values carried in behavior and condition properties.

use serde::{Deserialize, Serialize};

/// Two-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
  pub x: f32,
  pub y: f32,
}

/// Three-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
  pub x: f32,
  pub y: f32,
  pub z: f32,
}

/// Four-component vector (also used for quaternions).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector4 {
  pub x: f32,
  pub y: f32,
  pub z: f32,
  pub w: f32,
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
  pub r: f32,
  pub g: f32,
  pub b: f32,
  #[serde(default = "opaque")]
  pub a: f32,
}

fn opaque() -> f32 {
  1.0
}

impl Color {
  pub fn rgb(r: f32, g: f32, b: f32) -> Self {
    Self { r, g, b, a: 1.0 }
  }
}

/// A single key of an [AnimationCurve].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe {
  pub time: f32,
  pub value: f32,
  #[serde(default)]
  pub in_tangent: f32,
  #[serde(default)]
  pub out_tangent: f32,
}

impl Keyframe {
  pub fn new(time: f32, value: f32) -> Self {
    Self {
      time,
      value,
      ..Default::default()
    }
  }
}

/// Piecewise curve defined by keyframes in time order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationCurve {
  pub keys: Vec<Keyframe>,
}

impl AnimationCurve {
  pub fn new(keys: Vec<Keyframe>) -> Self {
    Self { keys }
  }

  /// Returns true if keys are sorted by time.
  pub fn is_ordered(&self) -> bool {
    self.keys.windows(2).all(|w| w[0].time <= w[1].time)
  }
}
