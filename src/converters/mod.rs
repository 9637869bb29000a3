//! Leaf value converters and the priority-ordered registry that selects them.
//!
//! Typed leaves ([Value::Vector3], [Value::Color], …) are written as JSON
//! objects tagged with `"$type"`. The first converter (by ascending priority)
//! whose [ValueConverter::can_write] accepts a value writes it; reading picks
//! the converter whose [ValueConverter::type_name] matches the tag.
//!
//! A converter with a lower priority overrides a built-in. Two converters of the
//! same priority that both accept a value are ambiguous, and writing that
//! value fails.

mod builtin;

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value as Json};
use tracing::warn;

use crate::error::{Result, SerializerError};
use crate::types::{Properties, Value};

pub use builtin::{
  AnimationCurveConverter, ColorConverter, KeyframeConverter, Vector2Converter, Vector3Converter,
  Vector4Converter,
};

/// JSON key carrying the type discriminator of a converted leaf.
pub const TYPE_TAG: &str = "$type";

/// JSON key wrapping a converted leaf that is not itself a JSON object.
pub const VALUE_KEY: &str = "$value";

/// Bidirectional codec between one typed [Value] variant and JSON.
pub trait ValueConverter: Send + Sync {
  /// Discriminator written under [TYPE_TAG]. Unique per registry.
  fn type_name(&self) -> &'static str;

  /// Lower runs earlier.
  fn priority(&self) -> i32 {
    0
  }

  fn can_write(&self, value: &Value) -> bool;

  fn write(&self, value: &Value) -> std::result::Result<Json, String>;

  fn read(&self, json: Json) -> std::result::Result<Value, String>;
}

/// Priority-ordered list of converters.
pub struct ConverterRegistry {
  converters: Vec<Box<dyn ValueConverter>>,
}

impl ConverterRegistry {
  /// Registry without any converter; only plain JSON-shaped values can be written.
  pub fn empty() -> Self {
    Self {
      converters: Vec::new(),
    }
  }

  /// Adds `converter`, keeping the list sorted by priority (stable for ties).
  pub fn register(&mut self, converter: impl ValueConverter + 'static) -> Result<()> {
    let name = converter.type_name();
    if self.converters.iter().any(|c| c.type_name() == name) {
      return Err(SerializerError::DuplicateConverter(name.to_string()));
    }
    let at = self
      .converters
      .iter()
      .position(|c| c.priority() > converter.priority())
      .unwrap_or(self.converters.len());
    self.converters.insert(at, Box::new(converter));
    Ok(())
  }

  pub fn with(mut self, converter: impl ValueConverter + 'static) -> Result<Self> {
    self.register(converter)?;
    Ok(self)
  }

  /// Type names in the order converters are tried.
  pub fn type_names(&self) -> Vec<&'static str> {
    self.converters.iter().map(|c| c.type_name()).collect()
  }

  fn reader_for(&self, type_name: &str) -> Option<&dyn ValueConverter> {
    self
      .converters
      .iter()
      .find(|c| c.type_name() == type_name)
      .map(|c| c.as_ref())
  }

  /// Writes one property value as JSON.
  pub fn write_value(&self, value: &Value) -> Result<Json> {
    match value {
      Value::Null => Ok(Json::Null),
      Value::Bool(b) => Ok(Json::Bool(*b)),
      Value::Int(i) => Ok(Json::from(*i)),
      Value::Float(f) => Number::from_f64(*f)
        .map(Json::Number)
        .ok_or_else(|| SerializerError::conversion("float", format!("{f} is not finite"))),
      Value::Text(s) => Ok(Json::String(s.clone())),
      Value::List(items) => items
        .iter()
        .map(|v| self.write_value(v))
        .collect::<Result<Vec<_>>>()
        .map(Json::Array),
      Value::Map(map) => {
        if map.contains_key(TYPE_TAG) {
          return Err(SerializerError::conversion(
            "map",
            format!("key '{TYPE_TAG}' is reserved"),
          ));
        }
        map
          .iter()
          .map(|(k, v)| Ok((k.clone(), self.write_value(v)?)))
          .collect::<Result<Map<String, Json>>>()
          .map(Json::Object)
      }
      typed => self.write_typed(typed),
    }
  }

  fn write_typed(&self, value: &Value) -> Result<Json> {
    let mut claimants = self.converters.iter().filter(|c| c.can_write(value));
    let converter = claimants
      .next()
      .ok_or_else(|| SerializerError::conversion(value.type_name(), "no converter registered"))?;
    if let Some(rival) = claimants.next().filter(|c| c.priority() == converter.priority()) {
      return Err(SerializerError::conversion(
        value.type_name(),
        format!(
          "claimed by both '{}' and '{}' at priority {}",
          converter.type_name(),
          rival.type_name(),
          converter.priority()
        ),
      ));
    }
    let json = converter
      .write(value)
      .map_err(|cause| SerializerError::conversion(converter.type_name(), cause))?;
    let mut object = match json {
      Json::Object(object) => object,
      other => {
        let mut object = Map::new();
        object.insert(VALUE_KEY.to_string(), other);
        object
      }
    };
    object.insert(
      TYPE_TAG.to_string(),
      Json::String(converter.type_name().to_string()),
    );
    Ok(Json::Object(object))
  }

  /// Reads one property value from JSON.
  pub fn read_value(&self, json: Json) -> Result<Value> {
    match json {
      Json::Null => Ok(Value::Null),
      Json::Bool(b) => Ok(Value::Bool(b)),
      Json::Number(n) => Ok(match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
      }),
      Json::String(s) => Ok(Value::Text(s)),
      Json::Array(items) => items
        .into_iter()
        .map(|v| self.read_value(v))
        .collect::<Result<Vec<_>>>()
        .map(Value::List),
      Json::Object(mut object) => match object.remove(TYPE_TAG) {
        None => object
          .into_iter()
          .map(|(k, v)| Ok((k, self.read_value(v)?)))
          .collect::<Result<BTreeMap<_, _>>>()
          .map(Value::Map),
        Some(Json::String(tag)) => {
          let Some(converter) = self.reader_for(&tag) else {
            warn!(type_name = %tag, "no converter registered for tagged value");
            return Err(SerializerError::conversion(tag, "no converter registered"));
          };
          let body = object.remove(VALUE_KEY).unwrap_or(Json::Object(object));
          converter
            .read(body)
            .map_err(|cause| SerializerError::conversion(tag, cause))
        }
        Some(other) => Err(SerializerError::conversion(
          other.to_string(),
          "type tag must be a string",
        )),
      },
    }
  }

  pub fn write_properties(&self, properties: &Properties) -> Result<BTreeMap<String, Json>> {
    properties
      .iter()
      .map(|(k, v)| Ok((k.clone(), self.write_value(v)?)))
      .collect()
  }

  pub fn read_properties(&self, properties: BTreeMap<String, Json>) -> Result<Properties> {
    properties
      .into_iter()
      .map(|(k, v)| Ok((k, self.read_value(v)?)))
      .collect()
  }
}

impl Default for ConverterRegistry {
  /// Registry with the built-in leaf converters.
  fn default() -> Self {
    let mut registry = Self::empty();
    let builtins: [Box<dyn ValueConverter>; 6] = [
      Box::new(Vector2Converter),
      Box::new(Vector3Converter),
      Box::new(Vector4Converter),
      Box::new(ColorConverter),
      Box::new(KeyframeConverter),
      Box::new(AnimationCurveConverter),
    ];
    // Built-ins have distinct names and equal priority; plain push keeps order.
    registry.converters.extend(builtins);
    registry
  }
}

impl fmt::Debug for ConverterRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConverterRegistry")
      .field("converters", &self.type_names())
      .finish()
  }
}
