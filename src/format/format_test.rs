//! Tests for format versions and dispatch.

use serde_json::{Value as Json, json};

use super::{FormatVersion, decode, peek_version};
use crate::converters::ConverterRegistry;
use crate::error::SerializerError;
use crate::types::{Behavior, Chapter, Process, Step, Transition, same_step};

fn encode(process: &Process, version: FormatVersion) -> Json {
  let bytes = version
    .encode(process, &ConverterRegistry::default(), false)
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

/// c: [a -> b, b -> a]
fn cycle() -> Process {
  let a = Step::new("a").into_ref();
  let b = Step::new("b").into_ref();
  a.borrow_mut().transitions.push(Transition::to(&b));
  b.borrow_mut().transitions.push(Transition::to(&a));
  Process::new("cycle").with_chapter(Chapter::new("c").with_step(&a).with_step(&b))
}

/// c: [outer(group: sub: [inner -> outer])]
fn nested() -> Process {
  let outer = Step::new("outer").into_ref();
  let inner = Step::new("inner").into_ref();
  inner.borrow_mut().transitions.push(Transition::to(&outer));
  outer
    .borrow_mut()
    .behaviors
    .push(Behavior::new("StepGroup").with_chapter(Chapter::new("sub").with_step(&inner)));
  Process::new("nested").with_chapter(Chapter::new("c").with_step(&outer))
}

#[test]
fn tags_round_trip() {
  for v in FormatVersion::ALL {
    assert_eq!(FormatVersion::from_tag(v.tag()).unwrap(), v);
  }
  assert_eq!(FormatVersion::CURRENT, FormatVersion::V3);
  assert_eq!(FormatVersion::V2.to_string(), "v2");
}

#[test]
fn unknown_tag_is_unsupported() {
  assert!(matches!(
    FormatVersion::from_tag(99),
    Err(SerializerError::UnsupportedFormatVersion(99))
  ));
  assert!(matches!(
    FormatVersion::from_tag(0),
    Err(SerializerError::UnsupportedFormatVersion(0))
  ));
}

#[test]
fn peek_reads_only_the_tag() {
  let payload = br#"{"Steps": "not even an array", "$serializerVersion": 2}"#;
  assert_eq!(peek_version(payload).unwrap(), FormatVersion::V2);
}

#[test]
fn peek_without_tag_is_malformed() {
  assert!(matches!(
    peek_version(br#"{"Name": "p"}"#),
    Err(SerializerError::MalformedPayload(_))
  ));
}

#[test]
fn peek_of_invalid_json_is_malformed() {
  assert!(matches!(
    peek_version(b"{not json"),
    Err(SerializerError::MalformedPayload(_))
  ));
}

#[test]
fn peek_of_non_integer_tag_is_malformed() {
  assert!(matches!(
    peek_version(br#"{"$serializerVersion": "3"}"#),
    Err(SerializerError::MalformedPayload(_))
  ));
  assert!(matches!(
    peek_version(br#"{"$serializerVersion": 3.5}"#),
    Err(SerializerError::MalformedPayload(_))
  ));
}

#[test]
fn peek_of_out_of_range_tag_is_unsupported() {
  match peek_version(br#"{"$serializerVersion": 9223372036854775808}"#) {
    Err(SerializerError::UnsupportedFormatVersion(tag)) => {
      assert_eq!(tag, i128::from(i64::MAX) + 1)
    }
    other => panic!("expected UnsupportedFormatVersion, got {:?}", other),
  }
  assert!(matches!(
    peek_version(br#"{"$serializerVersion": -4}"#),
    Err(SerializerError::UnsupportedFormatVersion(-4))
  ));
}

#[test]
fn v1_writes_process_at_top_level() {
  let json = encode(&cycle(), FormatVersion::V1);
  assert_eq!(json["$serializerVersion"], 1);
  assert_eq!(json["Name"], "cycle");
  assert!(json.get("Steps").is_none());
  let steps = &json["Chapters"][0]["Steps"];
  assert_eq!(steps[0]["Transitions"][0]["TargetStep"]["$ref"], "2");
  assert_eq!(steps[1]["Transitions"][0]["TargetStep"]["$ref"], "1");
}

#[test]
fn v3_writes_steps_and_process_shell() {
  let json = encode(&cycle(), FormatVersion::V3);
  assert_eq!(json["$serializerVersion"], 3);
  let steps = json["Steps"].as_array().unwrap();
  assert_eq!(steps.len(), 2);
  assert_eq!(
    steps[0]["Transitions"][0]["TargetStep"],
    json!({"PositionIndex": 1})
  );
  assert_eq!(
    steps[1]["Transitions"][0]["TargetStep"],
    json!({"PositionIndex": 0})
  );
  assert_eq!(
    json["Process"]["Chapters"][0]["Steps"],
    json!([{"$ref": "1"}, {"$ref": "2"}])
  );
}

#[test]
fn v3_null_target_is_minus_one() {
  let a = Step::new("a").with_transition(Transition::new()).into_ref();
  let p = Process::new("p").with_chapter(Chapter::new("c").with_step(&a));
  let json = encode(&p, FormatVersion::V3);
  assert_eq!(
    json["Steps"][0]["Transitions"][0]["TargetStep"],
    json!({"PositionIndex": -1})
  );
}

#[test]
fn v2_keeps_nested_targets_native() {
  let json = encode(&nested(), FormatVersion::V2);
  let steps = json["Steps"].as_array().unwrap();
  assert_eq!(steps.len(), 1);
  let inner = &steps[0]["Behaviors"][0]["Chapters"][0]["Steps"][0];
  assert_eq!(inner["Name"], "inner");
  assert_eq!(inner["Transitions"][0]["TargetStep"], json!({"$ref": "1"}));
}

#[test]
fn v3_flattens_nested_steps() {
  let json = encode(&nested(), FormatVersion::V3);
  let steps = json["Steps"].as_array().unwrap();
  assert_eq!(steps.len(), 2);
  let inner = &steps[0]["Behaviors"][0]["Chapters"][0]["Steps"][0];
  assert_eq!(inner["Transitions"][0]["TargetStep"], json!({"PositionIndex": 0}));
  assert_eq!(steps[1], json!({"$ref": "2"}));
}

#[test]
fn every_version_decodes_its_own_output() {
  let converters = ConverterRegistry::default();
  for v in FormatVersion::ALL {
    let bytes = v.encode(&nested(), &converters, true).unwrap();
    let p = decode(&bytes, &converters).unwrap();
    assert!(p.same_shape(&nested()), "{v} round trip changed the graph");
    let outer = p.find_step("outer").unwrap();
    let inner = p.find_step("inner").unwrap();
    assert!(same_step(
      &inner.borrow().transitions[0].target().unwrap(),
      &outer
    ));
  }
}

#[test]
fn decoder_rejects_mismatched_tag() {
  let converters = ConverterRegistry::default();
  let bytes = FormatVersion::V3
    .encode(&cycle(), &converters, false)
    .unwrap();
  assert!(matches!(
    FormatVersion::V2.decode(&bytes, &converters),
    Err(SerializerError::MalformedPayload(_))
  ));
}

#[test]
fn flat_payload_without_steps_is_malformed() {
  let converters = ConverterRegistry::default();
  let payload = br#"{"$serializerVersion": 3, "Process": {"Name": "p", "Chapters": []}}"#;
  assert!(matches!(
    decode(payload, &converters),
    Err(SerializerError::MalformedPayload(_))
  ));
}

#[test]
fn unowned_flattened_step_is_malformed() {
  let converters = ConverterRegistry::default();
  let payload = br#"{
    "$serializerVersion": 3,
    "Steps": [{"$id": "1", "Name": "a"}, {"$id": "2", "Name": "orphan"}],
    "Process": {"Name": "p", "Chapters": [{"Name": "c", "Steps": [{"$ref": "1"}]}]}
  }"#;
  assert!(matches!(
    decode(payload, &converters),
    Err(SerializerError::MalformedPayload(_))
  ));
}

#[test]
fn v2_cannot_express_target_into_nested_chapter() {
  let outer = Step::new("outer").into_ref();
  let inner = Step::new("inner").into_ref();
  outer.borrow_mut().transitions.push(Transition::to(&inner));
  outer
    .borrow_mut()
    .behaviors
    .push(Behavior::new("StepGroup").with_chapter(Chapter::new("sub").with_step(&inner)));
  let p = Process::new("p").with_chapter(Chapter::new("c").with_step(&outer));
  let converters = ConverterRegistry::default();
  assert!(matches!(
    FormatVersion::V2.encode(&p, &converters, false),
    Err(SerializerError::DanglingTarget { .. })
  ));
  assert!(FormatVersion::V3.encode(&p, &converters, false).is_ok());
}
