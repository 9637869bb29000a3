//! End-to-end tests through the public API: round trips of graphs with
//! cycles, self-loops and nested chapters, decoding of hand-written payloads
//! in every supported format, and rejection of corrupt payloads.

use std::path::{Path, PathBuf};

use serde_json::Value as Json;
use streamweave_process::{
  Behavior, Chapter, Condition, FormatVersion, Process, ProcessSerializer, SerializerError, Step,
  StepRef, Transition, Value,
};
use streamweave_process::types::same_step;

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

fn read_fixture(name: &str) -> Vec<u8> {
  std::fs::read(fixture(name)).expect("fixture")
}

fn step(name: &str) -> StepRef {
  Step::new(name).into_ref()
}

fn target(step: &StepRef, transition: usize) -> Option<StepRef> {
  step.borrow().transitions[transition].target()
}

/// The graph stored in tests/fixtures/demo_v*.json.
fn demo() -> Process {
  let start = Step::new("Start").with_description("entry").into_ref();
  let end = step("End");
  let inner = step("Inner");
  inner.borrow_mut().transitions.push(Transition::to(&start));
  {
    let mut s = start.borrow_mut();
    s.behaviors.push(
      Behavior::new("StepGroup")
        .with_property("label", "inner work")
        .with_chapter(Chapter::new("sub").with_step(&inner)),
    );
    s.transitions.push(
      Transition::to(&end).with_condition(Condition::new("Timeout").with_property("seconds", 1.5)),
    );
    s.transitions.push(Transition::new());
  }
  end.borrow_mut().transitions.push(Transition::to(&start));
  Process::new("demo").with_chapter(Chapter::new("main").with_step(&start).with_step(&end))
}

fn round_trip(process: &Process) -> Process {
  let s = ProcessSerializer::default();
  s.decode(&s.encode(process).unwrap()).unwrap()
}

#[test]
fn round_trip_preserves_shape() {
  let p = demo();
  let back = round_trip(&p);
  assert!(back.same_shape(&p));
  assert_eq!(back.step_count(), 3);
}

#[test]
fn two_step_cycle_keeps_identity() {
  let (a, b) = (step("A"), step("B"));
  a.borrow_mut().transitions.push(Transition::to(&b));
  b.borrow_mut().transitions.push(Transition::to(&a));
  let p = Process::new("cycle").with_chapter(Chapter::new("c").with_step(&a).with_step(&b));

  let back = round_trip(&p);
  let a2 = back.chapters[0].steps[0].clone();
  let b2 = back.chapters[0].steps[1].clone();
  assert!(same_step(&target(&a2, 0).unwrap(), &b2));
  assert!(same_step(&target(&b2, 0).unwrap(), &a2));
  assert!(same_step(&target(&target(&a2, 0).unwrap(), 0).unwrap(), &a2));
}

#[test]
fn self_loop_targets_itself() {
  let a = step("A");
  a.borrow_mut().transitions.push(Transition::to(&a));
  let p = Process::new("loop").with_chapter(Chapter::new("c").with_step(&a));

  let s = ProcessSerializer::default();
  let bytes = s.encode(&p).unwrap();
  let json: Json = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(json["Steps"][0]["Transitions"][0]["TargetStep"]["PositionIndex"], 0);

  let back = s.decode(&bytes).unwrap();
  let a2 = back.chapters[0].steps[0].clone();
  assert!(same_step(&target(&a2, 0).unwrap(), &a2));
}

#[test]
fn terminal_transition_is_written_as_minus_one() {
  let a = Step::new("A").with_transition(Transition::new()).into_ref();
  let p = Process::new("end").with_chapter(Chapter::new("c").with_step(&a));
  let s = ProcessSerializer::default();
  let bytes = s.encode(&p).unwrap();
  let json: Json = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(json["Steps"][0]["Transitions"][0]["TargetStep"]["PositionIndex"], -1);

  let back = s.decode(&bytes).unwrap();
  let a2 = back.chapters[0].steps[0].clone();
  assert_eq!(a2.borrow().transitions.len(), 1);
  assert!(target(&a2, 0).is_none());
}

#[test]
fn every_fixture_version_decodes_to_the_same_graph() {
  let s = ProcessSerializer::default();
  let expected = demo();
  for (name, version) in [
    ("demo_v1.json", FormatVersion::V1),
    ("demo_v2.json", FormatVersion::V2),
    ("demo_v3.json", FormatVersion::V3),
  ] {
    let bytes = read_fixture(name);
    assert_eq!(s.peek_version(&bytes).unwrap(), version);
    let p = s.decode(&bytes).unwrap();
    assert!(p.same_shape(&expected), "{name} decoded to a different graph");

    let start = p.find_step("Start").unwrap();
    let inner = p.find_step("Inner").unwrap();
    assert!(same_step(&target(&inner, 0).unwrap(), &start), "{name}");
    let start = start.borrow();
    assert_eq!(start.description, "entry");
    assert_eq!(
      start.behaviors[0].properties["label"],
      Value::Text("inner work".to_string())
    );
    assert_eq!(
      start.transitions[0].conditions[0].properties["seconds"],
      Value::Float(1.5)
    );
  }
}

#[test]
fn legacy_fixture_reencodes_like_current_fixture() {
  let s = ProcessSerializer::default();
  let from_v1 = s.encode(&s.decode(&read_fixture("demo_v1.json")).unwrap()).unwrap();
  let from_v3 = s.encode(&s.decode(&read_fixture("demo_v3.json")).unwrap()).unwrap();
  assert_eq!(s.peek_version(&from_v1).unwrap(), FormatVersion::CURRENT);
  assert_eq!(from_v1, from_v3);
}

#[test]
fn nested_step_targets_ancestor() {
  // main: [s1(group: sub: [n1 -> s1, n2 -> n1]), s2]
  let (s1, s2, n1, n2) = (step("s1"), step("s2"), step("n1"), step("n2"));
  n1.borrow_mut().transitions.push(Transition::to(&s1));
  n2.borrow_mut().transitions.push(Transition::to(&n1));
  s1.borrow_mut()
    .behaviors
    .push(Behavior::new("StepGroup").with_chapter(Chapter::new("sub").with_step(&n1).with_step(&n2)));
  let p = Process::new("p").with_chapter(Chapter::new("main").with_step(&s1).with_step(&s2));

  let s = ProcessSerializer::default();
  let bytes = s.encode(&p).unwrap();
  let json: Json = serde_json::from_slice(&bytes).unwrap();
  let names: Vec<&str> = json["Steps"]
    .as_array()
    .unwrap()
    .iter()
    .map(|n| n["Name"].as_str().unwrap_or("(ref)"))
    .collect();
  assert_eq!(names, vec!["s1", "s2", "(ref)", "(ref)"]);

  let back = s.decode(&bytes).unwrap();
  let s1b = back.find_step("s1").unwrap();
  let n1b = back.find_step("n1").unwrap();
  let n2b = back.find_step("n2").unwrap();
  assert!(same_step(&target(&n1b, 0).unwrap(), &s1b));
  assert!(same_step(&target(&n2b, 0).unwrap(), &n1b));
}

#[test]
fn top_level_step_targets_nested_step() {
  let (outer, inner) = (step("outer"), step("inner"));
  outer.borrow_mut().transitions.push(Transition::to(&inner));
  outer
    .borrow_mut()
    .behaviors
    .push(Behavior::new("StepGroup").with_chapter(Chapter::new("sub").with_step(&inner)));
  let p = Process::new("p").with_chapter(Chapter::new("main").with_step(&outer));

  let back = round_trip(&p);
  let outer2 = back.find_step("outer").unwrap();
  let inner2 = back.find_step("inner").unwrap();
  assert!(same_step(&target(&outer2, 0).unwrap(), &inner2));
}

#[test]
fn step_shared_between_chapters_stays_one_step() {
  let (a, b) = (step("a"), step("b"));
  b.borrow_mut().transitions.push(Transition::to(&a));
  let p = Process::new("p")
    .with_chapter(Chapter::new("one").with_step(&a).with_step(&b))
    .with_chapter(Chapter::new("two").with_step(&b));

  let back = round_trip(&p);
  assert_eq!(back.step_count(), 2);
  assert!(same_step(&back.chapters[0].steps[1], &back.chapters[1].steps[0]));
}

#[test]
fn single_step_codec_erases_targets() {
  let (a, b) = (step("A"), step("B"));
  a.borrow_mut().transitions.push(Transition::to(&b));
  let s = ProcessSerializer::default();
  let copy = s.decode_step(&s.encode_step(&a).unwrap()).unwrap();
  let copy = copy.borrow();
  assert_eq!(copy.name, "A");
  assert_eq!(copy.transitions.len(), 1);
  assert!(copy.transitions[0].target().is_none());
}

#[test]
fn unknown_version_is_rejected() {
  let s = ProcessSerializer::default();
  let payload = br#"{"$serializerVersion": 99, "Steps": [], "Process": {"Name": "p", "Chapters": []}}"#;
  match s.decode(payload) {
    Err(SerializerError::UnsupportedFormatVersion(v)) => assert_eq!(v, 99),
    other => panic!("expected UnsupportedFormatVersion, got {:?}", other.map(|p| p.name)),
  }
}

#[test]
fn out_of_range_placeholder_is_corrupt() {
  let s = ProcessSerializer::default();
  let mut json: Json = serde_json::from_slice(&read_fixture("demo_v3.json")).unwrap();
  json["Steps"][1]["Transitions"][0]["TargetStep"]["PositionIndex"] = Json::from(7);
  let bytes = serde_json::to_vec(&json).unwrap();
  match s.decode(&bytes) {
    Err(SerializerError::CorruptGraphReference { index, step_count }) => {
      assert_eq!(index, 7);
      assert_eq!(step_count, 3);
    }
    other => panic!("expected CorruptGraphReference, got {:?}", other.map(|p| p.name)),
  }
}

#[test]
fn truncated_payload_is_malformed() {
  let s = ProcessSerializer::default();
  let bytes = read_fixture("demo_v3.json");
  let cut = &bytes[..bytes.len() / 2];
  assert!(matches!(s.decode(cut), Err(SerializerError::MalformedPayload(_))));
}

#[test]
fn unknown_value_type_fails_decode() {
  let s = ProcessSerializer::default();
  let mut json: Json = serde_json::from_slice(&read_fixture("demo_v3.json")).unwrap();
  json["Steps"][0]["Behaviors"][0]["Properties"]["label"] =
    serde_json::json!({"$type": "Gradient", "stops": []});
  let bytes = serde_json::to_vec(&json).unwrap();
  match s.decode(&bytes) {
    Err(SerializerError::ValueConversion { type_name, .. }) => assert_eq!(type_name, "Gradient"),
    other => panic!("expected ValueConversion, got {:?}", other.map(|p| p.name)),
  }
}

#[test]
fn long_chain_round_trips_in_every_version() {
  let steps: Vec<StepRef> = (0..500).map(|i| step(&format!("s{i}"))).collect();
  for pair in steps.windows(2) {
    pair[0].borrow_mut().transitions.push(Transition::to(&pair[1]));
  }
  let chapter = steps
    .iter()
    .fold(Chapter::new("chain"), |c, s| c.with_step(s));
  let p = Process::new("chain").with_chapter(chapter);

  let s = ProcessSerializer::default();
  for v in FormatVersion::ALL {
    let back = s.decode(&s.encode_as(&p, v).unwrap()).unwrap();
    assert!(back.same_shape(&p), "{v}");
  }
}
