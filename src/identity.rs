//! Identity-preserving conversion between the live graph and wire records.
//!
//! The writer gives every step an `$id` in first-encounter order. A step is
//! defined (written in full) at the first position that owns it: a chapter's
//! step list, the `Steps` array, or the root of a single-step payload. Later
//! owning positions and all native transition targets write `{"$ref": id}`;
//! a target may reference a step defined further down the document.
//!
//! The reader registers each step under its `$id` before reading its body, so
//! self-loops and cycles through a step under construction resolve. Owning
//! references must point backwards; target references may point anywhere and
//! are bound in [IdentityReader::finish].

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::converters::ConverterRegistry;
use crate::error::{Result, SerializerError};
use crate::flatten::Flattened;
use crate::resolve::PendingTarget;
use crate::types::{
  Behavior, Chapter, Condition, Process, Step, StepKey, StepRef, Transition, step_key,
};
use crate::wire::{
  BehaviorRecord, ChapterRecord, ConditionRecord, PlaceholderRecord, ProcessRecord, StepNode,
  StepRecord, StepReference, TargetRecord, TransitionRecord,
};

/// How the writer emits transition targets.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TargetWriting<'a> {
  /// As identity references.
  Native,
  /// Placeholders for flattened steps, identity references for the rest.
  Indexed(&'a Flattened),
  /// Always `null`.
  Erased,
}

pub(crate) struct IdentityWriter<'a> {
  converters: &'a ConverterRegistry,
  targets: TargetWriting<'a>,
  ids: HashMap<StepKey, String>,
  defined: HashSet<StepKey>,
  /// Steps referenced as targets, with the name of the referring step.
  referenced: Vec<(StepKey, String)>,
}

impl<'a> IdentityWriter<'a> {
  pub(crate) fn new(converters: &'a ConverterRegistry, targets: TargetWriting<'a>) -> Self {
    Self {
      converters,
      targets,
      ids: HashMap::new(),
      defined: HashSet::new(),
      referenced: Vec::new(),
    }
  }

  fn id_of(&mut self, key: StepKey) -> String {
    let next = self.ids.len() + 1;
    self
      .ids
      .entry(key)
      .or_insert_with(|| next.to_string())
      .clone()
  }

  pub(crate) fn process(&mut self, process: &Process) -> Result<ProcessRecord> {
    Ok(ProcessRecord {
      name: process.name.clone(),
      chapters: self.chapters(&process.chapters)?,
    })
  }

  fn chapters(&mut self, chapters: &[Chapter]) -> Result<Vec<ChapterRecord>> {
    chapters.iter().map(|c| self.chapter(c)).collect()
  }

  pub(crate) fn chapter(&mut self, chapter: &Chapter) -> Result<ChapterRecord> {
    Ok(ChapterRecord {
      name: chapter.name.clone(),
      steps: chapter
        .steps
        .iter()
        .map(|s| self.step(s))
        .collect::<Result<_>>()?,
    })
  }

  /// Writes `step` at an owning position.
  pub(crate) fn step(&mut self, step: &StepRef) -> Result<StepNode> {
    let key = step_key(step);
    let id = self.id_of(key);
    if !self.defined.insert(key) {
      return Ok(StepNode::Ref(StepReference { id }));
    }
    let s = step.borrow();
    let behaviors = s
      .behaviors
      .iter()
      .map(|b| self.behavior(b))
      .collect::<Result<_>>()?;
    let transitions = s
      .transitions
      .iter()
      .enumerate()
      .map(|(j, t)| self.transition(step, &s.name, j, t))
      .collect::<Result<_>>()?;
    Ok(StepNode::Def(Box::new(StepRecord {
      id,
      name: s.name.clone(),
      description: s.description.clone(),
      behaviors,
      transitions,
    })))
  }

  fn behavior(&mut self, behavior: &Behavior) -> Result<BehaviorRecord> {
    Ok(BehaviorRecord {
      kind: behavior.kind.clone(),
      properties: self.converters.write_properties(&behavior.properties)?,
      chapters: self.chapters(&behavior.chapters)?,
    })
  }

  fn condition(&self, condition: &Condition) -> Result<ConditionRecord> {
    Ok(ConditionRecord {
      kind: condition.kind.clone(),
      properties: self.converters.write_properties(&condition.properties)?,
    })
  }

  fn transition(
    &mut self,
    owner: &StepRef,
    owner_name: &str,
    position: usize,
    transition: &Transition,
  ) -> Result<TransitionRecord> {
    let conditions = transition
      .conditions
      .iter()
      .map(|c| self.condition(c))
      .collect::<Result<_>>()?;
    let target_step = match self.targets {
      TargetWriting::Erased => None,
      TargetWriting::Indexed(flat) => match flat.placeholder(owner, position) {
        Some(index) => Some(TargetRecord::Placeholder(PlaceholderRecord {
          position_index: index,
        })),
        None => self.native_target(owner_name, transition)?,
      },
      TargetWriting::Native => self.native_target(owner_name, transition)?,
    };
    Ok(TransitionRecord {
      conditions,
      target_step,
    })
  }

  fn native_target(
    &mut self,
    owner_name: &str,
    transition: &Transition,
  ) -> Result<Option<TargetRecord>> {
    if !transition.has_target() {
      return Ok(None);
    }
    let Some(target) = transition.target() else {
      return Err(SerializerError::DanglingTarget {
        step: owner_name.to_string(),
      });
    };
    let key = step_key(&target);
    self.referenced.push((key, owner_name.to_string()));
    let id = self.id_of(key);
    Ok(Some(TargetRecord::Step(StepNode::Ref(StepReference { id }))))
  }

  /// Checks that every referenced target was also defined.
  pub(crate) fn finish(self) -> Result<()> {
    match self
      .referenced
      .into_iter()
      .find(|(key, _)| !self.defined.contains(key))
    {
      Some((_, step)) => Err(SerializerError::DanglingTarget { step }),
      None => Ok(()),
    }
  }
}

/// How the reader treats transition targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetReading {
  /// Identity references only; placeholders are malformed.
  Native,
  /// Identity references and placeholders (collected for the resolver).
  Indexed,
  /// Targets are ignored.
  Discard,
}

pub(crate) struct IdentityReader<'a> {
  converters: &'a ConverterRegistry,
  targets: TargetReading,
  steps: HashMap<String, StepRef>,
  forward: Vec<(StepRef, usize, String)>,
  placeholders: Vec<PendingTarget>,
}

impl<'a> IdentityReader<'a> {
  pub(crate) fn new(converters: &'a ConverterRegistry, targets: TargetReading) -> Self {
    Self {
      converters,
      targets,
      steps: HashMap::new(),
      forward: Vec::new(),
      placeholders: Vec::new(),
    }
  }

  pub(crate) fn process(&mut self, record: ProcessRecord) -> Result<Process> {
    Ok(Process {
      name: record.name,
      chapters: self.chapters(record.chapters)?,
    })
  }

  fn chapters(&mut self, records: Vec<ChapterRecord>) -> Result<Vec<Chapter>> {
    records.into_iter().map(|c| self.chapter(c)).collect()
  }

  pub(crate) fn chapter(&mut self, record: ChapterRecord) -> Result<Chapter> {
    Ok(Chapter {
      name: record.name,
      steps: record
        .steps
        .into_iter()
        .map(|s| self.step(s))
        .collect::<Result<_>>()?,
    })
  }

  /// Reads a step at an owning position.
  pub(crate) fn step(&mut self, node: StepNode) -> Result<StepRef> {
    match node {
      StepNode::Ref(reference) => self.steps.get(&reference.id).cloned().ok_or_else(|| {
        SerializerError::malformed(format!(
          "step reference '{}' precedes its definition",
          reference.id
        ))
      }),
      StepNode::Def(record) => self.define(*record),
    }
  }

  fn define(&mut self, record: StepRecord) -> Result<StepRef> {
    let step = Step::new(record.name).into_ref();
    if self.steps.insert(record.id.clone(), Rc::clone(&step)).is_some() {
      return Err(SerializerError::malformed(format!(
        "step id '{}' is defined twice",
        record.id
      )));
    }
    let behaviors = record
      .behaviors
      .into_iter()
      .map(|b| self.behavior(b))
      .collect::<Result<Vec<_>>>()?;
    let mut transitions = Vec::with_capacity(record.transitions.len());
    for (position, t) in record.transitions.into_iter().enumerate() {
      transitions.push(self.transition(&step, position, t)?);
    }
    {
      let mut s = step.borrow_mut();
      s.description = record.description;
      s.behaviors = behaviors;
      s.transitions = transitions;
    }
    Ok(step)
  }

  fn behavior(&mut self, record: BehaviorRecord) -> Result<Behavior> {
    Ok(Behavior {
      kind: record.kind,
      properties: self.converters.read_properties(record.properties)?,
      chapters: self.chapters(record.chapters)?,
    })
  }

  fn condition(&self, record: ConditionRecord) -> Result<Condition> {
    Ok(Condition {
      kind: record.kind,
      properties: self.converters.read_properties(record.properties)?,
    })
  }

  fn transition(
    &mut self,
    owner: &StepRef,
    position: usize,
    record: TransitionRecord,
  ) -> Result<Transition> {
    let mut transition = Transition::new();
    transition.conditions = record
      .conditions
      .into_iter()
      .map(|c| self.condition(c))
      .collect::<Result<_>>()?;
    if self.targets == TargetReading::Discard {
      return Ok(transition);
    }
    match record.target_step {
      None => {}
      Some(TargetRecord::Placeholder(p)) => {
        if self.targets == TargetReading::Native {
          return Err(SerializerError::malformed(format!(
            "placeholder target {} is not valid in this format",
            p.position_index
          )));
        }
        self.placeholders.push(PendingTarget {
          step: Rc::clone(owner),
          transition: position,
          placeholder: p.position_index,
        });
      }
      Some(TargetRecord::Step(StepNode::Ref(r))) => match self.steps.get(&r.id) {
        Some(target) => transition.set_target(Some(target)),
        None => self.forward.push((Rc::clone(owner), position, r.id)),
      },
      Some(TargetRecord::Step(StepNode::Def(d))) => {
        return Err(SerializerError::malformed(format!(
          "step '{}' is defined inside a transition target",
          d.name
        )));
      }
    }
    Ok(transition)
  }

  /// Binds forward target references and hands back the placeholders.
  pub(crate) fn finish(self) -> Result<Vec<PendingTarget>> {
    for (owner, position, id) in self.forward {
      let target = self.steps.get(&id).ok_or_else(|| {
        SerializerError::malformed(format!("transition targets unknown step id '{id}'"))
      })?;
      if let Some(t) = owner.borrow_mut().transitions.get_mut(position) {
        t.set_target(Some(target));
      }
    }
    Ok(self.placeholders)
  }
}
