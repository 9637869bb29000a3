//! Root of an authored process graph.

use crate::flatten::{self, DanglingPolicy, Flattened, Traversal};

use super::{Chapter, StepRef};

/// Root of the graph: chapters in declaration order.
#[derive(Debug, Default)]
pub struct Process {
  pub name: String,
  pub chapters: Vec<Chapter>,
}

impl Process {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      chapters: Vec::new(),
    }
  }

  pub fn with_chapter(mut self, chapter: Chapter) -> Self {
    self.chapters.push(chapter);
    self
  }

  /// Number of distinct steps, including those in behavior-owned chapters.
  pub fn step_count(&self) -> usize {
    flatten::collect_process(self, Traversal::Recursive).len()
  }

  /// First step named `name`, in flattening order.
  pub fn find_step(&self, name: &str) -> Option<StepRef> {
    flatten::collect_process(self, Traversal::Recursive)
      .steps()
      .iter()
      .find(|s| s.borrow().name == name)
      .cloned()
  }

  /// Deep structural equality of chapters, steps, behaviors and transitions.
  ///
  /// Transition targets compare by position in the flattened sequence, so
  /// cycles are handled and two steps with equal content in different places
  /// are not confused. A target that leaves the process counts as no target.
  pub fn same_shape(&self, other: &Process) -> bool {
    let lenient = |p: &Process| {
      flatten::assign_targets(
        flatten::collect_process(p, Traversal::Recursive),
        DanglingPolicy::Erase,
      )
      .ok()
    };
    let (Some(a), Some(b)) = (lenient(self), lenient(other)) else {
      return false;
    };
    self.name == other.name
      && chapters_match(&self.chapters, &a, &other.chapters, &b)
      && a.len() == b.len()
      && (0..a.len()).all(|i| steps_match(i, &a, &b))
  }
}

fn chapters_match(ca: &[Chapter], fa: &Flattened, cb: &[Chapter], fb: &Flattened) -> bool {
  ca.len() == cb.len()
    && ca.iter().zip(cb).all(|(x, y)| {
      x.name == y.name
        && x.steps.len() == y.steps.len()
        && x
          .steps
          .iter()
          .zip(&y.steps)
          .all(|(sx, sy)| fa.position(sx) == fb.position(sy))
    })
}

fn steps_match(position: usize, fa: &Flattened, fb: &Flattened) -> bool {
  let x = fa.steps()[position].borrow();
  let y = fb.steps()[position].borrow();
  x.name == y.name
    && x.description == y.description
    && fa.targets_of(position) == fb.targets_of(position)
    && x.transitions.len() == y.transitions.len()
    && x
      .transitions
      .iter()
      .zip(&y.transitions)
      .all(|(tx, ty)| tx.conditions == ty.conditions)
    && x.behaviors.len() == y.behaviors.len()
    && x.behaviors.iter().zip(&y.behaviors).all(|(bx, by)| {
      bx.kind == by.kind
        && bx.properties == by.properties
        && chapters_match(&bx.chapters, fa, &by.chapters, fb)
    })
}
