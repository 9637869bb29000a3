//! Process graph model: process → chapters → steps → transitions, with
//! behaviors that may own further chapters.
//!
//! Steps have reference identity ([StepRef]); transitions hold non-owning
//! handles to their targets, so cycles and self-loops are plain data.

mod behavior;
mod chapter;
mod condition;
mod leaf;
mod process;
mod step;
mod transition;
mod value;

pub use behavior::Behavior;
pub use chapter::Chapter;
pub use condition::Condition;
pub use leaf::{AnimationCurve, Color, Keyframe, Vector2, Vector3, Vector4};
pub use process::Process;
pub(crate) use step::{StepKey, step_key};
pub use step::{Step, StepRef, WeakStepRef, same_step};
pub use transition::Transition;
pub use value::{Properties, Value};
