//! # streamweave-process
//!
//! Versioned JSON persistence for authored processes: a graph of steps joined
//! by transitions, grouped into chapters, where a step's behaviors may own
//! further chapters.
//!
//! ## Architecture
//!
//! - [flatten]: walks the chapter forest into one ordered, identity-deduplicated
//!   step sequence and maps every transition target to its position.
//! - [resolve]: the inverse; rewires transitions from positions after decoding.
//! - [format]: the format versions (1, 2, 3) and the dispatcher that reads the
//!   `$serializerVersion` tag and picks a decoder. Encoding writes the newest.
//! - [clipboard]: single-step and single-chapter payloads for copy/paste.
//! - [converters]: pluggable codecs for typed leaf values (vectors, colors, curves).
//! - [serializer]: [ProcessSerializer], the façade over all of the above.
//! - [process_io]: save/load to files.

pub mod clipboard;
pub mod converters;
mod error;
pub mod flatten;
pub mod format;
mod identity;
pub mod process_io;
pub mod resolve;
pub mod serializer;
pub mod types;
mod wire;

pub use converters::{ConverterRegistry, ValueConverter};
pub use error::{Result, SerializerError};
pub use format::FormatVersion;
pub use serializer::{ProcessSerializer, SerializerOptions};
pub use types::{Behavior, Chapter, Condition, Process, Step, StepRef, Transition, Value};
