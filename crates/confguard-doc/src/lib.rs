//! Configuration document model and tree query primitives.
//!
//! A [`ConfigValue`] is the read-only in-memory form of one pipeline config:
//! scalars, ordered sequences, and insertion-ordered mappings. [`walk`] and
//! friends provide the generic traversal the built-in helpers and the rule
//! engine are written against.

#![forbid(unsafe_code)]

mod parse;
mod value;
mod walk;

pub use parse::{parse_document, DocError, MAX_DEPTH};
pub use value::{ConfigMap, ConfigValue, Number};
pub use walk::{lookup, match_paths, project, walk, DocPath, PathSeg, Walk};
