//! Shared primitive types used by the front end and the logging layer.

pub mod span;

pub use span::{Position, SourceMap, Span};
