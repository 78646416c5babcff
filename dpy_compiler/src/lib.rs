// Internal modules
pub mod backend;
pub mod cli;
pub mod config;
pub mod frontend;
pub mod locator;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod transform;
pub mod utils;

// Re-export key types for library consumers
pub use pipeline::{compile, CompileOptions, CompileOutcome, Mode, PipelineError, Session, Toolchain};
pub use transform::{TransformConfig, TransformFlags};
