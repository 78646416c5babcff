//! Code generation collaborators
//!
//! Each pipeline talks to its generators through these traits; the structural
//! implementations below are what `Toolchain::default()` wires in.

pub mod incgen;
pub mod printer;
pub mod pseudo;
pub mod pyast;
pub mod pygen;
mod query;

pub use incgen::IncrementalTransformer;
pub use printer::SourcePrinter;
pub use pseudo::PseudoPrinter;
pub use pyast::{PyModule, PyStmt};
pub use pygen::PythonGenerator;

use crate::frontend::Module;
use crate::logging::{codes, Code};
use crate::pipeline::Session;
use crate::transform::TransformConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("process {process} has no main method")]
    MissingMain { process: String },

    #[error("{message}")]
    Failed { message: String },
}

impl GenerateError {
    pub fn error_code(&self) -> Code {
        match self {
            GenerateError::MissingMain { .. } => codes::generation::MISSING_MAIN,
            GenerateError::Failed { .. } => codes::generation::HOST_GENERATION_FAILED,
        }
    }
}

/// Domain AST to host AST
pub trait Generator {
    fn generate(&self, module: &Module, session: &Session) -> Result<PyModule, GenerateError>;
}

/// Host AST to source text
pub trait Renderer {
    fn render(&self, module: &PyModule) -> String;
}

/// Domain AST to pseudocode text
pub trait PseudoRenderer {
    fn render_pseudo(&self, module: &Module) -> String;
}

/// The two host modules produced for incremental compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalModules {
    /// Hoisted queries and event hooks (`<base>_inc.py`)
    pub interface: PyModule,
    /// The program rewritten to call into the interface
    pub rewritten: PyModule,
}

pub trait IncrementalGenerator {
    fn generate(
        &self,
        module: &Module,
        config: &TransformConfig,
        session: &Session,
    ) -> Result<IncrementalModules, GenerateError>;
}
