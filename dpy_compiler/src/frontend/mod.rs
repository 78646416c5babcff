//! Front end boundary: parsing a compilation unit into a DistPy AST
//!
//! A front end reports every problem it finds as a `Diagnostic` and returns
//! the counts alongside the tree. The gate decides whether the tree may flow
//! into a generator.

pub mod ast;
pub mod gate;
pub mod parser;
pub mod source;

use crate::logging::Code;
use crate::pipeline::Session;
use crate::utils::Span;
use std::path::Path;

pub use ast::Module;
pub use gate::gate;
pub use parser::StructuralParser;
pub use source::{SourceError, SourceFile, SourceReader};

/// Parses one compilation unit
pub trait FrontEnd {
    fn parse(&self, path: &Path, session: &Session) -> Result<ParseResult, FrontEndError>;
}

/// Errors that prevent a front end from producing any result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrontEndError {
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl FrontEndError {
    pub fn error_code(&self) -> Code {
        match self {
            FrontEndError::Source(e) => e.error_code(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// One problem reported by a front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(code: Code, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn warning(code: Code, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// AST root plus the diagnostics collected while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub ast: Module,
    pub errcnt: usize,
    pub warncnt: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Build a result whose counters agree with its diagnostics
    pub fn new(ast: Module, diagnostics: Vec<Diagnostic>) -> Self {
        let errcnt = diagnostics.iter().filter(|d| d.is_error()).count();
        let warncnt = diagnostics.len() - errcnt;
        Self {
            ast,
            errcnt,
            warncnt,
            diagnostics,
        }
    }

    /// Result with explicit counters and no diagnostic detail
    pub fn with_counts(ast: Module, errcnt: usize, warncnt: usize) -> Self {
        Self {
            ast,
            errcnt,
            warncnt,
            diagnostics: Vec::new(),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.errcnt == 0
    }
}
