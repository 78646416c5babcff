mod error;
mod incremental;
pub mod output;
mod pseudo;
mod result;
mod source;
mod validation;

// Re-export public types
pub use error::{PipelineError, Stage};
pub use output::{Artifact, ArtifactKind, OutputError, OutputWriter, WriteTransaction};
pub use result::CompileOutcome;
pub use validation::{check_host_runtime, validate_pipeline};

use crate::backend::{
    Generator, IncrementalGenerator, IncrementalTransformer, PseudoPrinter, PseudoRenderer,
    PythonGenerator, Renderer, SourcePrinter,
};
use crate::config::debug::DebugLevel;
use crate::config::runtime::OutputPreferences;
use crate::frontend::{FrontEnd, ParseResult, StructuralParser};
use crate::locator::CompilationUnit;
use crate::logging;
use crate::transform::TransformFlags;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// The single pipeline an invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Source,
    Pseudocode,
    Incremental,
}

impl Mode {
    /// Pseudocode first, then incremental, else source. Conflicting flags are
    /// not an error.
    pub fn select(pseudo: bool, incremental: bool) -> Self {
        if pseudo {
            Mode::Pseudocode
        } else if incremental {
            Mode::Incremental
        } else {
            Mode::Source
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Source => "source",
            Mode::Pseudocode => "pseudocode",
            Mode::Incremental => "incremental",
        };
        f.write_str(name)
    }
}

/// Settings every collaborator receives explicitly
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub debug_level: DebugLevel,
    pub output: OutputPreferences,
}

impl Session {
    pub fn new(debug_level: DebugLevel, output: OutputPreferences) -> Self {
        Self {
            debug_level,
            output,
        }
    }

    pub fn writer(&self) -> OutputWriter {
        OutputWriter::from_preferences(&self.output)
    }
}

/// One invocation's inputs, as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub source: PathBuf,
    /// `-o`: primary output in source and incremental modes
    pub output: Option<PathBuf>,
    /// `--psdfile`: output in pseudocode mode
    pub pseudo_output: Option<PathBuf>,
    pub pseudo: bool,
    pub incremental: bool,
    pub transform: TransformFlags,
}

impl CompileOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::select(self.pseudo, self.incremental)
    }
}

/// Collaborators the pipelines delegate to
pub struct Toolchain {
    pub front_end: Box<dyn FrontEnd>,
    pub generator: Box<dyn Generator>,
    pub renderer: Box<dyn Renderer>,
    pub pseudo: Box<dyn PseudoRenderer>,
    pub incremental: Box<dyn IncrementalGenerator>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            front_end: Box::new(StructuralParser::new()),
            generator: Box::new(PythonGenerator::new()),
            renderer: Box::new(SourcePrinter::new()),
            pseudo: Box::new(PseudoPrinter::new()),
            incremental: Box::new(IncrementalTransformer::new()),
        }
    }
}

fn parse(
    unit: &CompilationUnit,
    session: &Session,
    toolchain: &Toolchain,
) -> Result<ParseResult, PipelineError> {
    toolchain
        .front_end
        .parse(&unit.path, session)
        .map_err(|source| PipelineError::FrontEnd {
            path: unit.path.display().to_string(),
            source,
        })
}

/// Compile one unit in the mode selected by `options`.
///
/// Failures are logged with their stage and returned as an outcome; nothing
/// here panics or exits the process.
pub fn compile(options: &CompileOptions, session: &Session, toolchain: &Toolchain) -> CompileOutcome {
    let start_time = Instant::now();
    let unit = CompilationUnit::locate(options.source.clone());
    if !unit.should_compile() {
        return CompileOutcome::Skipped;
    }

    let mode = options.mode();
    if options.pseudo && options.incremental {
        crate::log_debug!("Incremental flag ignored in pseudocode mode",
            "unit" => unit.path.display());
    }

    logging::with_unit_context(&unit.path, || {
        crate::log_debug!("Compiling unit", "mode" => mode);

        let result = match mode {
            Mode::Source => source::run(&unit, options, session, toolchain),
            Mode::Pseudocode => pseudo::run(&unit, options, session, toolchain),
            Mode::Incremental => incremental::run(&unit, options, session, toolchain),
        };

        let outcome = match result {
            Ok(artifacts) => CompileOutcome::Written(artifacts),
            Err(error) => {
                crate::log_error!(error.error_code(), &error.to_string(),
                    "stage" => error.stage());
                CompileOutcome::Failed(error)
            }
        };
        outcome.log_completion(&unit.path, start_time.elapsed());
        outcome
    })
}
