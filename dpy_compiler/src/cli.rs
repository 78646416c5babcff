//! `dpyc` command line

use crate::config::debug::{resolve_debug_level, DebugLevel};
use crate::config::runtime::{HostRuntimeVersion, LoggingPreferences, OutputPreferences};
use crate::logging::{self, codes};
use crate::pipeline::{self, CompileOptions, Session, Toolchain};
use crate::transform::TransformFlags;
use clap::Parser;
use std::path::PathBuf;

/// Exit status when the targeted host runtime is unsupported
pub const EXIT_UNSUPPORTED_RUNTIME: u8 = 2;

#[derive(Debug, Clone, Parser)]
#[command(name = "dpyc", version, about = "DistPy to Python compiler")]
pub struct Cli {
    /// DistPy source file
    #[arg(value_name = "SOURCEFILE")]
    pub source: PathBuf,

    /// Output file
    #[arg(short = 'o', value_name = "OUTFILE")]
    pub output: Option<PathBuf>,

    /// Debug level
    #[arg(short = 'L', value_name = "LEVEL", allow_hyphen_values = true)]
    pub debug_level: Option<String>,

    /// Generate pseudo code instead of Python code
    #[arg(short = 'p')]
    pub pseudo: bool,

    /// Generate interface to the incrementalizer
    #[arg(short = 'i')]
    pub incremental: bool,

    #[arg(long)]
    pub no_table1: bool,

    #[arg(long)]
    pub no_table2: bool,

    #[arg(long)]
    pub no_table3: bool,

    #[arg(long)]
    pub jb_style: bool,

    #[arg(long)]
    pub no_all_tables: bool,

    /// Name of the output pseudo code file
    #[arg(long = "psdfile", value_name = "NAME")]
    pub pseudo_output: Option<PathBuf>,

    /// Exit with status 1 when no artifact was produced
    #[arg(long)]
    pub strict_exit: bool,
}

impl Cli {
    pub fn transform_flags(&self) -> TransformFlags {
        TransformFlags {
            no_table1: self.no_table1,
            no_table2: self.no_table2,
            no_table3: self.no_table3,
            jb_style: self.jb_style,
            no_all_tables: self.no_all_tables,
        }
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            source: self.source.clone(),
            output: self.output.clone(),
            pseudo_output: self.pseudo_output.clone(),
            pseudo: self.pseudo,
            incremental: self.incremental,
            transform: self.transform_flags(),
        }
    }
}

/// Host runtime precondition, checked before any other work
fn check_host_runtime() -> Result<(), String> {
    let version = HostRuntimeVersion::from_env()?;
    pipeline::check_host_runtime(version)
}

/// Run one invocation and return the process exit status
pub fn run(cli: Cli) -> u8 {
    if let Err(message) = check_host_runtime() {
        logging::safe_log_error(codes::config::UNSUPPORTED_HOST_RUNTIME, &message);
        return EXIT_UNSUPPORTED_RUNTIME;
    }

    let resolution = resolve_debug_level(DebugLevel::default(), cli.debug_level.as_deref());
    if let Err(e) = logging::init_global_logging(resolution.level, LoggingPreferences::default()) {
        logging::safe_log_error(
            codes::system::INITIALIZATION_FAILURE,
            &format!("Failed to initialize logging: {}", e),
        );
        return 1;
    }
    if let Some(warning) = &resolution.warning {
        logging::safe_log_warning(warning.error_code(), &warning.to_string());
    }

    if let Err(e) = pipeline::validate_pipeline() {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &e);
        return 1;
    }

    let session = Session::new(resolution.level, OutputPreferences::default());
    let strict = cli.strict_exit || session.output.strict_exit;
    let outcome = pipeline::compile(&cli.compile_options(), &session, &Toolchain::default());

    logging::print_cargo_style_summary();
    outcome.exit_code(strict)
}
