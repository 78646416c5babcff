use super::error::PipelineError;
use super::output::Artifact;
use std::path::Path;
use std::time::Duration;

/// What a single invocation did with its compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Host-language source given as input; nothing was compiled
    Skipped,
    Written(Vec<Artifact>),
    Failed(PipelineError),
}

impl CompileOutcome {
    pub fn artifacts(&self) -> &[Artifact] {
        match self {
            CompileOutcome::Written(artifacts) => artifacts,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            CompileOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, CompileOutcome::Written(_))
    }

    /// Process exit status; only `strict` distinguishes a unit without artifacts
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            CompileOutcome::Written(_) => 0,
            CompileOutcome::Skipped | CompileOutcome::Failed(_) if strict => 1,
            CompileOutcome::Skipped | CompileOutcome::Failed(_) => 0,
        }
    }

    pub fn log_completion(&self, path: &Path, duration: Duration) {
        let status = match self {
            CompileOutcome::Skipped => "skipped",
            CompileOutcome::Written(_) => "written",
            CompileOutcome::Failed(_) => "failed",
        };
        crate::log_debug!("Compilation unit finished",
            "status" => status,
            "errors" => crate::logging::unit_errors(path).len(),
            "artifacts" => self.artifacts().len(),
            "duration_ms" => format!("{:.2}", duration.as_secs_f64() * 1000.0)
        );
    }
}
