use crate::backend::GenerateError;
use crate::frontend::FrontEndError;
use crate::logging::{codes, Code};
use crate::pipeline::output::OutputError;
use std::fmt;

/// Pipeline step a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FrontEnd,
    HostGeneration,
    IncrementalGeneration,
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FrontEnd => "front end",
            Stage::HostGeneration => "host generation",
            Stage::IncrementalGeneration => "incremental generation",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

/// Pipeline processing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("unable to generate DistPy AST for file {path} ({errcnt} errors)")]
    ParseFailed { path: String, errcnt: usize },

    #[error("unable to generate DistPy AST for file {path}: {source}")]
    FrontEnd { path: String, source: FrontEndError },

    #[error("unable to generate Python AST for file {path}: {source}")]
    HostGeneration { path: String, source: GenerateError },

    #[error("unable to generate incremental interface for file {path}: {source}")]
    IncrementalGeneration { path: String, source: GenerateError },

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::ParseFailed { .. } | PipelineError::FrontEnd { .. } => Stage::FrontEnd,
            PipelineError::HostGeneration { .. } => Stage::HostGeneration,
            PipelineError::IncrementalGeneration { .. } => Stage::IncrementalGeneration,
            PipelineError::Output(_) => Stage::Output,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::ParseFailed { .. } => codes::frontend::UNIT_REJECTED,
            PipelineError::FrontEnd { source, .. } => source.error_code(),
            PipelineError::HostGeneration { source, .. } => source.error_code(),
            PipelineError::IncrementalGeneration { source, .. } => match source {
                GenerateError::MissingMain { .. } => source.error_code(),
                _ => codes::generation::INCREMENTAL_GENERATION_FAILED,
            },
            PipelineError::Output(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::output::ArtifactKind;

    #[test]
    fn test_stage_attribution() {
        let parse = PipelineError::ParseFailed {
            path: "a.dpy".to_string(),
            errcnt: 2,
        };
        assert_eq!(parse.stage(), Stage::FrontEnd);
        assert_eq!(
            parse.to_string(),
            "unable to generate DistPy AST for file a.dpy (2 errors)"
        );

        let generation = PipelineError::HostGeneration {
            path: "a.dpy".to_string(),
            source: GenerateError::MissingMain {
                process: "P".to_string(),
            },
        };
        assert_eq!(generation.stage(), Stage::HostGeneration);
        assert_eq!(generation.error_code(), codes::generation::MISSING_MAIN);
        assert!(generation.to_string().starts_with("unable to generate Python AST"));

        let output: PipelineError = OutputError::Commit {
            path: "a_inc.py".to_string(),
            kind: ArtifactKind::Interface,
            message: "busy".to_string(),
        }
        .into();
        assert_eq!(output.stage(), Stage::Output);
        assert_eq!(output.error_code(), codes::output::COMMIT_FAILED);
    }

    #[test]
    fn test_incremental_failure_code() {
        let error = PipelineError::IncrementalGeneration {
            path: "a.dpy".to_string(),
            source: GenerateError::Failed {
                message: "bad query".to_string(),
            },
        };
        assert_eq!(
            error.error_code(),
            codes::generation::INCREMENTAL_GENERATION_FAILED
        );
        assert_eq!(Stage::IncrementalGeneration.to_string(), "incremental generation");
    }
}
