//! Parse-then-gate protocol
//!
//! The gate always reports the unit's error and warning counts, and only a
//! result with zero errors yields a tree for the generators.

use super::{Module, ParseResult};
use crate::locator::CompilationUnit;
use crate::log_success;
use crate::logging::codes;
use crate::pipeline::PipelineError;

pub fn gate(unit: &CompilationUnit, result: ParseResult) -> Result<Module, PipelineError> {
    log_success!(
        codes::success::PARSE_COMPLETE,
        &format!(
            "{} compiled with {} errors and {} warnings.",
            unit.path.display(),
            result.errcnt,
            result.warncnt
        )
    );

    if result.is_usable() {
        Ok(result.ast)
    } else {
        Err(PipelineError::ParseFailed {
            path: unit.path.display().to_string(),
            errcnt: result.errcnt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{self, LogLevel, LoggingService, MemoryLogger};
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn gate_at_lowest_level(result: ParseResult) -> (Result<Module, PipelineError>, Vec<String>) {
        let unit = CompilationUnit::new("ring.dpy");
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Error);
        let outcome = logging::with_logger(service, || gate(&unit, result));
        (outcome, memory.events().into_iter().map(|e| e.message).collect())
    }

    #[test]
    fn test_clean_result_passes() {
        let unit = CompilationUnit::new("ring.dpy");
        let result = ParseResult::with_counts(Module::new("ring"), 0, 3);
        let ast = gate(&unit, result).unwrap();
        assert_eq!(ast.name, "ring");
    }

    #[test]
    fn test_errors_block_the_unit() {
        let unit = CompilationUnit::new("ring.dpy");
        let result = ParseResult::with_counts(Module::new("ring"), 2, 0);
        assert_matches!(
            gate(&unit, result),
            Err(PipelineError::ParseFailed { errcnt: 2, ref path }) if path == "ring.dpy"
        );
    }

    #[test]
    fn test_counts_are_reported_at_lowest_debug_level() {
        let (outcome, messages) = gate_at_lowest_level(ParseResult::with_counts(Module::new("ring"), 0, 3));
        assert!(outcome.is_ok());
        assert_eq!(messages, vec!["ring.dpy compiled with 0 errors and 3 warnings."]);

        let (outcome, messages) = gate_at_lowest_level(ParseResult::with_counts(Module::new("ring"), 2, 0));
        assert!(outcome.is_err());
        assert_eq!(messages, vec!["ring.dpy compiled with 2 errors and 0 warnings."]);
    }
}
