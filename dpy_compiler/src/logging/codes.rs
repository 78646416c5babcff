//! Diagnostic codes and their metadata
//!
//! Codes are grouped by the stage that raises them: `E0xx` errors, `W0xx`
//! warnings, `I0xx` progress reports and `ERR0xx` internal failures.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Suffix classification by the locator
pub mod source {
    use super::Code;

    pub const UNKNOWN_SUFFIX: Code = Code::new("W010");
    pub const HOST_SOURCE_SKIPPED: Code = Code::new("W011");
}

/// Reading the unit from disk
pub mod file {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const TOO_MANY_LINES: Code = Code::new("E012");
}

pub mod frontend {
    use super::Code;

    pub const INCONSISTENT_INDENTATION: Code = Code::new("E020");
    pub const UNBALANCED_BRACKETS: Code = Code::new("E021");
    pub const DUPLICATE_PROCESS: Code = Code::new("E022");
    pub const MALFORMED_DECLARATION: Code = Code::new("E023");
    pub const UNIT_REJECTED: Code = Code::new("E024");
    pub const UNTERMINATED_STRING: Code = Code::new("E025");
    pub const MISSING_SETUP: Code = Code::new("W020");
}

pub mod generation {
    use super::Code;

    pub const MISSING_MAIN: Code = Code::new("E040");
    pub const HOST_GENERATION_FAILED: Code = Code::new("E041");
    pub const INCREMENTAL_GENERATION_FAILED: Code = Code::new("E042");
}

pub mod output {
    use super::Code;

    pub const WRITE_FAILED: Code = Code::new("E060");
    pub const COMMIT_FAILED: Code = Code::new("E061");
}

/// Startup: debug level and host runtime checks
pub mod config {
    use super::Code;

    pub const INVALID_DEBUG_LEVEL: Code = Code::new("W070");
    pub const UNSUPPORTED_HOST_RUNTIME: Code = Code::new("E071");
}

/// Progress reports shown at the default debug level
pub mod success {
    use super::Code;

    pub const PARSE_COMPLETE: Code = Code::new("I040");
    pub const ARTIFACT_WRITTEN: Code = Code::new("I060");
}

const NO_ACTION: &str = "No action required";

#[rustfmt::skip]
const REGISTRY: &[(&str, &str, Severity, &str, &str)] = &[
    ("ERR001", "System", Severity::Critical, "Internal compiler error", "Report the input that triggered it"),
    ("ERR002", "System", Severity::Critical, "Compiler startup failed", "Check the build profile and DPY_* environment"),
    ("W010", "Source", Severity::Low, "Input does not carry the .dpy suffix", "Rename DistPy sources to *.dpy"),
    ("W011", "Source", Severity::Low, "Input is a generated .py module and was skipped", "Pass the .dpy source instead"),
    ("E005", "FileProcessing", Severity::Medium, "Source file does not exist", "Check the path given on the command line"),
    ("E007", "FileProcessing", Severity::Medium, "Source file is larger than the configured limit", "Split the program into smaller units"),
    ("E009", "FileProcessing", Severity::High, "Source file is not readable", "Check file permissions"),
    ("E010", "FileProcessing", Severity::Medium, "Source file is not UTF-8", "Re-encode the source as UTF-8"),
    ("E011", "FileProcessing", Severity::High, "Reading the source file failed", "Check that the file is accessible"),
    ("E012", "FileProcessing", Severity::Medium, "Source file has more lines than the configured limit", "Split the program into smaller units"),
    ("E020", "FrontEnd", Severity::High, "Indentation does not fit the enclosing block structure", "Indent blocks consistently"),
    ("E021", "FrontEnd", Severity::High, "Bracket opened but never closed", "Close brackets before the statement ends"),
    ("E022", "FrontEnd", Severity::High, "Process class declared twice", "Rename one of the processes"),
    ("E023", "FrontEnd", Severity::High, "Class or method header is malformed", "Check the declaration syntax"),
    ("E024", "FrontEnd", Severity::High, "Front end rejected the unit", "Fix the reported errors and recompile"),
    ("E025", "FrontEnd", Severity::High, "String literal runs past the end of the line", "Close the string literal"),
    ("W020", "FrontEnd", Severity::Low, "Process has no setup method", "Add setup to initialize process state"),
    ("E040", "Generation", Severity::High, "Process has no main method", "Add a main method to the process"),
    ("E041", "Generation", Severity::High, "Python module generation failed", "Look at earlier diagnostics for the construct"),
    ("E042", "Generation", Severity::High, "Incrementalizer interface generation failed", "Retry with fewer query tables enabled"),
    ("E060", "Output", Severity::High, "Output file could not be written", "Check that the target directory is writable"),
    ("E061", "Output", Severity::Critical, "Staged output could not be moved into place", "Check that targets are not locked"),
    ("W070", "Configuration", Severity::Low, "Debug level is not an integer in range", "Pass -L with a level from 0 to 3"),
    ("E071", "Configuration", Severity::Critical, "Host runtime version is outside the supported window", "Set DPY_HOST_RUNTIME to a supported version"),
    ("I040", "Success", Severity::Low, "Front end produced a usable AST", NO_ACTION),
    ("I060", "Success", Severity::Low, "Output file written", NO_ACTION),
];

fn registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    static INDEX: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();
    INDEX.get_or_init(|| {
        REGISTRY
            .iter()
            .map(|&(code, category, severity, description, recommended_action)| {
                let metadata = ErrorMetadata {
                    code,
                    category,
                    severity,
                    description,
                    recommended_action,
                };
                (code, metadata)
            })
            .collect()
    })
}

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code).map_or(Severity::Medium, |m| m.severity)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code).map_or("Unknown error", |m| m.description)
}

/// `None` for unknown codes and for codes that need no action
pub fn get_action(code: &str) -> Option<&'static str> {
    get_error_metadata(code)
        .map(|m| m.recommended_action)
        .filter(|action| *action != NO_ACTION)
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code).map_or("Unknown", |m| m.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_is_registered() {
        let constants = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            source::UNKNOWN_SUFFIX,
            source::HOST_SOURCE_SKIPPED,
            file::FILE_NOT_FOUND,
            file::FILE_TOO_LARGE,
            file::PERMISSION_DENIED,
            file::INVALID_ENCODING,
            file::IO_ERROR,
            file::TOO_MANY_LINES,
            frontend::INCONSISTENT_INDENTATION,
            frontend::UNBALANCED_BRACKETS,
            frontend::DUPLICATE_PROCESS,
            frontend::MALFORMED_DECLARATION,
            frontend::UNIT_REJECTED,
            frontend::UNTERMINATED_STRING,
            frontend::MISSING_SETUP,
            generation::MISSING_MAIN,
            generation::HOST_GENERATION_FAILED,
            generation::INCREMENTAL_GENERATION_FAILED,
            output::WRITE_FAILED,
            output::COMMIT_FAILED,
            config::INVALID_DEBUG_LEVEL,
            config::UNSUPPORTED_HOST_RUNTIME,
            success::PARSE_COMPLETE,
            success::ARTIFACT_WRITTEN,
        ];

        for code in constants {
            assert!(get_error_metadata(code.as_str()).is_some(), "{} is unregistered", code);
        }
        assert_eq!(REGISTRY.len(), constants.len());
    }

    #[test]
    fn test_lookups() {
        assert_eq!(get_category("E020"), "FrontEnd");
        assert_eq!(
            get_description("E020"),
            "Indentation does not fit the enclosing block structure"
        );
        assert_eq!(get_severity("E061"), Severity::Critical);
        assert_eq!(get_action("E040"), Some("Add a main method to the process"));
        assert_eq!(get_action("I060"), None);
    }

    #[test]
    fn test_unknown_code_fallbacks() {
        assert_eq!(get_description("Z999"), "Unknown error");
        assert_eq!(get_action("Z999"), None);
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
    }
}
