//! Compilation unit location and suffix classification
//!
//! Derives the base name and suffix of the input path and the default output
//! paths built from them. Classification is pure; `CompilationUnit::locate`
//! is the single place that reports it to the operator.

use crate::config::constants::{interface_module_name, DOMAIN_SUFFIX, HOST_SUFFIX};
use crate::logging::codes;
use crate::{log_debug, log_warning};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// How the input suffix affects compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixClass {
    /// The domain suffix
    Expected,
    /// Unknown or empty suffix: warn and proceed
    Tolerated,
    /// Host-language source: skip the unit entirely
    Disallowed,
}

impl SuffixClass {
    pub fn should_compile(&self) -> bool {
        !matches!(self, SuffixClass::Disallowed)
    }
}

/// Classify an input suffix without side effects
pub fn classify_suffix(suffix: &str) -> SuffixClass {
    if suffix == DOMAIN_SUFFIX {
        SuffixClass::Expected
    } else if suffix == HOST_SUFFIX {
        SuffixClass::Disallowed
    } else {
        SuffixClass::Tolerated
    }
}

/// Split a path into (base, suffix) on the last '.' of its final component.
///
/// A path with no separator yields the whole path as base and an empty
/// suffix. A name whose only dot is the leading one has no suffix.
pub fn split_source_path(path: &Path) -> (PathBuf, String) {
    match path.extension() {
        Some(extension) => (
            path.with_extension(""),
            extension.to_string_lossy().into_owned(),
        ),
        None => (path.to_path_buf(), String::new()),
    }
}

/// One invocation's input file and the paths derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub path: PathBuf,
    pub base: PathBuf,
    pub suffix: String,
    pub class: SuffixClass,
}

impl CompilationUnit {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (base, suffix) = split_source_path(&path);
        let class = classify_suffix(&suffix);
        Self {
            path,
            base,
            suffix,
            class,
        }
    }

    /// Build the unit and report its suffix classification
    pub fn locate(path: impl Into<PathBuf>) -> Self {
        let unit = Self::new(path);
        let shown = unit.path.display().to_string();

        match unit.class {
            SuffixClass::Expected => {
                log_debug!("Located compilation unit", "path" => shown, "base" => unit.base.display());
            }
            SuffixClass::Tolerated => {
                log_warning!(
                    always,
                    code = codes::source::UNKNOWN_SUFFIX,
                    &format!("unknown suffix '{}' in filename '{}'", unit.suffix, shown)
                );
            }
            SuffixClass::Disallowed => {
                log_warning!(
                    always,
                    code = codes::source::HOST_SOURCE_SKIPPED,
                    &format!("skipping '.{}' file {}", HOST_SUFFIX, shown)
                );
            }
        }

        unit
    }

    pub fn should_compile(&self) -> bool {
        self.class.should_compile()
    }

    /// Base name with the given target suffix appended
    pub fn default_output(&self, target_suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        name.push(".");
        name.push(target_suffix);
        PathBuf::from(name)
    }

    /// Explicit path when given, otherwise the default for `target_suffix`
    pub fn output_or_default(&self, explicit: Option<&Path>, target_suffix: &str) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output(target_suffix))
    }

    /// Interface module path for incremental mode, next to the base and
    /// named the way the rewritten module imports it
    pub fn interface_output(&self) -> PathBuf {
        let stem = self
            .base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.base
            .with_file_name(format!("{}.{}", interface_module_name(&stem), HOST_SUFFIX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{self, LogLevel, LoggingService, MemoryLogger};
    use std::sync::Arc;

    #[test]
    fn test_path_without_separator_has_empty_suffix() {
        let (base, suffix) = split_source_path(Path::new("ring"));
        assert_eq!(base, PathBuf::from("ring"));
        assert_eq!(suffix, "");
    }

    #[test]
    fn test_split_uses_last_dot_of_final_component() {
        let (base, suffix) = split_source_path(Path::new("algos.v2/a.tar.dpy"));
        assert_eq!(base, PathBuf::from("algos.v2/a.tar"));
        assert_eq!(suffix, "dpy");

        let (base, suffix) = split_source_path(Path::new("algos.v2/ring"));
        assert_eq!(base, PathBuf::from("algos.v2/ring"));
        assert_eq!(suffix, "");
    }

    #[test]
    fn test_leading_dot_is_not_a_suffix() {
        let (base, suffix) = split_source_path(Path::new(".dpy"));
        assert_eq!(base, PathBuf::from(".dpy"));
        assert_eq!(suffix, "");
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify_suffix("dpy"), SuffixClass::Expected);
        assert_eq!(classify_suffix("py"), SuffixClass::Disallowed);
        assert_eq!(classify_suffix("txt"), SuffixClass::Tolerated);
        assert_eq!(classify_suffix(""), SuffixClass::Tolerated);
        assert!(!SuffixClass::Disallowed.should_compile());
        assert!(SuffixClass::Tolerated.should_compile());
    }

    #[test]
    fn test_default_outputs() {
        let unit = CompilationUnit::new("foo.dpy");
        assert_eq!(unit.default_output("py"), PathBuf::from("foo.py"));
        assert_eq!(unit.default_output("da"), PathBuf::from("foo.da"));
        assert_eq!(unit.interface_output(), PathBuf::from("foo_inc.py"));

        let nested = CompilationUnit::new("algos/a.tar.dpy");
        assert_eq!(nested.interface_output(), PathBuf::from("algos/a.tar_inc.py"));
    }

    #[test]
    fn test_default_output_appends_to_base() {
        let unit = CompilationUnit::new("a.tar.dpy");
        assert_eq!(unit.default_output("py"), PathBuf::from("a.tar.py"));

        let bare = CompilationUnit::new("ring");
        assert_eq!(bare.default_output("py"), PathBuf::from("ring.py"));
    }

    #[test]
    fn test_explicit_output_wins() {
        let unit = CompilationUnit::new("foo.dpy");
        assert_eq!(
            unit.output_or_default(Some(Path::new("out/custom.py")), "py"),
            PathBuf::from("out/custom.py")
        );
        assert_eq!(unit.output_or_default(None, "py"), PathBuf::from("foo.py"));
    }

    fn locate_at_lowest_level(path: &str) -> (CompilationUnit, Vec<String>) {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Error);
        let unit = logging::with_logger(service, || CompilationUnit::locate(path));
        (unit, memory.events().into_iter().map(|e| e.message).collect())
    }

    #[test]
    fn test_locate_host_source_is_skipped() {
        let (unit, messages) = locate_at_lowest_level("generated.py");
        assert!(!unit.should_compile());
        assert_eq!(messages, vec!["skipping '.py' file generated.py"]);
    }

    #[test]
    fn test_locate_warns_on_unknown_suffix_at_lowest_level() {
        let (unit, messages) = locate_at_lowest_level("ping.txt");
        assert!(unit.should_compile());
        assert_eq!(messages, vec!["unknown suffix 'txt' in filename 'ping.txt'"]);

        let (_, messages) = locate_at_lowest_level("ping.dpy");
        assert!(messages.is_empty());
    }
}
