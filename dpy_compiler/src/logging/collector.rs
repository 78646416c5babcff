//! Per-unit diagnostic collection and the cargo-style closing report
//!
//! Errors and warnings raised while a unit is in context are kept, grouped by
//! unit path, so the driver can summarize them after the pipeline finishes.

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Unit currently being compiled on this thread
#[derive(Debug, Clone)]
pub struct UnitContext {
    pub path: PathBuf,
    pub started: Instant,
}

impl UnitContext {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Error and warning counts across every unit seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub units: usize,
    pub failed_units: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Default)]
pub struct ErrorCollector {
    by_unit: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.by_unit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the unit known even if it never raises a problem
    pub fn open_unit(&self, path: &Path) {
        self.lock().entry(path.to_path_buf()).or_default();
    }

    /// Keep an event for `path`; past the per-unit cap a single overflow
    /// warning replaces the rest
    pub fn record(&self, path: &Path, event: LogEvent) {
        let mut by_unit = self.lock();
        let events = by_unit.entry(path.to_path_buf()).or_default();
        match events.len() {
            n if n < MAX_LOG_EVENTS_PER_FILE => events.push(event),
            n if n == MAX_LOG_EVENTS_PER_FILE => events.push(LogEvent::warning(&format!(
                "further diagnostics for this unit suppressed (limit {})",
                MAX_LOG_EVENTS_PER_FILE
            ))),
            _ => {}
        }
    }

    pub fn events_for(&self, path: &Path) -> Vec<LogEvent> {
        self.lock().get(path).cloned().unwrap_or_default()
    }

    pub fn errors_for(&self, path: &Path) -> Vec<LogEvent> {
        self.events_for(path)
            .into_iter()
            .filter(LogEvent::is_error)
            .collect()
    }

    pub fn tally(&self) -> Tally {
        let by_unit = self.lock();
        let mut tally = Tally {
            units: by_unit.len(),
            ..Tally::default()
        };
        for events in by_unit.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            tally.errors += errors;
            tally.warnings += events.iter().filter(|e| e.is_warning()).count();
            if errors > 0 {
                tally.failed_units += 1;
            }
        }
        tally
    }

    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.lock().clone()
    }
}

/// The event as the console prints it, placed in `path` when it names no unit
fn render_in(path: &Path, event: &LogEvent) -> String {
    let mut located = event.clone();
    located.unit.get_or_insert_with(|| path.to_path_buf());
    located.render(&located.message)
}

/// Problems of every unit that has any, errors before warnings, then totals.
/// Empty when nothing went wrong.
pub fn format_cargo_style_report(collector: &ErrorCollector) -> String {
    let mut report = String::new();

    for (path, events) in &collector.snapshot() {
        let mut problems: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if problems.is_empty() {
            continue;
        }
        problems.sort_by_key(|e| e.level);

        report.push_str(&format!("Compiling {}\n", path.display()));
        for event in problems {
            report.push_str(&render_in(path, event));
            report.push('\n');
            for (key, value) in &event.context {
                report.push_str(&format!("  = {}: {}\n", key, value));
            }
            if event.is_error() {
                report.push_str(&format!(
                    "  = note: {} [{}, {}]\n",
                    event.description(),
                    event.category(),
                    event.severity()
                ));
                if let Some(action) = event.recommended_action() {
                    report.push_str(&format!("  = help: {}\n", action));
                }
            }
        }
        report.push('\n');
    }

    let tally = collector.tally();
    if tally.errors > 0 {
        report.push_str(&format!("Total errors: {}\n", tally.errors));
    }
    if tally.warnings > 0 {
        report.push_str(&format!("Total warnings: {}\n", tally.warnings));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_events_grouped_by_unit() {
        let collector = ErrorCollector::new();
        let ring = PathBuf::from("ring.dpy");

        collector.record(
            &ring,
            LogEvent::error(codes::frontend::UNBALANCED_BRACKETS, "Unclosed '('"),
        );
        collector.record(
            &ring,
            LogEvent::warning_with_code(codes::frontend::MISSING_SETUP, "process P has no setup"),
        );

        assert_eq!(collector.events_for(&ring).len(), 2);
        assert_eq!(collector.errors_for(&ring).len(), 1);
        assert!(collector.errors_for(Path::new("other.dpy")).is_empty());
    }

    #[test]
    fn test_tally_counts_clean_units() {
        let collector = ErrorCollector::new();
        collector.open_unit(Path::new("a.dpy"));
        collector.open_unit(Path::new("b.dpy"));
        collector.record(
            Path::new("a.dpy"),
            LogEvent::error(codes::generation::MISSING_MAIN, "no main"),
        );

        assert_eq!(
            collector.tally(),
            Tally {
                units: 2,
                failed_units: 1,
                errors: 1,
                warnings: 0,
            }
        );
    }

    #[test]
    fn test_per_unit_cap() {
        let collector = ErrorCollector::new();
        let noisy = PathBuf::from("noisy.dpy");
        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record(&noisy, LogEvent::warning("noise"));
        }

        let events = collector.events_for(&noisy);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events[MAX_LOG_EVENTS_PER_FILE].message.contains("suppressed"));
    }

    #[test]
    fn test_cargo_style_report() {
        let collector = ErrorCollector::new();
        collector.record(
            Path::new("a.dpy"),
            LogEvent::error(codes::output::WRITE_FAILED, "Could not write a.py")
                .with_context("path", "a.py"),
        );

        let report = format_cargo_style_report(&collector);
        assert!(report.starts_with("Compiling a.dpy\n"));
        assert!(report.contains("error[E060]: Could not write a.py\n"));
        assert!(report.contains("  = path: a.py\n"));
        assert!(report.contains("  = note: Output file could not be written [Output, High]\n"));
        assert!(report.contains("  = help: "));
        assert!(report.ends_with("Total errors: 1\n"));
    }

    #[test]
    fn test_clean_run_has_empty_report() {
        let collector = ErrorCollector::new();
        collector.open_unit(Path::new("a.dpy"));
        assert!(format_cargo_style_report(&collector).is_empty());
    }
}
