//! Global logging for the DistPy compiler
//!
//! A write-once logging service and error collector, a thread-local unit
//! context that tags events with the unit being compiled, and the macros in
//! [`macros`]. The minimum level follows the installed debug level.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::debug::DebugLevel;
use crate::config::runtime::LoggingPreferences;
use std::cell::RefCell;
use std::path::Path;
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{ErrorCollector, Tally, UnitContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static LOGGER: OnceLock<LoggingService> = OnceLock::new();
static COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static UNIT: RefCell<Option<UnitContext>> = const { RefCell::new(None) };
    static SCOPED_LOGGER: RefCell<Option<LoggingService>> = const { RefCell::new(None) };
}

/// Install the debug level, preferences, logger and collector.
///
/// Runs once per process, before any pipeline.
pub fn init_global_logging(level: DebugLevel, preferences: LoggingPreferences) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("invalid logging configuration: {}", e))?;
    config::install_debug_level(level)?;
    config::install_preferences(preferences)?;

    LOGGER
        .set(LoggingService::with_config())
        .map_err(|_| "global logger already initialized".to_string())?;
    COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "global error collector already initialized".to_string())?;

    emit(LogEvent::debug("Logging initialized"), config::describe());
    Ok(())
}

pub fn global_logger() -> Option<&'static LoggingService> {
    LOGGER.get()
}

pub fn global_collector() -> Option<&'static ErrorCollector> {
    COLLECTOR.get()
}

/// Whether `log_debug!` output can reach the logger
pub fn debug_enabled() -> bool {
    config::get_min_log_level() >= LogLevel::Debug
}

/// Run `f` with `service` receiving this thread's events instead of the
/// global logger
pub fn with_logger<F, R>(service: LoggingService, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = SCOPED_LOGGER.with(|scoped| scoped.replace(Some(service)));
    let result = f();
    SCOPED_LOGGER.with(|scoped| *scoped.borrow_mut() = previous);
    result
}

/// Hand the event to the scoped logger if one is set, else the global one
fn deliver(event: LogEvent) {
    let unhandled = SCOPED_LOGGER.with(|scoped| match scoped.borrow().as_ref() {
        Some(service) => {
            service.log_event(event);
            None
        }
        None => Some(event),
    });
    if let (Some(event), Some(logger)) = (unhandled, global_logger()) {
        logger.log_event(event);
    }
}

pub fn current_unit() -> Option<UnitContext> {
    UNIT.with(|unit| unit.borrow().clone())
}

/// Run `f` with `path` as the current unit; events raised inside are tagged
/// with it and collected for the closing report
pub fn with_unit_context<F, R>(path: &Path, f: F) -> R
where
    F: FnOnce() -> R,
{
    if let Some(collector) = global_collector() {
        collector.open_unit(path);
    }
    let previous = UNIT.with(|unit| unit.replace(Some(UnitContext::new(path.to_path_buf()))));
    let result = f();
    UNIT.with(|unit| *unit.borrow_mut() = previous);
    result
}

/// Attach fields and the current unit, collect problems, then log
pub fn emit(mut event: LogEvent, fields: Vec<(&str, String)>) {
    for (key, value) in &fields {
        event = event.with_context(key, value);
    }

    let unit = current_unit();
    if let Some(unit) = &unit {
        if config::include_file_context() && event.unit.is_none() {
            event = event.with_unit(unit.path.clone());
        }
    }

    if event.is_error() || event.is_warning() {
        if let (Some(unit), Some(collector)) = (&unit, global_collector()) {
            collector.record(&unit.path, event.clone());
        }
    }

    deliver(event);
}

/// Used by `log_error!`
pub fn emit_error(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    fields: Vec<(&str, String)>,
) {
    let event = LogEvent::error(code, message);
    emit(
        match span {
            Some(span) => event.with_span(span),
            None => event,
        },
        fields,
    );
}

/// Used by `log_warning!`
pub fn emit_warning(code: Option<Code>, message: &str, fields: Vec<(&str, String)>) {
    let event = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    emit(event, fields);
}

/// Errors collected so far for `path`
pub fn unit_errors(path: &Path) -> Vec<LogEvent> {
    global_collector()
        .map(|collector| collector.errors_for(path))
        .unwrap_or_default()
}

/// Print the closing report on stderr when it is enabled and non-empty
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = global_collector() {
        let report = collector::format_cargo_style_report(collector);
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}

/// Error reporting that still reaches stderr before initialization
pub fn safe_log_error(code: Code, message: &str) {
    match global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("{}", LogEvent::error(code, message).render(message)),
    }
}

/// Warning reporting that still reaches stderr before initialization.
/// Shown at every debug level.
pub fn safe_log_warning(code: Code, message: &str) {
    let event = LogEvent::warning_with_code(code, message).always();
    match global_logger() {
        Some(logger) => logger.log_event(event),
        None => eprintln!("{}", event.render(message)),
    }
}
