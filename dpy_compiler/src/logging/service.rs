//! Logging service and its sinks
//!
//! All operator-facing output goes to stderr; stdout is never written.

use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for events that passed the level filter
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level filter in front of a single sink
pub struct LoggingService {
    sink: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { sink, min_level }
    }

    /// Sink and level chosen from the installed configuration
    pub fn with_config() -> Self {
        let sink: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger)
        };
        Self::new(sink, config::get_min_log_level())
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Level-filtered, except for events marked `always`
    pub fn log_event(&self, event: LogEvent) {
        if event.always || self.should_log(event.level) {
            self.sink.log(&event);
        }
    }
}

/// Compiler-style lines such as `error[E040]: ...`
pub struct ConsoleLogger;

impl ConsoleLogger {
    fn render(event: &LogEvent) -> String {
        event.render(config::clamp_message(&event.message))
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", Self::render(event));
    }
}

/// One JSON object per line, for tooling
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", ConsoleLogger::render(event)),
        }
    }
}

/// Keeps events in memory so tests can inspect them
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn at_level(&self, level: LogLevel) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        self.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use std::path::PathBuf;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_event(LogEvent::error(codes::output::WRITE_FAILED, "write failed"));
        service.log_event(LogEvent::warning_with_code(codes::source::UNKNOWN_SUFFIX, "odd suffix"));
        service.log_event(LogEvent::success(codes::success::ARTIFACT_WRITTEN, "written"));
        service.log_event(LogEvent::debug("details"));

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.at_level(LogLevel::Error).len(), 1);
        assert_eq!(memory.at_level(LogLevel::Warning).len(), 1);
        assert_eq!(memory.at_level(LogLevel::Info).len(), 1);

        memory.clear();
        assert!(memory.is_empty());
    }

    #[test]
    fn test_debug_level_shows_everything() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Debug);
        assert!(service.should_log(LogLevel::Debug));

        service.log_event(LogEvent::debug("staged"));
        service.log_event(LogEvent::info("compiled"));
        assert_eq!(memory.events().len(), 2);
    }

    #[test]
    fn test_level_zero_keeps_errors_and_operator_reports() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Error);

        service.log_event(LogEvent::warning("w"));
        service.log_event(LogEvent::info("chatter"));
        service.log_event(LogEvent::error(codes::generation::MISSING_MAIN, "e"));
        service.log_event(LogEvent::success(codes::success::ARTIFACT_WRITTEN, "Written compiled file a.py."));
        service.log_event(LogEvent::warning_with_code(codes::source::UNKNOWN_SUFFIX, "odd").always());

        let messages: Vec<String> = memory.events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["e", "Written compiled file a.py.", "odd"]);
        assert_eq!(service.min_level(), LogLevel::Error);
    }

    #[test]
    fn test_console_rendering() {
        let error = LogEvent::error(codes::generation::MISSING_MAIN, "process P has no main method")
            .with_unit(PathBuf::from("ring.dpy"));
        assert_eq!(
            ConsoleLogger::render(&error),
            "error[E040]: process P has no main method"
        );

        let info = LogEvent::success(
            codes::success::PARSE_COMPLETE,
            "a.dpy compiled with 0 errors and 0 warnings.",
        );
        assert_eq!(
            ConsoleLogger::render(&info),
            "a.dpy compiled with 0 errors and 0 warnings."
        );
    }
}
