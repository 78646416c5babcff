//! Log events raised while compiling a unit

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Log severity levels, ordered from most to least important
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

const GENERIC_WARNING: Code = Code::new("W000");
const GENERIC_INFO: Code = Code::new("I000");
const GENERIC_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Compilation unit the event was raised for
    pub unit: Option<PathBuf>,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
    /// Operator report that bypasses the debug-level filter
    pub always: bool,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            unit: None,
            span: None,
            context: BTreeMap::new(),
            always: false,
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    /// Warning without a specific code
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Operator-facing progress report (`I0xx` codes), shown at every debug level
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message).always()
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn always(mut self) -> Self {
        self.always = true;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_unit(mut self, unit: PathBuf) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> Option<&'static str> {
        codes::get_action(self.code.as_str())
    }

    /// `unit:line:column`, or whichever part is known
    pub fn location(&self) -> Option<String> {
        match (&self.unit, &self.span) {
            (Some(unit), Some(span)) => Some(format!("{}:{}", unit.display(), span)),
            (Some(unit), None) => Some(unit.display().to_string()),
            (None, Some(span)) => Some(span.to_string()),
            (None, None) => None,
        }
    }

    /// Compiler-style line for the operator channel.
    ///
    /// Info events are progress reports and print as their bare message.
    pub fn render(&self, message: &str) -> String {
        let head = match self.level {
            LogLevel::Info => return message.to_string(),
            LogLevel::Debug => format!("debug: {}", message),
            level => format!("{}[{}]: {}", level.as_str(), self.code, message),
        };
        match (self.level, self.span, self.location()) {
            (LogLevel::Error | LogLevel::Warning, Some(_), Some(location)) => {
                format!("{}\n  --> {}", head, location)
            }
            _ => head,
        }
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
        });

        if let Some(unit) = &self.unit {
            json["unit"] = serde_json::Value::String(unit.display().to_string());
        }

        if self.is_error() || self.is_warning() {
            json["category"] = self.category().into();
            json["severity"] = self.severity().into();
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_line": span.start.line,
                "start_column": span.start.column,
                "end_line": span.end.line,
                "end_column": span.end.column,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::Value::Object(
                self.context
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
        }

        serde_json::to_string(&json)
    }
}
