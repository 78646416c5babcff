//! Write-once logging settings
//!
//! The debug level and runtime preferences are installed by the driver before
//! any pipeline runs; everything else only reads them.

use crate::config::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE, MAX_LOG_MESSAGE_LENGTH,
};
use crate::config::debug::DebugLevel;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static DEBUG_LEVEL: OnceLock<DebugLevel> = OnceLock::new();
static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Fails if a level was already installed.
pub fn install_debug_level(level: DebugLevel) -> Result<(), String> {
    DEBUG_LEVEL
        .set(level)
        .map_err(|existing| format!("Debug level already installed ({})", existing))
}

pub fn install_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Logging preferences already installed".to_string())
}

/// Installed level, or the built-in default before installation
pub fn current_debug_level() -> DebugLevel {
    DEBUG_LEVEL.get().copied().unwrap_or_default()
}

fn preferences() -> LoggingPreferences {
    PREFERENCES.get().cloned().unwrap_or_default()
}

/// Least important level that still reaches the logger
pub fn get_min_log_level() -> LogLevel {
    current_debug_level().to_log_level()
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

pub fn use_cargo_style_output() -> bool {
    preferences().enable_cargo_style_output
}

pub fn include_file_context() -> bool {
    preferences().include_file_context
}

/// Longest prefix of `message` that fits the configured length, cut on a
/// char boundary
pub fn clamp_message(message: &str) -> &str {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message;
    }
    let end = (0..=MAX_LOG_MESSAGE_LENGTH)
        .rev()
        .find(|&i| message.is_char_boundary(i))
        .unwrap_or(0);
    &message[..end]
}

/// Sanity check of the compiled-in limits
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!(
            "log buffer size {} outside 100..=100000",
            LOG_BUFFER_SIZE
        ));
    }
    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err(format!(
            "per-unit event limit {} exceeds buffer size {}",
            MAX_LOG_EVENTS_PER_FILE, LOG_BUFFER_SIZE
        ));
    }
    if MAX_LOG_MESSAGE_LENGTH == 0 {
        return Err("message length limit must be positive".to_string());
    }
    Ok(())
}

/// `key=value` pairs describing the active settings, for debug output
pub fn describe() -> Vec<(&'static str, String)> {
    let preferences = preferences();
    vec![
        ("debug_level", current_debug_level().to_string()),
        ("structured", preferences.use_structured_logging.to_string()),
        ("summary", preferences.enable_cargo_style_output.to_string()),
        ("unit_context", preferences.include_file_context.to_string()),
        ("events_per_unit", MAX_LOG_EVENTS_PER_FILE.to_string()),
        ("profile", crate::config::build_info::profile_path()),
    ]
}
