//! Debug level handling for the `-L` command-line option
//!
//! Resolution is pure: the caller decides when to install the result and how
//! to report the warning, so the decision can be asserted on without capturing
//! log output.

use super::compile_time::debug::{DEFAULT_DEBUG_LEVEL, MAX_DEBUG_LEVEL, MIN_DEBUG_LEVEL};
use crate::logging::{codes, Code, LogLevel};
use std::fmt;

/// Process-wide verbosity, validated against the configured range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DebugLevel(u8);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DebugLevelError {
    #[error("Invalid debugging level {token}.")]
    NotAnInteger { token: String },

    #[error("Invalid debugging level {token}.")]
    OutOfRange { token: String, min: u8, max: u8 },
}

impl DebugLevelError {
    pub fn error_code(&self) -> Code {
        codes::config::INVALID_DEBUG_LEVEL
    }
}

impl DebugLevel {
    /// Validate a numeric level against the recognized range
    pub fn new(level: i64) -> Option<Self> {
        if level >= MIN_DEBUG_LEVEL as i64 && level <= MAX_DEBUG_LEVEL as i64 {
            Some(Self(level as u8))
        } else {
            None
        }
    }

    /// Parse a `-L` token
    pub fn parse(token: &str) -> Result<Self, DebugLevelError> {
        let value: i64 = token
            .trim()
            .parse()
            .map_err(|_| DebugLevelError::NotAnInteger {
                token: token.to_string(),
            })?;

        Self::new(value).ok_or_else(|| DebugLevelError::OutOfRange {
            token: token.to_string(),
            min: MIN_DEBUG_LEVEL,
            max: MAX_DEBUG_LEVEL,
        })
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Map onto the logging layer's minimum level
    pub fn to_log_level(&self) -> LogLevel {
        match self.0 {
            0 => LogLevel::Error,
            1 => LogLevel::Warning,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub fn is_debug(&self) -> bool {
        self.to_log_level() == LogLevel::Debug
    }
}

impl Default for DebugLevel {
    fn default() -> Self {
        Self(DEFAULT_DEBUG_LEVEL)
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of resolving an optional `-L` token against the current level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugResolution {
    pub level: DebugLevel,
    pub warning: Option<DebugLevelError>,
}

/// Resolve the level to install. Invalid tokens keep `current` and carry
/// exactly one warning.
pub fn resolve_debug_level(current: DebugLevel, token: Option<&str>) -> DebugResolution {
    match token.map(DebugLevel::parse) {
        None => DebugResolution {
            level: current,
            warning: None,
        },
        Some(Ok(level)) => DebugResolution {
            level,
            warning: None,
        },
        Some(Err(error)) => DebugResolution {
            level: current,
            warning: Some(error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_valid_levels() {
        for level in MIN_DEBUG_LEVEL..=MAX_DEBUG_LEVEL {
            let parsed = DebugLevel::parse(&level.to_string()).unwrap();
            assert_eq!(parsed.value(), level);
        }
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        assert_matches!(
            DebugLevel::parse("abc"),
            Err(DebugLevelError::NotAnInteger { .. })
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        let too_high = (MAX_DEBUG_LEVEL as i64 + 1).to_string();
        assert_matches!(
            DebugLevel::parse(&too_high),
            Err(DebugLevelError::OutOfRange { .. })
        );
        assert_matches!(
            DebugLevel::parse("-1"),
            Err(DebugLevelError::OutOfRange { .. })
        );
    }

    #[test]
    fn test_invalid_token_keeps_prior_level_with_one_warning() {
        let current = DebugLevel::new(1).unwrap();
        let resolution = resolve_debug_level(current, Some("abc"));

        assert_eq!(resolution.level, current);
        let warning = resolution.warning.expect("one warning expected");
        assert_eq!(warning.to_string(), "Invalid debugging level abc.");
    }

    #[test]
    fn test_valid_token_replaces_level() {
        let resolution = resolve_debug_level(DebugLevel::default(), Some("3"));
        assert_eq!(resolution.level.value(), 3);
        assert!(resolution.warning.is_none());
    }

    #[test]
    fn test_absent_token_keeps_level() {
        let current = DebugLevel::default();
        let resolution = resolve_debug_level(current, None);
        assert_eq!(resolution.level, current);
        assert!(resolution.warning.is_none());
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(DebugLevel::new(0).unwrap().to_log_level(), LogLevel::Error);
        assert_eq!(DebugLevel::new(3).unwrap().to_log_level(), LogLevel::Debug);
        assert!(DebugLevel::new(3).unwrap().is_debug());
    }
}
