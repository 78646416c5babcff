// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Read a boolean preference from the environment, falling back to `default`
fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of human-readable console output
    pub use_structured_logging: bool,

    /// Tag every event with the compilation unit being processed
    pub include_file_context: bool,

    /// Print the cargo-style error summary after a failed unit
    pub enable_cargo_style_output: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag("DPY_LOG_STRUCTURED", false),
            include_file_context: env_flag("DPY_LOG_FILE_CONTEXT", true),
            enable_cargo_style_output: env_flag("DPY_LOG_CARGO_STYLE", true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputPreferences {
    /// Stage artifacts in temp files and rename them into place
    pub atomic_writes: bool,

    /// Exit with status 1 when the unit produced no artifact
    pub strict_exit: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            atomic_writes: env_flag("DPY_ATOMIC_WRITES", true),
            strict_exit: env_flag("DPY_STRICT_EXIT", false),
        }
    }
}

/// Version of the host runtime the generated modules target, `major.minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostRuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl HostRuntimeVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Version requested through `DPY_HOST_RUNTIME`, defaulting to 3.4
    pub fn from_env() -> Result<Self, String> {
        match env::var("DPY_HOST_RUNTIME") {
            Ok(raw) => raw.parse(),
            Err(_) => Ok(Self::new(3, 4)),
        }
    }

    pub fn as_tuple(&self) -> (u32, u32) {
        (self.major, self.minor)
    }
}

impl FromStr for HostRuntimeVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| format!("Invalid host runtime version '{}'", s))?;
        let minor = match parts.next() {
            Some(p) => p
                .parse()
                .map_err(|_| format!("Invalid host runtime version '{}'", s))?,
            None => 0,
        };
        Ok(Self::new(major, minor))
    }
}

impl fmt::Display for HostRuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_runtime_version_parsing() {
        assert_eq!("3.4".parse::<HostRuntimeVersion>(), Ok(HostRuntimeVersion::new(3, 4)));
        assert_eq!("3.4.2".parse::<HostRuntimeVersion>(), Ok(HostRuntimeVersion::new(3, 4)));
        assert_eq!("3".parse::<HostRuntimeVersion>(), Ok(HostRuntimeVersion::new(3, 0)));
        assert!("three".parse::<HostRuntimeVersion>().is_err());
        assert!("3.x".parse::<HostRuntimeVersion>().is_err());
    }

    #[test]
    fn test_host_runtime_version_ordering() {
        assert!(HostRuntimeVersion::new(3, 3) < HostRuntimeVersion::new(3, 5));
        assert!(HostRuntimeVersion::new(2, 7) < HostRuntimeVersion::new(3, 0));
        assert_eq!(HostRuntimeVersion::new(3, 4).to_string(), "3.4");
    }
}
