//! Compiler configuration
//!
//! Limits fixed at build time come from the TOML profile via `build.rs`;
//! preferences read at startup live in [`runtime`].

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod constants;
pub mod debug;
pub mod runtime;

pub use debug::{resolve_debug_level, DebugLevel, DebugLevelError, DebugResolution};
pub use runtime::{HostRuntimeVersion, LoggingPreferences, OutputPreferences};

/// Which build profile produced [`compile_time`]
pub mod build_info {
    pub fn profile() -> &'static str {
        option_env!("DPY_BUILD_PROFILE").unwrap_or("development")
    }

    /// `config/development.toml` unless overridden at build time
    pub fn profile_path() -> String {
        let dir = option_env!("DPY_CONFIG_DIR").unwrap_or("config");
        format!("{}/{}.toml", dir, profile())
    }
}
