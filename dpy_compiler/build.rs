// Turns config/<profile>.toml into the `compile_time` constants module
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    debug: DebugLimits,
    host_runtime: HostRuntimeWindow,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct DebugLimits {
    min_level: u8,
    max_level: u8,
    default_level: u8,
}

#[derive(serde::Deserialize)]
struct HostRuntimeWindow {
    /// Oldest supported host runtime, inclusive: [major, minor]
    min_version: [u32; 2],
    /// First unsupported host runtime, exclusive: [major, minor]
    max_version: [u32; 2],
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_events_per_file: usize,
    max_log_message_length: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DPY_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=DPY_CONFIG_DIR");

    let profile = env::var("DPY_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("DPY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Profiles live next to the workspace manifest, one level above this crate
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let workspace_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));
    println!("cargo:rerun-if-changed={}", config_path.display());

    let text = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "cannot read build profile {} ({}); set DPY_BUILD_PROFILE or DPY_CONFIG_DIR",
            config_path.display(),
            e
        )
    });
    let config: CompileTimeConfig = toml::from_str(&text)
        .unwrap_or_else(|e| panic!("invalid TOML in {}: {}", config_path.display(), e));

    let violations = check_constraints(&config, &profile);
    if !violations.is_empty() {
        panic!(
            "build profile {} rejected:\n  - {}",
            config_path.display(),
            violations.join("\n  - ")
        );
    }
    generate_constants(&config, &profile);
}

/// Every broken constraint, so one build run reports them all
fn check_constraints(config: &CompileTimeConfig, profile: &str) -> Vec<&'static str> {
    let debug = &config.debug;
    let runtime = &config.host_runtime;
    let logging = &config.logging;
    let limits = &config.file_processing;

    [
        (limits.max_file_size > 1_000_000_000, "file_processing.max_file_size above 1 GB"),
        (limits.max_line_count == 0, "file_processing.max_line_count must be positive"),
        (debug.min_level > debug.max_level, "debug.min_level above debug.max_level"),
        (
            !(debug.min_level..=debug.max_level).contains(&debug.default_level),
            "debug.default_level outside [min_level, max_level]",
        ),
        (debug.max_level > 3, "debug.max_level above 3"),
        (
            runtime.min_version >= runtime.max_version,
            "host_runtime.min_version not below host_runtime.max_version",
        ),
        (
            logging.max_log_events_per_file > logging.log_buffer_size,
            "logging.max_log_events_per_file above logging.log_buffer_size",
        ),
        (
            profile == "production" && limits.max_file_size > 50_000_000,
            "production profile allows files above 50 MB",
        ),
    ]
    .into_iter()
    .filter_map(|(broken, message)| broken.then_some(message))
    .collect()
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let output_path = Path::new(&env::var("OUT_DIR").unwrap()).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated by build.rs from the `{}` build profile

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const MAX_LINE_COUNT: usize = {};
    }}

    pub mod debug {{
        pub const MIN_DEBUG_LEVEL: u8 = {};
        pub const MAX_DEBUG_LEVEL: u8 = {};
        pub const DEFAULT_DEBUG_LEVEL: u8 = {};
    }}

    pub mod host_runtime {{
        pub const MIN_VERSION: (u32, u32) = ({}, {});
        pub const MAX_VERSION: (u32, u32) = ({}, {});
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
    }}
}}
"#,
        profile,
        config.file_processing.max_file_size,
        config.file_processing.max_line_count,
        config.debug.min_level,
        config.debug.max_level,
        config.debug.default_level,
        config.host_runtime.min_version[0],
        config.host_runtime.min_version[1],
        config.host_runtime.max_version[0],
        config.host_runtime.max_version[1],
        config.logging.log_buffer_size,
        config.logging.max_log_events_per_file,
        config.logging.max_log_message_length,
    );

    fs::write(&output_path, constants_code)
        .unwrap_or_else(|e| panic!("cannot write {}: {}", output_path.display(), e));
}
