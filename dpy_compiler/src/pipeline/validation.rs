use crate::config::compile_time::host_runtime::{MAX_VERSION, MIN_VERSION};
use crate::config::runtime::HostRuntimeVersion;
use crate::logging::codes;

/// Check the targeted host runtime against the supported window `[MIN, MAX)`.
///
/// The error is the operator message to print before exiting.
pub fn check_host_runtime(version: HostRuntimeVersion) -> Result<(), String> {
    let min = HostRuntimeVersion::new(MIN_VERSION.0, MIN_VERSION.1);
    let max = HostRuntimeVersion::new(MAX_VERSION.0, MAX_VERSION.1);

    if version < min {
        Err(format!("DistPy requires Python version {} or newer.", min))
    } else if version >= max {
        Err(format!("Python {} not yet supported.", version))
    } else {
        Ok(())
    }
}

/// Validate that the pipeline is properly configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    let required = [
        codes::frontend::UNIT_REJECTED,
        codes::generation::MISSING_MAIN,
        codes::generation::HOST_GENERATION_FAILED,
        codes::generation::INCREMENTAL_GENERATION_FAILED,
        codes::output::WRITE_FAILED,
        codes::output::COMMIT_FAILED,
    ];
    for code in required {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for pipeline code {}", code.as_str()));
        }
    }

    crate::log_debug!("Pipeline validation succeeded",
        "codes_checked" => required.len(),
        "host_runtime_min" => format!("{}.{}", MIN_VERSION.0, MIN_VERSION.1),
        "host_runtime_max" => format!("{}.{}", MAX_VERSION.0, MAX_VERSION.1)
    );

    Ok(())
}
