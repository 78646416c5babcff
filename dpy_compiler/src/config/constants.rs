//! Naming conventions shared by the locator and the pipelines.

/// Suffix of DistPy source files.
pub const DOMAIN_SUFFIX: &str = "dpy";

/// Suffix of generated host-language (Python) modules.
pub const HOST_SUFFIX: &str = "py";

/// Suffix of generated pseudocode files.
pub const PSEUDO_SUFFIX: &str = "da";

/// Tag appended to the base name of the incrementalizer interface module.
pub const INTERFACE_MODULE_TAG: &str = "_inc";

/// Module name of the interface generated for the module `stem`.
pub fn interface_module_name(stem: &str) -> String {
    format!("{}{}", stem, INTERFACE_MODULE_TAG)
}

/// Base class that marks a class declaration as a DistPy process.
pub const PROCESS_BASE_CLASS: &str = "DistProcess";

/// Prefix that marks a process method as a message handler.
pub const HANDLER_PREFIX: &str = "On";
