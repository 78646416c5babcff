//! Logging macros
//!
//! Every macro accepts trailing `"key" => value` fields. Values may be any
//! `Display` type and are rendered once, when the event is built.

/// Builds the field list shared by the logging macros.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_fields {
    () => {
        ::std::vec::Vec::<(&str, ::std::string::String)>::new()
    };
    ($($key:expr => $value:expr),+) => {
        ::std::vec![$(($key, ::std::string::ToString::to_string(&$value))),+]
    };
}

/// Log an error; `span = ...` points the diagnostic at a source location
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit_error($code, $message, Some($span), $crate::__log_fields!($($key => $value),*))
    };
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit_error($code, $message, None, $crate::__log_fields!($($key => $value),*))
    };
}

/// Log a warning, optionally under a specific code (`code = ...`).
/// A leading `always,` shows it at every debug level.
#[macro_export]
macro_rules! log_warning {
    (always, code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::warning_with_code($code, $message).always(),
            $crate::__log_fields!($($key => $value),*),
        )
    };
    (code = $code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit_warning(Some($code), $message, $crate::__log_fields!($($key => $value),*))
    };
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit_warning(None, $message, $crate::__log_fields!($($key => $value),*))
    };
}

/// Operator-facing progress report under an `I0xx` code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::success($code, $message),
            $crate::__log_fields!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::info($message),
            $crate::__log_fields!($($key => $value),*),
        )
    };
}

/// Fields are only rendered when debug output is enabled
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::emit(
                $crate::logging::LogEvent::debug($message),
                $crate::__log_fields!($($key => $value),*),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Span;
    use std::path::PathBuf;

    #[test]
    fn test_every_arm_runs_without_a_logger() {
        let path = PathBuf::from("ring.dpy");
        let errcnt: usize = 0;

        log_error!(codes::output::WRITE_FAILED, "Write failed");
        log_error!(codes::frontend::UNBALANCED_BRACKETS, "Unbalanced", span = Span::dummy());
        log_error!(codes::output::WRITE_FAILED, "Write failed", "path" => path.display());
        log_error!(
            codes::frontend::UNBALANCED_BRACKETS,
            "Unbalanced",
            span = Span::dummy(),
            "line" => 1,
        );
        log_success!(codes::success::PARSE_COMPLETE, "Parsed");
        log_success!(codes::success::PARSE_COMPLETE, "Parsed", "errors" => errcnt);
        log_info!("Compiling");
        log_info!("Compiling", "unit" => path.display());
        log_warning!("Plain warning");
        log_warning!(code = codes::source::UNKNOWN_SUFFIX, "Odd suffix", "suffix" => "txt");
        log_warning!(always, code = codes::source::HOST_SOURCE_SKIPPED, "Skipped");
        log_debug!("Details");
        log_debug!("Details", "mode" => "source");
    }

    #[test]
    fn test_fields_render_display_values() {
        let fields = __log_fields!("errors" => 3, "unit" => PathBuf::from("a.dpy").display());
        assert_eq!(
            fields,
            vec![("errors", "3".to_string()), ("unit", "a.dpy".to_string())]
        );
        assert!(__log_fields!().is_empty());
    }
}
