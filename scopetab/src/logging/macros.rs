//! Logging macros taking `Code` values and `"key" => value` context pairs
//!
//! Context values may be any `Display` type.

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::error($code, $message)
                .with_span($span)
                $(.with_context($key, &format!("{}", $value)))*
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::error($code, $message)
                $(.with_context($key, &format!("{}", $value)))*
        )
    };
}

/// Warnings always carry a code so they can be classified and collected
#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::warning_with_code($code, $message)
                .with_span($span)
                $(.with_context($key, &format!("{}", $value)))*
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::warning_with_code($code, $message)
                $(.with_context($key, &format!("{}", $value)))*
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(
            $crate::logging::LogEvent::success($code, $message)
                $(.with_context($key, &format!("{}", $value)))*
        )
    };
}

/// Skips formatting entirely unless the configured level admits debug events
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)*) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::emit(
                $crate::logging::LogEvent::debug($message)
                    $(.with_context($key, &format!("{}", $value)))*
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;
    use crate::utils::Span;

    #[test]
    fn test_macros_accept_display_context() {
        let depth = 3usize;
        log_error!(codes::table::LIMIT_EXCEEDED, "Too deep", "depth" => depth, "limit" => 2);
        log_error!(
            codes::analysis::UNDECLARED_IDENTIFIER,
            "Undeclared 'z'",
            span = Span::identifier(1, 1, 1)
        );
        log_warning!(
            codes::analysis::SHADOWED_DECLARATION,
            "Shadowed 'x'",
            span = Span::dummy(),
            "outer_level" => 0
        );
        log_success!(codes::success::SCOPE_FINALIZED, "Closed", "frame_size" => 12i64);
        log_debug!("Entered scope", "level" => 1);
        log_debug!("Left scope");
    }
}
