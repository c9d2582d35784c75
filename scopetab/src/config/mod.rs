//! Configuration module for scopetab
//! Compile-time limits are generated from TOML by build.rs; user preferences live in `runtime`.

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("SCOPETAB_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("SCOPETAB_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

/// Human-readable listing of the active compile-time limits
pub fn limits_report() -> String {
    use compile_time::{layout, logging, table, trace};

    let mut report = String::new();
    report.push_str(&format!("Source: {}\n", build_info::source_info()));
    report.push_str(&format!("Max scope depth: {}\n", table::MAX_SCOPE_DEPTH));
    report.push_str(&format!(
        "Max entries per scope: {}\n",
        table::MAX_ENTRIES_PER_SCOPE
    ));
    report.push_str(&format!(
        "Max identifier length: {}\n",
        table::MAX_IDENTIFIER_LENGTH
    ));
    report.push_str(&format!("First label: {}\n", table::FIRST_LABEL));
    report.push_str(&format!(
        "Layout: base {}, int {}, boolean {}, char {}\n",
        layout::DEFAULT_BASE_OFFSET,
        layout::INT_UNIT_SIZE,
        layout::BOOLEAN_UNIT_SIZE,
        layout::CHAR_UNIT_SIZE
    ));
    report.push_str(&format!(
        "Trace: max {} bytes, max {} steps\n",
        trace::MAX_TRACE_FILE_SIZE,
        trace::MAX_TRACE_STEPS
    ));
    report.push_str(&format!(
        "Logging: buffer {}, per-file {}",
        logging::LOG_BUFFER_SIZE,
        logging::MAX_LOG_EVENTS_PER_FILE
    ));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_report_lists_every_section() {
        let report = limits_report();
        assert!(report.contains("Max scope depth"));
        assert!(report.contains("Layout:"));
        assert!(report.contains("Trace:"));
        assert!(report.contains("Logging:"));
    }

    #[test]
    fn test_compile_time_constants_are_sane() {
        assert!(compile_time::table::MAX_SCOPE_DEPTH > 0);
        assert!(compile_time::table::MAX_ENTRIES_PER_SCOPE > 0);
        assert!(compile_time::layout::INT_UNIT_SIZE > 0);
        assert!(
            compile_time::logging::MAX_LOG_EVENTS_PER_FILE
                <= compile_time::logging::LOG_BUFFER_SIZE
        );
    }
}
