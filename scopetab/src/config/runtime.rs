// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::layout::{
    BOOLEAN_UNIT_SIZE, CHAR_UNIT_SIZE, DEFAULT_BASE_OFFSET, INT_UNIT_SIZE,
};
use serde::{Deserialize, Serialize};
use std::env;

/// Frame layout policy knobs; defaults come from the compile-time profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutPreferences {
    /// Offset assigned to the first entry of every frame
    pub base_offset: i64,

    /// Storage units consumed by an Int (also the Int array element size)
    pub int_unit_size: i64,

    /// Storage units consumed by a Boolean
    pub boolean_unit_size: i64,

    /// Storage units consumed by a Char
    pub char_unit_size: i64,
}

impl Default for LayoutPreferences {
    fn default() -> Self {
        Self {
            base_offset: env::var(env_vars::LAYOUT_BASE_OFFSET)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_BASE_OFFSET),
            int_unit_size: env::var(env_vars::LAYOUT_INT_UNIT_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &i64| *size > 0)
                .unwrap_or(INT_UNIT_SIZE),
            boolean_unit_size: env::var(env_vars::LAYOUT_BOOLEAN_UNIT_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &i64| *size > 0)
                .unwrap_or(BOOLEAN_UNIT_SIZE),
            char_unit_size: env::var(env_vars::LAYOUT_CHAR_UNIT_SIZE)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size: &i64| *size > 0)
                .unwrap_or(CHAR_UNIT_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisPreferences {
    /// Whether to warn when a declaration hides one in an enclosing scope
    pub warn_on_shadowing: bool,

    /// Whether to emit debug events on scope entry and exit
    pub log_scope_transitions: bool,

    /// Whether a trace replay stops at the first error diagnostic
    pub stop_on_first_error: bool,
}

impl Default for AnalysisPreferences {
    fn default() -> Self {
        Self {
            warn_on_shadowing: env::var(env_vars::ANALYSIS_WARN_ON_SHADOWING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_scope_transitions: env::var(env_vars::ANALYSIS_LOG_SCOPE_TRANSITIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            stop_on_first_error: env::var(env_vars::ANALYSIS_STOP_ON_FIRST_ERROR)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub layout: LayoutPreferences,
    pub analysis: AnalysisPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Layout
    pub const LAYOUT_BASE_OFFSET: &str = "SCOPETAB_LAYOUT_BASE_OFFSET";
    pub const LAYOUT_INT_UNIT_SIZE: &str = "SCOPETAB_LAYOUT_INT_UNIT_SIZE";
    pub const LAYOUT_BOOLEAN_UNIT_SIZE: &str = "SCOPETAB_LAYOUT_BOOLEAN_UNIT_SIZE";
    pub const LAYOUT_CHAR_UNIT_SIZE: &str = "SCOPETAB_LAYOUT_CHAR_UNIT_SIZE";

    // Analysis
    pub const ANALYSIS_WARN_ON_SHADOWING: &str = "SCOPETAB_ANALYSIS_WARN_ON_SHADOWING";
    pub const ANALYSIS_LOG_SCOPE_TRANSITIONS: &str = "SCOPETAB_ANALYSIS_LOG_SCOPE_TRANSITIONS";
    pub const ANALYSIS_STOP_ON_FIRST_ERROR: &str = "SCOPETAB_ANALYSIS_STOP_ON_FIRST_ERROR";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SCOPETAB_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SCOPETAB_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SCOPETAB_LOGGING_MIN_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("WARN"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_layout_defaults_have_positive_units() {
        let prefs = LayoutPreferences::default();
        assert!(prefs.int_unit_size > 0);
        assert!(prefs.boolean_unit_size > 0);
        assert!(prefs.char_unit_size > 0);
    }

    #[test]
    fn test_runtime_config_round_trips_through_toml() {
        let config = RuntimeConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: RuntimeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.layout, config.layout);
    }
}
