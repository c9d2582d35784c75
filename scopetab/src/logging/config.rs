//! Logging preferences installed at startup

use crate::config::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE};
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install the process-wide preferences. Fails on a second call.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn preferences() -> LoggingPreferences {
    PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> LogLevel {
    preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    preferences().enable_console_logging
}

/// Checks the compiled collector limits against each other
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!(
            "Log buffer size {} outside 100..=100000",
            LOG_BUFFER_SIZE
        ));
    }
    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err(format!(
            "Per-trace event cap {} exceeds buffer size {}",
            MAX_LOG_EVENTS_PER_FILE, LOG_BUFFER_SIZE
        ));
    }
    Ok(())
}
