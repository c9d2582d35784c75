//! Process-wide logging
//!
//! One `LoggingService` and one `ErrorCollector` live in `OnceLock`s. While a
//! trace is replayed its path sits in a thread-local so every event raised on
//! that thread is stamped with it and, for errors and warnings, filed under it
//! for the cargo-style report.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleFormat, ConsoleLogger, Logger, LoggingService};

static SERVICE: OnceLock<LoggingService> = OnceLock::new();
static COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static CURRENT_FILE: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

/// Install the global service and collector from the preferences set with
/// [`config::init_runtime_preferences`]. Fails when called twice.
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Invalid logging limits: {}", e))?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::table::DUPLICATE_NAME,
        codes::layout::INCOMPLETE_ENTRY,
        codes::analysis::UNDECLARED_IDENTIFIER,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("No registry entry for {}", code));
        }
    }

    SERVICE
        .set(LoggingService::with_config())
        .map_err(|_| "Logging already initialized".to_string())?;
    COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "Error collector already initialized".to_string())?;

    emit(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Logging initialized",
    ));
    Ok(())
}

pub fn current_file() -> Option<FileProcessingContext> {
    CURRENT_FILE.with(|current| current.borrow().clone())
}

/// Run `f` with `file_path` as this thread's trace file, restoring the
/// previous one afterwards.
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let context = FileProcessingContext::new(file_path, file_id);
    if let Some(collector) = COLLECTOR.get() {
        collector.record_file_context(&context);
    }

    let previous = CURRENT_FILE.with(|current| current.replace(Some(context)));
    let result = f();
    CURRENT_FILE.with(|current| *current.borrow_mut() = previous);
    result
}

fn stamp(event: LogEvent, file: Option<&FileProcessingContext>) -> LogEvent {
    match file {
        Some(ctx) => event
            .with_context("file", &ctx.file_path.display().to_string())
            .with_context("file_id", &ctx.file_id.to_string()),
        None => event,
    }
}

/// Entry point for the `log_*!` macros
pub fn emit(event: LogEvent) {
    let file = current_file();
    let event = stamp(event, file.as_ref());

    if let (Some(ctx), Some(collector)) = (&file, COLLECTOR.get()) {
        if event.is_error() || event.is_warning() {
            collector.record_event(&ctx.file_path, event.clone());
        }
    }
    if let Some(service) = SERVICE.get() {
        service.log_event(event);
    }
}

pub fn get_processing_summary() -> ProcessingSummary {
    COLLECTOR
        .get()
        .map(ErrorCollector::get_summary)
        .unwrap_or_default()
}

/// Cargo-style listing of everything collected so far
pub fn cargo_style_summary() -> String {
    COLLECTOR
        .get()
        .map(collector::format_cargo_style_errors)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_context_is_scoped() {
        assert!(current_file().is_none());

        let id = with_file_context(PathBuf::from("outer.toml"), 1, || {
            let inner = with_file_context(PathBuf::from("inner.toml"), 2, || {
                current_file().map(|c| c.file_path)
            });
            assert_eq!(inner, Some(PathBuf::from("inner.toml")));
            current_file().map(|c| c.file_id)
        });

        assert_eq!(id, Some(1));
        assert!(current_file().is_none());
    }

    #[test]
    fn test_events_carry_file_context() {
        let ctx = FileProcessingContext::new(PathBuf::from("ctx.toml"), 7);
        let event = stamp(
            LogEvent::error(codes::table::UNKNOWN_NAME, "Unknown 'k'")
                .with_context("scope_level", "0"),
            Some(&ctx),
        );

        assert_eq!(event.context.get("file").map(String::as_str), Some("ctx.toml"));
        assert_eq!(event.context.get("file_id").map(String::as_str), Some("7"));
        assert_eq!(event.context.get("scope_level").map(String::as_str), Some("0"));

        let bare = stamp(LogEvent::debug("no file"), None);
        assert!(bare.context.is_empty());
    }
}
