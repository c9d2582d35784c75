//! Events grouped by trace file, printed cargo-style

use super::codes::Code;
use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The trace file currently being replayed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub traces: usize,
    pub failed_traces: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

#[derive(Default)]
pub struct ErrorCollector {
    by_file: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.by_file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a trace so it counts in the summary even if it stays clean
    pub fn record_file_context(&self, context: &FileProcessingContext) {
        self.files().entry(context.file_path.clone()).or_default();
    }

    /// Appends `event` under `file_path`. Past `MAX_LOG_EVENTS_PER_FILE` one
    /// `W000` overflow warning is kept and the rest are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut files = self.files();
        let events = files.entry(file_path.to_path_buf()).or_default();

        match events.len().cmp(&MAX_LOG_EVENTS_PER_FILE) {
            std::cmp::Ordering::Less => events.push(event),
            std::cmp::Ordering::Equal => {
                let message = format!(
                    "Event limit of {} reached; later events dropped",
                    MAX_LOG_EVENTS_PER_FILE
                );
                events.push(LogEvent::warning_with_code(Code::new("W000"), &message));
            }
            std::cmp::Ordering::Greater => {}
        }
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let files = self.files();
        let mut summary = ProcessingSummary {
            traces: files.len(),
            ..ProcessingSummary::default()
        };

        for events in files.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            if errors > 0 {
                summary.failed_traces += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += events.iter().filter(|e| e.is_warning()).count();
        }
        summary
    }

    fn snapshot(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        self.files().clone()
    }
}

fn push_event(output: &mut String, kind: &str, file_path: &Path, event: &LogEvent) {
    output.push_str(&format!("{}[{}]: {}\n", kind, event.code, event.message));
    if let Some(span) = &event.span {
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            file_path.display(),
            span.start().line,
            span.start().column
        ));
    }

    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            output.push_str(&format!("  = {}: {}\n", key, value));
        }
    }

    if event.is_error() {
        let action = event.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("  = help: {}\n", action));
        }
    }
}

/// Errors then warnings per trace, followed by totals
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.snapshot() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();
        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in errors {
            push_event(&mut output, "error", file_path, event);
        }
        for event in warnings {
            push_event(&mut output, "warning", file_path, event);
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}
