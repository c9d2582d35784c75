//! Size-limited loading of declaration traces

use super::error::{TraceError, TraceResult};
use super::format::DeclarationTrace;
use crate::config::compile_time::trace::{MAX_TRACE_FILE_SIZE, MAX_TRACE_STEPS};
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::Path;

/// Parse and validate trace text
pub fn parse_trace(text: &str) -> TraceResult<DeclarationTrace> {
    let trace: DeclarationTrace = match toml::from_str(text) {
        Ok(trace) => trace,
        Err(e) => {
            let error = TraceError::from(e);
            log_error!(error.error_code(), "Trace is not valid TOML",
                "detail" => error.to_string());
            return Err(error);
        }
    };

    if trace.steps.len() > MAX_TRACE_STEPS {
        let error = TraceError::TooManySteps {
            count: trace.steps.len(),
            max_steps: MAX_TRACE_STEPS,
        };
        log_error!(error.error_code(), "Trace exceeds the step limit",
            "steps" => trace.steps.len(),
            "max_steps" => MAX_TRACE_STEPS);
        return Err(error);
    }

    if let Err(error) = trace.validate() {
        log_error!(error.error_code(), "Trace contains an invalid step",
            "detail" => error.to_string());
        return Err(error);
    }

    Ok(trace)
}

/// Read a trace file, enforcing the compile-time size limit before reading
pub fn load_trace(path: &Path) -> TraceResult<DeclarationTrace> {
    let display = path.display().to_string();
    log_debug!("Loading trace", "path" => display);

    if !path.is_file() {
        let error = TraceError::FileNotFound {
            path: display.clone(),
        };
        log_error!(error.error_code(), "Trace file not found", "path" => display);
        return Err(error);
    }

    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return Err(io_error(&display, &e)),
    };

    if size > MAX_TRACE_FILE_SIZE {
        let error = TraceError::FileTooLarge {
            size,
            max_size: MAX_TRACE_FILE_SIZE,
        };
        log_error!(error.error_code(), "Trace file exceeds size limit",
            "path" => display,
            "size_bytes" => size,
            "max_size_bytes" => MAX_TRACE_FILE_SIZE);
        return Err(error);
    }

    let text = fs::read_to_string(path).map_err(|e| io_error(&display, &e))?;
    let trace = parse_trace(&text)?;

    log_success!(codes::success::TRACE_LOADED, "Trace loaded",
        "path" => display,
        "name" => trace.display_name(),
        "steps" => trace.steps.len(),
        "size_bytes" => size);

    Ok(trace)
}

fn io_error(path: &str, e: &std::io::Error) -> TraceError {
    let error = TraceError::IoError {
        path: path.to_string(),
        message: e.to_string(),
    };
    log_error!(error.error_code(), "Failed to read trace file",
        "path" => path,
        "io_error" => e);
    error
}
