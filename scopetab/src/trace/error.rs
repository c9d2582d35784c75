use crate::logging::codes;

pub type TraceResult<T> = Result<T, TraceError>;

/// Failures loading a declaration trace. Replay itself never fails; problems
/// found while replaying become diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TraceError {
    #[error("Trace file not found: {path}")]
    FileNotFound { path: String },

    #[error("Trace file too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("I/O error reading trace {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Invalid trace TOML: {message}")]
    ParseError { message: String },

    #[error("Invalid trace step {index}: {reason}")]
    InvalidStep { index: usize, reason: String },

    #[error("Trace has too many steps: {count} (max: {max_steps})")]
    TooManySteps { count: usize, max_steps: usize },
}

impl TraceError {
    pub fn invalid_step(index: usize, reason: &str) -> Self {
        Self::InvalidStep {
            index,
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            TraceError::FileNotFound { .. } => codes::trace::TRACE_NOT_FOUND,
            TraceError::FileTooLarge { .. } => codes::trace::TRACE_TOO_LARGE,
            TraceError::IoError { .. } => codes::trace::TRACE_IO_ERROR,
            TraceError::ParseError { .. } => codes::trace::TRACE_PARSE_ERROR,
            TraceError::InvalidStep { .. } => codes::trace::INVALID_TRACE_STEP,
            TraceError::TooManySteps { .. } => codes::trace::TOO_MANY_STEPS,
        }
    }
}

impl From<toml::de::Error> for TraceError {
    fn from(err: toml::de::Error) -> Self {
        TraceError::ParseError {
            message: err.to_string(),
        }
    }
}
