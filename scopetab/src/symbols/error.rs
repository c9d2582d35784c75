//! Error types for the scoped symbol table
//!
//! The table has no notion of source text, so none of these carry a span.
//! The analyzer attaches positions when it turns them into diagnostics.

/// Result type for symbol table operations
pub type SymbolResult<T> = Result<T, SymbolTableError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolTableError {
    #[error("Name '{name}' is already declared at scope level {level}")]
    DuplicateName { name: String, level: usize },

    #[error("Name '{name}' is not declared at scope level {level}")]
    UnknownName { name: String, level: usize },

    #[error("Cannot {operation} with {live_scopes} live scope(s)")]
    EmptyStack {
        operation: &'static str,
        live_scopes: usize,
    },

    #[error("Entry '{name}' cannot be laid out: {reason}")]
    IncompleteEntry { name: String, reason: String },

    #[error("Invalid array bounds [{start}..{end}]: start index exceeds end index")]
    InvalidBounds { start: i64, end: i64 },

    #[error("'{name}' cannot own a scope: {reason}")]
    InvalidScopeOwner { name: String, reason: String },

    #[error("{limit} limit exceeded: {value} > {max}")]
    LimitExceeded {
        limit: &'static str,
        value: usize,
        max: usize,
    },

    #[error("Frame offset overflow while laying out '{name}'")]
    LayoutOverflow { name: String },
}

impl SymbolTableError {
    pub fn duplicate_name(name: &str, level: usize) -> Self {
        Self::DuplicateName {
            name: name.to_string(),
            level,
        }
    }

    pub fn unknown_name(name: &str, level: usize) -> Self {
        Self::UnknownName {
            name: name.to_string(),
            level,
        }
    }

    pub fn empty_stack(operation: &'static str, live_scopes: usize) -> Self {
        Self::EmptyStack {
            operation,
            live_scopes,
        }
    }

    pub fn incomplete_entry(name: &str, reason: &str) -> Self {
        Self::IncompleteEntry {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_bounds(start: i64, end: i64) -> Self {
        Self::InvalidBounds { start, end }
    }

    pub fn invalid_scope_owner(name: &str, reason: &str) -> Self {
        Self::InvalidScopeOwner {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// `value` is the size that would result, `max` the configured ceiling
    pub fn limit_exceeded(limit: &'static str, value: usize, max: usize) -> Self {
        Self::LimitExceeded { limit, value, max }
    }

    pub fn layout_overflow(name: &str) -> Self {
        Self::LayoutOverflow {
            name: name.to_string(),
        }
    }

    /// Name the error is about, when there is one
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::DuplicateName { name, .. }
            | Self::UnknownName { name, .. }
            | Self::IncompleteEntry { name, .. }
            | Self::InvalidScopeOwner { name, .. }
            | Self::LayoutOverflow { name } => Some(name),
            Self::EmptyStack { .. } | Self::InvalidBounds { .. } | Self::LimitExceeded { .. } => {
                None
            }
        }
    }

    /// Check if this error requires halting
    pub fn requires_halt(&self) -> bool {
        crate::logging::codes::requires_halt(self.error_code().as_str())
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> crate::logging::codes::Code {
        use crate::logging::codes;
        match self {
            Self::DuplicateName { .. } => codes::table::DUPLICATE_NAME,
            Self::UnknownName { .. } => codes::table::UNKNOWN_NAME,
            Self::EmptyStack { .. } => codes::table::EMPTY_SCOPE_STACK,
            Self::IncompleteEntry { .. } => codes::layout::INCOMPLETE_ENTRY,
            Self::InvalidBounds { .. } => codes::table::INVALID_BOUNDS,
            Self::InvalidScopeOwner { .. } => codes::table::INVALID_SCOPE_OWNER,
            Self::LimitExceeded { .. } => codes::table::LIMIT_EXCEEDED,
            Self::LayoutOverflow { .. } => codes::layout::LAYOUT_OVERFLOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_messages_name_the_identifier() {
        let err = SymbolTableError::duplicate_name("count", 2);
        assert_eq!(
            err.to_string(),
            "Name 'count' is already declared at scope level 2"
        );
        assert_eq!(err.name(), Some("count"));

        let err = SymbolTableError::invalid_bounds(5, 1);
        assert!(err.to_string().contains("[5..1]"));
        assert_eq!(err.name(), None);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SymbolTableError::duplicate_name("x", 0).error_code().as_str(),
            "E090"
        );
        assert_eq!(
            SymbolTableError::incomplete_entry("a", "no bounds")
                .error_code()
                .as_str(),
            "E120"
        );
        assert_matches!(
            SymbolTableError::empty_stack("exit scope", 1),
            SymbolTableError::EmptyStack { live_scopes: 1, .. }
        );
    }

    #[test]
    fn test_halting_classification() {
        assert!(SymbolTableError::empty_stack("exit scope", 1).requires_halt());
        assert!(SymbolTableError::layout_overflow("big").requires_halt());
        assert!(!SymbolTableError::duplicate_name("x", 0).requires_halt());
        assert!(!SymbolTableError::unknown_name("x", 0).requires_halt());
    }
}
