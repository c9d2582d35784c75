//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for every code the crate emits together with its
//! behavioral metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Declaration trace loading error codes
pub mod trace {
    use super::Code;

    pub const TRACE_NOT_FOUND: Code = Code::new("E005");
    pub const TRACE_TOO_LARGE: Code = Code::new("E007");
    pub const TRACE_IO_ERROR: Code = Code::new("E011");
    pub const TRACE_PARSE_ERROR: Code = Code::new("E012");
    pub const INVALID_TRACE_STEP: Code = Code::new("E013");
    pub const TOO_MANY_STEPS: Code = Code::new("E014");
}

/// Symbol table error codes
pub mod table {
    use super::Code;

    pub const DUPLICATE_NAME: Code = Code::new("E090");
    pub const UNKNOWN_NAME: Code = Code::new("E091");
    pub const EMPTY_SCOPE_STACK: Code = Code::new("E092");
    pub const INVALID_SCOPE_OWNER: Code = Code::new("E093");
    pub const LIMIT_EXCEEDED: Code = Code::new("E094");
    pub const INVALID_BOUNDS: Code = Code::new("E095");
}

/// Frame layout error codes
pub mod layout {
    use super::Code;

    pub const INCOMPLETE_ENTRY: Code = Code::new("E120");
    pub const LAYOUT_OVERFLOW: Code = Code::new("E121");
}

/// Analyzer diagnostic codes
pub mod analysis {
    use super::Code;

    pub const UNDECLARED_IDENTIFIER: Code = Code::new("E110");
    pub const SHADOWED_DECLARATION: Code = Code::new("W110");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TRACE_LOADED: Code = Code::new("I006");
    pub const SCOPE_FINALIZED: Code = Code::new("I050");
    pub const PROGRAM_FINALIZED: Code = Code::new("I051");
    pub const REPLAY_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

type RegistryRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    &'static str,
    &'static str,
);

// (code, category, severity, requires_halt, description, action)
const REGISTRY_ROWS: &[RegistryRow] = &[
    (
        "ERR001",
        "System",
        Severity::Critical,
        true,
        "Critical internal system error",
        "File a bug report with the failing trace",
    ),
    (
        "ERR002",
        "System",
        Severity::Critical,
        true,
        "System initialization failure",
        "Check configuration and environment variables",
    ),
    (
        "E005",
        "Trace",
        Severity::Medium,
        true,
        "Declaration trace file not found",
        "Check the trace path",
    ),
    (
        "E007",
        "Trace",
        Severity::Medium,
        true,
        "Declaration trace exceeds maximum size",
        "Split the trace or raise max_trace_file_size",
    ),
    (
        "E011",
        "Trace",
        Severity::Medium,
        true,
        "I/O error while reading declaration trace",
        "Check file permissions and disk state",
    ),
    (
        "E012",
        "Trace",
        Severity::Medium,
        true,
        "Declaration trace is not valid TOML",
        "Fix the TOML syntax reported in the message",
    ),
    (
        "E013",
        "Trace",
        Severity::Medium,
        true,
        "Declaration trace step is malformed",
        "Supply the fields required by the step kind",
    ),
    (
        "E014",
        "Trace",
        Severity::Medium,
        true,
        "Declaration trace has too many steps",
        "Split the trace or raise max_trace_steps",
    ),
    (
        "E090",
        "SymbolTable",
        Severity::Medium,
        false,
        "Identifier redeclared in the same scope",
        "Rename one of the declarations",
    ),
    (
        "E091",
        "SymbolTable",
        Severity::Medium,
        false,
        "Identifier not present in the targeted scope",
        "Declare the identifier before updating it",
    ),
    (
        "E092",
        "SymbolTable",
        Severity::High,
        true,
        "No poppable scope on the scope stack",
        "Balance scope entry and exit; close the program scope with finish",
    ),
    (
        "E093",
        "SymbolTable",
        Severity::High,
        false,
        "Scope owner is missing or not a procedure or program",
        "Declare the procedure before entering its scope",
    ),
    (
        "E094",
        "SymbolTable",
        Severity::High,
        true,
        "Compile-time symbol table limit exceeded",
        "Reduce nesting or declarations, or rebuild with a larger profile",
    ),
    (
        "E095",
        "SymbolTable",
        Severity::Medium,
        false,
        "Array start index exceeds end index",
        "Swap or correct the array bounds",
    ),
    (
        "E110",
        "Analysis",
        Severity::Medium,
        false,
        "Reference to an undeclared identifier",
        "Declare the identifier in this or an enclosing scope",
    ),
    (
        "W110",
        "Analysis",
        Severity::Low,
        false,
        "Declaration hides one in an enclosing scope",
        "Rename the inner declaration if the hiding is unintended",
    ),
    (
        "E120",
        "Layout",
        Severity::High,
        false,
        "Entry lacks the size information needed for frame layout",
        "Give arrays resolved bounds and a scalar base type",
    ),
    (
        "E121",
        "Layout",
        Severity::High,
        true,
        "Frame offset arithmetic overflowed",
        "Reduce array sizes or unit sizes",
    ),
    (
        "I004",
        "System",
        Severity::Low,
        false,
        "System initialization completed",
        "Continue",
    ),
    (
        "I006",
        "Trace",
        Severity::Low,
        false,
        "Declaration trace loaded",
        "Continue to replay",
    ),
    (
        "I050",
        "Layout",
        Severity::Low,
        false,
        "Scope closed and frame laid out",
        "Continue",
    ),
    (
        "I051",
        "Layout",
        Severity::Low,
        false,
        "Program scope closed and frame laid out",
        "Continue",
    ),
    (
        "I060",
        "Trace",
        Severity::Low,
        false,
        "Declaration trace replay completed",
        "Review the reported scopes",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ROWS
            .iter()
            .map(
                |&(code, category, severity, requires_halt, description, action)| {
                    (
                        code,
                        ErrorMetadata {
                            code,
                            category,
                            severity,
                            requires_halt,
                            description,
                            recommended_action: action,
                        },
                    )
                },
            )
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Severity of `code`; unregistered codes count as medium
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code).is_some_and(|metadata| metadata.requires_halt)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
