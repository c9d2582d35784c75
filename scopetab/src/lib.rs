// Internal modules
pub mod analysis;
pub mod config;
#[macro_use]
pub mod logging;
pub mod symbols;
pub mod trace;
pub mod utils;

// Re-export key types for library consumers
pub use analysis::{AnalysisReport, Declaration, Diagnostic, ScopeAnalyzer};
pub use symbols::{
    ArrayBounds, Category, Entry, FinalizedScope, FrameLayout, Label, LayoutPolicy, SymbolResult,
    SymbolTable, SymbolTableError,
};
pub use trace::{ReplayReport, TraceError};
