//! Declaration analysis over the scoped symbol table

pub mod analyzer;
pub mod types;

pub use analyzer::ScopeAnalyzer;
pub use types::{
    AnalysisReport, Declaration, Diagnostic, DiagnosticSeverity, Resolution,
};
