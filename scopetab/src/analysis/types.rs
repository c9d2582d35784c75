//! Declarations, diagnostics and the analysis report

use crate::logging::codes::{self, Code};
use crate::symbols::{
    ArrayBounds, Category, Entry, FinalizedScope, Label, SymbolResult, SymbolTableError,
};
use crate::utils::Span;
use std::fmt;

/// A variable or array declaration as the analyzer receives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Variable {
        name: String,
        category: Category,
    },
    Array {
        name: String,
        base_type: Category,
        /// `None` while the bounds are still unresolved
        bounds: Option<(i64, i64)>,
    },
}

impl Declaration {
    pub fn variable(name: &str, category: Category) -> Self {
        Self::Variable {
            name: name.to_string(),
            category,
        }
    }

    pub fn array(name: &str, base_type: Category, bounds: Option<(i64, i64)>) -> Self {
        Self::Array {
            name: name.to_string(),
            base_type,
            bounds,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Variable { name, .. } | Self::Array { name, .. } => name,
        }
    }

    /// Build the table entry; fails only on reversed array bounds
    pub fn into_entry(self) -> SymbolResult<Entry> {
        match self {
            Self::Variable { name, category } => Ok(Entry::variable(&name, category)),
            Self::Array {
                name,
                base_type,
                bounds,
            } => {
                let bounds = bounds
                    .map(|(start, end)| ArrayBounds::new(start, end))
                    .transpose()?;
                Ok(Entry::array(&name, base_type, bounds))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A user-facing problem found while analyzing declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: Code,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub span: Span,
    /// Scope level the analyzer was at, if any scope was open
    pub scope_level: Option<usize>,
}

impl Diagnostic {
    pub fn from_table_error(error: &SymbolTableError, span: Span, scope_level: Option<usize>) -> Self {
        Self {
            code: error.error_code(),
            severity: DiagnosticSeverity::Error,
            message: error.to_string(),
            span,
            scope_level,
        }
    }

    pub fn undeclared(name: &str, span: Span, scope_level: Option<usize>) -> Self {
        Self {
            code: codes::analysis::UNDECLARED_IDENTIFIER,
            severity: DiagnosticSeverity::Error,
            message: format!("Use of undeclared identifier '{}'", name),
            span,
            scope_level,
        }
    }

    pub fn shadowed(name: &str, outer_level: usize, span: Span, scope_level: Option<usize>) -> Self {
        Self {
            code: codes::analysis::SHADOWED_DECLARATION,
            severity: DiagnosticSeverity::Warning,
            message: format!(
                "Declaration of '{}' hides the one at scope level {}",
                name, outer_level
            ),
            span,
            scope_level,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity.as_str(), self.code, self.message)?;
        if !self.span.is_dummy() {
            write!(f, " at {}", self.span.start())?;
        }
        Ok(())
    }
}

/// What a successful `resolve` found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: String,
    pub category: Category,
    /// Level of the scope the declaration was found in
    pub depth: usize,
    pub label: Option<Label>,
}

impl Resolution {
    pub(crate) fn new(entry: &Entry, depth: usize) -> Self {
        Self {
            name: entry.name().to_string(),
            category: entry.category(),
            depth,
            label: entry.label(),
        }
    }
}

/// Everything an analysis run produced
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    /// Closed scopes in closing order (innermost first, program last)
    pub scopes: Vec<FinalizedScope>,
    pub diagnostics: Vec<Diagnostic>,
    pub declared: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

impl AnalysisReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// The program scope, present once the program was finished cleanly
    pub fn program_scope(&self) -> Option<&FinalizedScope> {
        self.scopes.iter().find(|s| s.level() == 0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} scope(s) closed, {} declaration(s), {} reference(s) resolved, {} error(s), {} warning(s)",
            self.scopes.len(),
            self.declared,
            self.resolved,
            self.error_count(),
            self.warning_count()
        )
    }
}
