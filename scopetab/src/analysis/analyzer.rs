//! Scope analyzer: drives the symbol table and reports positioned diagnostics
//!
//! The table returns typed errors and never logs. This layer attaches the
//! caller's source span, records a `Diagnostic`, logs it and keeps going, so
//! one bad declaration does not end the analysis.

use super::types::{AnalysisReport, Declaration, Diagnostic, Resolution};
use crate::config::runtime::AnalysisPreferences;
use crate::logging::codes;
use crate::symbols::{
    Entry, FinalizedScope, LayoutPolicy, ScopeId, SymbolTable, SymbolTableError,
};
use crate::utils::Span;
use crate::{log_debug, log_error, log_success, log_warning};

/// What each `begin_*` call opened, so `end_scope` can stay balanced after errors
#[derive(Debug, Clone, PartialEq, Eq)]
enum OpenScope {
    Program,
    Procedure(String),
    Block,
    /// A begin whose scope could not be opened
    Phantom,
}

pub struct ScopeAnalyzer {
    table: SymbolTable,
    preferences: AnalysisPreferences,
    open: Vec<OpenScope>,
    finalized: Vec<FinalizedScope>,
    diagnostics: Vec<Diagnostic>,
    declared: usize,
    resolved: usize,
    unresolved: usize,
    halted: bool,
}

impl Default for ScopeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeAnalyzer {
    pub fn new() -> Self {
        Self::with_config(LayoutPolicy::default(), AnalysisPreferences::default())
    }

    pub fn with_config(policy: LayoutPolicy, preferences: AnalysisPreferences) -> Self {
        Self {
            table: SymbolTable::with_policy(policy),
            preferences,
            open: Vec::new(),
            finalized: Vec::new(),
            diagnostics: Vec::new(),
            declared: 0,
            resolved: 0,
            unresolved: 0,
            halted: false,
        }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finalized_scopes(&self) -> &[FinalizedScope] {
        &self.finalized
    }

    /// True when the program scope is the only open scope
    pub fn at_program_level(&self) -> bool {
        matches!(self.open.as_slice(), [OpenScope::Program])
    }

    /// Scopes opened by `begin_*` and not yet ended
    pub fn open_scope_count(&self) -> usize {
        self.open.len()
    }

    /// Set by an error whose code requires a halt, or by any error while
    /// `stop_on_first_error` is on
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let level = diagnostic
            .scope_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());

        if diagnostic.is_error() {
            log_error!(diagnostic.code, &diagnostic.message,
                span = diagnostic.span,
                "scope_level" => level);
            if self.preferences.stop_on_first_error {
                self.halted = true;
            }
        } else {
            log_warning!(diagnostic.code, &diagnostic.message,
                span = diagnostic.span,
                "scope_level" => level);
        }

        self.diagnostics.push(diagnostic);
    }

    fn report_table_error(&mut self, error: &SymbolTableError, span: Span) {
        let level = self.table.current_depth();
        self.report(Diagnostic::from_table_error(error, span, level));
        if error.requires_halt() {
            self.halted = true;
        }
    }

    fn trace_transition(&self, action: &str, id: Option<ScopeId>) {
        if self.preferences.log_scope_transitions {
            log_debug!(action,
                "scope_id" => id.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string()),
                "depth" => self.table.current_depth().map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()));
        }
    }

    // ========================================================================
    // Scope structure
    // ========================================================================

    /// Open the program scope and declare the program inside it
    pub fn begin_program(&mut self, name: &str, span: Span) -> Option<ScopeId> {
        if !self.open.is_empty() {
            let err = SymbolTableError::invalid_scope_owner(name, "a program scope is already open");
            self.report_table_error(&err, span);
            self.open.push(OpenScope::Phantom);
            return None;
        }

        let id = match self.table.enter_scope() {
            Ok(id) => id,
            Err(err) => {
                self.report_table_error(&err, span);
                self.open.push(OpenScope::Phantom);
                return None;
            }
        };
        self.open.push(OpenScope::Program);
        self.trace_transition("Entered program scope", Some(id));

        match self.table.declare(Entry::program(name)) {
            Ok(()) => self.declared += 1,
            Err(err) => self.report_table_error(&err, span),
        }

        Some(id)
    }

    /// Declare a procedure in the current scope and open the scope it owns.
    ///
    /// If the declaration fails an anonymous block is opened instead so the
    /// procedure body still gets its own scope.
    pub fn begin_procedure(&mut self, name: &str, span: Span) -> Option<ScopeId> {
        let entered = match self.table.declare(Entry::procedure(name)) {
            Ok(()) => {
                self.declared += 1;
                self.table
                    .enter_procedure_scope(name)
                    .map(|id| (id, OpenScope::Procedure(name.to_string())))
            }
            Err(err) => {
                self.report_table_error(&err, span);
                self.table.enter_scope().map(|id| (id, OpenScope::Block))
            }
        };

        match entered {
            Ok((id, kind)) => {
                self.open.push(kind);
                self.trace_transition("Entered procedure scope", Some(id));
                Some(id)
            }
            Err(err) => {
                self.report_table_error(&err, span);
                self.open.push(OpenScope::Phantom);
                None
            }
        }
    }

    /// Open an anonymous nested block
    pub fn begin_block(&mut self, span: Span) -> Option<ScopeId> {
        match self.table.enter_scope() {
            Ok(id) => {
                self.open.push(OpenScope::Block);
                self.trace_transition("Entered block scope", Some(id));
                Some(id)
            }
            Err(err) => {
                self.report_table_error(&err, span);
                self.open.push(OpenScope::Phantom);
                None
            }
        }
    }

    /// Close the innermost procedure or block scope
    pub fn end_scope(&mut self, span: Span) -> Option<&FinalizedScope> {
        match self.open.last() {
            Some(OpenScope::Phantom) => {
                self.open.pop();
                return None;
            }
            None | Some(OpenScope::Program) => {
                // The table refuses to pop the program scope; report its error.
                if let Err(err) = self.table.exit_scope() {
                    self.report_table_error(&err, span);
                }
                return None;
            }
            Some(OpenScope::Procedure(_)) | Some(OpenScope::Block) => {}
        }

        let kind = self.open.pop();
        match self.table.exit_scope() {
            Ok(scope) => {
                log_success!(codes::success::SCOPE_FINALIZED, "Scope closed and laid out",
                    "level" => scope.level(),
                    "owner" => scope.owner().unwrap_or("-"),
                    "frame_size" => scope.frame_size());
                self.finalized.push(scope);
                self.trace_transition("Exited scope", None);
                self.finalized.last()
            }
            Err(err) => {
                self.report_table_error(&err, span);
                if let Err(err) = self.table.abandon_scope() {
                    log_error!(err.error_code(), "Failed to discard unclosable scope",
                        "owner" => format!("{:?}", kind));
                }
                None
            }
        }
    }

    /// Close the program scope; every nested scope must already be closed
    pub fn end_program(&mut self, span: Span) -> Option<&FinalizedScope> {
        match self.table.finish() {
            Ok(scope) => {
                self.open.clear();
                log_success!(codes::success::PROGRAM_FINALIZED, "Program scope closed and laid out",
                    "owner" => scope.owner().unwrap_or("-"),
                    "frame_size" => scope.frame_size(),
                    "entries" => scope.size());
                self.finalized.push(scope);
                self.finalized.last()
            }
            Err(err) => {
                self.report_table_error(&err, span);
                None
            }
        }
    }

    // ========================================================================
    // Declarations and references
    // ========================================================================

    /// Declare a variable or array in the innermost scope
    pub fn declare(&mut self, declaration: Declaration, span: Span) -> bool {
        let name = declaration.name().to_string();
        let outer_level = self.table.lookup(&name).map(|(_, level)| level);

        let result = declaration
            .into_entry()
            .and_then(|entry| self.table.declare(entry));

        match result {
            Ok(()) => {
                self.declared += 1;
                if self.preferences.warn_on_shadowing {
                    if let Some(outer) = outer_level {
                        let current = self.table.current_depth();
                        self.report(Diagnostic::shadowed(&name, outer, span, current));
                    }
                }
                true
            }
            Err(err) => {
                self.report_table_error(&err, span);
                false
            }
        }
    }

    /// Resolve a reference; unknown names become `UndeclaredIdentifier` diagnostics
    pub fn resolve(&mut self, name: &str, span: Span) -> Option<Resolution> {
        match self.table.lookup(name) {
            Some((entry, depth)) => {
                let resolution = Resolution::new(entry, depth);
                self.resolved += 1;
                Some(resolution)
            }
            None => {
                self.unresolved += 1;
                let level = self.table.current_depth();
                self.report(Diagnostic::undeclared(name, span, level));
                None
            }
        }
    }

    pub fn into_report(self) -> AnalysisReport {
        AnalysisReport {
            scopes: self.finalized,
            diagnostics: self.diagnostics,
            declared: self.declared,
            resolved: self.resolved,
            unresolved: self.unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Category;

    fn analyzer(prefs: AnalysisPreferences) -> ScopeAnalyzer {
        ScopeAnalyzer::with_config(
            LayoutPolicy {
                base_offset: 0,
                int_unit_size: 1,
                boolean_unit_size: 1,
                char_unit_size: 1,
            },
            prefs,
        )
    }

    fn quiet() -> AnalysisPreferences {
        AnalysisPreferences {
            warn_on_shadowing: false,
            log_scope_transitions: false,
            stop_on_first_error: false,
        }
    }

    #[test]
    fn test_program_with_procedure() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy()).unwrap();
        assert!(a.declare(Declaration::variable("g", Category::Int), Span::dummy()));
        a.begin_procedure("p", Span::dummy()).unwrap();
        assert!(a.declare(Declaration::variable("l", Category::Int), Span::dummy()));
        assert!(a.declare(
            Declaration::array("buf", Category::Char, Some((0, 3))),
            Span::dummy()
        ));

        let proc_scope = a.end_scope(Span::dummy()).cloned().unwrap();
        assert_eq!(proc_scope.owner(), Some("p"));
        assert_eq!(proc_scope.frame_size(), 5);

        let program = a.end_program(Span::dummy()).cloned().unwrap();
        assert_eq!(program.owner(), Some("main"));
        assert_eq!(program.frame_size(), 1);
        assert_eq!(program.entry("p").and_then(Entry::frame_size), Some(5));

        assert_eq!(a.finalized_scopes().len(), 2);
        let report = a.into_report();
        assert!(!report.has_errors());
        assert_eq!(report.declared, 5);
        assert_eq!(report.scopes.len(), 2);
    }

    #[test]
    fn test_undeclared_reference_is_diagnosed() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy());
        assert!(a.resolve("ghost", Span::identifier(2, 7, 5)).is_none());

        let diag = &a.diagnostics()[0];
        assert_eq!(diag.code, codes::analysis::UNDECLARED_IDENTIFIER);
        assert_eq!(diag.span.start().line, 2);
        assert_eq!(diag.scope_level, Some(0));
    }

    #[test]
    fn test_resolve_reports_depth() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy());
        a.declare(Declaration::variable("x", Category::Int), Span::dummy());
        a.begin_block(Span::dummy());
        a.declare(Declaration::variable("x", Category::Boolean), Span::dummy());

        let inner = a.resolve("x", Span::dummy()).unwrap();
        assert_eq!((inner.category, inner.depth), (Category::Boolean, 1));

        a.end_scope(Span::dummy());
        let outer = a.resolve("x", Span::dummy()).unwrap();
        assert_eq!((outer.category, outer.depth), (Category::Int, 0));

        let main = a.resolve("main", Span::dummy()).unwrap();
        assert!(main.label.is_some());
    }

    #[test]
    fn test_shadowing_warning_is_optional() {
        let mut prefs = quiet();
        prefs.warn_on_shadowing = true;
        let mut a = analyzer(prefs);
        a.begin_program("main", Span::dummy());
        a.declare(Declaration::variable("x", Category::Int), Span::dummy());
        a.begin_block(Span::dummy());
        assert!(a.declare(Declaration::variable("x", Category::Char), Span::dummy()));

        assert_eq!(a.diagnostics().len(), 1);
        assert_eq!(a.diagnostics()[0].code, codes::analysis::SHADOWED_DECLARATION);
        assert!(!a.diagnostics()[0].is_error());

        let mut silent = analyzer(quiet());
        silent.begin_program("main", Span::dummy());
        silent.declare(Declaration::variable("x", Category::Int), Span::dummy());
        silent.begin_block(Span::dummy());
        silent.declare(Declaration::variable("x", Category::Char), Span::dummy());
        assert!(silent.diagnostics().is_empty());
    }

    #[test]
    fn test_duplicate_procedure_still_balances() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy());
        a.declare(Declaration::variable("p", Category::Int), Span::dummy());
        assert!(a.begin_procedure("p", Span::dummy()).is_some());
        a.declare(Declaration::variable("local", Category::Int), Span::dummy());
        a.end_scope(Span::dummy());

        // Back at the program level, the failed procedure's body was isolated.
        assert_eq!(a.table().current_depth(), Some(0));
        assert!(a.table().lookup("local").is_none());
        assert_eq!(a.diagnostics()[0].code, codes::table::DUPLICATE_NAME);
        assert!(a.end_program(Span::dummy()).is_some());
    }

    #[test]
    fn test_end_scope_on_program_level_reports_empty_stack() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy());
        assert!(a.end_scope(Span::dummy()).is_none());
        assert_eq!(a.diagnostics()[0].code, codes::table::EMPTY_SCOPE_STACK);
        assert_eq!(a.table().current_depth(), Some(0));
    }

    #[test]
    fn test_incomplete_scope_is_discarded() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy());
        a.begin_procedure("p", Span::dummy());
        a.declare(Declaration::array("open", Category::Int, None), Span::dummy());

        assert!(a.end_scope(Span::identifier(9, 1, 3)).is_none());
        assert_eq!(a.diagnostics()[0].code, codes::layout::INCOMPLETE_ENTRY);
        assert_eq!(a.table().current_depth(), Some(0));
        assert!(a.end_program(Span::dummy()).is_some());
    }

    #[test]
    fn test_reversed_bounds_and_halting() {
        let mut prefs = quiet();
        prefs.stop_on_first_error = true;
        let mut a = analyzer(prefs);
        a.begin_program("main", Span::dummy());

        assert!(!a.is_halted());
        assert!(!a.declare(
            Declaration::array("bad", Category::Int, Some((5, 1))),
            Span::dummy()
        ));
        assert_eq!(a.diagnostics()[0].code, codes::table::INVALID_BOUNDS);
        assert!(a.is_halted());
    }

    #[test]
    fn test_halting_codes_stop_analysis() {
        let mut a = analyzer(quiet());
        a.begin_program("main", Span::dummy());
        a.resolve("ghost", Span::dummy());
        assert!(!a.is_halted());

        // An unbalanced end reports EmptyStack, which is registered as halting.
        a.end_scope(Span::dummy());
        assert_eq!(a.diagnostics()[1].code, codes::table::EMPTY_SCOPE_STACK);
        assert!(a.is_halted());
    }

    #[test]
    fn test_second_program_is_rejected() {
        let mut a = analyzer(quiet());
        a.begin_program("one", Span::dummy());
        assert!(a.begin_program("two", Span::dummy()).is_none());
        assert_eq!(a.diagnostics()[0].code, codes::table::INVALID_SCOPE_OWNER);

        // The phantom scope from the rejected program closes without touching the table.
        assert!(a.end_scope(Span::dummy()).is_none());
        assert!(a.end_program(Span::dummy()).is_some());
    }
}
