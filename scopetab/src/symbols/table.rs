//! Scope stack with innermost-first lookup
//!
//! The stack bottom is the program scope. Procedure and block scopes are
//! pushed above it as nesting deepens. Closing a scope lays out its frame and
//! writes the frame size back to the owning procedure.

use super::dump;
use super::entry::{Category, Entry, Label};
use super::error::{SymbolResult, SymbolTableError};
use super::layout::{FrameLayout, LayoutPolicy};
use super::scope::{FinalizedScope, Scope, ScopeId};
use crate::config::compile_time::table::{
    FIRST_LABEL, MAX_ENTRIES_PER_SCOPE, MAX_IDENTIFIER_LENGTH, MAX_SCOPE_DEPTH,
};

#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    policy: LayoutPolicy,
    next_label: u32,
    next_scope_id: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Empty table; the first `enter_scope` creates the program scope
    pub fn new() -> Self {
        Self::with_policy(LayoutPolicy::default())
    }

    pub fn with_policy(policy: LayoutPolicy) -> Self {
        Self {
            scopes: Vec::new(),
            policy,
            next_label: FIRST_LABEL,
            next_scope_id: 0,
        }
    }

    pub fn policy(&self) -> &LayoutPolicy {
        &self.policy
    }

    // ========================================================================
    // Scope stack
    // ========================================================================

    fn check_depth(&self) -> SymbolResult<()> {
        let requested = self.scopes.len() + 1;
        if requested > MAX_SCOPE_DEPTH {
            return Err(SymbolTableError::limit_exceeded(
                "scope depth",
                requested,
                MAX_SCOPE_DEPTH,
            ));
        }
        Ok(())
    }

    fn allocate_scope_id(&mut self) -> ScopeId {
        let id = ScopeId(self.next_scope_id);
        self.next_scope_id += 1;
        id
    }

    /// Push an empty scope with no owner
    pub fn enter_scope(&mut self) -> SymbolResult<ScopeId> {
        self.check_depth()?;
        let id = self.allocate_scope_id();
        let level = self.scopes.len();
        self.scopes.push(Scope::new(id, level));
        Ok(id)
    }

    /// Push the scope owned by `owner`, a procedure declared in the current scope
    pub fn enter_procedure_scope(&mut self, owner: &str) -> SymbolResult<ScopeId> {
        let top = self
            .scopes
            .last()
            .ok_or_else(|| SymbolTableError::empty_stack("enter a procedure scope", 0))?;

        let entry = top.lookup_local(owner).ok_or_else(|| {
            SymbolTableError::invalid_scope_owner(owner, "not declared in the current scope")
        })?;
        if !entry.category().is_procedure_like() {
            return Err(SymbolTableError::invalid_scope_owner(
                owner,
                &format!("a {} does not own a frame", entry.category()),
            ));
        }
        if entry.frame_size().is_some() {
            return Err(SymbolTableError::invalid_scope_owner(
                owner,
                "its scope was already closed",
            ));
        }

        self.check_depth()?;
        let id = self.allocate_scope_id();
        let level = self.scopes.len();
        self.scopes.push(Scope::owned_by(id, level, owner));
        Ok(id)
    }

    /// Lay out and pop the innermost scope.
    ///
    /// The program scope cannot be popped this way; use `finish`.
    pub fn exit_scope(&mut self) -> SymbolResult<FinalizedScope> {
        if self.scopes.len() <= 1 {
            return Err(SymbolTableError::empty_stack(
                "exit a nested scope",
                self.scopes.len(),
            ));
        }

        let top_index = self.scopes.len() - 1;
        let top = &self.scopes[top_index];
        let layout = self.policy.assign_layout(top)?;
        let owner = top.owner().map(str::to_string);

        if let Some(name) = owner.as_deref() {
            let parent = &self.scopes[top_index - 1];
            match parent.lookup_local(name) {
                Some(entry) if entry.frame_size().is_none() => {}
                _ => {
                    return Err(SymbolTableError::invalid_scope_owner(
                        name,
                        "owner entry cannot take a frame size",
                    ))
                }
            }
        }

        // Validation is complete; mutation starts here.
        let mut scope = self.scopes.pop().ok_or_else(|| {
            SymbolTableError::empty_stack("exit a nested scope", 0)
        })?;
        apply_offsets(&mut scope, &layout)?;

        if let Some(name) = owner.as_deref() {
            if let Some(entry) = self
                .scopes
                .last_mut()
                .and_then(|parent| parent.lookup_local_mut(name))
            {
                entry.set_frame_size(layout.frame_size)?;
            }
        }

        Ok(FinalizedScope::from_scope(scope, owner, layout.frame_size))
    }

    /// Close the program scope. Terminal; every nested scope must be closed first.
    ///
    /// The first Program entry declared in the scope owns the frame.
    pub fn finish(&mut self) -> SymbolResult<FinalizedScope> {
        if self.scopes.len() != 1 {
            return Err(SymbolTableError::empty_stack(
                "finish the program",
                self.scopes.len(),
            ));
        }

        let layout = self.policy.assign_layout(&self.scopes[0])?;
        let owner_entry = self.scopes[0]
            .entries()
            .find(|e| e.category() == Category::Program);
        if let Some(entry) = owner_entry.filter(|e| e.frame_size().is_some()) {
            return Err(SymbolTableError::invalid_scope_owner(
                entry.name(),
                "owner entry cannot take a frame size",
            ));
        }
        let owner = owner_entry.map(|e| e.name().to_string());

        let mut scope = self
            .scopes
            .pop()
            .ok_or_else(|| SymbolTableError::empty_stack("finish the program", 0))?;
        apply_offsets(&mut scope, &layout)?;

        if let Some(name) = owner.as_deref() {
            if let Some(entry) = scope.lookup_local_mut(name) {
                entry.set_frame_size(layout.frame_size)?;
            }
        }

        Ok(FinalizedScope::from_scope(scope, owner, layout.frame_size))
    }

    /// Pop the innermost nested scope without laying it out.
    ///
    /// Used to recover when `exit_scope` failed. The owner gets no frame size.
    pub fn abandon_scope(&mut self) -> SymbolResult<Scope> {
        if self.scopes.len() <= 1 {
            return Err(SymbolTableError::empty_stack(
                "abandon a nested scope",
                self.scopes.len(),
            ));
        }
        self.scopes
            .pop()
            .ok_or_else(|| SymbolTableError::empty_stack("abandon a nested scope", 0))
    }

    // ========================================================================
    // Declarations and lookup
    // ========================================================================

    /// Declare `entry` in the innermost scope.
    ///
    /// Procedures and programs without an explicit label get the next
    /// sequential one. The counter only advances when the declaration lands.
    pub fn declare(&mut self, mut entry: Entry) -> SymbolResult<()> {
        if entry.name().len() > MAX_IDENTIFIER_LENGTH {
            return Err(SymbolTableError::limit_exceeded(
                "identifier length",
                entry.name().len(),
                MAX_IDENTIFIER_LENGTH,
            ));
        }

        let live = self.scopes.len();
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| SymbolTableError::empty_stack("declare", live))?;

        if scope.contains(entry.name()) {
            return Err(SymbolTableError::duplicate_name(entry.name(), scope.level()));
        }
        if scope.size() >= MAX_ENTRIES_PER_SCOPE {
            return Err(SymbolTableError::limit_exceeded(
                "entries per scope",
                scope.size() + 1,
                MAX_ENTRIES_PER_SCOPE,
            ));
        }

        let mut next_label = self.next_label;
        if entry.category().is_procedure_like() && entry.label().is_none() {
            entry.set_label(Label(next_label));
            next_label = next_label.checked_add(1).ok_or_else(|| {
                SymbolTableError::limit_exceeded("label", u32::MAX as usize, u32::MAX as usize)
            })?;
        }

        scope.add_entry(entry)?;
        self.next_label = next_label;
        Ok(())
    }

    /// Innermost declaration of `name` and the level it was found at
    pub fn lookup(&self, name: &str) -> Option<(&Entry, usize)> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.lookup_local(name).map(|entry| (entry, scope.level())))
    }

    /// Lookup restricted to the innermost scope
    pub fn lookup_current(&self, name: &str) -> Option<&Entry> {
        self.scopes.last().and_then(|scope| scope.lookup_local(name))
    }

    /// 0-based level of the innermost scope, `None` when no scope is live
    pub fn current_depth(&self) -> Option<usize> {
        self.scopes.len().checked_sub(1)
    }

    pub fn current_scope(&self) -> Option<&Scope> {
        self.scopes.last()
    }

    /// Live scopes, outermost first
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Entries across all live scopes
    pub fn entry_count(&self) -> usize {
        self.scopes.iter().map(Scope::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Layout the innermost scope would get if it closed now
    pub fn preview_layout(&self) -> Option<SymbolResult<FrameLayout>> {
        self.scopes
            .last()
            .map(|scope| self.policy.assign_layout(scope))
    }

    /// Textual listing of every live scope, outermost first
    pub fn dump(&self) -> String {
        dump::dump_table(self)
    }
}

fn apply_offsets(scope: &mut Scope, layout: &FrameLayout) -> SymbolResult<()> {
    for (name, offset) in &layout.offsets {
        scope.set_offset(name, *offset)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::entry::ArrayBounds;
    use assert_matches::assert_matches;

    fn unit_table() -> SymbolTable {
        SymbolTable::with_policy(LayoutPolicy {
            base_offset: 0,
            int_unit_size: 1,
            boolean_unit_size: 1,
            char_unit_size: 1,
        })
    }

    #[test]
    fn test_depths() {
        let mut table = unit_table();
        assert_eq!(table.current_depth(), None);

        let outer = table.enter_scope().unwrap();
        assert_eq!(table.current_depth(), Some(0));
        let inner = table.enter_scope().unwrap();
        assert_eq!(table.current_depth(), Some(1));
        assert_ne!(outer, inner);

        table.exit_scope().unwrap();
        assert_eq!(table.current_depth(), Some(0));
    }

    #[test]
    fn test_shadowing() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("x", Category::Int)).unwrap();
        table.enter_scope().unwrap();
        table
            .declare(Entry::variable("x", Category::Boolean))
            .unwrap();

        let (entry, depth) = table.lookup("x").unwrap();
        assert_eq!(entry.category(), Category::Boolean);
        assert_eq!(depth, 1);

        table.exit_scope().unwrap();
        let (entry, depth) = table.lookup("x").unwrap();
        assert_eq!(entry.category(), Category::Int);
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_outer_names_visible_from_inner_scope() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("g", Category::Char)).unwrap();
        table.enter_scope().unwrap();

        assert_eq!(table.lookup("g").map(|(_, d)| d), Some(0));
        assert!(table.lookup_current("g").is_none());
        assert!(table.lookup("undeclared").is_none());
    }

    #[test]
    fn test_program_scope_cannot_be_popped() {
        let mut table = unit_table();
        assert_matches!(
            table.exit_scope(),
            Err(SymbolTableError::EmptyStack { live_scopes: 0, .. })
        );

        table.enter_scope().unwrap();
        assert_matches!(
            table.exit_scope(),
            Err(SymbolTableError::EmptyStack { live_scopes: 1, .. })
        );
        assert_eq!(table.current_depth(), Some(0));
    }

    #[test]
    fn test_declare_without_scope() {
        let mut table = unit_table();
        assert_matches!(
            table.declare(Entry::variable("x", Category::Int)),
            Err(SymbolTableError::EmptyStack { .. })
        );
    }

    #[test]
    fn test_duplicate_keeps_first_entry() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("n", Category::Int)).unwrap();

        assert_matches!(
            table.declare(Entry::variable("n", Category::Char)),
            Err(SymbolTableError::DuplicateName { level: 0, .. })
        );
        assert_eq!(
            table.lookup("n").map(|(e, _)| e.category()),
            Some(Category::Int)
        );
        assert_eq!(table.entry_count(), 1);
    }

    #[test]
    fn test_labels_sequential_and_explicit() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::program("main")).unwrap();
        table.declare(Entry::procedure("p")).unwrap();
        table
            .declare(Entry::procedure("q").with_label(Label(100)))
            .unwrap();
        // A rejected declaration does not consume a label.
        assert!(table.declare(Entry::procedure("p")).is_err());
        table.declare(Entry::procedure("r")).unwrap();
        table.declare(Entry::variable("v", Category::Int)).unwrap();

        let label = |name: &str| table.lookup(name).and_then(|(e, _)| e.label());
        assert_eq!(label("main"), Some(Label(FIRST_LABEL)));
        assert_eq!(label("p"), Some(Label(FIRST_LABEL + 1)));
        assert_eq!(label("q"), Some(Label(100)));
        assert_eq!(label("r"), Some(Label(FIRST_LABEL + 2)));
        assert_eq!(label("v"), None);
    }

    #[test]
    fn test_procedure_frame_size_written_back() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::program("main")).unwrap();
        table.declare(Entry::procedure("p")).unwrap();

        table.enter_procedure_scope("p").unwrap();
        table.declare(Entry::variable("a", Category::Int)).unwrap();
        table
            .declare(Entry::array(
                "buf",
                Category::Char,
                Some(ArrayBounds::new(1, 4).unwrap()),
            ))
            .unwrap();

        let closed = table.exit_scope().unwrap();
        assert_eq!(closed.owner(), Some("p"));
        assert_eq!(closed.frame_size(), 5);
        assert_eq!(closed.entry("buf").and_then(Entry::offset), Some(1));
        assert_eq!(
            table.lookup("p").and_then(|(e, _)| e.frame_size()),
            Some(5)
        );

        let program = table.finish().unwrap();
        assert_eq!(program.owner(), Some("main"));
        assert_eq!(program.entry("main").and_then(Entry::frame_size), Some(0));
        assert!(table.is_empty());
    }

    #[test]
    fn test_invalid_scope_owner() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("x", Category::Int)).unwrap();
        table.declare(Entry::procedure("p")).unwrap();

        assert_matches!(
            table.enter_procedure_scope("x"),
            Err(SymbolTableError::InvalidScopeOwner { .. })
        );
        assert_matches!(
            table.enter_procedure_scope("missing"),
            Err(SymbolTableError::InvalidScopeOwner { .. })
        );
        assert_eq!(table.current_depth(), Some(0));

        table.enter_procedure_scope("p").unwrap();
        table.exit_scope().unwrap();
        assert_matches!(
            table.enter_procedure_scope("p"),
            Err(SymbolTableError::InvalidScopeOwner { .. })
        );
    }

    #[test]
    fn test_failed_exit_leaves_scope_open() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("ok", Category::Int)).unwrap();
        table
            .declare(Entry::array("open", Category::Int, None))
            .unwrap();

        assert_matches!(
            table.exit_scope(),
            Err(SymbolTableError::IncompleteEntry { .. })
        );
        assert_eq!(table.current_depth(), Some(1));
        assert_eq!(table.lookup_current("ok").and_then(Entry::offset), None);

        let dropped = table.abandon_scope().unwrap();
        assert_eq!(dropped.size(), 2);
        assert_eq!(table.current_depth(), Some(0));
        assert_matches!(
            table.abandon_scope(),
            Err(SymbolTableError::EmptyStack { live_scopes: 1, .. })
        );
    }

    #[test]
    fn test_non_positive_unit_size_blocks_exit() {
        let mut table = SymbolTable::with_policy(LayoutPolicy {
            base_offset: 0,
            int_unit_size: -4,
            boolean_unit_size: 0,
            char_unit_size: 1,
        });
        table.enter_scope().unwrap();
        table.enter_scope().unwrap();
        for (name, category) in [
            ("a", Category::Int),
            ("b", Category::Int),
            ("c", Category::Boolean),
            ("d", Category::Boolean),
        ] {
            table.declare(Entry::variable(name, category)).unwrap();
        }

        assert_matches!(
            table.exit_scope(),
            Err(SymbolTableError::IncompleteEntry { ref name, .. }) if name == "a"
        );
        assert_eq!(table.current_depth(), Some(1));
        assert!(table
            .current_scope()
            .unwrap()
            .entries()
            .all(|e| e.offset().is_none()));
    }

    #[test]
    fn test_finish_requires_single_scope() {
        let mut table = unit_table();
        assert_matches!(table.finish(), Err(SymbolTableError::EmptyStack { .. }));

        table.enter_scope().unwrap();
        table.enter_scope().unwrap();
        assert_matches!(
            table.finish(),
            Err(SymbolTableError::EmptyStack { live_scopes: 2, .. })
        );
    }

    #[test]
    fn test_identifier_length_limit() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        let long = "v".repeat(MAX_IDENTIFIER_LENGTH + 1);

        assert_matches!(
            table.declare(Entry::variable(&long, Category::Int)),
            Err(SymbolTableError::LimitExceeded { limit: "identifier length", .. })
        );
        assert_eq!(table.entry_count(), 0);
    }

    #[test]
    fn test_scope_depth_limit() {
        let mut table = unit_table();
        for _ in 0..MAX_SCOPE_DEPTH {
            table.enter_scope().unwrap();
        }
        assert_matches!(
            table.enter_scope(),
            Err(SymbolTableError::LimitExceeded { limit: "scope depth", .. })
        );
        assert_eq!(table.current_depth(), Some(MAX_SCOPE_DEPTH - 1));
    }

    #[test]
    fn test_entry_count_and_preview() {
        let mut table = unit_table();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("a", Category::Int)).unwrap();
        table.enter_scope().unwrap();
        table.declare(Entry::variable("b", Category::Int)).unwrap();
        table.declare(Entry::variable("c", Category::Int)).unwrap();

        assert_eq!(table.entry_count(), 3);
        let preview = table.preview_layout().unwrap().unwrap();
        assert_eq!(preview.frame_size, 2);
        // Previewing does not assign anything.
        assert_eq!(table.lookup_current("b").and_then(Entry::offset), None);
    }
}
