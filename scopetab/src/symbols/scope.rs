use super::entry::Entry;
use super::error::{SymbolResult, SymbolTableError};
use indexmap::IndexMap;
use std::fmt;

/// Handle returned when a scope is entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One lexical level. Names are unique and kept in declaration order.
#[derive(Debug, Clone)]
pub struct Scope {
    id: ScopeId,
    level: usize,
    owner: Option<String>,
    entries: IndexMap<String, Entry>,
}

impl Scope {
    pub fn new(id: ScopeId, level: usize) -> Self {
        Self {
            id,
            level,
            owner: None,
            entries: IndexMap::new(),
        }
    }

    /// Scope whose frame size belongs to the procedure `owner`
    pub fn owned_by(id: ScopeId, level: usize, owner: &str) -> Self {
        Self {
            owner: Some(owner.to_string()),
            ..Self::new(id, level)
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Insert `entry`, stamping it with this scope's level.
    /// A duplicate leaves the existing entry untouched.
    pub fn add_entry(&mut self, mut entry: Entry) -> SymbolResult<()> {
        if self.entries.contains_key(entry.name()) {
            return Err(SymbolTableError::duplicate_name(entry.name(), self.level));
        }

        entry.set_static_nest_level(self.level);
        self.entries.insert(entry.name().to_string(), entry);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub(crate) fn lookup_local_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(name)
    }

    pub fn set_offset(&mut self, name: &str, offset: i64) -> SymbolResult<()> {
        let level = self.level;
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| SymbolTableError::unknown_name(name, level))?;
        entry.set_offset(offset);
        Ok(())
    }

    /// Names in declaration order
    pub fn all_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A closed scope. Offsets are assigned and nothing can change it anymore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedScope {
    id: ScopeId,
    level: usize,
    owner: Option<String>,
    entries: Vec<Entry>,
    frame_size: i64,
}

impl FinalizedScope {
    pub(crate) fn from_scope(scope: Scope, owner: Option<String>, frame_size: i64) -> Self {
        Self {
            id: scope.id,
            level: scope.level,
            owner,
            entries: scope.entries.into_values().collect(),
            frame_size,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Procedure or program whose frame this scope describes
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn frame_size(&self) -> i64 {
        self.frame_size
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }
}
