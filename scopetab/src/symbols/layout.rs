//! Frame layout assignment
//!
//! Offsets are handed out in declaration order from a running cursor. The
//! cursor's final value is the frame size.

use super::entry::{Category, Entry};
use super::error::{SymbolResult, SymbolTableError};
use super::scope::Scope;
use crate::config::compile_time::layout::{
    BOOLEAN_UNIT_SIZE, CHAR_UNIT_SIZE, DEFAULT_BASE_OFFSET, INT_UNIT_SIZE,
};
use crate::config::runtime::LayoutPreferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPolicy {
    pub base_offset: i64,
    pub int_unit_size: i64,
    pub boolean_unit_size: i64,
    pub char_unit_size: i64,
}

impl Default for LayoutPolicy {
    /// Compile-time profile values; environment overrides are ignored
    fn default() -> Self {
        Self {
            base_offset: DEFAULT_BASE_OFFSET,
            int_unit_size: INT_UNIT_SIZE,
            boolean_unit_size: BOOLEAN_UNIT_SIZE,
            char_unit_size: CHAR_UNIT_SIZE,
        }
    }
}

impl From<&LayoutPreferences> for LayoutPolicy {
    fn from(prefs: &LayoutPreferences) -> Self {
        Self {
            base_offset: prefs.base_offset,
            int_unit_size: prefs.int_unit_size,
            boolean_unit_size: prefs.boolean_unit_size,
            char_unit_size: prefs.char_unit_size,
        }
    }
}

/// Result of laying out one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    /// (name, offset) in declaration order
    pub offsets: Vec<(String, i64)>,
    pub frame_size: i64,
}

impl FrameLayout {
    pub fn offset_of(&self, name: &str) -> Option<i64> {
        self.offsets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, offset)| *offset)
    }
}

impl LayoutPolicy {
    /// Storage units of one scalar.
    ///
    /// `None` for non-scalars and for unit sizes below 1, so offsets always
    /// grow by a positive amount per scalar element.
    pub fn unit_size(&self, category: Category) -> Option<i64> {
        let size = match category {
            Category::Int => self.int_unit_size,
            Category::Boolean => self.boolean_unit_size,
            Category::Char => self.char_unit_size,
            _ => return None,
        };
        (size > 0).then_some(size)
    }

    /// Storage an entry takes in its enclosing frame
    pub fn entry_size(&self, entry: &Entry) -> SymbolResult<i64> {
        match entry.category() {
            Category::Int | Category::Boolean | Category::Char => self
                .unit_size(entry.category())
                .ok_or_else(|| {
                    SymbolTableError::incomplete_entry(entry.name(), "unit size is not positive")
                }),
            // Callee frames are sized when their own scope closes.
            Category::Procedure | Category::Program | Category::NotApplicable => Ok(0),
            Category::Undefined => Err(SymbolTableError::incomplete_entry(
                entry.name(),
                "category is undefined",
            )),
            Category::Array => {
                let bounds = entry.bounds().ok_or_else(|| {
                    SymbolTableError::incomplete_entry(entry.name(), "array bounds are unresolved")
                })?;
                let element_size = entry
                    .base_type()
                    .and_then(|base| self.unit_size(base))
                    .ok_or_else(|| {
                        SymbolTableError::incomplete_entry(
                            entry.name(),
                            "array base type has no positive unit size",
                        )
                    })?;

                bounds
                    .element_count()
                    .and_then(|count| count.checked_mul(element_size))
                    .ok_or_else(|| SymbolTableError::layout_overflow(entry.name()))
            }
        }
    }

    /// Compute offsets and frame size without touching the scope
    pub fn assign_layout(&self, scope: &Scope) -> SymbolResult<FrameLayout> {
        self.assign_entries(scope.entries())
    }

    pub fn assign_entries<'a, I>(&self, entries: I) -> SymbolResult<FrameLayout>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut cursor = self.base_offset;
        let mut offsets = Vec::new();

        for entry in entries {
            let size = self.entry_size(entry)?;
            offsets.push((entry.name().to_string(), cursor));
            cursor = cursor
                .checked_add(size)
                .ok_or_else(|| SymbolTableError::layout_overflow(entry.name()))?;
        }

        Ok(FrameLayout {
            offsets,
            frame_size: cursor,
        })
    }
}
