//! Declared identifiers and their storage metadata

use super::error::{SymbolResult, SymbolTableError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of declaration categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Undefined,
    NotApplicable,
    Int,
    Boolean,
    Char,
    Array,
    Procedure,
    Program,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Undefined => "undefined",
            Category::NotApplicable => "n/a",
            Category::Int => "int",
            Category::Boolean => "boolean",
            Category::Char => "char",
            Category::Array => "array",
            Category::Procedure => "procedure",
            Category::Program => "program",
        }
    }

    /// Legacy numeric type code used in listings
    pub fn code(&self) -> i32 {
        match self {
            Category::Undefined => -1,
            Category::NotApplicable => 0,
            Category::Int => 1,
            Category::Boolean => 2,
            Category::Char => 3,
            Category::Array => 4,
            Category::Procedure => 5,
            Category::Program => 6,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Category::Int | Category::Boolean | Category::Char)
    }

    /// Procedures and programs own a frame and a label
    pub fn is_procedure_like(&self) -> bool {
        matches!(self, Category::Procedure | Category::Program)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive index range of an array; `start <= end` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayBounds {
    start: i64,
    end: i64,
}

impl ArrayBounds {
    pub fn new(start: i64, end: i64) -> SymbolResult<Self> {
        if start > end {
            return Err(SymbolTableError::invalid_bounds(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Element count, `None` if it does not fit in an i64
    pub fn element_count(&self) -> Option<i64> {
        self.end.checked_sub(self.start)?.checked_add(1)
    }
}

impl fmt::Display for ArrayBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Code-generation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// One declared identifier.
///
/// Every storage field starts as `None`. The table fills in the nesting
/// level and label on declaration; the layout path fills in offsets and
/// frame sizes when a scope closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    category: Category,
    base_type: Option<Category>,
    bounds: Option<ArrayBounds>,
    offset: Option<i64>,
    label: Option<Label>,
    static_nest_level: Option<usize>,
    frame_size: Option<i64>,
}

impl Entry {
    fn with_category(name: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            category,
            base_type: None,
            bounds: None,
            offset: None,
            label: None,
            static_nest_level: None,
            frame_size: None,
        }
    }

    /// A simple variable of the given category
    pub fn variable(name: &str, category: Category) -> Self {
        Self::with_category(name, category)
    }

    /// An array; `bounds` may be unresolved, which layout later rejects
    pub fn array(name: &str, base_type: Category, bounds: Option<ArrayBounds>) -> Self {
        Self {
            base_type: Some(base_type),
            bounds,
            ..Self::with_category(name, Category::Array)
        }
    }

    pub fn procedure(name: &str) -> Self {
        Self::with_category(name, Category::Procedure)
    }

    pub fn program(name: &str) -> Self {
        Self::with_category(name, Category::Program)
    }

    /// Keep a caller-chosen label instead of a table-assigned one
    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn base_type(&self) -> Option<Category> {
        self.base_type
    }

    pub fn bounds(&self) -> Option<ArrayBounds> {
        self.bounds
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn label(&self) -> Option<Label> {
        self.label
    }

    pub fn static_nest_level(&self) -> Option<usize> {
        self.static_nest_level
    }

    pub fn frame_size(&self) -> Option<i64> {
        self.frame_size
    }

    pub(crate) fn set_offset(&mut self, offset: i64) {
        self.offset = Some(offset);
    }

    pub(crate) fn set_label(&mut self, label: Label) {
        self.label = Some(label);
    }

    pub(crate) fn set_static_nest_level(&mut self, level: usize) {
        self.static_nest_level = Some(level);
    }

    /// Only procedure-like entries own a frame, and its size is written once
    pub(crate) fn set_frame_size(&mut self, size: i64) -> SymbolResult<()> {
        if !self.category.is_procedure_like() {
            return Err(SymbolTableError::invalid_scope_owner(
                &self.name,
                "only procedures and programs have a frame size",
            ));
        }
        if self.frame_size.is_some() {
            return Err(SymbolTableError::invalid_scope_owner(
                &self.name,
                "frame size already assigned",
            ));
        }
        self.frame_size = Some(size);
        Ok(())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.category)?;
        if let (Some(base), Some(bounds)) = (self.base_type, self.bounds) {
            write!(f, "[{}] of {}", bounds, base)?;
        } else if let Some(base) = self.base_type {
            write!(f, "[?] of {}", base)?;
        }
        Ok(())
    }
}
