//! Nested-scope symbol table
//!
//! Declarations live in a stack of scopes. Lookup searches innermost first,
//! so inner declarations shadow outer ones. Closing a scope assigns frame
//! offsets in declaration order. Nothing in this module logs; failures are
//! returned as [`SymbolTableError`].

pub mod dump;
pub mod entry;
pub mod error;
pub mod layout;
pub mod scope;
pub mod table;

pub use entry::{ArrayBounds, Category, Entry, Label};
pub use error::{SymbolResult, SymbolTableError};
pub use layout::{FrameLayout, LayoutPolicy};
pub use scope::{FinalizedScope, Scope, ScopeId};
pub use table::SymbolTable;
