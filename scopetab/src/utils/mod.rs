//! Shared utilities for scopetab

pub mod span;

pub use span::{Position, Span};
