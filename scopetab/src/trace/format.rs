//! TOML declaration-trace format
//!
//! A trace is the sequence of scope events a front end would emit:
//!
//! ```toml
//! name = "nested"
//!
//! [[step]]
//! kind = "program"
//! name = "main"
//!
//! [[step]]
//! kind = "declare"
//! name = "arr"
//! type = "array"
//! base_type = "int"
//! bounds = [1, 5]
//! line = 3
//! column = 5
//! ```

use super::error::{TraceError, TraceResult};
use crate::analysis::Declaration;
use crate::symbols::Category;
use crate::utils::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationTrace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "step", default)]
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Program,
    Procedure,
    Block,
    End,
    Declare,
    Resolve,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Program => "program",
            StepKind::Procedure => "procedure",
            StepKind::Block => "block",
            StepKind::End => "end",
            StepKind::Declare => "declare",
            StepKind::Resolve => "resolve",
        }
    }

    fn needs_name(&self) -> bool {
        matches!(
            self,
            StepKind::Program | StepKind::Procedure | StepKind::Declare | StepKind::Resolve
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub kind: StepKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub base_type: Option<Category>,
    #[serde(default)]
    pub bounds: Option<[i64; 2]>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

impl TraceStep {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn span(&self) -> Span {
        match (self.line, self.column) {
            (Some(line), Some(column)) => Span::identifier(line, column, self.name().len()),
            _ => Span::dummy(),
        }
    }

    /// Structural checks only; naming and layout problems are left to replay
    pub fn validate(&self, index: usize) -> TraceResult<()> {
        if self.kind.needs_name() && self.name().is_empty() {
            return Err(TraceError::invalid_step(
                index,
                &format!("'{}' step requires a name", self.kind.as_str()),
            ));
        }

        if self.kind == StepKind::Declare {
            match self.category {
                None => {
                    return Err(TraceError::invalid_step(index, "declare step requires a type"))
                }
                Some(Category::Procedure) | Some(Category::Program) => {
                    return Err(TraceError::invalid_step(
                        index,
                        "procedures and programs are opened with their own step kinds",
                    ))
                }
                Some(Category::Array) if self.base_type.is_none() => {
                    return Err(TraceError::invalid_step(
                        index,
                        "array declaration requires a base_type",
                    ))
                }
                _ => {}
            }
        } else if self.category.is_some() || self.base_type.is_some() || self.bounds.is_some() {
            return Err(TraceError::invalid_step(
                index,
                &format!(
                    "'{}' step does not take type information",
                    self.kind.as_str()
                ),
            ));
        }

        Ok(())
    }

    /// The declaration carried by a validated `declare` step
    pub fn declaration(&self) -> Option<Declaration> {
        if self.kind != StepKind::Declare {
            return None;
        }
        match self.category? {
            Category::Array => Some(Declaration::array(
                self.name(),
                self.base_type.unwrap_or(Category::Undefined),
                self.bounds.map(|[start, end]| (start, end)),
            )),
            other => Some(Declaration::variable(self.name(), other)),
        }
    }
}

impl DeclarationTrace {
    pub fn validate(&self) -> TraceResult<()> {
        self.steps
            .iter()
            .enumerate()
            .try_for_each(|(index, step)| step.validate(index))
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}
