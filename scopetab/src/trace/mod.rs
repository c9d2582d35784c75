//! Declaration traces: TOML files describing scope events, and their replay

pub mod error;
pub mod format;
pub mod loader;
pub mod replay;

pub use error::{TraceError, TraceResult};
pub use format::{DeclarationTrace, StepKind, TraceStep};
pub use loader::{load_trace, parse_trace};
pub use replay::{replay, replay_file, ReplayReport};
