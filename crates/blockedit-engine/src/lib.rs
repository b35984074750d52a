pub mod editing;
pub mod engine;
pub mod io;
pub mod policy;

// Re-export key types for easier usage
pub use editing::{BlockKind, BlockSpan, Cmd, ContentError, ContentOp, Document, Line, Patch};
pub use engine::{DocumentQuery, EditingEngine};
pub use policy::{BindingSet, Decision, Key, KeyBinding, KeyInput, ESCAPABLE_KINDS};
