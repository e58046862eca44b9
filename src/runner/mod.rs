//! Script execution engine
//!
//! This module walks compiled scripts: task numbering and selection, step
//! execution in a shared interpreter session, prompts and script inclusion.

pub mod context;
pub mod engine;
pub mod loader;
pub mod prompt;
pub mod range;
pub mod session;
pub mod step;

// Re-export main types
pub use context::*;
pub use engine::*;
pub use loader::*;
pub use prompt::*;
pub use range::*;
pub use session::*;
pub use step::*;
