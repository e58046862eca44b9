//! Taskmark - a task runner for indentation-based task scripts
//!
//! Scripts group shell steps (`- command`) under numbered tasks (`@ title`).
//! Taskmark compiles a script into an instruction list and runs it, with
//! task selection, dry runs and interactive confirmation.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod preprocess;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, TaskmarkError};

/// Current version of Taskmark
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
