//! Settings parsing and validation
//!
//! This module handles taskmark.yml settings files: discovery, layering
//! of user and project files, and validation.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
