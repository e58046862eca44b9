//! Script preprocessing
//!
//! This module turns task markup into a flat list of instructions that the
//! runner walks. A task starts with `@ title`, its steps are `- command` lines
//! indented under it; indentation is the only nesting signal.

pub mod block;
pub mod line;
pub mod render;

// Re-export main types
pub use block::*;
pub use line::*;
pub use render::*;

/// One unit of the compiled script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Opens a task; `line` is the 1-based source line of the marker
    StartTask { name: String, line: usize },

    /// Closes the currently open task
    EndTask,

    /// A command belonging to the open task, possibly spanning several lines
    Step { command: String, line: usize },

    /// Loads every script matching `pattern`
    Include { pattern: String, line: usize },

    /// Any other line, kept at its original position
    Verbatim(String),
}

impl Instruction {
    pub fn is_start_task(&self) -> bool {
        matches!(self, Instruction::StartTask { .. })
    }

    pub fn is_end_task(&self) -> bool {
        matches!(self, Instruction::EndTask)
    }
}
