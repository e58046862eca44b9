//! Step execution
//!
//! This module runs step commands through the run's interpreter session.
//! Step output lands on stderr so it never interleaves with status lines.

use crate::error::ExecutionResult;
use crate::runner::Context;

/// Result of running one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failed(Option<i32>),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}

/// Print a step and, unless this is a dry run, execute it
pub fn execute_step(command: &str, ctx: &mut Context) -> ExecutionResult<StepOutcome> {
    ctx.print_command(command);

    if ctx.dry_run {
        return Ok(StepOutcome::Success);
    }

    ctx.session.run(command, &ctx.state.base_dir)
}

/// Run lines that sit outside of steps; printed only in verbose mode
pub fn execute_inline(snippet: &str, ctx: &mut Context) -> ExecutionResult<StepOutcome> {
    ctx.print_debug(&format!("inline: {}", snippet.replace('\n', "; ")));

    if ctx.dry_run {
        return Ok(StepOutcome::Success);
    }

    ctx.session.run(snippet, &ctx.state.base_dir)
}
