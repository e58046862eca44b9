//! Task engine
//!
//! Walks a compiled script, driving the task state machine through a
//! [`TaskHooks`] implementation. [`DefaultHooks`] gives the standard
//! behavior; wrappers such as [`KeepGoing`] change parts of it while
//! delegating the rest.

use crate::error::{ExecutionError, ExecutionResult, Result};
use crate::preprocess::Instruction;
use crate::runner::{execute_inline, execute_step, include, Answer, Context, StepOutcome};

/// Points where a run can be customized
pub trait TaskHooks {
    fn on_task_start(&mut self, ctx: &mut Context, name: &str) -> ExecutionResult<()>;

    fn on_task_end(&mut self, ctx: &mut Context) -> ExecutionResult<()>;

    fn on_step(&mut self, ctx: &mut Context, command: &str) -> ExecutionResult<StepOutcome>;

    /// Called after a step exits non-zero; returning `Ok` lets the run go on
    fn on_failure(
        &mut self,
        ctx: &mut Context,
        command: &str,
        code: Option<i32>,
    ) -> ExecutionResult<()>;
}

/// Number the task, decide whether it is skipped and confirm it if asked to
pub fn default_task_start(ctx: &mut Context, name: &str) -> ExecutionResult<()> {
    ctx.state.task_num += 1;
    ctx.state.task_name = name.to_string();
    let task_num = ctx.state.task_num;

    if ctx.selection.skips(task_num) {
        ctx.state.skip = true;
        ctx.print_task_skip(task_num, name);
        return Ok(());
    }

    ctx.state.skip = false;
    ctx.print_task_start(task_num, name);

    if ctx.ask {
        let answer = ctx
            .prompter
            .ask(task_num, name)
            .map_err(|e| ExecutionError::Prompt(e.to_string()))?;

        match answer {
            Answer::Continue => {}
            Answer::Skip => {
                ctx.state.skip = true;
                ctx.print_task_skip(task_num, name);
                return Ok(());
            }
            Answer::Abort => return Err(ExecutionError::Aborted),
        }
    }

    ctx.session.change_dir(&ctx.state.base_dir)?;
    Ok(())
}

/// Count the task if it ran and clear the skip flag
pub fn default_task_end(ctx: &mut Context) -> ExecutionResult<()> {
    if !ctx.state.skip {
        ctx.state.finished_tasks += 1;
        ctx.print_task_complete(ctx.state.task_num, &ctx.state.task_name);
    }
    ctx.state.skip = false;
    Ok(())
}

pub fn default_step(ctx: &mut Context, command: &str) -> ExecutionResult<StepOutcome> {
    execute_step(command, ctx)
}

/// Stop the run
pub fn default_failure(ctx: &mut Context, command: &str, code: Option<i32>) -> ExecutionResult<()> {
    Err(ExecutionError::StepFailed {
        task_num: ctx.state.task_num,
        command: command.to_string(),
        code,
    })
}

/// The standard hooks
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl TaskHooks for DefaultHooks {
    fn on_task_start(&mut self, ctx: &mut Context, name: &str) -> ExecutionResult<()> {
        default_task_start(ctx, name)
    }

    fn on_task_end(&mut self, ctx: &mut Context) -> ExecutionResult<()> {
        default_task_end(ctx)
    }

    fn on_step(&mut self, ctx: &mut Context, command: &str) -> ExecutionResult<StepOutcome> {
        default_step(ctx, command)
    }

    fn on_failure(
        &mut self,
        ctx: &mut Context,
        command: &str,
        code: Option<i32>,
    ) -> ExecutionResult<()> {
        default_failure(ctx, command, code)
    }
}

/// Logs failed steps and carries on instead of stopping
#[derive(Debug, Default)]
pub struct KeepGoing<H> {
    inner: H,
}

impl<H: TaskHooks> KeepGoing<H> {
    pub fn new(inner: H) -> Self {
        KeepGoing { inner }
    }
}

impl<H: TaskHooks> TaskHooks for KeepGoing<H> {
    fn on_task_start(&mut self, ctx: &mut Context, name: &str) -> ExecutionResult<()> {
        self.inner.on_task_start(ctx, name)
    }

    fn on_task_end(&mut self, ctx: &mut Context) -> ExecutionResult<()> {
        self.inner.on_task_end(ctx)
    }

    fn on_step(&mut self, ctx: &mut Context, command: &str) -> ExecutionResult<StepOutcome> {
        self.inner.on_step(ctx, command)
    }

    fn on_failure(
        &mut self,
        ctx: &mut Context,
        command: &str,
        code: Option<i32>,
    ) -> ExecutionResult<()> {
        let err = ExecutionError::StepFailed {
            task_num: ctx.state.task_num,
            command: command.lines().next().unwrap_or_default().to_string(),
            code,
        };
        ctx.print_warning(&format!("{} (continuing)", err));
        ctx.state.tolerated_failures += 1;
        Ok(())
    }
}

/// Interprets instruction lists
pub struct Engine {
    hooks: Box<dyn TaskHooks>,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_hooks(Box::new(DefaultHooks))
    }

    pub fn with_hooks(hooks: Box<dyn TaskHooks>) -> Self {
        Engine { hooks }
    }

    /// Run every instruction in order
    pub fn run(&mut self, ctx: &mut Context, instructions: &[Instruction]) -> Result<()> {
        let mut pending: Vec<&str> = Vec::new();

        for instruction in instructions {
            if let Instruction::Verbatim(line) = instruction {
                pending.push(line.as_str());
                continue;
            }
            self.flush_inline(ctx, &mut pending)?;

            match instruction {
                Instruction::StartTask { name, .. } => self.hooks.on_task_start(ctx, name)?,
                Instruction::EndTask => self.hooks.on_task_end(ctx)?,
                Instruction::Step { command, .. } => self.step(ctx, command)?,
                Instruction::Include { pattern, .. } => include(self, ctx, pattern)?,
                Instruction::Verbatim(_) => {}
            }
        }

        self.flush_inline(ctx, &mut pending)?;
        Ok(())
    }

    /// Print the summary and return the number of finished tasks
    pub fn finish(&mut self, ctx: &Context) -> usize {
        ctx.print_summary();
        ctx.state.finished_tasks
    }

    fn step(&mut self, ctx: &mut Context, command: &str) -> ExecutionResult<()> {
        if ctx.state.skip {
            return Ok(());
        }
        match self.hooks.on_step(ctx, command)? {
            StepOutcome::Success => Ok(()),
            StepOutcome::Failed(code) => self.hooks.on_failure(ctx, command, code),
        }
    }

    /// Run buffered lines between markers as one silent snippet
    fn flush_inline(&mut self, ctx: &mut Context, pending: &mut Vec<&str>) -> ExecutionResult<()> {
        let has_code = pending.iter().any(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });
        if !has_code || ctx.state.skip {
            pending.clear();
            return Ok(());
        }

        let snippet = pending.join("\n");
        pending.clear();

        match execute_inline(&snippet, ctx)? {
            StepOutcome::Success => Ok(()),
            StepOutcome::Failed(code) => self.hooks.on_failure(ctx, &snippet, code),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
