//! Execution context for script running
//!
//! The context tracks all the state needed while walking a compiled script:
//! the task bookkeeping in [`RunState`], run options and the include stack.

use crate::runner::{Prompter, Selection, Session, StdinPrompter};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Task bookkeeping for one run
///
/// Only the task start/end handlers write `task_num`, `skip` and
/// `finished_tasks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    /// Number of the most recently started task, counting skipped ones
    pub task_num: usize,

    /// Tasks that ran to their end without being skipped
    pub finished_tasks: usize,

    /// Whether the open task is being skipped
    pub skip: bool,

    /// Title of the most recently started task
    pub task_name: String,

    /// Directory every active task starts in
    pub base_dir: PathBuf,

    /// Step failures let through by a tolerant failure handler
    pub tolerated_failures: usize,
}

impl RunState {
    pub fn new(base_dir: PathBuf) -> Self {
        RunState {
            task_num: 0,
            finished_tasks: 0,
            skip: false,
            task_name: String::new(),
            base_dir,
            tolerated_failures: 0,
        }
    }
}

/// Verbosity levels for output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    #[default]
    Normal = 2,
    Verbose = 3,
}

/// Execution context that tracks state during a run
pub struct Context {
    /// Task bookkeeping
    pub state: RunState,

    /// Scripts being run, outermost first (for detecting include cycles)
    pub script_stack: Vec<PathBuf>,

    /// Interpreter process shared by all commands of the run
    pub session: Session,

    /// Which task numbers run
    pub selection: Selection,

    /// Print steps without running them
    pub dry_run: bool,

    /// Confirm every active task with the operator
    pub ask: bool,

    /// Verbosity level
    pub verbosity: Verbosity,

    /// Source of answers for `ask` mode
    pub prompter: Box<dyn Prompter>,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        let base_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Context {
            state: RunState::new(base_dir),
            script_stack: Vec::new(),
            session: Session::new(vec!["sh".to_string(), "-c".to_string()]),
            selection: Selection::All,
            dry_run: false,
            ask: false,
            verbosity: Verbosity::Normal,
            prompter: Box::new(StdinPrompter),
        }
    }

    /// Set the directory every task starts in
    pub fn with_base_dir(mut self, dir: PathBuf) -> Self {
        self.state.base_dir = dir;
        self
    }

    /// Set the interpreter (e.g., ["bash", "-c"])
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.session = Session::new(interpreter);
        self
    }

    /// Set the task selection
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_ask(mut self, ask: bool) -> Self {
        self.ask = ask;
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Replace the prompt input (stdin by default)
    pub fn with_prompter(mut self, prompter: Box<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Push a script onto the include stack
    pub fn push_script(&mut self, path: PathBuf) {
        self.script_stack.push(path);
    }

    /// Pop a script from the include stack
    pub fn pop_script(&mut self) -> Option<PathBuf> {
        self.script_stack.pop()
    }

    /// Check if a script is already being run (include cycle)
    pub fn is_script_in_stack(&self, path: &Path) -> bool {
        self.script_stack.iter().any(|p| p == path)
    }

    /// Directory relative includes resolve against
    pub fn script_dir(&self) -> PathBuf {
        self.script_stack
            .last()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.state.base_dir.clone())
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            println!("{}", message);
        }
    }

    /// Print warning message
    pub fn print_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[debug]".dimmed(), message);
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, task_num: usize, task_name: &str) {
        self.print_info(&format!(
            "{} {}",
            format!("[{}]", task_num).green().bold(),
            task_name.bold()
        ));
    }

    /// Print task skip message
    pub fn print_task_skip(&self, task_num: usize, task_name: &str) {
        self.print_info(&format!(
            "{} {} {}",
            format!("[{}]", task_num).yellow(),
            task_name.dimmed(),
            "(skipped)".yellow()
        ));
    }

    /// Print task complete message
    pub fn print_task_complete(&self, task_num: usize, task_name: &str) {
        self.print_debug(&format!("Task {} completed: {}", task_num, task_name));
    }

    /// Print a step, one marked line per physical line
    pub fn print_command(&self, command: &str) {
        if self.verbosity < Verbosity::Normal {
            return;
        }
        for line in command.lines() {
            println!("  {} {}", "$".cyan(), line);
        }
    }

    /// Print the end-of-run summary
    pub fn print_summary(&self) {
        if self.verbosity < Verbosity::Quiet {
            return;
        }
        let finished = self.state.finished_tasks;
        let noun = if finished == 1 { "task" } else { "tasks" };
        let mut line = format!("{} {} finished", finished, noun);
        if self.state.tolerated_failures > 0 {
            line.push_str(&format!(
                ", {} failed step(s) ignored",
                self.state.tolerated_failures
            ));
        }
        if self.dry_run {
            line.push_str(" (dry run)");
        }
        println!("{}", line.bold());
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_new() {
        let ctx = Context::new();
        assert_eq!(ctx.verbosity, Verbosity::Normal);
        assert_eq!(ctx.session.interpreter(), ["sh", "-c"]);
        assert!(!ctx.session.is_running());
        assert_eq!(ctx.state.task_num, 0);
        assert_eq!(ctx.state.finished_tasks, 0);
        assert!(!ctx.state.skip);
        assert!(ctx.script_stack.is_empty());
        assert_eq!(ctx.selection, Selection::All);
    }

    #[test]
    fn test_with_base_dir() {
        let ctx = Context::new().with_base_dir(PathBuf::from("/tmp"));
        assert_eq!(ctx.state.base_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_script_stack() {
        let mut ctx = Context::new().with_base_dir(PathBuf::from("/work"));
        let main = PathBuf::from("/work/main.tasks");
        let lib = PathBuf::from("/work/lib/common.tasks");

        assert_eq!(ctx.script_dir(), PathBuf::from("/work"));

        ctx.push_script(main.clone());
        ctx.push_script(lib.clone());
        assert!(ctx.is_script_in_stack(&main));
        assert_eq!(ctx.script_dir(), PathBuf::from("/work/lib"));

        assert_eq!(ctx.pop_script(), Some(lib.clone()));
        assert!(!ctx.is_script_in_stack(&lib));
    }

    #[test]
    fn test_verbosity_levels() {
        assert!(Verbosity::Verbose > Verbosity::Normal);
        assert!(Verbosity::Normal > Verbosity::Quiet);
        assert!(Verbosity::Quiet > Verbosity::Silent);
    }

    #[test]
    fn test_with_interpreter() {
        let ctx = Context::new().with_interpreter(vec!["bash".to_string(), "-c".to_string()]);
        assert_eq!(ctx.session.interpreter(), ["bash", "-c"]);
    }

    #[test]
    fn test_verbosity_from_yaml() {
        let v: Verbosity = serde_yaml::from_str("quiet").unwrap();
        assert_eq!(v, Verbosity::Quiet);
    }
}
