//! Error types for Taskmark

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Taskmark operations
pub type Result<T> = std::result::Result<T, TaskmarkError>;

/// Exit code for a clean run
pub const EXIT_OK: i32 = 0;
/// Exit code when a step failed and the failure handler stopped the run
pub const EXIT_STEP_FAILED: i32 = 1;
/// Exit code for configuration and markup errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when the operator aborted from the prompt
pub const EXIT_ABORTED: i32 = 3;

/// Main error type for Taskmark
#[derive(Error, Debug)]
pub enum TaskmarkError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Markup errors in a script file
    #[error("Script error in {}: {}", .path.display(), .error)]
    Script {
        path: PathBuf,
        #[source]
        error: PreprocessError,
    },

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TaskmarkError {
    /// Process exit code for this error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            TaskmarkError::Config(_)
            | TaskmarkError::Script { .. }
            | TaskmarkError::Yaml(_)
            | TaskmarkError::Io(_) => EXIT_CONFIG,
            // An interpreter that cannot start is a setup problem, not a failed step
            TaskmarkError::Execution(ExecutionError::Spawn { .. }) => EXIT_CONFIG,
            TaskmarkError::Execution(ExecutionError::Aborted) => EXIT_ABORTED,
            TaskmarkError::Execution(_) => EXIT_STEP_FAILED,
        }
    }
}

/// Configuration and selector errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find script '{}'", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("Failed to read script '{}': {error}", .path.display())]
    ScriptUnreadable { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("--only and --skip cannot be used together")]
    ConflictingSelectors,

    #[error("Invalid range '{0}'")]
    InvalidRange(String),

    #[error("Failed to include file '{}': {error}", .path.display())]
    IncludeFile { path: PathBuf, error: String },

    #[error("Circular include detected: {0}")]
    CircularInclude(String),
}

/// Malformed markup, located by 1-based line number
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreprocessError {
    #[error("line {line}: step outside of any task: {text}")]
    StepOutsideTask { line: usize, text: String },

    #[error("line {line}: task opened inside another task: {text}")]
    NestedTask { line: usize, text: String },

    #[error("line {line}: task has no title: {text}")]
    EmptyTaskTitle { line: usize, text: String },

    #[error("line {line}: include is only allowed outside of tasks: {text}")]
    IncludeInsideTask { line: usize, text: String },
}

impl PreprocessError {
    /// Line number the error points at
    pub fn line(&self) -> usize {
        match self {
            PreprocessError::StepOutsideTask { line, .. }
            | PreprocessError::NestedTask { line, .. }
            | PreprocessError::EmptyTaskTitle { line, .. }
            | PreprocessError::IncludeInsideTask { line, .. } => *line,
        }
    }
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task {task_num} failed: '{command}' exited with {}", render_code(.code))]
    StepFailed {
        task_num: usize,
        command: String,
        code: Option<i32>,
    },

    #[error("Failed to start '{command}': {error}")]
    Spawn { command: String, error: String },

    #[error("Interpreter session failed: {0}")]
    Session(String),

    #[error("Aborted by operator")]
    Aborted,

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

fn render_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit status".to_string(),
    }
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for preprocessing
pub type PreprocessResult<T> = std::result::Result<T, PreprocessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let config: TaskmarkError = ConfigError::ConflictingSelectors.into();
        let failed: TaskmarkError = ExecutionError::StepFailed {
            task_num: 1,
            command: "false".to_string(),
            code: Some(1),
        }
        .into();
        let aborted: TaskmarkError = ExecutionError::Aborted.into();

        assert_eq!(config.exit_code(), EXIT_CONFIG);
        assert_eq!(failed.exit_code(), EXIT_STEP_FAILED);
        assert_eq!(aborted.exit_code(), EXIT_ABORTED);
        assert_ne!(EXIT_OK, EXIT_ABORTED);
    }

    #[test]
    fn test_setup_failures_use_config_code() {
        let spawn: TaskmarkError = ExecutionError::Spawn {
            command: "zsh -c".to_string(),
            error: "No such file or directory".to_string(),
        }
        .into();
        let unreadable: TaskmarkError = ConfigError::ScriptUnreadable {
            path: PathBuf::from("main.tasks"),
            error: "Permission denied".to_string(),
        }
        .into();
        let session: TaskmarkError = ExecutionError::Session("broken pipe".to_string()).into();

        assert_eq!(spawn.exit_code(), EXIT_CONFIG);
        assert_eq!(unreadable.exit_code(), EXIT_CONFIG);
        assert_eq!(session.exit_code(), EXIT_STEP_FAILED);
        assert_eq!(
            unreadable.to_string(),
            "Configuration error: Failed to read script 'main.tasks': Permission denied"
        );
    }

    #[test]
    fn test_step_failed_message_names_task() {
        let err = ExecutionError::StepFailed {
            task_num: 4,
            command: "make".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "Task 4 failed: 'make' exited with exit code 2");
    }

    #[test]
    fn test_preprocess_error_line() {
        let err = PreprocessError::NestedTask {
            line: 7,
            text: "  @ inner".to_string(),
        };
        assert_eq!(err.line(), 7);
        assert!(err.to_string().starts_with("line 7:"));
    }
}
