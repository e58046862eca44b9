//! Settings validation
//!
//! This module provides validation logic for settings files.

use crate::config::types::Settings;
use crate::error::{ConfigError, ConfigResult};

/// Validate a complete set of settings
pub fn validate_settings(settings: &Settings) -> ConfigResult<()> {
    if let Some(interpreter) = &settings.interpreter {
        validate_interpreter(interpreter)?;
    }

    if let Some(base_dir) = &settings.base_dir {
        if !base_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "Base directory {} does not exist",
                base_dir.display()
            )));
        }
    }

    Ok(())
}

/// An interpreter needs at least a program name
pub fn validate_interpreter(interpreter: &[String]) -> ConfigResult<()> {
    match interpreter.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Invalid(
            "Interpreter must name a program, e.g. [sh, -c]".to_string(),
        )),
    }
}
