//! Core configuration types
//!
//! This module defines the data structures that represent a taskmark.yml
//! settings file.

use crate::runner::Verbosity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run settings; every field is optional so files can be layered
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Interpreter used for steps (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Directory every task starts in, relative to the settings file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Print steps without running them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,

    /// Confirm each task before it runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<bool>,

    /// Log failed steps and continue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_going: Option<bool>,

    /// Load a `.env` file from the base directory before running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dotenv: Option<bool>,

    /// Output verbosity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
}

impl Settings {
    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            interpreter: other.interpreter.or(self.interpreter),
            base_dir: other.base_dir.or(self.base_dir),
            dry_run: other.dry_run.or(self.dry_run),
            ask: other.ask.or(self.ask),
            keep_going: other.keep_going.or(self.keep_going),
            dotenv: other.dotenv.or(self.dotenv),
            verbosity: other.verbosity.or(self.verbosity),
        }
    }
}
