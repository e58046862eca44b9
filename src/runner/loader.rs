//! Script loading and inclusion
//!
//! A script is read, compiled and handed to the engine. `include PATTERN`
//! lines pull in further scripts, resolved relative to the including file,
//! which run to completion before control returns.

use crate::error::{ConfigError, ConfigResult, Result, TaskmarkError};
use crate::preprocess::{preprocess, Instruction};
use crate::runner::{Context, Engine};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read and compile a script
pub fn load_script(path: &Path) -> Result<Vec<Instruction>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            TaskmarkError::Config(ConfigError::ScriptNotFound(path.to_path_buf()))
        } else {
            TaskmarkError::Config(ConfigError::ScriptUnreadable {
                path: path.to_path_buf(),
                error: e.to_string(),
            })
        }
    })?;

    preprocess(&contents).map_err(|error| TaskmarkError::Script {
        path: path.to_path_buf(),
        error,
    })
}

/// Load a script and run it through the engine
pub fn run_script(engine: &mut Engine, ctx: &mut Context, path: &Path) -> Result<()> {
    let instructions = load_script(path)?;
    run_loaded(engine, ctx, path, &instructions)
}

fn run_loaded(
    engine: &mut Engine,
    ctx: &mut Context,
    path: &Path,
    instructions: &[Instruction],
) -> Result<()> {
    let key = canonical(path);
    if ctx.is_script_in_stack(&key) {
        let mut chain: Vec<String> = ctx
            .script_stack
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        chain.push(key.display().to_string());
        return Err(ConfigError::CircularInclude(chain.join(" -> ")).into());
    }

    ctx.print_debug(&format!("Running script {}", path.display()));
    ctx.push_script(key);
    let result = engine.run(ctx, instructions);
    ctx.pop_script();

    result
}

/// Run every script matched by an `include` pattern
pub fn include(engine: &mut Engine, ctx: &mut Context, pattern: &str) -> Result<()> {
    for path in resolve_include(&ctx.script_dir(), pattern)? {
        let instructions = load_script(&path)?;
        run_loaded(engine, ctx, &path, &instructions)?;
    }
    Ok(())
}

/// Expand an include pattern into sorted paths
pub fn resolve_include(base_dir: &Path, pattern: &str) -> ConfigResult<Vec<PathBuf>> {
    let full = base_dir.join(pattern);
    let full_str = full.to_string_lossy();

    let paths = glob::glob(&full_str).map_err(|e| ConfigError::IncludeFile {
        path: full.clone(),
        error: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| ConfigError::IncludeFile {
            path: e.path().to_path_buf(),
            error: e.error().to_string(),
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }
    matches.sort();

    if matches.is_empty() {
        return Err(ConfigError::IncludeFile {
            path: full,
            error: "no such file".to_string(),
        });
    }

    Ok(matches)
}

/// Number the tasks of a script and its includes without running anything
pub fn list_tasks(path: &Path) -> Result<Vec<(usize, String)>> {
    let mut tasks = Vec::new();
    let mut stack = Vec::new();
    collect_tasks(path, &mut stack, &mut tasks)?;
    Ok(tasks)
}

fn collect_tasks(
    path: &Path,
    stack: &mut Vec<PathBuf>,
    tasks: &mut Vec<(usize, String)>,
) -> Result<()> {
    let key = canonical(path);
    if stack.contains(&key) {
        return Err(ConfigError::CircularInclude(key.display().to_string()).into());
    }

    let instructions = load_script(path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    stack.push(key);

    for instruction in &instructions {
        match instruction {
            Instruction::StartTask { name, .. } => tasks.push((tasks.len() + 1, name.clone())),
            Instruction::Include { pattern, .. } => {
                for included in resolve_include(&dir, pattern)? {
                    collect_tasks(&included, stack, tasks)?;
                }
            }
            _ => {}
        }
    }

    stack.pop();
    Ok(())
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
