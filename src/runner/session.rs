//! Persistent interpreter session
//!
//! All commands of a run go through one interpreter process, so `cd`,
//! variables and functions carry over from one command to the next. Each
//! command is written to a scratch file that the interpreter sources; the
//! exit status comes back on fd 3, which keeps the interpreter's original
//! stdout while command output is sent to stderr.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::StepOutcome;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command as StdCommand, Stdio};
use tempfile::TempDir;

/// Read loop run by the interpreter; commands never see its stdin
const BOOTSTRAP: &str = r#"exec 3>&1 1>&2
while IFS= read -r __taskmark_cmd; do
  . "$__taskmark_cmd" </dev/null
  printf '%s\n' "$?" >&3
done"#;

/// A running interpreter
struct Live {
    child: Child,
    stdin: ChildStdin,
    status: BufReader<ChildStdout>,
}

/// Interpreter process shared by every command of a run
///
/// The process is started on the first command, so dry runs never spawn
/// anything. If a command ends the interpreter (e.g. `exit 3`), the next
/// command starts a fresh one.
pub struct Session {
    interpreter: Vec<String>,
    scratch: Option<TempDir>,
    live: Option<Live>,
}

impl Session {
    pub fn new(interpreter: Vec<String>) -> Self {
        Session {
            interpreter,
            scratch: None,
            live: None,
        }
    }

    /// Program and leading arguments; the bootstrap loop is appended
    pub fn interpreter(&self) -> &[String] {
        &self.interpreter
    }

    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    /// Run `command`, starting the interpreter in `start_dir` if needed
    pub fn run(&mut self, command: &str, start_dir: &Path) -> ExecutionResult<StepOutcome> {
        let script = self.write_command(command)?;
        let mut live = match self.live.take() {
            Some(live) => live,
            None => self.start(start_dir)?,
        };

        let line = format!("{}\n", script.display());
        if let Err(e) = live
            .stdin
            .write_all(line.as_bytes())
            .and_then(|_| live.stdin.flush())
        {
            let _ = live.child.wait();
            return Err(ExecutionError::Session(format!(
                "interpreter stopped accepting commands: {}",
                e
            )));
        }

        let mut reply = String::new();
        let read = live
            .status
            .read_line(&mut reply)
            .map_err(|e| ExecutionError::Session(e.to_string()))?;

        if read == 0 {
            // The command ended the interpreter itself
            let status = live
                .child
                .wait()
                .map_err(|e| ExecutionError::Session(e.to_string()))?;
            return Ok(if status.success() {
                StepOutcome::Success
            } else {
                StepOutcome::Failed(status.code())
            });
        }

        self.live = Some(live);
        match reply.trim().parse::<i32>() {
            Ok(0) => Ok(StepOutcome::Success),
            Ok(code) => Ok(StepOutcome::Failed(Some(code))),
            Err(_) => Err(ExecutionError::Session(format!(
                "unexpected status line '{}'",
                reply.trim()
            ))),
        }
    }

    /// Move a running interpreter to `dir`; a stopped one starts there anyway
    pub fn change_dir(&mut self, dir: &Path) -> ExecutionResult<()> {
        if !self.is_running() {
            return Ok(());
        }

        let path = dir.to_string_lossy();
        let command = format!("cd {}", crate::preprocess::quote(&path));
        match self.run(&command, dir)? {
            StepOutcome::Success => Ok(()),
            StepOutcome::Failed(_) => Err(ExecutionError::Session(format!(
                "cannot enter {}",
                dir.display()
            ))),
        }
    }

    fn write_command(&mut self, command: &str) -> ExecutionResult<PathBuf> {
        if self.scratch.is_none() {
            let dir = tempfile::Builder::new()
                .prefix("taskmark-")
                .tempdir()
                .map_err(|e| ExecutionError::Session(e.to_string()))?;
            self.scratch = Some(dir);
        }

        let Some(scratch) = self.scratch.as_ref() else {
            return Err(ExecutionError::Session("no scratch directory".to_string()));
        };
        let path = scratch.path().join("command.sh");
        fs::write(&path, format!("{}\n", command))
            .map_err(|e| ExecutionError::Session(e.to_string()))?;
        Ok(path)
    }

    fn start(&self, start_dir: &Path) -> ExecutionResult<Live> {
        let spawn_error = |error: String| ExecutionError::Spawn {
            command: self.interpreter.join(" "),
            error,
        };

        let (program, args) = self
            .interpreter
            .split_first()
            .ok_or_else(|| spawn_error("no interpreter configured".to_string()))?;

        let mut child = StdCommand::new(program)
            .args(args)
            .arg(BOOTSTRAP)
            .current_dir(start_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(e.to_string()))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(spawn_error("interpreter pipes unavailable".to_string()));
        };

        Ok(Live {
            child,
            stdin,
            status: BufReader::new(stdout),
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(Live {
            mut child, stdin, ..
        }) = self.live.take()
        {
            // End of input stops the read loop
            drop(stdin);
            let _ = child.wait();
        }
    }
}
