//! Indentation-driven block compiler
//!
//! At most two blocks are open at any time: a task and, inside it, a command.
//! A non-blank line indented less than an open block closes it; the command
//! always closes first since steps sit at or beyond their task's indent.

use crate::error::{PreprocessError, PreprocessResult};
use crate::preprocess::{classify, Instruction, LineKind};

/// Open task frame
#[derive(Debug)]
struct OpenTask {
    indent: usize,
}

/// Open command frame
#[derive(Debug)]
struct OpenCommand {
    indent: usize,
    line: usize,
    text: String,
    /// Blank lines seen since the last non-blank continuation, kept verbatim
    blank_run: Vec<String>,
}

/// Single-pass markup compiler
#[derive(Debug, Default)]
pub struct Preprocessor {
    output: Vec<Instruction>,
    task: Option<OpenTask>,
    command: Option<OpenCommand>,
    line_no: usize,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next physical line
    pub fn feed(&mut self, line: &str) -> PreprocessResult<()> {
        self.line_no += 1;
        let kind = classify(line);

        if let Some(indent) = kind.indent() {
            if self.command.as_ref().is_some_and(|c| indent < c.indent) {
                self.close_command();
            }
            if self.task.as_ref().is_some_and(|t| indent < t.indent) {
                self.close_task();
            }
        }

        match kind {
            LineKind::Task { title, indent } => {
                self.close_command();
                if self.task.as_ref().is_some_and(|t| indent <= t.indent) {
                    self.close_task();
                }
                if self.task.is_some() {
                    return Err(PreprocessError::NestedTask {
                        line: self.line_no,
                        text: line.to_string(),
                    });
                }
                if title.is_empty() {
                    return Err(PreprocessError::EmptyTaskTitle {
                        line: self.line_no,
                        text: line.to_string(),
                    });
                }
                self.task = Some(OpenTask { indent });
                self.output.push(Instruction::StartTask {
                    name: title.to_string(),
                    line: self.line_no,
                });
            }
            LineKind::Step { text, indent } => {
                self.close_command();
                if self.task.is_none() {
                    return Err(PreprocessError::StepOutsideTask {
                        line: self.line_no,
                        text: line.to_string(),
                    });
                }
                self.command = Some(OpenCommand {
                    indent,
                    line: self.line_no,
                    text: text.to_string(),
                    blank_run: Vec::new(),
                });
            }
            _ if self.command.is_some() => self.continue_command(line, kind.is_blank()),
            LineKind::Include { pattern, indent } => {
                if self.task.as_ref().is_some_and(|t| indent <= t.indent) {
                    self.close_task();
                }
                if self.task.is_some() {
                    return Err(PreprocessError::IncludeInsideTask {
                        line: self.line_no,
                        text: line.to_string(),
                    });
                }
                self.output.push(Instruction::Include {
                    pattern: pattern.to_string(),
                    line: self.line_no,
                });
            }
            LineKind::Blank | LineKind::Other { .. } => {
                self.output.push(Instruction::Verbatim(line.to_string()));
            }
        }

        Ok(())
    }

    /// Close whatever is still open and return the instructions
    pub fn finish(mut self) -> Vec<Instruction> {
        self.close_command();
        self.close_task();
        self.output
    }

    fn continue_command(&mut self, line: &str, blank: bool) {
        let Some(cmd) = self.command.as_mut() else {
            return;
        };

        if blank {
            // Placement depends on whether more command text follows
            cmd.blank_run.push(line.to_string());
            return;
        }

        cmd.text.push('\n');
        for _ in cmd.blank_run.drain(..) {
            cmd.text.push('\n');
        }
        // Leading whitespace is ASCII, so the indent is also a byte offset
        cmd.text.push_str(&line[cmd.indent..]);
    }

    fn close_command(&mut self) {
        if let Some(cmd) = self.command.take() {
            self.output.push(Instruction::Step {
                command: cmd.text,
                line: cmd.line,
            });
            self.output
                .extend(cmd.blank_run.into_iter().map(Instruction::Verbatim));
        }
    }

    fn close_task(&mut self) {
        if self.task.take().is_some() {
            self.output.push(Instruction::EndTask);
        }
    }
}

/// Compile markup text into instructions
pub fn preprocess(text: &str) -> PreprocessResult<Vec<Instruction>> {
    let mut pre = Preprocessor::new();
    for line in text.lines() {
        pre.feed(line)?;
    }
    Ok(pre.finish())
}
