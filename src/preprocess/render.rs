//! Rendering instructions as a shell script
//!
//! Used by `--emit` to show what a script compiles to. Task bodies are
//! wrapped in `if ! task_skipped; then ... fi` so a skipped task's steps stay
//! inert when the rendered text is sourced by a shell providing those
//! functions.

use crate::preprocess::Instruction;
use std::borrow::Cow;

/// Quote `text` as one shell word that reads back byte for byte
pub fn quote(text: &str) -> Cow<'_, str> {
    match shlex::try_quote(text) {
        Ok(quoted) => quoted,
        // NUL bytes are rejected by shlex; single quotes keep them literal
        Err(_) => Cow::Owned(format!("'{}'", text.replace('\'', r"'\''"))),
    }
}

/// Render the instruction list as shell text
pub fn render(instructions: &[Instruction]) -> String {
    let mut out = String::new();
    // `if ...; then fi` is a syntax error, so an empty body gets a `:`
    let mut body_empty = false;

    for instruction in instructions {
        match instruction {
            Instruction::StartTask { name, .. } => {
                out.push_str(&format!("start_task {}\n", quote(name)));
                out.push_str("if ! task_skipped; then\n");
                body_empty = true;
            }
            Instruction::EndTask => {
                if body_empty {
                    out.push_str(":\n");
                }
                out.push_str("fi\n");
                out.push_str("end_task\n");
                body_empty = false;
            }
            Instruction::Step { command, .. } => {
                out.push_str(&format!("step {}\n", quote(command)));
                body_empty = false;
            }
            Instruction::Include { pattern, .. } => {
                out.push_str(&format!("include {}\n", quote(pattern)));
            }
            Instruction::Verbatim(line) => {
                out.push_str(line);
                out.push('\n');
                let code = line.trim();
                if !code.is_empty() && !code.starts_with('#') {
                    body_empty = false;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;

    #[test]
    fn test_render_wraps_task_body() {
        let instructions = preprocess("@ Build\n  - make\n").unwrap();
        let text = render(&instructions);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("start_task "));
        assert_eq!(lines[1], "if ! task_skipped; then");
        assert_eq!(lines[2], "step make");
        assert_eq!(lines[3], "fi");
        assert_eq!(lines[4], "end_task");
    }

    #[test]
    fn test_empty_task_renders_valid_shell() {
        let instructions = preprocess("@ Empty\n@ Commented\n  # nothing yet\n").unwrap();
        let text = render(&instructions);
        assert_eq!(text.matches(":\nfi\n").count(), 2);

        let output = std::process::Command::new("sh")
            .arg("-n")
            .arg("-c")
            .arg(&text)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn test_quote_reads_back_multiline_command() {
        let command = "echo \"it's\" \\\n  done\nprintf '%s\\n' a";
        let quoted = quote(command);
        let words = shlex::split(&quoted).unwrap();
        assert_eq!(words, vec![command.to_string()]);
    }

    #[test]
    fn test_quote_title_with_spaces() {
        let words = shlex::split(&quote("First task")).unwrap();
        assert_eq!(words, vec!["First task".to_string()]);
    }

    #[test]
    fn test_render_keeps_verbatim_lines() {
        let instructions = preprocess("# hi\n\n@ T\n").unwrap();
        let text = render(&instructions);
        assert!(text.starts_with("# hi\n\nstart_task T\n"));
    }
}
