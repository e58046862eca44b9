//! Integration tests for script preprocessing

mod common;

use taskmark::preprocess::{preprocess, render, Instruction};

const DEPLOY: &str = r#"#!/usr/bin/env taskmark
# Release checklist

@ Check the working tree
  - git status --short

@ Build
  - cargo build --release
  - for target in a b; do
      echo "building $target"

      echo "done $target"
    done

  - echo 'it''s built'

@ Nothing to do here

@ Publish
    - echo one \
        two
"#;

#[test]
fn test_start_and_end_are_balanced() {
    let instructions = preprocess(DEPLOY).unwrap();

    let starts = instructions.iter().filter(|i| i.is_start_task()).count();
    let ends = instructions.iter().filter(|i| i.is_end_task()).count();
    assert_eq!(starts, 4);
    assert_eq!(starts, ends);
}

#[test]
fn test_every_step_is_inside_a_task() {
    let instructions = preprocess(DEPLOY).unwrap();

    let mut open = false;
    for instruction in &instructions {
        match instruction {
            Instruction::StartTask { .. } => {
                assert!(!open, "task opened twice");
                open = true;
            }
            Instruction::EndTask => {
                assert!(open, "task closed twice");
                open = false;
            }
            Instruction::Step { .. } => assert!(open, "step outside of task"),
            _ => {}
        }
    }
    assert!(!open);
}

#[test]
fn test_preprocessing_is_deterministic() {
    let first = preprocess(DEPLOY).unwrap();
    let second = preprocess(DEPLOY).unwrap();
    assert_eq!(first, second);
    assert_eq!(render(&first), render(&second));
}

#[test]
fn test_multiline_step_with_inner_blank() {
    let instructions = preprocess(DEPLOY).unwrap();
    let steps: Vec<&str> = instructions
        .iter()
        .filter_map(|i| match i {
            Instruction::Step { command, .. } => Some(command.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(
        steps,
        vec![
            "git status --short",
            "cargo build --release",
            "for target in a b; do\n    echo \"building $target\"\n\n    echo \"done $target\"\n  done",
            "echo 'it''s built'",
            "echo one \\\n    two",
        ]
    );
}

#[test]
fn test_blank_after_step_stays_outside_command() {
    let script = "@ T\n  - echo a\n      more\n\n@ U\n  - echo b\n";
    let instructions = preprocess(script).unwrap();

    let step_pos = instructions
        .iter()
        .position(|i| matches!(i, Instruction::Step { command, .. } if command == "echo a\n    more"))
        .unwrap();
    assert_eq!(instructions[step_pos + 1], Instruction::Verbatim(String::new()));
    assert_eq!(instructions[step_pos + 2], Instruction::EndTask);
}

#[test]
fn test_rendered_script_quotes_steps() {
    let instructions = preprocess(DEPLOY).unwrap();
    let text = render(&instructions);

    assert!(text.starts_with("#!/usr/bin/env taskmark\n# Release checklist\n"));
    assert_eq!(text.matches("if ! task_skipped; then").count(), 4);
    assert_eq!(text.matches("\nend_task\n").count(), 4);

    let check = std::process::Command::new("sh")
        .args(["-n", "-c", text.as_str()])
        .output()
        .unwrap();
    assert!(check.status.success(), "{}", String::from_utf8_lossy(&check.stderr));
}

#[test]
fn test_rendered_step_reads_back_as_one_word() {
    let instructions = preprocess("@ A\n  - echo \"it's\" \\\n      done\n").unwrap();
    let words = shlex::split(&render(&instructions)).unwrap();

    let step = words.iter().position(|w| w == "step").unwrap();
    assert_eq!(words[step + 1], "echo \"it's\" \\\n    done");
    assert_eq!(words[0], "start_task");
    assert_eq!(words[1], "A");
}

#[test]
fn test_markup_errors_report_lines() {
    let err = preprocess("@ A\n  - ok\n\n    @ Nested\n").unwrap_err();
    assert_eq!(err.line(), 4);
    assert!(err.to_string().contains("@ Nested"));
}
