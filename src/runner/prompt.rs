//! Interactive task confirmation

use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Operator's decision for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Continue,
    Skip,
    Abort,
}

/// Parse one line of input; `None` means ask again
pub fn parse_answer(input: &str) -> Option<Answer> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "c" | "continue" | "y" | "yes" => Some(Answer::Continue),
        "s" | "skip" | "n" | "no" => Some(Answer::Skip),
        "a" | "abort" | "q" | "quit" => Some(Answer::Abort),
        _ => None,
    }
}

/// Asks whether an active task should run
pub trait Prompter {
    fn ask(&mut self, task_num: usize, task_name: &str) -> io::Result<Answer>;
}

/// Prompter reading answers line by line
pub struct LinePrompter<R> {
    input: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(input: R) -> Self {
        LinePrompter { input }
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn ask(&mut self, task_num: usize, task_name: &str) -> io::Result<Answer> {
        loop {
            print!(
                "{} {} {} ",
                format!("Run task {} ({})?", task_num, task_name).bold(),
                "[C]ontinue / [s]kip / [a]bort".dimmed(),
                ">".cyan()
            );
            io::stdout().flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // No more input can ever arrive
                println!();
                return Ok(Answer::Abort);
            }

            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => println!("Please answer c, s or a."),
            }
        }
    }
}

/// Prompter reading the process's stdin; the lock is only held while asking
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, task_num: usize, task_name: &str) -> io::Result<Answer> {
        LinePrompter::new(io::stdin().lock()).ask(task_num, task_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("\n"), Some(Answer::Continue));
        assert_eq!(parse_answer("C"), Some(Answer::Continue));
        assert_eq!(parse_answer(" skip "), Some(Answer::Skip));
        assert_eq!(parse_answer("a"), Some(Answer::Abort));
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let mut prompter = LinePrompter::new(Cursor::new("what\nnope\ns\n"));
        assert_eq!(prompter.ask(1, "Build").unwrap(), Answer::Skip);
    }

    #[test]
    fn test_end_of_input_aborts() {
        let mut prompter = LinePrompter::new(Cursor::new(""));
        assert_eq!(prompter.ask(1, "Build").unwrap(), Answer::Abort);
    }
}
