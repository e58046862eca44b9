//! Line classification

use regex::Regex;
use std::sync::LazyLock;

/// What a single physical line of markup is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Whitespace only
    Blank,

    /// `@ title`
    Task { title: &'a str, indent: usize },

    /// `- command`
    Step { text: &'a str, indent: usize },

    /// `include pattern`
    Include { pattern: &'a str, indent: usize },

    /// Anything else
    Other { indent: usize },
}

impl LineKind<'_> {
    /// Indentation of a non-blank line
    pub fn indent(&self) -> Option<usize> {
        match self {
            LineKind::Blank => None,
            LineKind::Task { indent, .. }
            | LineKind::Step { indent, .. }
            | LineKind::Include { indent, .. }
            | LineKind::Other { indent } => Some(*indent),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, LineKind::Blank)
    }
}

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*@[ \t]+(.*)$").unwrap());

static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*-[ \t]+(.*)$").unwrap());

static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*include[ \t]+(\S.*?)[ \t]*$").unwrap());

/// Count of leading spaces and tabs; a tab counts as one
pub fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Classify one line of markup
pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    let indent = indent_of(line);

    if let Some(caps) = TASK_RE.captures(line) {
        let title = caps.get(1).map_or("", |m| m.as_str()).trim_end();
        return LineKind::Task { title, indent };
    }

    if let Some(caps) = STEP_RE.captures(line) {
        let text = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::Step { text, indent };
    }

    if let Some(caps) = INCLUDE_RE.captures(line) {
        let pattern = caps.get(1).map_or("", |m| m.as_str());
        return LineKind::Include { pattern, indent };
    }

    LineKind::Other { indent }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_task() {
        assert_eq!(
            classify("@ Build it"),
            LineKind::Task {
                title: "Build it",
                indent: 0
            }
        );
        assert_eq!(
            classify("  @\tIndented  "),
            LineKind::Task {
                title: "Indented",
                indent: 2
            }
        );
    }

    #[test]
    fn test_classify_step() {
        assert_eq!(
            classify("    - echo 'a b'"),
            LineKind::Step {
                text: "echo 'a b'",
                indent: 4
            }
        );
    }

    #[test]
    fn test_marker_needs_whitespace() {
        assert_eq!(classify("@task"), LineKind::Other { indent: 0 });
        assert_eq!(classify("  -n flag"), LineKind::Other { indent: 2 });
        assert_eq!(classify("  --long"), LineKind::Other { indent: 2 });
    }

    #[test]
    fn test_classify_include() {
        assert_eq!(
            classify("include lib/*.tasks  "),
            LineKind::Include {
                pattern: "lib/*.tasks",
                indent: 0
            }
        );
        assert_eq!(classify("included"), LineKind::Other { indent: 0 });
    }

    #[test]
    fn test_blank_lines() {
        assert!(classify("").is_blank());
        assert!(classify(" \t ").is_blank());
        assert_eq!(classify(" \t ").indent(), None);
    }

    #[test]
    fn test_indent_counts_raw_whitespace() {
        assert_eq!(indent_of("\t\t- x"), 2);
        assert_eq!(indent_of(" \t x"), 3);
        assert_eq!(indent_of("x"), 0);
    }

    #[test]
    fn test_empty_title_is_still_a_task_marker() {
        assert_eq!(
            classify("@   "),
            LineKind::Task {
                title: "",
                indent: 0
            }
        );
    }
}
