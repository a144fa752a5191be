//! Line classification and dispatch
//!
//! One tokenized line is classified into a [`LineShape`] and handed to the
//! matching strategy. Recognized operators are `|`, `>` and a trailing `&`;
//! every other token is passed through untouched.

use log::{debug, error};
use shell_core::{Result, ShellError};
use std::path::Path;

use crate::strategy;

pub const PIPE: &str = "|";
pub const REDIRECT: &str = ">";
pub const BACKGROUND: &str = "&";

fn is_operator(token: &str) -> bool {
    matches!(token, PIPE | REDIRECT | BACKGROUND)
}

fn reject_operators(tokens: &[String], context: &str) -> Result<()> {
    match tokens.iter().find(|t| is_operator(t)) {
        Some(op) => Err(ShellError::InvalidLine(format!(
            "unexpected '{}' {}",
            op, context
        ))),
        None => Ok(()),
    }
}

/// Execution shape of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    Foreground,
    Background,
    /// `at` is the index of the `|` token
    Pipeline { at: usize },
    /// `at` is the index of the `>` token; the file name follows it
    Redirect { at: usize },
}

/// Result of dispatching one line. Either way the caller keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Classify `argv`, stripping a trailing `&` in place.
///
/// After a successful classification no sub-vector the strategy will launch
/// contains an operator token.
pub fn classify(argv: &mut Vec<String>) -> Result<LineShape> {
    if argv.last().is_some_and(|t| t == BACKGROUND) {
        argv.pop();
        if argv.is_empty() {
            return Err(ShellError::InvalidLine(format!(
                "'{}' without a command",
                BACKGROUND
            )));
        }
        reject_operators(argv, "in a background command")?;
        return Ok(LineShape::Background);
    }

    if argv.is_empty() {
        return Err(ShellError::InvalidLine("empty command".to_string()));
    }

    if let Some(at) = argv.iter().position(|t| t == PIPE) {
        let (left, right) = (&argv[..at], &argv[at + 1..]);
        if left.is_empty() || right.is_empty() {
            return Err(ShellError::InvalidLine(format!(
                "'{}' needs a command on both sides",
                PIPE
            )));
        }
        reject_operators(left, "before '|'")?;
        reject_operators(right, "after '|'")?;
        return Ok(LineShape::Pipeline { at });
    }

    if let Some(at) = argv.iter().position(|t| t == REDIRECT) {
        if at == 0 {
            return Err(ShellError::InvalidLine(format!(
                "'{}' without a command",
                REDIRECT
            )));
        }
        if argv.len() != at + 2 {
            return Err(ShellError::InvalidLine(format!(
                "expected exactly one file name after '{}'",
                REDIRECT
            )));
        }
        reject_operators(&argv[at + 1..], "as a file name")?;
        reject_operators(&argv[..at], "before '>'")?;
        return Ok(LineShape::Redirect { at });
    }

    reject_operators(argv, "in the middle of a command")?;
    Ok(LineShape::Foreground)
}

fn execute(argv: &mut Vec<String>) -> Result<()> {
    let shape = classify(argv)?;
    debug!("Dispatching {:?} as {:?}", argv, shape);
    run(argv, shape)
}

fn run(argv: &[String], shape: LineShape) -> Result<()> {
    match shape {
        LineShape::Foreground => strategy::foreground(argv),
        LineShape::Background => strategy::background(argv),
        LineShape::Pipeline { at } => strategy::pipeline(&argv[..at], &argv[at + 1..]),
        LineShape::Redirect { at } => strategy::redirect(&argv[..at], Path::new(&argv[at + 1])),
    }
}

/// Execute one tokenized line.
///
/// Never terminates the orchestrator; every failure is logged and turned
/// into [`Outcome::Failure`]. An empty line does nothing and succeeds.
pub fn dispatch(argv: &mut Vec<String>) -> Outcome {
    if argv.is_empty() {
        return Outcome::Success;
    }

    match execute(argv) {
        Ok(()) => Outcome::Success,
        Err(e) => {
            error!("{}", e);
            Outcome::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn classify_plain_command() {
        let mut line = argv(&["echo", "hi"]);
        assert_eq!(classify(&mut line).unwrap(), LineShape::Foreground);
        assert_eq!(line, argv(&["echo", "hi"]));
    }

    #[test]
    fn classify_strips_background_marker() {
        let mut line = argv(&["sleep", "5", "&"]);
        assert_eq!(classify(&mut line).unwrap(), LineShape::Background);
        assert_eq!(line, argv(&["sleep", "5"]));
    }

    #[test]
    fn classify_pipeline_position() {
        let mut line = argv(&["ls", "|", "wc", "-l"]);
        assert_eq!(classify(&mut line).unwrap(), LineShape::Pipeline { at: 1 });
    }

    #[test]
    fn classify_redirect_position() {
        let mut line = argv(&["echo", "x", ">", "/tmp/out"]);
        assert_eq!(classify(&mut line).unwrap(), LineShape::Redirect { at: 2 });
    }

    #[test]
    fn pipe_takes_priority_over_redirect() {
        let mut line = argv(&["cat", ">", "f", "|", "wc"]);
        // The pipe decides the shape; the stray '>' on its left is rejected.
        let err = classify(&mut line).unwrap_err();
        assert!(err.to_string().contains("before '|'"));
    }

    #[test]
    fn operator_inside_a_token_is_not_an_operator() {
        let mut line = argv(&["sh", "-c", "echo a | cat > b"]);
        assert_eq!(classify(&mut line).unwrap(), LineShape::Foreground);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        let cases: &[&[&str]] = &[
            &["&"],
            &["|", "wc"],
            &["ls", "|"],
            &["a", "|", "b", "|", "c"],
            &["echo", ">"],
            &[">", "out"],
            &["echo", ">", "a", "b"],
            &["echo", ">", "|"],
            &["ls", "|", "wc", "&"],
            &["echo", "x", ">", "f", "&"],
            &["echo", "&", "more"],
        ];

        for case in cases {
            let mut line = argv(case);
            let err = classify(&mut line).unwrap_err();
            assert!(
                matches!(err, ShellError::InvalidLine(_)),
                "expected {:?} to be rejected, got {}",
                case,
                err
            );
        }
    }

    #[test]
    fn empty_line_is_a_no_op() {
        let mut line = Vec::new();
        assert_eq!(dispatch(&mut line), Outcome::Success);
    }

    #[test]
    fn malformed_line_reports_failure_without_spawning() {
        let mut line = argv(&["echo", ">"]);
        assert_eq!(dispatch(&mut line), Outcome::Failure);
    }

    #[test]
    fn test_outcome_is_success() {
        assert!(Outcome::Success.is_success());
        assert!(!Outcome::Failure.is_success());
    }
}
