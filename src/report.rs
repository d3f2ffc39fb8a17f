//! Problems found by the inspection and how they are printed.

use crate::ast::{Node, Span};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for problems
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "hint" | "note" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" | "err" => Ok(Severity::Error),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// One anchor in an unexpected position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Byte range of the anchor in the pattern.
    pub start: usize,
    pub end: usize,
    /// The anchor as written, e.g. `^` or `\A`.
    pub anchor: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl Problem {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// 1-based column of the anchor, counted in characters.
    pub fn column(&self, pattern: &str) -> usize {
        pattern
            .get(..self.start)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0)
            + 1
    }
}

/// Receives problems as the inspection finds them.
pub trait ProblemSink {
    /// `text` is the full pattern the node belongs to.
    fn report(&mut self, node: &Node, text: &str, message: &str);
}

impl ProblemSink for Vec<Problem> {
    fn report(&mut self, node: &Node, text: &str, message: &str) {
        self.push(Problem {
            start: node.span.start,
            end: node.span.end,
            anchor: node.span.text(text).to_string(),
            message: message.to_string(),
            severity: Severity::default(),
        });
    }
}

/// `pattern:col: severity: message`, one line per problem.
pub fn render_text(pattern: &str, problems: &[Problem], color: bool) -> String {
    let mut out = String::new();
    for problem in problems {
        let severity = problem.severity.to_string();
        let severity = if !color {
            severity
        } else {
            match problem.severity {
                Severity::Error => severity.red().bold().to_string(),
                Severity::Warning => severity.yellow().bold().to_string(),
                Severity::Info => severity.blue().to_string(),
            }
        };
        out.push_str(&format!(
            "{}:{}: {}: {}\n",
            pattern,
            problem.column(pattern),
            severity,
            problem.message
        ));
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    pattern: &'a str,
    problems: &'a [Problem],
}

pub fn render_json(pattern: &str, problems: &[Problem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&JsonReport { pattern, problems })
}
