//! Lint findings and the per-pass lint context.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintLevel {
    Warning,
    Error,
}

impl fmt::Display for LintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintLevel::Warning => f.write_str("warning"),
            LintLevel::Error => f.write_str("error"),
        }
    }
}

/// A single problem found in a config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lint {
    pub line: usize,
    pub column: usize,
    pub level: LintLevel,
    pub what: String,
}

impl Lint {
    pub fn error(line: usize, what: impl Into<String>) -> Self {
        Self {
            line,
            column: 1,
            level: LintLevel::Error,
            what: what.into(),
        }
    }

    pub fn warning(line: usize, what: impl Into<String>) -> Self {
        Self {
            line,
            column: 1,
            level: LintLevel::Warning,
            what: what.into(),
        }
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.level, self.what)
    }
}

/// State shared by every lint rule invoked during one pass over one document.
///
/// Build a fresh context per document; labels registered here are how
/// collisions are detected.
#[derive(Debug, Default)]
pub struct LintContext {
    pub labels_to_line: HashMap<String, usize>,
}

impl LintContext {
    pub fn new() -> Self {
        Self::default()
    }
}
