//! Issue records and Sonar enumerations
//!
//! IMPORTANT: The string forms of `Severity` and `IssueType` are dictated by
//! the SonarQube generic issue import format. Do not rename them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::rules::RuleError;

/// Sonar issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    /// All severities, in the order the host documents them
    pub const ALLOWED: [Severity; 5] = [
        Self::Blocker,
        Self::Critical,
        Self::Major,
        Self::Minor,
        Self::Info,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Critical => "CRITICAL",
            Self::Blocker => "BLOCKER",
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self::Minor
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALLOWED
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| RuleError::Format(format!("{} is not one of {}.", s, allowed(&Self::ALLOWED))))
    }
}

/// Sonar issue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Bug,
    Vulnerability,
    CodeSmell,
}

impl IssueType {
    pub const ALLOWED: [IssueType; 3] = [Self::Bug, Self::Vulnerability, Self::CodeSmell];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::Vulnerability => "VULNERABILITY",
            Self::CodeSmell => "CODE_SMELL",
        }
    }
}

impl Default for IssueType {
    fn default() -> Self {
        Self::CodeSmell
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALLOWED
            .into_iter()
            .find(|issue_type| issue_type.as_str() == s)
            .ok_or_else(|| RuleError::Format(format!("{} is not one of {}.", s, allowed(&Self::ALLOWED))))
    }
}

fn allowed<T: std::fmt::Display>(values: &[T]) -> String {
    let names: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("({})", names.join(", "))
}

/// One issue as reported by the host.
///
/// Read-only from the reporter's point of view; it never owns or edits the
/// host's records, only copies of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIssue {
    /// Message ID (e.g. `C0114`)
    pub msg_id: String,

    /// Human-readable message, possibly empty
    pub message: String,

    /// File path as the host reported it
    pub path: String,

    /// Line number (1-indexed)
    pub line: u32,

    /// Column number (0-indexed)
    pub column: u32,

    /// Optional end line (for ranges)
    pub end_line: Option<u32>,

    /// Optional end column (for ranges)
    pub end_column: Option<u32>,
}

impl RawIssue {
    /// Create an issue anchored at a single position
    pub fn new(
        msg_id: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            msg_id: msg_id.into(),
            message: message.into(),
            path: path.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Set the end of the range
    pub fn with_end(mut self, end_line: Option<u32>, end_column: Option<u32>) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }
}
