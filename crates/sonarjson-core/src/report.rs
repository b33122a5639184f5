//! SonarQube generic issue report
//!
//! The JSON layout is the SonarQube generic issue import format and is a
//! wire contract: field names and order must not change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::issue::{IssueType, RawIssue, Severity};
use crate::rules::{Defaults, RuleTable};

/// Engine name stamped on every issue
pub const ENGINE_ID: &str = "PYLINT";

/// Errors raised while writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Position of an issue within its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRange {
    /// 1-indexed
    pub start_line: u32,

    /// 0-indexed
    pub start_column: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryLocation {
    pub message: String,
    pub file_path: String,
    pub text_range: TextRange,
}

/// One issue in the import format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputIssue {
    pub engine_id: String,
    pub rule_id: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub primary_location: PrimaryLocation,
    pub severity: Severity,
    pub effort_minutes: u32,
}

impl OutputIssue {
    /// Resolve `issue` against the rule table
    pub fn resolve(issue: RawIssue, rules: &RuleTable, defaults: &Defaults) -> Self {
        let resolved = rules.resolve(&issue.msg_id, defaults);

        Self {
            engine_id: ENGINE_ID.to_string(),
            rule_id: issue.msg_id,
            issue_type: resolved.issue_type,
            primary_location: PrimaryLocation {
                message: issue.message,
                file_path: issue.path,
                text_range: TextRange {
                    start_line: issue.line,
                    start_column: issue.column,
                    // Zero end positions mean "unknown" to the host.
                    end_line: issue.end_line.filter(|&line| line != 0),
                    end_column: issue.end_column.filter(|&column| column != 0),
                },
            },
            severity: resolved.severity,
            effort_minutes: resolved.effort,
        }
    }
}

/// Generic issue import document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SonarReport {
    pub issues: Vec<OutputIssue>,
}

impl SonarReport {
    /// Resolve every issue, keeping input order
    pub fn from_issues<I>(issues: I, rules: &RuleTable, defaults: &Defaults) -> Self
    where
        I: IntoIterator<Item = RawIssue>,
    {
        let issues: Vec<OutputIssue> = issues
            .into_iter()
            .map(|issue| OutputIssue::resolve(issue, rules, defaults))
            .collect();

        tracing::debug!(issues = issues.len(), "resolved sonar issues");
        Self { issues }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issue counts per severity
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }
        counts
    }

    /// Serialize to JSON with a four-space indent and trailing newline
    pub fn to_json(&self) -> Result<String, ReportError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        buf.push(b'\n');

        String::from_utf8(buf)
            .map_err(|e| ReportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Write the whole document to `out` in one go
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), ReportError> {
        let json = self.to_json()?;
        out.write_all(json.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Save to file, replacing any previous content.
    ///
    /// The document goes to a sibling temp file first and is renamed over
    /// `path`, so readers never see a partial report.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        let tmp = temp_sibling(path);

        if let Err(e) = std::fs::write(&tmp, json).and_then(|_| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "sonar-report.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Collects issues as the host reports them and renders them at shutdown
#[derive(Debug, Clone)]
pub struct SonarJsonReporter {
    rules: RuleTable,
    defaults: Defaults,
    messages: Vec<RawIssue>,
}

impl SonarJsonReporter {
    pub fn new(rules: RuleTable, defaults: Defaults) -> Self {
        Self {
            rules,
            defaults,
            messages: Vec::new(),
        }
    }

    /// Called by the host once per discovered issue
    pub fn handle_message(&mut self, issue: RawIssue) {
        self.messages.push(issue);
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Build the report from everything collected so far
    pub fn display_messages(&self) -> SonarReport {
        SonarReport::from_issues(self.messages.iter().cloned(), &self.rules, &self.defaults)
    }
}
