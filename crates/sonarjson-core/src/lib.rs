//! pylint-sonarjson core
//!
//! Turns a host linter's issues into the SonarQube generic issue import
//! format, remapping severity, effort and type per message ID.
//! The JSON layout is a wire contract - never rename its fields.

pub mod config;
pub mod issue;
pub mod registry;
pub mod report;
pub mod rules;

pub use config::{parse_yn, ConfigError, SonarOptions};
pub use issue::{IssueType, RawIssue, Severity};
pub use registry::{MessageCatalog, MessageRegistry, MessageToggle};
pub use report::{OutputIssue, ReportError, SonarJsonReporter, SonarReport, ENGINE_ID};
pub use rules::{
    load_configuration, parse_rule_list, Defaults, ResolvedRule, RuleError, RuleOverride,
    RuleTable,
};
