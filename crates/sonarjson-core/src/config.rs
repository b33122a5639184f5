//! Configuration schema (sonarjson.toml)
//!
//! Keys carry the same names as the host's command-line options:
//!
//! ```toml
//! sonar-rules = "C0114:INFO:10,E0102:MAJOR:5:BUG"
//! sonar-default-severity = "MINOR"
//! sonar-default-effort = 5
//! sonar-default-type = "CODE_SMELL"
//! only-enable-sonar-rules = false
//! halt-on-invalid-sonar-rules = true
//! ```

use serde::{Deserialize, Serialize};

use crate::issue::{IssueType, Severity};
use crate::rules::Defaults;

/// Reporter options, passed explicitly to the rule table builder and formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SonarOptions {
    /// Comma-separated `<message id>:<severity>[:<effort>[:<type>]]` entries
    pub sonar_rules: String,

    /// Severity for messages without an override
    pub sonar_default_severity: Severity,

    /// Effort minutes for messages without an override
    pub sonar_default_effort: u32,

    /// Issue type for messages without an override
    pub sonar_default_type: IssueType,

    /// Disable every host message not listed in `sonar_rules`
    pub only_enable_sonar_rules: bool,

    /// Abort on unknown message IDs instead of warning and skipping them
    pub halt_on_invalid_sonar_rules: bool,
}

impl Default for SonarOptions {
    fn default() -> Self {
        let defaults = Defaults::default();
        Self {
            sonar_rules: String::new(),
            sonar_default_severity: defaults.severity,
            sonar_default_effort: defaults.effort,
            sonar_default_type: defaults.issue_type,
            only_enable_sonar_rules: false,
            halt_on_invalid_sonar_rules: true,
        }
    }
}

impl SonarOptions {
    /// Fallback values for issues without a (complete) override
    pub fn defaults(&self) -> Defaults {
        Defaults {
            severity: self.sonar_default_severity,
            effort: self.sonar_default_effort,
            issue_type: self.sonar_default_type,
        }
    }

    /// Load options from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&contents)
    }

    /// Load options from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Parse a yes/no option value the way the host does
pub fn parse_yn(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Ok(true),
        "n" | "no" | "false" => Ok(false),
        _ => Err(ConfigError::Parse(format!(
            "{} is not a valid yes/no value (expected y or n)",
            value
        ))),
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
