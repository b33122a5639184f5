//! Rule table: per-message overrides of severity, effort and type
//!
//! Rule lists use the syntax `<message id>:<severity>[:<effort minutes>[:<type>]]`,
//! comma separated, e.g. `C0326:MINOR:1,E0102:MAJOR:5:BUG`.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::SonarOptions;
use crate::issue::{IssueType, Severity};
use crate::registry::{MessageRegistry, MessageToggle};

/// Errors raised while building the rule table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Malformed entry or out-of-range value. Always fatal.
    #[error("invalid sonar rule: {0}")]
    Format(String),

    /// Message ID the host does not know. Fatal only when halting is enabled.
    #[error("{0} is not a known Pylint message id.")]
    UnknownRule(String),
}

/// Override parsed from one rule-list entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOverride {
    pub severity: Severity,
    pub effort: Option<u32>,
    pub issue_type: Option<IssueType>,
}

impl RuleOverride {
    /// Override that only changes severity
    pub fn severity(severity: Severity) -> Self {
        Self {
            severity,
            effort: None,
            issue_type: None,
        }
    }

    pub fn with_effort(mut self, effort: u32) -> Self {
        self.effort = Some(effort);
        self
    }

    pub fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    /// Fill unset fields from `defaults`
    pub fn resolve(&self, defaults: &Defaults) -> ResolvedRule {
        ResolvedRule {
            severity: self.severity,
            effort: self.effort.unwrap_or(defaults.effort),
            issue_type: self.issue_type.unwrap_or(defaults.issue_type),
        }
    }
}

/// Values used for any field no override sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    pub severity: Severity,
    pub effort: u32,
    pub issue_type: IssueType,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            severity: Severity::Minor,
            effort: 5,
            issue_type: IssueType::CodeSmell,
        }
    }
}

impl Defaults {
    fn resolved(&self) -> ResolvedRule {
        ResolvedRule {
            severity: self.severity,
            effort: self.effort,
            issue_type: self.issue_type,
        }
    }
}

/// Fully resolved severity, effort and type for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRule {
    pub severity: Severity,
    pub effort: u32,
    pub issue_type: IssueType,
}

/// Parse a comma-separated rule list.
///
/// Entries are trimmed and empty entries skipped, so `""` yields an empty
/// list. Entries are returned in input order, duplicates included.
pub fn parse_rule_list(list: &str) -> Result<Vec<(String, RuleOverride)>, RuleError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_rule)
        .collect()
}

fn parse_rule(entry: &str) -> Result<(String, RuleOverride), RuleError> {
    let fields: Vec<&str> = entry.split(':').collect();
    if fields.len() < 2 || fields.len() > 4 {
        return Err(RuleError::Format(format!(
            "{} does not match <message id>:<severity>[:<effort minutes>[:<type>]].",
            entry
        )));
    }

    let msg_id = fields[0];
    if msg_id.is_empty() {
        return Err(RuleError::Format(format!("{} has an empty message id.", entry)));
    }

    let mut rule = RuleOverride::severity(fields[1].parse()?);
    // An empty effort slot leaves effort unset so a type can still follow.
    if let Some(effort) = fields.get(2).filter(|effort| !effort.is_empty()) {
        rule = rule.with_effort(parse_effort(effort)?);
    }
    if let Some(issue_type) = fields.get(3) {
        rule = rule.with_type(issue_type.parse()?);
    }

    Ok((msg_id.to_string(), rule))
}

fn parse_effort(effort: &str) -> Result<u32, RuleError> {
    effort
        .parse()
        .map_err(|_| RuleError::Format(format!("{} is not a non-negative integer.", effort)))
}

/// Mapping from message ID to override, read-only once built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    rules: BTreeMap<String, RuleOverride>,
}

impl RuleTable {
    /// Build the table from `options`, validating IDs against `registry`.
    ///
    /// Format errors abort before any registry lookup. Unknown IDs abort when
    /// `halt_on_invalid_sonar_rules` is set, and are otherwise logged and
    /// dropped. A later entry for the same ID replaces an earlier one.
    pub fn build<R>(options: &SonarOptions, registry: &R) -> Result<Self, RuleError>
    where
        R: MessageRegistry + ?Sized,
    {
        let entries = parse_rule_list(&options.sonar_rules)?;

        let mut rules = BTreeMap::new();
        for (msg_id, rule) in entries {
            if !registry.is_known(&msg_id) {
                if options.halt_on_invalid_sonar_rules {
                    return Err(RuleError::UnknownRule(msg_id));
                }
                tracing::warn!("Disabling {} since it is not a known Pylint message id.", msg_id);
                continue;
            }
            rules.insert(msg_id, rule);
        }

        tracing::debug!(rules = rules.len(), "built sonar rule table");
        Ok(Self { rules })
    }

    /// Restrict the host to the messages named in this table
    pub fn restrict<T>(&self, toggle: &mut T)
    where
        T: MessageToggle + ?Sized,
    {
        tracing::debug!(enabled = self.rules.len(), "only enabling sonar rules");
        toggle.enable_only(&self.message_ids());
    }

    /// Resolve the effective rule for `msg_id`, falling back per field
    pub fn resolve(&self, msg_id: &str, defaults: &Defaults) -> ResolvedRule {
        match self.rules.get(msg_id) {
            Some(rule) => rule.resolve(defaults),
            None => defaults.resolved(),
        }
    }

    pub fn get(&self, msg_id: &str) -> Option<&RuleOverride> {
        self.rules.get(msg_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Entries ordered by message ID
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleOverride)> {
        self.rules.iter().map(|(id, rule)| (id.as_str(), rule))
    }

    pub fn message_ids(&self) -> BTreeSet<String> {
        self.rules.keys().cloned().collect()
    }

    /// Render back to rule-list syntax, ordered by message ID
    pub fn to_rule_list(&self) -> String {
        self.iter()
            .map(|(msg_id, rule)| {
                let mut entry = format!("{}:{}", msg_id, rule.severity);
                match (rule.effort, rule.issue_type) {
                    (Some(effort), Some(issue_type)) => {
                        entry.push_str(&format!(":{}:{}", effort, issue_type))
                    }
                    (Some(effort), None) => entry.push_str(&format!(":{}", effort)),
                    (None, Some(issue_type)) => entry.push_str(&format!("::{}", issue_type)),
                    (None, None) => {}
                }
                entry
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Startup routine: build the table and, if requested, restrict the host's
/// enabled messages to it.
pub fn load_configuration<H>(options: &SonarOptions, host: &mut H) -> Result<RuleTable, RuleError>
where
    H: MessageRegistry + MessageToggle + ?Sized,
{
    let table = RuleTable::build(options, &*host)?;
    if options.only_enable_sonar_rules {
        table.restrict(host);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MessageCatalog;

    fn options(rules: &str) -> SonarOptions {
        SonarOptions {
            sonar_rules: rules.to_string(),
            ..SonarOptions::default()
        }
    }

    #[test]
    fn parse_all_field_counts() {
        let parsed = parse_rule_list("C0326:MINOR,C0114:INFO:10,E0102:MAJOR:5:BUG").unwrap();
        assert_eq!(
            parsed,
            vec![
                ("C0326".to_string(), RuleOverride::severity(Severity::Minor)),
                ("C0114".to_string(), RuleOverride::severity(Severity::Info).with_effort(10)),
                (
                    "E0102".to_string(),
                    RuleOverride::severity(Severity::Major)
                        .with_effort(5)
                        .with_type(IssueType::Bug)
                ),
            ]
        );
    }

    #[test]
    fn parse_skips_blank_entries() {
        assert!(parse_rule_list("").unwrap().is_empty());
        assert_eq!(parse_rule_list(" C0114:INFO , ,").unwrap().len(), 1);
    }

    #[test]
    fn parse_rejects_missing_severity() {
        assert!(matches!(parse_rule_list("C0114"), Err(RuleError::Format(_))));
        assert!(matches!(parse_rule_list(":MAJOR"), Err(RuleError::Format(_))));
    }

    #[test]
    fn parse_rejects_too_many_fields() {
        assert!(matches!(
            parse_rule_list("C0114:INFO:1:BUG:extra"),
            Err(RuleError::Format(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_values() {
        assert!(matches!(parse_rule_list("C0114:HIGH"), Err(RuleError::Format(_))));
        assert!(matches!(parse_rule_list("C0114:INFO:-1"), Err(RuleError::Format(_))));
        assert!(matches!(parse_rule_list("C0114:INFO:ten"), Err(RuleError::Format(_))));
        assert!(matches!(parse_rule_list("C0114:INFO:1:SMELL"), Err(RuleError::Format(_))));
    }

    #[test]
    fn empty_effort_slot_leaves_effort_unset() {
        let parsed = parse_rule_list("C0114:INFO::BUG").unwrap();
        assert_eq!(
            parsed[0].1,
            RuleOverride::severity(Severity::Info).with_type(IssueType::Bug)
        );
        assert_eq!(
            parse_rule_list("C0114:INFO:").unwrap()[0].1,
            RuleOverride::severity(Severity::Info)
        );
    }

    #[test]
    fn format_errors_win_over_unknown_ids() {
        let registry = MessageCatalog::from_ids(["C0114"]);
        let err = RuleTable::build(&options("X9999:HIGH"), &registry).unwrap_err();
        assert!(matches!(err, RuleError::Format(_)));
    }

    #[test]
    fn unknown_id_halts_by_default() {
        let registry = MessageCatalog::from_ids(["C0114"]);
        let err = RuleTable::build(&options("X9999:MAJOR"), &registry).unwrap_err();
        assert_eq!(err, RuleError::UnknownRule("X9999".to_string()));
        assert_eq!(err.to_string(), "X9999 is not a known Pylint message id.");
    }

    #[test]
    fn unknown_id_dropped_without_halt() {
        let registry = MessageCatalog::from_ids(["C0114"]);
        let opts = SonarOptions {
            halt_on_invalid_sonar_rules: false,
            ..options("X9999:MAJOR,C0114:INFO")
        };
        let table = RuleTable::build(&opts, &registry).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("X9999").is_none());
    }

    #[test]
    fn duplicate_ids_last_entry_wins() {
        let registry = MessageCatalog::permissive();
        let table = RuleTable::build(&options("C0114:INFO:10,C0114:MAJOR"), &registry).unwrap();
        assert_eq!(table.get("C0114"), Some(&RuleOverride::severity(Severity::Major)));
    }

    #[test]
    fn resolve_falls_back_per_field() {
        let registry = MessageCatalog::permissive();
        let table = RuleTable::build(&options("C0114:INFO:10"), &registry).unwrap();
        let defaults = Defaults::default();

        let resolved = table.resolve("C0114", &defaults);
        assert_eq!(resolved.severity, Severity::Info);
        assert_eq!(resolved.effort, 10);
        assert_eq!(resolved.issue_type, IssueType::CodeSmell);

        let fallback = table.resolve("W0611", &defaults);
        assert_eq!(fallback, defaults.resolved());
    }

    #[test]
    fn only_enable_restricts_host() {
        let mut catalog = MessageCatalog::from_ids(["C0114", "W0611", "E0102"]);
        let opts = SonarOptions {
            only_enable_sonar_rules: true,
            ..options("C0114:INFO,E0102:MAJOR")
        };
        load_configuration(&opts, &mut catalog).unwrap();
        assert!(catalog.is_enabled("C0114"));
        assert!(catalog.is_enabled("E0102"));
        assert!(!catalog.is_enabled("W0611"));
    }

    #[test]
    fn host_untouched_without_only_enable() {
        let mut catalog = MessageCatalog::from_ids(["C0114", "W0611"]);
        load_configuration(&options("C0114:INFO"), &mut catalog).unwrap();
        assert!(catalog.is_enabled("W0611"));
    }

    #[test]
    fn rule_list_rendering_reparses_to_same_table() {
        let registry = MessageCatalog::permissive();
        let table = RuleTable::build(
            &options("E0102:MAJOR:5:BUG,C0114:INFO:10,C0326:MINOR,W0611:INFO::VULNERABILITY"),
            &registry,
        )
        .unwrap();
        let rendered = table.to_rule_list();
        assert_eq!(
            rendered,
            "C0114:INFO:10,C0326:MINOR,E0102:MAJOR:5:BUG,W0611:INFO::VULNERABILITY"
        );

        let again = RuleTable::build(&options(&rendered), &registry).unwrap();
        assert_eq!(table, again);
    }
}
