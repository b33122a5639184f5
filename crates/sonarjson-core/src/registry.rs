//! Host-facing interfaces for message lookup and enablement

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Lookup of message IDs the host can emit
pub trait MessageRegistry {
    fn is_known(&self, msg_id: &str) -> bool;
}

/// Host-wide message enablement
pub trait MessageToggle {
    /// Disable every message except `msg_ids`
    fn enable_only(&mut self, msg_ids: &BTreeSet<String>);
}

/// In-memory message registry and enablement state.
///
/// A permissive catalog treats every ID as known, which is what a host
/// that cannot enumerate its messages amounts to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    known: Option<BTreeSet<String>>,
    enabled: Option<BTreeSet<String>>,
}

impl MessageCatalog {
    /// Catalog that accepts any message ID
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Catalog that only knows `ids`
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(ids.into_iter().map(Into::into).collect()),
            enabled: None,
        }
    }

    /// Build a catalog from a message listing.
    ///
    /// Accepts the host's `--list-msgs` output, where IDs appear as
    /// `:symbol (C0114): *text*`, or a plain list with one ID per line.
    /// Blank lines and `#` comments are ignored.
    pub fn parse_message_listing(listing: &str) -> Self {
        static LISTED_ID: OnceLock<Regex> = OnceLock::new();
        let listed_id = LISTED_ID.get_or_init(|| {
            Regex::new(r"^:[\w-]+ \(([A-Z]\d{4})\)").expect("message listing regex is valid")
        });

        let lines: Vec<&str> = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        // `--list-msgs` interleaves descriptions; only the headers carry IDs.
        let listed: Vec<String> = lines
            .iter()
            .filter_map(|line| listed_id.captures(line).map(|caps| caps[1].to_string()))
            .collect();
        if !listed.is_empty() {
            return Self::from_ids(listed);
        }

        Self::from_ids(lines.iter().filter_map(|line| line.split_whitespace().next()))
    }

    pub fn is_permissive(&self) -> bool {
        self.known.is_none()
    }

    /// Whether the host should still emit `msg_id`
    pub fn is_enabled(&self, msg_id: &str) -> bool {
        match &self.enabled {
            Some(enabled) => enabled.contains(msg_id),
            None => true,
        }
    }

    /// Number of known IDs, if the catalog is not permissive
    pub fn known_count(&self) -> Option<usize> {
        self.known.as_ref().map(BTreeSet::len)
    }
}

impl MessageRegistry for MessageCatalog {
    fn is_known(&self, msg_id: &str) -> bool {
        match &self.known {
            Some(known) => known.contains(msg_id),
            None => true,
        }
    }
}

impl MessageToggle for MessageCatalog {
    fn enable_only(&mut self, msg_ids: &BTreeSet<String>) {
        self.enabled = Some(msg_ids.clone());
    }
}
