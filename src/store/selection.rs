//! Target selection shared by every query.
//!
//! A raw selector may be missing, empty, a single id or a list of ids.
//! All of these normalize to a [`Selection`]; nothing is rejected.

use super::event_store::TargetId;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which targets participate in a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Every target in the store
    #[default]
    All,

    /// Exactly one target
    One(TargetId),

    /// A set of targets; empty when a selector named no valid id
    Many(BTreeSet<TargetId>),
}

impl Selection {
    /// Build a selection from a list of ids
    ///
    /// An empty list selects everything.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = TargetId>,
    {
        let ids: BTreeSet<TargetId> = ids.into_iter().collect();
        if ids.is_empty() {
            Selection::All
        } else {
            Selection::Many(ids)
        }
    }

    /// Normalize a raw comma-separated selector such as `"1,3"`
    ///
    /// Empty input, `all` and `*` select everything. Entries that are not
    /// integer ids are skipped with a warning. If ids were given but none
    /// of them parse, the selection matches no target at all.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") || raw == "*" {
            return Selection::All;
        }

        let tokens: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if tokens.is_empty() {
            return Selection::All;
        }

        let ids: BTreeSet<TargetId> = tokens
            .into_iter()
            .filter_map(|part| match part.parse::<TargetId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Ignoring non-numeric target id in selection: {:?}", part);
                    None
                }
            })
            .collect();

        if ids.is_empty() {
            warn!("Selection {:?} names no valid target id, nothing will match", raw);
        }
        Selection::Many(ids)
    }

    /// Check whether a target participates in this selection
    pub fn matches(&self, id: TargetId) -> bool {
        match self {
            Selection::All => true,
            Selection::One(selected) => *selected == id,
            Selection::Many(selected) => selected.contains(&id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Split a selection into one single-target selection per id
    ///
    /// `All` stays a single entry.
    pub fn split(&self) -> Vec<Selection> {
        match self {
            Selection::All => vec![Selection::All],
            Selection::One(id) => vec![Selection::One(*id)],
            Selection::Many(ids) => ids.iter().copied().map(Selection::One).collect(),
        }
    }
}

impl From<TargetId> for Selection {
    fn from(id: TargetId) -> Self {
        Selection::One(id)
    }
}

impl From<Option<TargetId>> for Selection {
    fn from(id: Option<TargetId>) -> Self {
        id.map_or(Selection::All, Selection::One)
    }
}

impl From<Vec<TargetId>> for Selection {
    fn from(ids: Vec<TargetId>) -> Self {
        Selection::from_ids(ids)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "all"),
            Selection::One(id) => write!(f, "{}", id),
            Selection::Many(ids) if ids.is_empty() => write!(f, "none"),
            Selection::Many(ids) => {
                let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "{}", joined.join(","))
            }
        }
    }
}
