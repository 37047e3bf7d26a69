//! Core types for brgen-core — the canonical battle report.
//!
//! This module defines the output side of the normalizer: the
//! [`CanonicalReport`], its two [`SideSummary`] halves, the per-side
//! [`ShipGroup`] tallies, and the adapted [`Participant`] shape that the
//! aggregation step consumes. Raw, heterogeneous input lives in
//! [`crate::payload`].

use serde::{Deserialize, Serialize};

/// Identity of the character (or account) a report is attributed to.
///
/// EVE character IDs are numeric; free-form names are accepted for callers
/// that identify viewers some other way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Character(u64),
    Named(String),
}

impl From<u64> for Identity {
    fn from(id: u64) -> Self {
        Identity::Character(id)
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Identity::Named(name.to_string())
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Character(id) => write!(f, "{id}"),
            Identity::Named(name) => write!(f, "{name}"),
        }
    }
}

impl std::str::FromStr for Identity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u64>()
            .map(Identity::Character)
            .unwrap_or_else(|_| Identity::Named(s.to_string())))
    }
}

/// Which side of a battle a participant counts towards.
///
/// Assigned by the array a participant came from (`defenders` are friendly,
/// `attackers` are enemy), never by anything on the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Friendly,
    Enemy,
}

impl Side {
    /// CSS-style class the report viewer uses for this side's section.
    pub fn display_class(self) -> &'static str {
        match self {
            Side::Friendly => "section-friendly",
            Side::Enemy => "section-enemy",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Friendly => write!(f, "Friendly"),
            Side::Enemy => write!(f, "Enemy"),
        }
    }
}

/// A participant after field-name reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub ship_type_name: String,
    /// Always finite and `>= 0`.
    pub isk_value: f64,
    pub pilot_name: Option<String>,
}

/// Number of participants of one ship type on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipGroup {
    #[serde(rename = "type")]
    pub ship_type: String,
    pub count: u32,
}

/// Aggregated losses and ship tallies for one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSummary {
    pub name: String,
    pub total_isk_lost: f64,
    /// One entry per distinct ship type, in first-seen order.
    pub ships: Vec<ShipGroup>,
    pub display_class: String,
}

impl SideSummary {
    /// An empty summary for `side`: no losses, no ships.
    pub fn empty(side: Side) -> Self {
        Self {
            name: side.to_string(),
            total_isk_lost: 0.0,
            ships: Vec::new(),
            display_class: side.display_class().to_string(),
        }
    }

    /// Fold one participant into the running totals.
    ///
    /// The total saturates at `f64::MAX` so it always serialises as a number.
    pub fn record(&mut self, participant: &Participant) {
        self.total_isk_lost = saturating_isk_sum(self.total_isk_lost, participant.isk_value);
        match self
            .ships
            .iter_mut()
            .find(|g| g.ship_type == participant.ship_type_name)
        {
            Some(group) => group.count += 1,
            None => self.ships.push(ShipGroup {
                ship_type: participant.ship_type_name.clone(),
                count: 1,
            }),
        }
    }

    /// Total number of participants folded into this side.
    pub fn participant_count(&self) -> u32 {
        self.ships.iter().map(|g| g.count).sum()
    }
}

/// The normalised battle report handed to the persistence sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReport {
    pub report_title: String,
    /// ISO-8601, passed through from the payload when present.
    pub battle_time: String,
    pub system_name: String,
    pub total_value_destroyed: f64,
    pub efficiency: f64,
    pub enemy_efficiency: f64,
    pub friendly: SideSummary,
    pub enemy: SideSummary,
    pub key_events: Vec<String>,
    /// Set by the caller, never by the normalizer.
    pub created_by: Option<Identity>,
}

impl CanonicalReport {
    /// Attribute the report to `identity` (or clear the attribution).
    pub fn with_created_by(mut self, identity: Option<Identity>) -> Self {
        self.created_by = identity;
        self
    }
}

/// `a + b`, capped at `f64::MAX`.
pub(crate) fn saturating_isk_sum(a: f64, b: f64) -> f64 {
    (a + b).min(f64::MAX)
}
