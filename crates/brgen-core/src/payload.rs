//! Raw battle payloads and the participant adapter.
//!
//! Every acquisition path (ESI killmail, zKillboard, manual entry) hands the
//! normalizer a [`RawBattlePayload`]. Field names vary between providers, so
//! nothing here is strict: wrongly-typed or missing fields deserialize as
//! absent and the normalizer applies its defaults. The only hard failure is a
//! payload that is not a JSON object at all.
//!
//! Field-name reconciliation happens once, in [`RawParticipant::resolve`],
//! before any aggregation runs.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ReportError;
use crate::types::{Participant, Side};

/// Ship label used when a participant names no ship type.
pub const UNKNOWN_SHIP: &str = "Unknown";

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A battle payload in any of the known provider shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBattlePayload {
    #[serde(default, deserialize_with = "lenient_metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RawMetadata>,
    #[serde(default, deserialize_with = "lenient_participants", skip_serializing_if = "Option::is_none")]
    pub attackers: Option<Vec<RawParticipant>>,
    #[serde(default, deserialize_with = "lenient_participants", skip_serializing_if = "Option::is_none")]
    pub attackers_list: Option<Vec<RawParticipant>>,
    #[serde(default, deserialize_with = "lenient_participants", skip_serializing_if = "Option::is_none")]
    pub defenders: Option<Vec<RawParticipant>>,
    #[serde(default, deserialize_with = "lenient_participants", skip_serializing_if = "Option::is_none")]
    pub defenders_list: Option<Vec<RawParticipant>>,
    #[serde(default, deserialize_with = "lenient_strings", skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Optional descriptive metadata. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetadata {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl RawBattlePayload {
    /// Adapt an untyped JSON value.
    ///
    /// # Errors
    ///
    /// [`ReportError::InvalidPayload`] when `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, ReportError> {
        let kind = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(kind) = kind {
            return Err(ReportError::InvalidPayload(format!(
                "expected a JSON object, got {kind}"
            )));
        }
        serde_json::from_value(value).map_err(|e| ReportError::InvalidPayload(e.to_string()))
    }

    /// Parse a JSON document and adapt it.
    pub fn from_json_str(s: &str) -> Result<Self, ReportError> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| ReportError::InvalidPayload(e.to_string()))?;
        Self::from_value(value)
    }

    /// The side opposing the viewer. Falls back to `attackers_list`.
    pub fn attackers(&self) -> &[RawParticipant] {
        self.attackers
            .as_deref()
            .or(self.attackers_list.as_deref())
            .unwrap_or(&[])
    }

    /// The viewer's side. Falls back to `defenders_list`.
    pub fn defenders(&self) -> &[RawParticipant] {
        self.defenders
            .as_deref()
            .or(self.defenders_list.as_deref())
            .unwrap_or(&[])
    }

    /// Every participant, resolved and tagged with its side: attackers first,
    /// then defenders.
    pub fn participants(&self) -> impl Iterator<Item = (Side, Participant)> + '_ {
        let enemy = self.attackers().iter().map(|p| (Side::Enemy, p.resolve()));
        let friendly = self.defenders().iter().map(|p| (Side::Friendly, p.resolve()));
        enemy.chain(friendly)
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.title.as_deref())
    }

    pub fn system(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.system.as_deref())
    }

    pub fn time(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.time.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Participant adapter
// ---------------------------------------------------------------------------

/// A participant record exactly as the provider sent it.
///
/// Each accepted spelling is kept separately so that precedence between
/// spellings is explicit in [`resolve`](Self::resolve).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParticipant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<Value>,
    #[serde(default, rename = "shipType", skip_serializing_if = "Option::is_none")]
    pub ship_type_camel: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pilot_name: Option<Value>,
    #[serde(default, rename = "pilotName", skip_serializing_if = "Option::is_none")]
    pub pilot_name_camel: Option<Value>,
}

impl RawParticipant {
    /// A participant in the canonical `ship_type` / `value` / `pilot_name`
    /// spelling.
    pub fn new(ship_type: impl Into<String>, value: f64, pilot_name: Option<String>) -> Self {
        Self {
            ship_type: Some(Value::String(ship_type.into())),
            value: serde_json::Number::from_f64(value).map(Value::Number),
            pilot_name: pilot_name.map(Value::String),
            ..Self::default()
        }
    }

    /// Reconcile provider spellings into one [`Participant`].
    ///
    /// `value` wins over `loss_value` unless it is absent, zero, or not a
    /// number. Negative values clamp to zero. A missing ship type becomes
    /// [`UNKNOWN_SHIP`].
    pub fn resolve(&self) -> Participant {
        let isk_value = [&self.value, &self.loss_value]
            .into_iter()
            .filter_map(|v| v.as_ref().and_then(number))
            .find(|v| *v != 0.0)
            .map(|v| v.max(0.0))
            .unwrap_or(0.0);

        let ship_type_name = [&self.ship_type, &self.ship_type_camel]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(text))
            .unwrap_or_else(|| UNKNOWN_SHIP.to_string());

        let pilot_name = [&self.pilot_name, &self.pilot_name_camel]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(text));

        Participant {
            ship_type_name,
            isk_value,
            pilot_name,
        }
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field helpers
// ---------------------------------------------------------------------------

fn number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text(&Value::deserialize(deserializer)?))
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_participants<'de, D>(deserializer: D) -> Result<Option<Vec<RawParticipant>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(items.into_iter().map(RawParticipant::from_value).collect()),
        _ => None,
    })
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<RawMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        v @ Value::Object(_) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
