//! Acquisition paths — where a raw battle payload comes from.
//!
//! [`DataSource`] has one variant per path. The SSO and public-URL variants
//! only carry the reference needed to fetch; the fetch itself lives in
//! `brgen-feeds`. The manual variant carries the user's form fields and is
//! turned into a payload locally by [`ManualDetails::into_payload`].

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ReportError;
use crate::payload::{RawBattlePayload, RawMetadata, RawParticipant};

/// Title given to manual reports that do not name one.
pub const MANUAL_TITLE: &str = "Manual Battle";

// ---------------------------------------------------------------------------
// Discriminator
// ---------------------------------------------------------------------------

/// The acquisition-path discriminator carried by a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    SsoKillmail,
    PublicUrl,
    Manual,
}

impl FromStr for SourceKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sso-killmail" | "sso_recent_killmail" => Ok(SourceKind::SsoKillmail),
            "public-url" | "sso_zkb_url" | "manual_zkb_url" => Ok(SourceKind::PublicUrl),
            "manual" | "manual_details" => Ok(SourceKind::Manual),
            other => Err(ReportError::UnsupportedSource(other.to_string())),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::SsoKillmail => write!(f, "sso-killmail"),
            SourceKind::PublicUrl => write!(f, "public-url"),
            SourceKind::Manual => write!(f, "manual"),
        }
    }
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

/// Reference to a single killmail on ESI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillmailRef {
    #[serde(rename = "killmail_id")]
    pub id: u64,
    #[serde(rename = "killmail_hash", default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Authenticated ESI killmail fetch.
    SsoKillmail { killmail: KillmailRef },
    /// Public battle-report URL (zKillboard).
    PublicUrl { url: Url },
    /// User-entered form fields.
    Manual(ManualDetails),
}

impl DataSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            DataSource::SsoKillmail { .. } => SourceKind::SsoKillmail,
            DataSource::PublicUrl { .. } => SourceKind::PublicUrl,
            DataSource::Manual(_) => SourceKind::Manual,
        }
    }

    /// Build a public-URL source, accepting only `http` and `https`.
    pub fn public_url(url: &str) -> Result<Self, ReportError> {
        let url = Url::parse(url)
            .map_err(|e| ReportError::InvalidRequest(format!("invalid URL {url:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(DataSource::PublicUrl { url }),
            scheme => Err(ReportError::InvalidRequest(format!(
                "unsupported URL scheme {scheme:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Flat request record
// ---------------------------------------------------------------------------

/// A report request as a frontend form submits it: one discriminator plus
/// the union of every path's fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub data_source_type: String,
    pub sso_reference_id: Option<u64>,
    pub sso_reference_hash: Option<String>,
    pub zkb_url: Option<String>,
    pub report_title: Option<String>,
    pub manual_system: Option<String>,
    pub manual_date: Option<String>,
    pub manual_time: Option<String>,
    #[serde(default)]
    pub attackers: Vec<ManualParticipant>,
    #[serde(default)]
    pub defenders: Vec<ManualParticipant>,
    #[serde(default)]
    pub events: Vec<String>,
}

impl TryFrom<ReportRequest> for DataSource {
    type Error = ReportError;

    fn try_from(req: ReportRequest) -> Result<Self, Self::Error> {
        match req.data_source_type.parse::<SourceKind>()? {
            SourceKind::SsoKillmail => {
                let id = required(req.sso_reference_id, "ssoReferenceId")?;
                Ok(DataSource::SsoKillmail {
                    killmail: KillmailRef {
                        id,
                        hash: req.sso_reference_hash,
                    },
                })
            }
            SourceKind::PublicUrl => DataSource::public_url(&required(req.zkb_url, "zkbUrl")?),
            SourceKind::Manual => {
                let details = ManualDetails {
                    title: req.report_title,
                    system: required(req.manual_system, "manualSystem")?,
                    date: required(req.manual_date, "manualDate")?,
                    time: required(req.manual_time, "manualTime")?,
                    attackers: req.attackers,
                    defenders: req.defenders,
                    events: req.events,
                };
                details.validate()?;
                Ok(DataSource::Manual(details))
            }
        }
    }
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, ReportError> {
    field.ok_or_else(|| ReportError::InvalidRequest(format!("missing required field {name:?}")))
}

// ---------------------------------------------------------------------------
// Manual input adapter
// ---------------------------------------------------------------------------

/// One row of the manual-entry participant table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualParticipant {
    pub ship_type: String,
    pub value: f64,
    pub pilot_name: String,
}

/// Form fields for a manually entered battle.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualDetails {
    pub title: Option<String>,
    pub system: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub attackers: Vec<ManualParticipant>,
    pub defenders: Vec<ManualParticipant>,
    pub events: Vec<String>,
}

impl ManualDetails {
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.system.trim().is_empty() {
            return Err(ReportError::InvalidRequest("manual system is empty".into()));
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|e| {
            ReportError::InvalidRequest(format!("manual date {:?}: {e}", self.date))
        })?;
        if self.time.len() != 5 {
            return Err(ReportError::InvalidRequest(format!(
                "manual time {:?} must be HH:MM",
                self.time
            )));
        }
        NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|e| {
            ReportError::InvalidRequest(format!("manual time {:?}: {e}", self.time))
        })?;
        for p in self.attackers.iter().chain(&self.defenders) {
            if p.ship_type.trim().is_empty() {
                return Err(ReportError::InvalidRequest("participant ship type is empty".into()));
            }
            if !p.value.is_finite() || p.value < 0.0 {
                return Err(ReportError::InvalidRequest(format!(
                    "participant value {} for {:?} must be a non-negative number",
                    p.value, p.ship_type
                )));
            }
        }
        Ok(())
    }

    /// Validate and assemble a payload with the same shape the fetchers
    /// return.
    pub fn into_payload(self) -> Result<RawBattlePayload, ReportError> {
        self.validate()?;
        let to_raw = |p: ManualParticipant| RawParticipant::new(p.ship_type, p.value, Some(p.pilot_name));
        Ok(RawBattlePayload {
            metadata: Some(RawMetadata {
                title: Some(
                    self.title
                        .filter(|t| !t.is_empty())
                        .unwrap_or_else(|| MANUAL_TITLE.to_string()),
                ),
                system: Some(self.system),
                time: Some(format!("{}T{}Z", self.date, self.time)),
            }),
            attackers: Some(self.attackers.into_iter().map(to_raw).collect()),
            defenders: Some(self.defenders.into_iter().map(to_raw).collect()),
            events: self.events,
            ..RawBattlePayload::default()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
