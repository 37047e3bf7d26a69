//! Normalizer — folds a [`RawBattlePayload`] into a [`CanonicalReport`].
//!
//! Single pass: resolve every participant through the payload adapter, tag it
//! with the side of the array it came from, and accumulate ISK and ship
//! tallies per side. Efficiency ratios are derived from the two totals.
//!
//! The transform is pure. The only time-dependent input, the default battle
//! time, is the explicit `now` argument.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::ReportError;
use crate::payload::RawBattlePayload;
use crate::types::{saturating_isk_sum, CanonicalReport, Identity, Side, SideSummary};

pub const DEFAULT_TITLE: &str = "Battle Report";
pub const DEFAULT_SYSTEM: &str = "Unknown";

/// Normalise a typed payload.
///
/// `viewer` is accepted for the SSO path but does not influence side
/// assignment: defenders are always friendly and attackers always enemy.
/// The returned report has `created_by == None`; attribution is the
/// caller's job.
pub fn normalize(
    raw: &RawBattlePayload,
    viewer: Option<&Identity>,
    now: DateTime<Utc>,
) -> CanonicalReport {
    let report_title = raw.title().unwrap_or(DEFAULT_TITLE).to_string();
    let battle_time = raw
        .time()
        .map(str::to_string)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));
    let system_name = raw.system().unwrap_or(DEFAULT_SYSTEM).to_string();

    let mut friendly = SideSummary::empty(Side::Friendly);
    let mut enemy = SideSummary::empty(Side::Enemy);

    for (side, participant) in raw.participants() {
        match side {
            Side::Friendly => friendly.record(&participant),
            Side::Enemy => enemy.record(&participant),
        }
    }

    let efficiency = ratio(friendly.total_isk_lost, enemy.total_isk_lost);
    let enemy_efficiency = ratio(enemy.total_isk_lost, friendly.total_isk_lost);

    tracing::debug!(
        title = %report_title,
        system = %system_name,
        viewer = ?viewer,
        friendly_ships = friendly.participant_count(),
        enemy_ships = enemy.participant_count(),
        "normalised battle report"
    );

    CanonicalReport {
        report_title,
        battle_time,
        system_name,
        total_value_destroyed: saturating_isk_sum(friendly.total_isk_lost, enemy.total_isk_lost),
        efficiency,
        enemy_efficiency,
        friendly,
        enemy,
        key_events: raw.events.clone(),
        created_by: None,
    }
}

/// Adapt an untyped JSON payload, then [`normalize`] it.
///
/// # Errors
///
/// [`ReportError::InvalidPayload`] if `value` is not a JSON object.
pub fn normalize_value(
    value: Value,
    viewer: Option<&Identity>,
    now: DateTime<Utc>,
) -> Result<CanonicalReport, ReportError> {
    let raw = RawBattlePayload::from_value(value)?;
    Ok(normalize(&raw, viewer, now))
}

/// `numerator / denominator` to two decimals, or 0 when the denominator side
/// lost nothing. Quotients past `f64::MAX` are capped there.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        round2((numerator / denominator).min(f64::MAX))
    } else {
        0.0
    }
}

fn round2(x: f64) -> f64 {
    let scaled = x * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        x
    }
}
