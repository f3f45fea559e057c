//! Ingestion boundary for provider activity data.
//!
//! The sync job fetches activities from the fitness provider and hands the
//! JSON to this module. [`map_activity`] is the single place where provider
//! fields are interpreted: optional fields, defaults, timestamp handling and
//! the "is this a run" classification all happen here, so the store only
//! ever holds normalized rows.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use pacer_db::models::{ActivityKind, NewActivity};
use pacer_db::queries::activities;

/// Errors raised while interpreting provider data.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed activity payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("activity {id}: missing start_date_local")]
    MissingStartDate { id: i64 },

    #[error("activity {id}: unparseable start_date_local {value:?}")]
    BadStartDate { id: i64, value: String },

    #[error("activity {id}: {field} {value} is out of range")]
    OutOfRange {
        id: i64,
        field: &'static str,
        value: String,
    },
}

/// An activity as the provider returns it.
///
/// Everything but `id` is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderActivity {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Meters.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Seconds.
    #[serde(default)]
    pub moving_time: Option<i64>,
    /// Seconds.
    #[serde(default)]
    pub elapsed_time: Option<i64>,
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    #[serde(default)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
}

/// Parse a provider payload: either a JSON array of activities or a single
/// activity object.
pub fn parse_payload(json: &str) -> Result<Vec<ProviderActivity>, IngestError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Many(Vec<ProviderActivity>),
        One(ProviderActivity),
    }

    Ok(match serde_json::from_str::<Payload>(json)? {
        Payload::Many(list) => list,
        Payload::One(one) => vec![one],
    })
}

/// Interpret a provider `start_date_local`.
///
/// The provider reports local wall-clock time but tags it with a `Z` or an
/// offset. The suffix is discarded: the stored value is the naive local time
/// the athlete saw, which is what day-level aggregation groups on.
pub fn parse_local_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

/// Non-negative measurement, or zero when the provider omitted it.
fn measure_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0)
}

fn seconds(id: i64, field: &'static str, value: Option<i64>) -> Result<i32, IngestError> {
    let raw = value.unwrap_or(0).max(0);
    i32::try_from(raw).map_err(|_| IngestError::OutOfRange {
        id,
        field,
        value: raw.to_string(),
    })
}

/// Map a provider activity to the row stored for `user_id`.
///
/// Defaults: missing name is empty; missing distance, elevation and times
/// are zero; speeds, heart rate and calories stay absent. Classification
/// prefers `sport_type` over `type`.
pub fn map_activity(user_id: &str, raw: ProviderActivity) -> Result<NewActivity, IngestError> {
    let id = raw.id;

    let start = raw
        .start_date_local
        .as_deref()
        .ok_or(IngestError::MissingStartDate { id })?;
    let start_date_local = parse_local_timestamp(start).ok_or_else(|| IngestError::BadStartDate {
        id,
        value: start.to_owned(),
    })?;

    let provider_type = raw.sport_type.or(raw.activity_type);
    let kind = provider_type
        .as_deref()
        .map(ActivityKind::from_provider_type)
        .unwrap_or(ActivityKind::Other);

    Ok(NewActivity {
        provider_id: id,
        user_id: user_id.to_owned(),
        name: raw.name.unwrap_or_default(),
        kind,
        provider_type,
        start_date_local,
        distance_m: measure_or_zero(raw.distance),
        moving_time_s: seconds(id, "moving_time", raw.moving_time)?,
        elapsed_time_s: seconds(id, "elapsed_time", raw.elapsed_time)?,
        elevation_gain_m: measure_or_zero(raw.total_elevation_gain),
        average_speed_mps: raw.average_speed,
        max_speed_mps: raw.max_speed,
        average_heartrate: raw.average_heartrate,
        max_heartrate: raw.max_heartrate,
        calories: raw.calories,
    })
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub upserted: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// Map and upsert every activity in `batch` for `user_id`.
///
/// Each activity is handled independently: a bad record or a failed upsert
/// is logged, counted as skipped and does not stop the rest of the batch.
pub async fn import_activities(
    pool: &PgPool,
    user_id: &str,
    batch: Vec<ProviderActivity>,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for raw in batch {
        let id = raw.id;
        let row = match map_activity(user_id, raw) {
            Ok(row) => row,
            Err(e) => {
                warn!(provider_id = id, error = %e, "skipping activity");
                summary.skipped += 1;
                summary.errors.push(e.to_string());
                continue;
            }
        };

        match activities::upsert_activity(pool, &row).await {
            Ok(()) => summary.upserted += 1,
            Err(e) => {
                warn!(provider_id = id, error = %format!("{e:#}"), "failed to store activity");
                summary.skipped += 1;
                summary.errors.push(format!("{e:#}"));
            }
        }
    }

    info!(
        user_id,
        upserted = summary.upserted,
        skipped = summary.skipped,
        "activity import finished"
    );
    summary
}
