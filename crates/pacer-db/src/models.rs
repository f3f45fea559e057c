use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Normalized category of an ingested activity.
///
/// Provider type labels are folded into this enum once, at ingestion time,
/// so queries filter on `kind = 'run'` instead of pattern-matching labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Run,
    Ride,
    Swim,
    Walk,
    Hike,
    Other,
}

impl ActivityKind {
    /// Classify a provider activity type label.
    ///
    /// Any label containing "run" (case-insensitive) is a run, which covers
    /// `Run`, `TrailRun`, `VirtualRun` and `TrailRunning`. Everything else is
    /// matched on a handful of known labels, falling back to [`Self::Other`].
    pub fn from_provider_type(label: &str) -> Self {
        let lower = label.trim().to_ascii_lowercase();
        if lower.contains("run") {
            return Self::Run;
        }
        if lower.contains("ride") || lower == "handcycle" || lower == "velomobile" {
            return Self::Ride;
        }
        match lower.as_str() {
            "swim" | "openwaterswim" => Self::Swim,
            "walk" => Self::Walk,
            "hike" => Self::Hike,
            _ => Self::Other,
        }
    }

    pub fn is_run(self) -> bool {
        self == Self::Run
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Run => "run",
            Self::Ride => "ride",
            Self::Swim => "swim",
            Self::Walk => "walk",
            Self::Hike => "hike",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for ActivityKind {
    type Err = ActivityKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Self::Run),
            "ride" => Ok(Self::Ride),
            "swim" => Ok(Self::Swim),
            "walk" => Ok(Self::Walk),
            "hike" => Ok(Self::Hike),
            "other" => Ok(Self::Other),
            other => Err(ActivityKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ActivityKind`] string.
#[derive(Debug, Clone)]
pub struct ActivityKindParseError(pub String);

impl fmt::Display for ActivityKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid activity kind: {:?}", self.0)
    }
}

impl std::error::Error for ActivityKindParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A training plan owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingPlan {
    pub id: Uuid,
    pub user_id: String,
    pub goal: String,
    pub created_at: DateTime<Utc>,
}

/// A single scheduled session within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: i64,
    pub plan_id: Uuid,
    pub user_id: String,
    pub scheduled_date: NaiveDate,
    pub workout_type: String,
    pub distance_km: f64,
    pub target_pace: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A workout to be inserted. Plan and user ids are stamped on at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
    pub scheduled_date: NaiveDate,
    pub workout_type: String,
    pub distance_km: f64,
    pub target_pace: Option<String>,
    pub description: Option<String>,
}

/// An activity ingested from the fitness provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub provider_id: i64,
    pub user_id: String,
    pub name: String,
    pub kind: ActivityKind,
    pub provider_type: Option<String>,
    pub start_date_local: NaiveDateTime,
    pub distance_m: f64,
    pub moving_time_s: i32,
    pub elapsed_time_s: i32,
    pub elevation_gain_m: f64,
    pub average_speed_mps: Option<f64>,
    pub max_speed_mps: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub calories: Option<f64>,
    pub ingested_at: DateTime<Utc>,
}

/// Column values for an activity upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub provider_id: i64,
    pub user_id: String,
    pub name: String,
    pub kind: ActivityKind,
    pub provider_type: Option<String>,
    pub start_date_local: NaiveDateTime,
    pub distance_m: f64,
    pub moving_time_s: i32,
    pub elapsed_time_s: i32,
    pub elevation_gain_m: f64,
    pub average_speed_mps: Option<f64>,
    pub max_speed_mps: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub calories: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_kind_display_roundtrip() {
        let variants = [
            ActivityKind::Run,
            ActivityKind::Ride,
            ActivityKind::Swim,
            ActivityKind::Walk,
            ActivityKind::Hike,
            ActivityKind::Other,
        ];
        for v in &variants {
            let s = v.to_string();
            let parsed: ActivityKind = s.parse().expect("should parse");
            assert_eq!(*v, parsed);
        }
    }

    #[test]
    fn activity_kind_invalid() {
        let result = "jog".parse::<ActivityKind>();
        assert!(result.is_err());
    }

    #[test]
    fn run_labels_are_runs() {
        for label in ["Run", "run", "TrailRun", "VirtualRun", " TrailRunning "] {
            assert_eq!(
                ActivityKind::from_provider_type(label),
                ActivityKind::Run,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn non_run_labels() {
        assert_eq!(ActivityKind::from_provider_type("Ride"), ActivityKind::Ride);
        assert_eq!(ActivityKind::from_provider_type("GravelRide"), ActivityKind::Ride);
        assert_eq!(ActivityKind::from_provider_type("Swim"), ActivityKind::Swim);
        assert_eq!(ActivityKind::from_provider_type("Walk"), ActivityKind::Walk);
        assert_eq!(ActivityKind::from_provider_type("Hike"), ActivityKind::Hike);
        assert_eq!(ActivityKind::from_provider_type("Yoga"), ActivityKind::Other);
        assert_eq!(ActivityKind::from_provider_type(""), ActivityKind::Other);
        assert!(!ActivityKind::from_provider_type("WeightTraining").is_run());
    }
}
