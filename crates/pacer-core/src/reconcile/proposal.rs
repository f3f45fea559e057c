//! Proposed workouts as sent by the planning agent, and their validation.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use pacer_db::models::NewWorkout;

use super::ReconcileError;

/// Workout type used when the proposal does not name one.
pub const DEFAULT_WORKOUT_TYPE: &str = "Run";

/// One workout in a rewrite or plan-creation batch.
///
/// Field names follow what the agent is prompted with (`date`, `type`,
/// `distance_km`, `pace`, `description`); the storage names are accepted as
/// aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedWorkout {
    #[serde(alias = "scheduled_date")]
    pub date: NaiveDate,
    #[serde(default, rename = "type", alias = "workout_type")]
    pub workout_type: Option<String>,
    #[serde(deserialize_with = "distance_from_number_or_string")]
    pub distance_km: f64,
    #[serde(default, alias = "target_pace")]
    pub pace: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ProposedWorkout {
    pub fn new(date: NaiveDate, distance_km: f64) -> Self {
        Self {
            date,
            workout_type: None,
            distance_km,
            pace: None,
            description: None,
        }
    }

    pub fn with_type(mut self, workout_type: impl Into<String>) -> Self {
        self.workout_type = Some(workout_type.into());
        self
    }

    fn into_new_workout(self) -> NewWorkout {
        NewWorkout {
            scheduled_date: self.date,
            workout_type: non_blank(self.workout_type)
                .unwrap_or_else(|| DEFAULT_WORKOUT_TYPE.to_owned()),
            distance_km: self.distance_km,
            target_pace: non_blank(self.pace),
            description: non_blank(self.description),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Models sometimes quote numbers; accept `5`, `5.0` and `"5"`.
fn distance_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("distance_km {s:?} is not a number"))),
    }
}

/// Parse a JSON array of proposed workouts.
pub fn parse_proposals(json: &str) -> Result<Vec<ProposedWorkout>, ReconcileError> {
    serde_json::from_str(json)
        .map_err(|e| ReconcileError::InvalidInput(format!("malformed workout list: {e}")))
}

/// Validate a batch and convert it to insertable rows sorted by date.
///
/// Rejects an empty batch and any distance that is negative or not finite.
/// The first element of the returned vector carries the cutoff date.
pub fn validate_proposals(proposals: &[ProposedWorkout]) -> Result<Vec<NewWorkout>, ReconcileError> {
    if proposals.is_empty() {
        return Err(ReconcileError::InvalidInput(
            "no workouts provided".to_owned(),
        ));
    }

    for p in proposals {
        if !p.distance_km.is_finite() || p.distance_km < 0.0 {
            return Err(ReconcileError::InvalidInput(format!(
                "workout on {} has invalid distance {} km (must be a non-negative number)",
                p.date, p.distance_km
            )));
        }
    }

    let mut rows: Vec<NewWorkout> = proposals
        .iter()
        .cloned()
        .map(ProposedWorkout::into_new_workout)
        .collect();
    rows.sort_by_key(|w| w.scheduled_date);
    Ok(rows)
}

/// The earliest date in a batch, or `None` when the batch is empty.
pub fn cutoff_date(proposals: &[ProposedWorkout]) -> Option<NaiveDate> {
    proposals.iter().map(|p| p.date).min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn parses_agent_shaped_json() {
        let json = r#"[
            {"date": "2026-01-04", "type": "Long Run", "distance_km": 8, "pace": "5:30", "description": "easy"},
            {"date": "2026-01-02", "distance_km": "3.5"}
        ]"#;
        let proposals = parse_proposals(json).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].workout_type.as_deref(), Some("Long Run"));
        assert_eq!(proposals[0].distance_km, 8.0);
        assert_eq!(proposals[1].distance_km, 3.5);
        assert_eq!(proposals[1].workout_type, None);
    }

    #[test]
    fn accepts_storage_field_names() {
        let json = r#"[{"scheduled_date": "2026-01-02", "workout_type": "Tempo",
                        "distance_km": 6, "target_pace": "4:50"}]"#;
        let proposals = parse_proposals(json).unwrap();
        assert_eq!(proposals[0].date, date("2026-01-02"));
        assert_eq!(proposals[0].workout_type.as_deref(), Some("Tempo"));
        assert_eq!(proposals[0].pace.as_deref(), Some("4:50"));
    }

    #[test]
    fn malformed_date_is_invalid_input() {
        let err = parse_proposals(r#"[{"date": "2026-13-40", "distance_km": 5}]"#).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput(_)), "got {err:?}");
    }

    #[test]
    fn missing_distance_is_invalid_input() {
        let err = parse_proposals(r#"[{"date": "2026-01-02"}]"#).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput(_)));
    }

    #[test]
    fn non_numeric_distance_string_is_invalid_input() {
        let err = parse_proposals(r#"[{"date": "2026-01-02", "distance_km": "far"}]"#).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput(_)));
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = validate_proposals(&[]).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidInput(_)));
        assert!(cutoff_date(&[]).is_none());
    }

    #[test]
    fn negative_distance_is_rejected() {
        let batch = [
            ProposedWorkout::new(date("2026-01-02"), 3.0),
            ProposedWorkout::new(date("2026-01-03"), -1.0),
        ];
        let err = validate_proposals(&batch).unwrap_err();
        assert!(err.to_string().contains("2026-01-03"), "got {err}");
    }

    #[test]
    fn nan_distance_is_rejected() {
        let batch = [ProposedWorkout::new(date("2026-01-02"), f64::NAN)];
        assert!(validate_proposals(&batch).is_err());
    }

    #[test]
    fn zero_distance_is_allowed() {
        let batch = [ProposedWorkout::new(date("2026-01-02"), 0.0).with_type("Rest")];
        let rows = validate_proposals(&batch).unwrap();
        assert_eq!(rows[0].distance_km, 0.0);
        assert_eq!(rows[0].workout_type, "Rest");
    }

    #[test]
    fn rows_are_sorted_and_defaulted() {
        let mut late = ProposedWorkout::new(date("2026-01-04"), 8.0);
        late.pace = Some("  ".to_owned());
        late.description = Some(" long and slow ".to_owned());
        let early = ProposedWorkout::new(date("2026-01-02"), 3.0);

        let batch = [late, early];
        assert_eq!(cutoff_date(&batch), Some(date("2026-01-02")));

        let rows = validate_proposals(&batch).unwrap();
        assert_eq!(rows[0].scheduled_date, date("2026-01-02"));
        assert_eq!(rows[0].workout_type, DEFAULT_WORKOUT_TYPE);
        assert_eq!(rows[1].target_pace, None);
        assert_eq!(rows[1].description.as_deref(), Some("long and slow"));
    }
}
