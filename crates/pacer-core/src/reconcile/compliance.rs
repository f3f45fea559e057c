//! Compliance maths: how much of a planned workout was actually run.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Compliance below this percentage is a missed workout.
pub const MISSED_THRESHOLD_PERCENT: f64 = 50.0;

/// Outcome of comparing one day's plan against recorded runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Missed,
    Good,
}

impl Verdict {
    /// `Missed` strictly below the threshold; exactly 50% is `Good`.
    pub fn from_percent(percent: f64) -> Self {
        if percent < MISSED_THRESHOLD_PERCENT {
            Self::Missed
        } else {
            Self::Good
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missed => f.write_str("Missed"),
            Self::Good => f.write_str("Good"),
        }
    }
}

/// Round to `places` decimal places, half away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `actual / planned * 100`, rounded to one decimal.
///
/// A zero (or otherwise non-positive) planned distance yields `0.0` rather
/// than infinity or NaN.
pub fn compliance_percent(planned_km: f64, actual_km: f64) -> f64 {
    if planned_km.is_nan() || planned_km <= 0.0 || !actual_km.is_finite() {
        return 0.0;
    }
    round_to(actual_km / planned_km * 100.0, 1)
}

/// Comparison of one scheduled workout against the runs recorded that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub date: NaiveDate,
    pub plan_id: Uuid,
    pub planned_km: f64,
    pub actual_km: f64,
    pub compliance_percent: f64,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_speed_mps: Option<f64>,
}

impl ComplianceReport {
    /// Build a report from raw totals. `actual_km` is rounded to two decimals
    /// first and the percentage is computed from the rounded value, so the
    /// serialized fields are consistent with each other.
    pub fn new(
        date: NaiveDate,
        plan_id: Uuid,
        planned_km: f64,
        actual_km: f64,
        avg_speed_mps: Option<f64>,
    ) -> Self {
        let actual_km = round_to(actual_km, 2);
        let compliance_percent = compliance_percent(planned_km, actual_km);
        Self {
            date,
            plan_id,
            planned_km,
            actual_km,
            compliance_percent,
            verdict: Verdict::from_percent(compliance_percent),
            avg_speed_mps: avg_speed_mps.map(|s| round_to(s, 3)),
        }
    }
}

/// Result of a compare: callers must handle the unscheduled case before
/// reading any numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareOutcome {
    NotScheduled { date: NaiveDate },
    Report(ComplianceReport),
}

impl CompareOutcome {
    pub fn report(&self) -> Option<&ComplianceReport> {
        match self {
            Self::Report(r) => Some(r),
            Self::NotScheduled { .. } => None,
        }
    }
}
