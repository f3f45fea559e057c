//! Plan reconciliation: compare a day's plan against recorded runs, and
//! rewrite the future tail of a plan.
//!
//! ```text
//! compare(user, date)
//!     workouts  --find_workout_on-->  NotScheduled | planned km
//!     activities --day_run_totals-->  actual km
//!     --> ComplianceReport { compliance_percent, verdict }
//!
//! rewrite(plan, proposals)
//!     validate --> cutoff = min(date)
//!     BEGIN
//!       SELECT ... FOR UPDATE      (serializes rewrites of one plan)
//!       DELETE date >= cutoff
//!       INSERT proposals
//!     COMMIT
//! ```

pub mod compliance;
pub mod engine;
pub mod proposal;

use thiserror::Error;
use uuid::Uuid;

pub use compliance::{CompareOutcome, ComplianceReport, MISSED_THRESHOLD_PERCENT, Verdict};
pub use engine::{RewriteResult, compare, rewrite};
pub use proposal::{ProposedWorkout, cutoff_date, parse_proposals, validate_proposals};

/// Errors surfaced by reconciliation, planning and stats operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("plan {0} not found")]
    PlanNotFound(Uuid),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl ReconcileError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PlanNotFound(_))
    }
}
