//! Agent-callable tools.
//!
//! Each tool takes a flat JSON object and returns text. The
//! [`ToolRegistry`] looks tools up by name and turns tool failures into
//! prefixed error text, so callers always get a string back.

pub mod args;
pub mod builtin;
pub mod registry;
pub mod trait_def;

use thiserror::Error;

use crate::reconcile::ReconcileError;

pub use builtin::{NO_WORKOUTS_MESSAGE, NOT_SCHEDULED_MESSAGE};
pub use registry::{ToolOutput, ToolRegistry};
pub use trait_def::{Tool, ToolContext, ToolParam, ToolSpec};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("missing argument '{0}'")]
    MissingArgument(&'static str),

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The request was refused; the message is shown to the agent as is.
    #[error("{0}")]
    Rejected(&'static str),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}
