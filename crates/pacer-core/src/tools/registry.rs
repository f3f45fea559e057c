//! Tool registry -- the named collection of tools available to agents.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::EngineConfig;

use super::builtin::{
    ComparePlanVsActual, GetRunnerStats, ListPlanWorkouts, SaveTrainingPlan, UpdateTrainingPlan,
};
use super::{Tool, ToolContext, ToolError, ToolSpec};

/// Text returned from a tool call. Failures are reported in-band with
/// `is_error` set, the way the agent runtime expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub output: String,
    pub is_error: bool,
}

/// A collection of registered [`Tool`]s, keyed by name.
pub struct ToolRegistry {
    ctx: ToolContext,
    tools: BTreeMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with no tools.
    pub fn empty(pool: PgPool, config: EngineConfig) -> Self {
        Self {
            ctx: ToolContext { pool, config },
            tools: BTreeMap::new(),
        }
    }

    /// Create a registry holding every built-in tool.
    pub fn new(pool: PgPool, config: EngineConfig) -> Self {
        let mut registry = Self::empty(pool, config);
        registry.register(ComparePlanVsActual);
        registry.register(UpdateTrainingPlan);
        registry.register(SaveTrainingPlan);
        registry.register(GetRunnerStats);
        registry.register(ListPlanWorkouts);
        registry
    }

    /// Register a tool under its spec name, returning any tool it replaced.
    pub fn register(&mut self, tool: impl Tool + 'static) -> Option<Box<dyn Tool>> {
        let name = tool.spec().name;
        self.tools.insert(name, Box::new(tool))
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|b| b.as_ref())
    }

    /// Tool names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call the tool `name` with `args`.
    ///
    /// Only an unknown tool name is an `Err`; everything the tool itself
    /// reports comes back as a [`ToolOutput`], prefixed with the tool's
    /// error prefix when it failed. Rejections keep their plain message.
    pub async fn invoke(&self, name: &str, args: &Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;

        let empty = Value::Object(Default::default());
        let args = if args.is_null() { &empty } else { args };

        match tool.call(&self.ctx, args).await {
            Ok(output) => {
                info!(tool = name, "tool call succeeded");
                Ok(ToolOutput {
                    output,
                    is_error: false,
                })
            }
            Err(ToolError::Rejected(message)) => {
                warn!(tool = name, reason = message, "tool call rejected");
                Ok(ToolOutput {
                    output: message.to_owned(),
                    is_error: true,
                })
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                Ok(ToolOutput {
                    output: format!("{}: {e}", tool.error_prefix()),
                    is_error: true,
                })
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("config", &self.ctx.config)
            .finish()
    }
}
