//! The `Tool` trait -- the interface every agent-callable tool implements.
//!
//! The trait is object-safe so tools can be stored as `Box<dyn Tool>` in the
//! [`super::ToolRegistry`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;

use crate::config::EngineConfig;

use super::ToolError;

/// One parameter in a tool's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolParam {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ToolParam {
    pub const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
        }
    }
}

/// Name, description and parameters, as shown to the calling agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ToolParam>,
}

/// Shared state handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub pool: PgPool,
    pub config: EngineConfig,
}

/// A tool the agent layer can call by name with a flat JSON object.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Prefix put in front of the error text when the call fails.
    fn error_prefix(&self) -> &'static str {
        "Error"
    }

    /// Run the tool. `args` is the JSON object sent by the caller.
    async fn call(&self, ctx: &ToolContext, args: &Value) -> Result<String, ToolError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn Tool) {}
};
