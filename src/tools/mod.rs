//! Tool system: the `Tool` trait and the registry that backs both the
//! model-facing catalog and dispatch.
//!
//! The catalog sent to the model and the dispatch table are derived from
//! the same trait objects, so a tool's advertised name, schema, and
//! implementation cannot drift apart.

mod trials;

pub use trials::{CountTrials, GetEligibilityCriteria, GetTrialLocations, GetTrialPhases};

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{FunctionDefinition, ToolDefinition};
use crate::registry::RegistryClient;

/// A capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as advertised to the model.
    fn name(&self) -> &str;

    /// Purpose description the model reads to decide relevance.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters_schema(&self) -> Value;

    /// Execute with JSON arguments, returning a model-readable string.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Name and purpose of one registered tool, for prompt building.
pub struct ToolSummary<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

/// Holds all available tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with the four clinical-trials query tools.
    pub fn builtin(registry: Arc<RegistryClient>) -> Self {
        let mut tools = Self::new();
        tools.register(Box::new(CountTrials::new(registry.clone())));
        tools.register(Box::new(GetEligibilityCriteria::new(registry.clone())));
        tools.register(Box::new(GetTrialLocations::new(registry.clone())));
        tools.register(Box::new(GetTrialPhases::new(registry)));
        tools
    }

    /// Register a tool. Panics on a duplicate name, so a catalog clash
    /// surfaces at startup rather than at call time.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        assert!(
            !self.has_tool(tool.name()),
            "duplicate tool name: {}",
            tool.name()
        );
        self.tools.push(tool);
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name() == name)
    }

    /// Names and descriptions of all registered tools.
    pub fn list_tools(&self) -> Vec<ToolSummary<'_>> {
        self.tools
            .iter()
            .map(|t| ToolSummary {
                name: t.name(),
                description: t.description(),
            })
            .collect()
    }

    /// The catalog in the shape the completion endpoint expects.
    pub fn get_tool_schemas(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                def_type: "function".to_string(),
                function: FunctionDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    /// Execute a tool by name with the given arguments.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;

        tracing::debug!(tool = name, "Dispatching tool call");
        tool.execute(args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
