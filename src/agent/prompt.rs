//! System prompt for the research assistant.

use crate::tools::ToolRegistry;

/// Build the system prompt with tool purposes listed for context.
pub fn build_system_prompt(tools: &ToolRegistry) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("- **{}**: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a clinical trials research assistant. You help pharmaceutical researchers find information about clinical trials using the ClinicalTrials.gov database. Answer questions clearly and cite specific data when available.

## Available Tools
{tool_descriptions}

Use the tools to look up real data before answering. If a question needs no lookup, answer directly."#,
        tool_descriptions = tool_descriptions
    )
}
