//! Clinical-trials query tools exposed to the model.
//!
//! Each tool wraps one registry query and serializes its outcome (summary
//! or upstream error) to JSON for the tool-result message. Argument
//! parsing failures and transport errors propagate; they are not soft
//! results.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;
use crate::registry::{Phase, RegistryClient, TrialStatus};

/// Count trials for a condition and recruitment status.
pub struct CountTrials {
    registry: Arc<RegistryClient>,
}

impl CountTrials {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Tool for CountTrials {
    fn name(&self) -> &str {
        "count_trials"
    }

    fn description(&self) -> &str {
        "Count the number of clinical trials for a specific medical condition and status. Use this when users ask 'how many trials' or want to know trial counts."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "condition": {
                    "type": "string",
                    "description": "The medical condition or disease (e.g., 'diabetes', 'asthma', 'ulcerative colitis')"
                },
                "status": {
                    "type": "string",
                    "enum": ["RECRUITING", "COMPLETED", "TERMINATED", "ACTIVE_NOT_RECRUITING"],
                    "description": "The trial status",
                    "default": "RECRUITING"
                }
            },
            "required": ["condition"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let condition = args["condition"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'condition' argument"))?;
        let status = match args.get("status") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())?,
            _ => TrialStatus::Recruiting,
        };

        let outcome = self.registry.count_trials(condition, status).await?;
        Ok(serde_json::to_string(&outcome)?)
    }
}

/// Collect eligibility criteria from trials of a condition.
pub struct GetEligibilityCriteria {
    registry: Arc<RegistryClient>,
}

impl GetEligibilityCriteria {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Tool for GetEligibilityCriteria {
    fn name(&self) -> &str {
        "get_eligibility_criteria"
    }

    fn description(&self) -> &str {
        "Get eligibility criteria for clinical trials of a specific condition. Use this when users ask about eligibility, inclusion/exclusion criteria, or who can participate."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "condition": {
                    "type": "string",
                    "description": "The medical condition"
                },
                "max_trials": {
                    "type": "integer",
                    "description": "Maximum number of trials to analyze",
                    "default": 5
                }
            },
            "required": ["condition"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let condition = args["condition"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'condition' argument"))?;
        let max_trials = args["max_trials"].as_u64().map(|v| v as u32);

        let outcome = self.registry.eligibility_criteria(condition, max_trials).await?;
        Ok(serde_json::to_string(&outcome)?)
    }
}

/// List facilities running trials for a condition.
pub struct GetTrialLocations {
    registry: Arc<RegistryClient>,
}

impl GetTrialLocations {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Tool for GetTrialLocations {
    fn name(&self) -> &str {
        "get_trial_locations"
    }

    fn description(&self) -> &str {
        "Get locations and facilities running clinical trials for a condition. Use this when users ask about trial sites, locations, or which hospitals/centers are conducting trials."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "condition": {
                    "type": "string",
                    "description": "The medical condition"
                },
                "country": {
                    "type": "string",
                    "description": "Optional country name to filter by (e.g., 'Spain', 'France', 'Germany')"
                }
            },
            "required": ["condition"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let condition = args["condition"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'condition' argument"))?;
        let country = args["country"].as_str();

        let outcome = self.registry.trial_locations(condition, country).await?;
        Ok(serde_json::to_string(&outcome)?)
    }
}

/// List trials of a condition in a given phase.
pub struct GetTrialPhases {
    registry: Arc<RegistryClient>,
}

impl GetTrialPhases {
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Tool for GetTrialPhases {
    fn name(&self) -> &str {
        "get_trial_phases"
    }

    fn description(&self) -> &str {
        "Get trials for a specific phase. Use this when users ask about Phase 1, 2, 3, or 4 trials, or trial duration by phase."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "condition": {
                    "type": "string",
                    "description": "The medical condition"
                },
                "phase": {
                    "type": "string",
                    "enum": ["PHASE1", "PHASE2", "PHASE3", "PHASE4"],
                    "description": "The trial phase"
                }
            },
            "required": ["condition", "phase"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let condition = args["condition"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'condition' argument"))?;
        let phase: Phase = serde_json::from_value(
            args.get("phase")
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Missing 'phase' argument"))?,
        )?;

        let outcome = self.registry.trial_phases(condition, phase).await?;
        Ok(serde_json::to_string(&outcome)?)
    }
}
