//! # Trial Scout
//!
//! A clinical trials research agent over the ClinicalTrials.gov v2 API.
//!
//! This library provides:
//! - A registry client with four query operations (counts, eligibility,
//!   locations, phases) projected into flat summaries
//! - A tool catalog describing those operations to a language model
//! - An orchestration loop that lets the model pick tools, executes them,
//!   and asks the model for a final answer
//!
//! ## Architecture
//!
//! The agent follows a single-pass tool-calling pattern:
//! 1. Send the question plus the tool catalog to the completion endpoint
//! 2. If the model answers directly, return that text
//! 3. Otherwise execute each requested tool in order, feed results back,
//!    and request the final answer with tool selection disabled
//!
//! ## Example
//!
//! ```rust,ignore
//! use trial_scout::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(config);
//! let answer = agent.answer("How many diabetes trials are recruiting?", None).await?;
//! ```

pub mod agent;
pub mod config;
pub mod llm;
pub mod registry;
pub mod tools;

pub use config::Config;
