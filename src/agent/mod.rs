//! Agent module - the tool-calling orchestration loop.
//!
//! One question flows through three stages:
//! 1. Ask the model which tools it wants (tool selection on auto)
//! 2. Execute each requested tool in order, appending results
//! 3. Ask the model for the final answer (tool selection disabled)
//!
//! A direct answer in stage 1 short-circuits stages 2 and 3.

mod agent_loop;
mod prompt;

pub use agent_loop::Agent;
pub use prompt::build_system_prompt;
