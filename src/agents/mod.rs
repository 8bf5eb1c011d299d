//! Participating agents
//!
//! The registry owns the three agents and their status; the orchestrator is
//! its only writer.

pub mod registry;

pub use registry::AgentRegistry;
