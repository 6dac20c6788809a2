//! Proposal Agency
//!
//! Multi-agent pipeline turning a project brief into a priced, written
//! and rendered client proposal:
//! - Rule-based pricing
//! - LLM-written proposal sections with template fallback
//! - Case study retrieval over sentence embeddings
//! - HTML templating with PDF conversion through WebDriver
//! - Typed message envelopes between every stage

pub mod agent;
pub mod config;
pub mod mcp;
pub mod memory;
pub mod orchestrator;
pub mod proposal;
pub mod render;
pub mod server;
pub mod utils;

// Re-exports for convenience
pub use config::ProposalConfig;
pub use mcp::Envelope;
pub use orchestrator::ProposalOrchestrator;
pub use proposal::ProjectBrief;
