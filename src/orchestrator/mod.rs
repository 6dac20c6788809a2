//! Orchestrator Module
//!
//! Sequences the proposal stages and keeps track of finished runs.

pub mod coordinator;
pub mod history;
pub mod pipeline;
pub mod presets;

pub use coordinator::ProposalOrchestrator;
pub use history::{GenerationHistory, HistoryEntry, DEFAULT_HISTORY_LIMIT};
pub use pipeline::{PipelineRun, PipelineState};
pub use presets::{demo_project, example_project, BUDGET_RANGES, EXAMPLE_NAMES};
