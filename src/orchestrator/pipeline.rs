//! Pipeline state machine
//!
//! `Start → Priced → Written → Retrieved → Rendered → Done`, with
//! `Failed` reachable from any non-terminal state.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::agent::{AgentError, AgentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PipelineState {
    Start,
    Priced,
    Written,
    Retrieved,
    Rendered,
    Done,
    Failed,
}

impl PipelineState {
    /// The only state a successful step may move to.
    pub fn successor(self) -> Option<PipelineState> {
        match self {
            PipelineState::Start => Some(PipelineState::Priced),
            PipelineState::Priced => Some(PipelineState::Written),
            PipelineState::Written => Some(PipelineState::Retrieved),
            PipelineState::Retrieved => Some(PipelineState::Rendered),
            PipelineState::Rendered => Some(PipelineState::Done),
            PipelineState::Done | PipelineState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks one run through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    visited: Vec<PipelineState>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            visited: vec![PipelineState::Start],
        }
    }

    pub fn state(&self) -> PipelineState {
        *self.visited.last().unwrap_or(&PipelineState::Start)
    }

    /// States passed through so far, in order.
    pub fn visited(&self) -> &[PipelineState] {
        &self.visited
    }

    /// Move to `next`, which must be the current state's successor.
    pub fn advance(&mut self, next: PipelineState) -> AgentResult<()> {
        let current = self.state();
        if current.successor() != Some(next) {
            return Err(AgentError::Protocol(format!(
                "Illegal pipeline transition {} -> {}",
                current, next
            )));
        }
        debug!("Pipeline {} -> {}", current, next);
        self.visited.push(next);
        Ok(())
    }

    /// Enter the absorbing `Failed` state. No-op once terminal.
    pub fn fail(&mut self) {
        let current = self.state();
        if !current.is_terminal() {
            debug!("Pipeline {} -> Failed", current);
            self.visited.push(PipelineState::Failed);
        }
    }
}
