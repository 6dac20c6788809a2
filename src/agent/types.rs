use serde::{Deserialize, Serialize};

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Failures a stage can report.
///
/// Only `Configuration` and `Protocol` are fatal to a pipeline run; the
/// other variants are absorbed by the stage that hits them.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Text generation failed: {0}")]
    Provider(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// What a stage produced: its real output, or a fallback plus the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Success(T),
    Degraded { value: T, reason: String },
}

impl<T> StageOutcome<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        StageOutcome::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, StageOutcome::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            StageOutcome::Success(value) | StageOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_parts(self) -> (T, Option<String>) {
        match self {
            StageOutcome::Success(value) => (value, None),
            StageOutcome::Degraded { value, reason } => (value, Some(reason)),
        }
    }
}

/// Participants that send or receive envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    UserInterface,
    Orchestrator,
    PricingAgent,
    WritingAgent,
    CaseStudyAgent,
    TemplateAgent,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::UserInterface => "UserInterface",
            AgentRole::Orchestrator => "Orchestrator",
            AgentRole::PricingAgent => "PricingAgent",
            AgentRole::WritingAgent => "WritingAgent",
            AgentRole::CaseStudyAgent => "CaseStudyAgent",
            AgentRole::TemplateAgent => "TemplateAgent",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling and length bounds handed to the text-generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub model: String,
    pub max_length: u32,
    pub min_length: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "llama3.2:3b".to_string(),
            max_length: 300,
            min_length: 50,
            temperature: 0.7,
            top_p: 0.9,
            repetition_penalty: 1.2,
        }
    }
}
