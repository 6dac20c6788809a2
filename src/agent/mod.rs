//! Agent Module
//!
//! The four pipeline stages plus the shared error, outcome and provider
//! types they are built on.

mod provider;
mod types;

pub mod case_study;
pub mod pricing;
pub mod template;
pub mod writing;

pub use case_study::CaseStudyAgent;
pub use pricing::PricingAgent;
pub use provider::{LLMProvider, OllamaProvider, OpenAICompatibleProvider};
pub use template::TemplateAgent;
pub use types::{AgentError, AgentResult, AgentRole, GenerationParams, StageOutcome};
pub use writing::WritingAgent;

/// Shorten `s` to at most `max_len` bytes for log lines.
pub fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len.saturating_sub(3);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
