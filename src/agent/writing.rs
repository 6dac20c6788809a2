//! Writing Agent
//!
//! Builds one prompt per proposal section, sends each to the configured
//! [`LLMProvider`] and tidies the result. Any provider failure swaps the
//! whole set for deterministic template text, so this stage never aborts
//! the pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use super::{truncate, AgentError, AgentResult, AgentRole, GenerationParams, LLMProvider, StageOutcome};
use crate::mcp::{create_mcp, Envelope, Payload, SectionsPayload};
use crate::proposal::{ProjectBrief, ProposalSections};

const DEFAULT_CLIENT_NAME: &str = "Our Valued Client";
const DEFAULT_PROJECT_TITLE: &str = "Digital Transformation Project";
const DEFAULT_DESCRIPTION: &str = "A comprehensive digital solution";
const DEFAULT_TIMELINE_MONTHS: u32 = 6;
const DEFAULT_REQUIREMENTS: [&str; 3] = ["Modern design", "User-friendly interface", "Scalable architecture"];
const DEFAULT_TECHNOLOGIES: [&str; 3] = ["React", "Node.js", "MongoDB"];
const DEFAULT_CLIENT_TYPE: &str = "business";
const KEY_BENEFITS: &str =
    "enhanced digital presence, improved user experience, scalable technology solutions, competitive advantage";

const MAX_CHARS: usize = 800;
const MAX_WORDS: usize = 120;

/// Prompt variables with the documented defaults already substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub client_name: String,
    pub project_title: String,
    pub project_description: String,
    pub timeline_months: u32,
    pub requirements: String,
    pub technologies: String,
    pub client_type: String,
}

fn joined_or(items: &[String], fallback: &[&str]) -> String {
    if items.is_empty() {
        fallback.join(", ")
    } else {
        items.join(", ")
    }
}

impl PromptContext {
    pub fn from_brief(brief: &ProjectBrief) -> Self {
        Self {
            client_name: brief.client_name.clone().unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            project_title: brief
                .project_title
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT_TITLE.to_string()),
            project_description: brief
                .project_description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            timeline_months: brief.timeline_months.unwrap_or(DEFAULT_TIMELINE_MONTHS),
            requirements: joined_or(&brief.requirements, &DEFAULT_REQUIREMENTS),
            technologies: joined_or(&brief.target_technologies, &DEFAULT_TECHNOLOGIES),
            client_type: brief
                .client_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CLIENT_TYPE.to_string()),
        }
    }

    pub fn executive_summary_prompt(&self) -> String {
        format!(
            "Write an executive summary for {}'s {}.\n\n\
             Project: {}\n\
             Timeline: {} months\n\
             Benefits: {}\n\n\
             Create a professional summary that highlights the project value, scope, and our expertise. \
             Focus on business benefits and outcomes.\n\n\
             Executive Summary:",
            self.client_name, self.project_title, self.project_description, self.timeline_months, KEY_BENEFITS
        )
    }

    pub fn project_overview_prompt(&self) -> String {
        format!(
            "Write a project overview for {}.\n\n\
             Description: {}\n\
             Requirements: {}\n\
             Technologies: {}\n\
             Timeline: {} months\n\n\
             Explain the project goals, technical approach, key features, and expected deliverables. \
             Be specific and professional.\n\n\
             Project Overview:",
            self.project_title, self.project_description, self.requirements, self.technologies, self.timeline_months
        )
    }

    pub fn methodology_prompt(&self) -> String {
        format!(
            "Write a methodology section for {}.\n\n\
             Project: {}\n\
             Technologies: {}\n\
             Client: {}\n\n\
             Describe our development process, project phases, quality assurance, and collaboration approach. \
             Emphasize expertise and proven methods.\n\n\
             Methodology:",
            self.project_title,
            self.project_description,
            self.technologies,
            title_case(&self.client_type.replace('_', " "))
        )
    }

    /// Deterministic sections used when generation is unavailable.
    pub fn fallback_sections(&self) -> ProposalSections {
        ProposalSections {
            executive_summary: format!(
                "This proposal outlines a comprehensive {} for {}, designed to deliver significant business value \
                 through modern technology solutions and proven methodologies over a {}-month timeline.",
                self.project_title, self.client_name, self.timeline_months
            ),
            project_overview: format!(
                "The {} represents a strategic initiative to enhance {}'s digital capabilities. This project \
                 encompasses {} and will be implemented using cutting-edge technologies including {}.",
                self.project_title, self.client_name, self.requirements, self.technologies
            ),
            methodology: format!(
                "Our proven methodology for {} combines agile development practices with continuous client \
                 collaboration, ensuring high-quality deliverables and successful project outcomes.",
                self.project_title
            ),
        }
    }
}

/// Upper-case the first letter of every word, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Drop repeated sentences, close with a period and cap overly long text.
///
/// Sentences are the chunks between `". "`; repeats are detected
/// case-insensitively and the first occurrence wins.
pub fn clean_generated_text(text: &str) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect();

    let mut cleaned = unique.join(". ");
    if !cleaned.is_empty() && !cleaned.ends_with('.') {
        cleaned.push('.');
    }

    if cleaned.chars().count() > MAX_CHARS {
        let words: Vec<&str> = cleaned.split_whitespace().collect();
        if words.len() > MAX_WORDS {
            cleaned = format!("{}.", words[..MAX_WORDS].join(" "));
        }
    }

    cleaned
}

pub struct WritingAgent {
    provider: Option<Arc<dyn LLMProvider>>,
    params: GenerationParams,
}

impl WritingAgent {
    pub fn new(provider: Option<Arc<dyn LLMProvider>>, params: GenerationParams) -> Self {
        if provider.is_none() {
            warn!("No text-generation provider configured; proposals will use template text");
        }
        Self { provider, params }
    }

    async fn generate_section(&self, provider: &dyn LLMProvider, name: &str, prompt: String) -> AgentResult<String> {
        info!("Generating {}...", name.replace('_', " "));
        let raw = provider
            .generate(prompt, &self.params)
            .await
            .map_err(|e| AgentError::Provider(format!("{}: {}", name, e)))?;

        let cleaned = clean_generated_text(raw.trim());
        if cleaned.is_empty() {
            return Err(AgentError::Provider(format!("{}: model returned no text", name)));
        }
        tracing::debug!("{}: {}", name, truncate(&cleaned, 80));
        Ok(cleaned)
    }

    /// Generate all three sections, or the fallback set if any call fails.
    pub async fn generate_sections(&self, brief: &ProjectBrief) -> StageOutcome<ProposalSections> {
        let ctx = PromptContext::from_brief(brief);

        let Some(provider) = self.provider.as_deref() else {
            return StageOutcome::degraded(ctx.fallback_sections(), "Text generation service not configured");
        };

        let generated: AgentResult<ProposalSections> = async {
            Ok(ProposalSections {
                executive_summary: self
                    .generate_section(provider, "executive_summary", ctx.executive_summary_prompt())
                    .await?,
                project_overview: self
                    .generate_section(provider, "project_overview", ctx.project_overview_prompt())
                    .await?,
                methodology: self
                    .generate_section(provider, "methodology", ctx.methodology_prompt())
                    .await?,
            })
        }
        .await;

        match generated {
            Ok(sections) => {
                info!("Generated 3 sections successfully");
                StageOutcome::Success(sections)
            }
            Err(e) => {
                warn!("Error generating sections, using template text: {}", e);
                StageOutcome::degraded(ctx.fallback_sections(), e.to_string())
            }
        }
    }

    /// Answer a `PROPOSAL_REQUEST` envelope with `PROPOSAL_SECTIONS_GENERATED`.
    pub async fn generate_proposal_sections(&self, request: &Envelope) -> AgentResult<Envelope> {
        let Payload::ProposalRequest(brief) = request.payload() else {
            return Err(AgentError::Protocol(format!(
                "WritingAgent expects PROPOSAL_REQUEST, got {}",
                request.message_type()
            )));
        };

        let (sections, note) = self.generate_sections(brief).await.into_parts();
        Ok(create_mcp(
            AgentRole::WritingAgent.as_str(),
            AgentRole::Orchestrator.as_str(),
            Payload::ProposalSectionsGenerated(SectionsPayload { sections, note }),
        ))
    }
}
