//! Proposal Orchestrator
//!
//! Runs pricing, writing, retrieval and rendering one after another,
//! checks every envelope a stage hands back, and merges the payloads.
//! The caller always gets an envelope back: `PROPOSAL_COMPLETED` on
//! success, `GENERATION_ERROR` with partial data otherwise.

use anyhow::{Context, Result};
use ollama_rs::Ollama;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::pipeline::{PipelineRun, PipelineState};
use crate::agent::{
    AgentError, AgentResult, AgentRole, CaseStudyAgent, GenerationParams, LLMProvider, OllamaProvider,
    OpenAICompatibleProvider, PricingAgent, TemplateAgent, WritingAgent,
};
use crate::config::{LlmBackend, ProposalConfig};
use crate::mcp::{create_mcp, validate_mcp, Envelope, ErrorPayload, MessageType, Payload};
use crate::memory::{load_case_studies, Embedder, FastEmbedder};
use crate::proposal::{CombinedProposal, FinalProposal, PartialProposal, PricingRules, ProjectBrief};
use crate::render::{PdfRenderer, WebDriverPdfRenderer};

pub struct ProposalOrchestrator {
    pricing: PricingAgent,
    writing: WritingAgent,
    case_study: CaseStudyAgent,
    template: TemplateAgent,
}

/// Fail unless `envelope` is well formed and carries one of `expected`.
fn check(envelope: &Envelope, expected: &[MessageType], failure: &str) -> AgentResult<()> {
    if expected.iter().any(|t| validate_mcp(envelope, Some(*t))) {
        Ok(())
    } else {
        Err(AgentError::Protocol(failure.to_string()))
    }
}

fn build_provider(config: &ProposalConfig) -> Option<Arc<dyn LLMProvider>> {
    match config.llm_backend {
        LlmBackend::Ollama => {
            info!(
                "Text generation via Ollama at {}:{} ({})",
                config.ollama_host, config.ollama_port, config.llm_model
            );
            let client = Ollama::new(config.ollama_host.clone(), config.ollama_port);
            Some(Arc::new(OllamaProvider::new(client)))
        }
        LlmBackend::OpenAi => {
            info!("Text generation via {} ({})", config.openai_url, config.llm_model);
            Some(Arc::new(OpenAICompatibleProvider::new(
                config.openai_url.clone(),
                config.openai_api_key.clone(),
            )))
        }
        LlmBackend::Disabled => None,
    }
}

async fn build_embedder(config: &ProposalConfig) -> Option<Arc<dyn Embedder>> {
    if !config.enable_embeddings {
        return None;
    }
    // Model loading blocks on file and network I/O.
    match tokio::task::spawn_blocking(FastEmbedder::new).await {
        Ok(Ok(embedder)) => Some(Arc::new(embedder)),
        Ok(Err(e)) => {
            warn!("Embedding model unavailable, case study retrieval disabled: {}", e);
            None
        }
        Err(e) => {
            warn!("Embedding model loader panicked: {}", e);
            None
        }
    }
}

impl ProposalOrchestrator {
    pub fn new(pricing: PricingAgent, writing: WritingAgent, case_study: CaseStudyAgent, template: TemplateAgent) -> Self {
        Self {
            pricing,
            writing,
            case_study,
            template,
        }
    }

    /// Load data files and connect every service named in `config`.
    pub async fn from_config(config: &ProposalConfig) -> Result<Self> {
        info!("Initializing Proposal Orchestrator...");

        let rules = PricingRules::load(&config.pricing_rules_path)?;
        let pricing = PricingAgent::new(Arc::new(rules));

        let params = GenerationParams {
            model: config.llm_model.clone(),
            ..Default::default()
        };
        let writing = WritingAgent::new(build_provider(config), params);

        let cases = load_case_studies(&config.case_studies_path)?;
        let embedder = build_embedder(config).await;
        let case_study = CaseStudyAgent::build(cases, embedder, config.top_k).await;
        info!(
            "Case study agent: {} cases, top {}, retrieval {}",
            case_study.case_count(),
            case_study.top_k(),
            if case_study.is_ready() { "ready" } else { "disabled" }
        );

        let renderer = config
            .webdriver_url
            .as_ref()
            .map(|url| Arc::new(WebDriverPdfRenderer::new(url.clone())) as Arc<dyn PdfRenderer>);
        let template = TemplateAgent::load(&config.template_path, renderer, config.company_name.clone())
            .context("Failed to initialize template agent")?;

        info!("All agents initialized successfully");
        Ok(Self::new(pricing, writing, case_study, template))
    }

    /// Run the whole pipeline for a brief.
    pub async fn generate_complete_proposal(&self, brief: ProjectBrief) -> Envelope {
        let request = create_mcp(
            AgentRole::UserInterface.as_str(),
            AgentRole::Orchestrator.as_str(),
            Payload::ProposalRequest(brief),
        );
        self.handle_request(request).await
    }

    /// Run the pipeline for an already built `PROPOSAL_REQUEST` envelope.
    pub async fn handle_request(&self, request: Envelope) -> Envelope {
        let mut run = PipelineRun::new();
        let mut partial = PartialProposal::default();

        let result = match request.payload() {
            Payload::ProposalRequest(brief) => {
                partial.brief = brief.clone();
                info!(
                    "Starting proposal generation for {}",
                    brief.client_name.as_deref().unwrap_or("Client")
                );
                self.run(&request, &mut run, &mut partial).await
            }
            _ => Err(AgentError::Protocol(format!(
                "Expected PROPOSAL_REQUEST, got {}",
                request.message_type()
            ))),
        };

        match result {
            Ok(done) => {
                info!("Proposal complete: {} document", done.document.format);
                create_mcp(
                    AgentRole::Orchestrator.as_str(),
                    AgentRole::UserInterface.as_str(),
                    Payload::ProposalCompleted(Box::new(done)),
                )
            }
            Err(e) => {
                run.fail();
                error!("Orchestration error at {:?}: {}", run.visited(), e);
                create_mcp(
                    AgentRole::Orchestrator.as_str(),
                    AgentRole::UserInterface.as_str(),
                    Payload::GenerationError(Box::new(ErrorPayload {
                        error: e.to_string(),
                        partial_data: partial,
                    })),
                )
            }
        }
    }

    async fn run(
        &self,
        request: &Envelope,
        run: &mut PipelineRun,
        partial: &mut PartialProposal,
    ) -> AgentResult<FinalProposal> {
        let mut stage_notes = Vec::new();

        let priced = self.pricing.calculate_pricing(request)?;
        check(
            &priced,
            &[MessageType::PricingCalculated],
            "Pricing calculation failed - invalid MCP response",
        )?;
        let Payload::PricingCalculated(payload) = priced.into_payload() else {
            return Err(AgentError::Protocol("Pricing calculation failed - invalid MCP response".into()));
        };
        info!("Pricing calculated: ${:.2}", payload.pricing.total);
        partial.pricing = Some(payload.pricing);
        run.advance(PipelineState::Priced)?;

        let written = self.writing.generate_proposal_sections(request).await?;
        check(
            &written,
            &[MessageType::ProposalSectionsGenerated],
            "Proposal writing failed - invalid MCP response",
        )?;
        let Payload::ProposalSectionsGenerated(payload) = written.into_payload() else {
            return Err(AgentError::Protocol("Proposal writing failed - invalid MCP response".into()));
        };
        info!("Generated {} proposal sections", payload.sections.iter().count());
        stage_notes.extend(payload.note);
        partial.sections = Some(payload.sections);
        run.advance(PipelineState::Written)?;

        let retrieved = self.case_study.retrieve_relevant_cases(request).await?;
        check(
            &retrieved,
            &[MessageType::CaseStudiesRetrieved],
            "Case study retrieval failed - invalid MCP response",
        )?;
        let Payload::CaseStudiesRetrieved(payload) = retrieved.into_payload() else {
            return Err(AgentError::Protocol("Case study retrieval failed - invalid MCP response".into()));
        };
        info!("Found {} relevant case studies", payload.relevant_cases.len());
        stage_notes.extend(payload.note);
        partial.relevant_cases = Some(payload.relevant_cases);
        run.advance(PipelineState::Retrieved)?;

        let combined = CombinedProposal {
            brief: partial.brief.clone(),
            pricing: partial.pricing.clone().ok_or_else(|| AgentError::Protocol("Pricing missing".into()))?,
            sections: partial.sections.clone().ok_or_else(|| AgentError::Protocol("Sections missing".into()))?,
            relevant_cases: partial.relevant_cases.clone().unwrap_or_default(),
        };
        let render_request = create_mcp(
            AgentRole::Orchestrator.as_str(),
            AgentRole::TemplateAgent.as_str(),
            Payload::GeneratePdf(Box::new(combined)),
        );

        let rendered = self.template.generate_pdf_proposal(&render_request).await?;
        check(
            &rendered,
            &[MessageType::PdfGenerated, MessageType::HtmlGenerated],
            "PDF generation failed - invalid MCP response",
        )?;
        let document = match rendered.into_payload() {
            Payload::PdfGenerated(doc) | Payload::HtmlGenerated(doc) => *doc,
            _ => return Err(AgentError::Protocol("PDF generation failed - invalid MCP response".into())),
        };
        info!("Final document generated: {}", document.format);
        stage_notes.extend(document.note.clone());
        run.advance(PipelineState::Rendered)?;

        let Payload::GeneratePdf(combined) = render_request.into_payload() else {
            return Err(AgentError::Protocol("Render request lost its payload".into()));
        };
        run.advance(PipelineState::Done)?;

        Ok(FinalProposal {
            proposal: *combined,
            document,
            stage_notes,
        })
    }
}
