//! Template Agent
//!
//! Fills the proposal HTML template with the merged proposal data and
//! asks the configured [`PdfRenderer`] for a PDF. Without a renderer, or
//! when conversion fails, the HTML is returned alone with a note.

use chrono::Local;
use handlebars::{handlebars_helper, Handlebars};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::writing::title_case;
use super::{AgentError, AgentResult, AgentRole, StageOutcome};
use crate::mcp::{create_mcp, Envelope, Payload};
use crate::proposal::{CombinedProposal, RenderedDocument, PDF_UNAVAILABLE_NOTE};
use crate::render::PdfRenderer;

const TEMPLATE_NAME: &str = "proposal";
const BUNDLED_TEMPLATE: &str = include_str!("../../data/templates/proposal_template.html");

pub const DEFAULT_COMPANY_NAME: &str = "Creative Agency Pro";
const DEFAULT_CLIENT_NAME: &str = "Valued Client";
const DEFAULT_PROJECT_TYPE: &str = "Website";

/// `$12,345.67`
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}${}.{}", sign, grouped, cents)
}

handlebars_helper!(money: |amount: f64| format_money(amount));
handlebars_helper!(percent: |rate: f64| format!("{:.0}%", rate * 100.0));
handlebars_helper!(titlecase: |s: str| title_case(&s.replace('_', " ")));
handlebars_helper!(inc: |n: u64| n + 1);

pub struct TemplateAgent {
    registry: Handlebars<'static>,
    renderer: Option<Arc<dyn PdfRenderer>>,
    company_name: String,
}

impl TemplateAgent {
    /// Compile `template` and register the formatting helpers.
    pub fn new(
        template: &str,
        renderer: Option<Arc<dyn PdfRenderer>>,
        company_name: impl Into<String>,
    ) -> AgentResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_helper("money", Box::new(money));
        registry.register_helper("percent", Box::new(percent));
        registry.register_helper("titlecase", Box::new(titlecase));
        registry.register_helper("inc", Box::new(inc));
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| AgentError::Configuration(format!("Invalid proposal template: {}", e)))?;

        if renderer.is_none() {
            warn!("No PDF renderer configured; documents will be HTML only");
        }

        Ok(Self {
            registry,
            renderer,
            company_name: company_name.into(),
        })
    }

    /// Load the template from disk, using the bundled one if the file is missing.
    pub fn load(
        path: impl AsRef<Path>,
        renderer: Option<Arc<dyn PdfRenderer>>,
        company_name: impl Into<String>,
    ) -> AgentResult<Self> {
        let path = path.as_ref();
        let source = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            warn!("Template file not found at {:?}; using bundled template", path);
            BUNDLED_TEMPLATE.to_string()
        };
        Self::new(&source, renderer, company_name)
    }

    pub fn with_bundled_template(
        renderer: Option<Arc<dyn PdfRenderer>>,
        company_name: impl Into<String>,
    ) -> AgentResult<Self> {
        Self::new(BUNDLED_TEMPLATE, renderer, company_name)
    }

    pub fn render_html(&self, proposal: &CombinedProposal) -> AgentResult<String> {
        let brief = &proposal.brief;
        let date = brief
            .date
            .clone()
            .unwrap_or_else(|| Local::now().format("%B %d, %Y").to_string());

        let data = json!({
            "client_name": brief.client_name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME),
            "project_title": brief.project_title.as_deref().unwrap_or("Project Proposal"),
            "project_type": brief.project_type.as_deref().unwrap_or(DEFAULT_PROJECT_TYPE),
            "sections": proposal.sections,
            "pricing": proposal.pricing,
            "case_studies": proposal.relevant_cases,
            "company_name": self.company_name,
            "date": date,
            "timeline_weeks": brief.timeline_weeks_or_default(),
        });

        self.registry
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| AgentError::Render(format!("Template rendering failed: {}", e)))
    }

    /// Render HTML, then try for a PDF.
    pub async fn render_document(&self, proposal: &CombinedProposal) -> AgentResult<StageOutcome<RenderedDocument>> {
        let html = self.render_html(proposal)?;

        let Some(renderer) = self.renderer.as_deref() else {
            return Ok(StageOutcome::degraded(
                RenderedDocument::html_only(html),
                PDF_UNAVAILABLE_NOTE,
            ));
        };

        match renderer.render_pdf(&html).await {
            Ok(bytes) if !bytes.is_empty() => {
                info!("PDF generated successfully: {} bytes", bytes.len());
                Ok(StageOutcome::Success(RenderedDocument::pdf(bytes, html)))
            }
            Ok(_) => Ok(StageOutcome::degraded(
                RenderedDocument::html_only(html),
                "PDF renderer returned an empty document",
            )),
            Err(e) => {
                warn!("PDF generation error, continuing with HTML-only output: {}", e);
                Ok(StageOutcome::degraded(
                    RenderedDocument::html_only(html),
                    format!("PDF generation failed: {}", e),
                ))
            }
        }
    }

    /// Answer a `GENERATE_PDF` envelope with `PDF_GENERATED` or `HTML_GENERATED`.
    pub async fn generate_pdf_proposal(&self, request: &Envelope) -> AgentResult<Envelope> {
        let Payload::GeneratePdf(proposal) = request.payload() else {
            return Err(AgentError::Protocol(format!(
                "TemplateAgent expects GENERATE_PDF, got {}",
                request.message_type()
            )));
        };

        let (document, _) = self.render_document(proposal).await?.into_parts();
        Ok(create_mcp(
            AgentRole::TemplateAgent.as_str(),
            AgentRole::Orchestrator.as_str(),
            Payload::document(document),
        ))
    }
}
