#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use proposal_agency::agent::{
    CaseStudyAgent, GenerationParams, LLMProvider, PricingAgent, TemplateAgent, WritingAgent,
};
use proposal_agency::memory::{CaseStudy, Embedder};
use proposal_agency::proposal::{PricingRules, ProjectBrief};
use proposal_agency::render::PdfRenderer;
use proposal_agency::ProposalOrchestrator;

/// Answers prompts in order; fails once the script runs out.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
        }
    }

    /// Reply to each of the three section prompts with a short paragraph.
    pub fn fluent() -> Self {
        Self::new(vec![
            Ok("We deliver measurable value. We deliver measurable value. Our team is ready".to_string()),
            Ok("The platform covers catalog, checkout and reporting".to_string()),
            Ok("Agile sprints with weekly demos.".to_string()),
        ])
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate(&self, _prompt: String, _params: &GenerationParams) -> Result<String> {
        match self.responses.lock().await.pop_front() {
            Some(reply) => reply,
            None => bail!("mock model has nothing more to say"),
        }
    }
}

/// Deterministic bag-of-words encoder over a fixed vocabulary.
pub struct KeywordEmbedder;

pub const VOCABULARY: [&str; 8] = [
    "retail", "ecommerce", "health", "mobile", "finance", "manufacturing", "website", "analytics",
];

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                VOCABULARY
                    .iter()
                    .map(|word| text.matches(word).count() as f32)
                    .collect()
            })
            .collect())
    }
}

pub struct FakePdfRenderer;

#[async_trait]
impl PdfRenderer for FakePdfRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>> {
        Ok(format!("%PDF-1.7\n% {} bytes of html", html.len()).into_bytes())
    }
}

pub struct BrokenPdfRenderer;

#[async_trait]
impl PdfRenderer for BrokenPdfRenderer {
    async fn render_pdf(&self, _html: &str) -> Result<Vec<u8>> {
        bail!("chromedriver not running")
    }
}

pub fn rules() -> PricingRules {
    PricingRules {
        base_pricing: HashMap::from([
            (
                "website".to_string(),
                HashMap::from([("low".to_string(), 5000.0), ("medium".to_string(), 10000.0)]),
            ),
            ("ecommerce".to_string(), HashMap::from([("medium".to_string(), 25000.0)])),
        ]),
        timeline_multipliers: HashMap::from([("4".to_string(), 1.0), ("2".to_string(), 1.3)]),
        additional_services: HashMap::from([("seo".to_string(), 2500.0)]),
        client_type_multipliers: HashMap::from([
            ("enterprise".to_string(), 1.0),
            ("startup".to_string(), 0.85),
        ]),
        recurring_client_discount: Some(0.10),
        tax_rate: Some(0.08),
    }
}

pub fn corpus() -> Vec<CaseStudy> {
    vec![
        CaseStudy::new("Fashion Storefront", "Retail", "ecommerce", "Online retail ecommerce shop"),
        CaseStudy::new("Patient Portal", "Healthcare", "web_app", "Health records for clinics"),
        CaseStudy::new("Trading App", "Finance", "mobile_app", "Mobile finance app"),
        CaseStudy::new("Plant ERP", "Manufacturing", "web_app", "Manufacturing analytics"),
    ]
}

/// Standard website brief: prices at 10,000 before tax.
pub fn website_brief() -> ProjectBrief {
    ProjectBrief {
        client_name: Some("Acme Retail".into()),
        project_title: Some("Storefront Refresh".into()),
        project_description: Some("A retail website refresh".into()),
        project_type: Some("website".into()),
        complexity: Some("medium".into()),
        industry: Some("Retail".into()),
        client_type: Some("enterprise".into()),
        timeline_weeks: Some(4),
        ..Default::default()
    }
}

pub async fn orchestrator(
    provider: Option<Arc<dyn LLMProvider>>,
    renderer: Option<Arc<dyn PdfRenderer>>,
) -> ProposalOrchestrator {
    let pricing = PricingAgent::new(Arc::new(rules()));
    let writing = WritingAgent::new(provider, GenerationParams::default());
    let case_study = CaseStudyAgent::build(corpus(), Some(Arc::new(KeywordEmbedder)), 3).await;
    let template = TemplateAgent::with_bundled_template(renderer, "Test Studio").expect("bundled template compiles");
    ProposalOrchestrator::new(pricing, writing, case_study, template)
}
