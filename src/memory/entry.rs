//! Case study records

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// A past project used as reference material in proposals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStudy {
    pub title: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Precomputed vector; records without one are encoded at startup.
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    /// Any further fields of the source record (client, results, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CaseStudy {
    pub fn new(
        title: impl Into<String>,
        industry: impl Into<String>,
        project_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            industry: industry.into(),
            project_type: project_type.into(),
            description: description.into(),
            technologies: Vec::new(),
            embedding: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_technologies(mut self, technologies: Vec<String>) -> Self {
        self.technologies = technologies;
        self
    }

    /// Text the record is indexed under.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.industry, self.project_type, self.description
        )
    }
}

/// A case study with the similarity it scored against one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCaseStudy {
    #[serde(flatten)]
    pub case: CaseStudy,
    pub similarity_score: f32,
}

/// Load the corpus. A missing file gives an empty corpus.
pub fn load_case_studies(path: impl AsRef<Path>) -> Result<Vec<CaseStudy>> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Case studies file not found at {:?}; retrieval disabled", path);
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read case studies from {:?}", path))?;
    let cases: Vec<CaseStudy> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse case studies from {:?}", path))?;

    info!("Loaded {} case studies", cases.len());
    Ok(cases)
}
