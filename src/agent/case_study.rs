//! Case Study Agent
//!
//! Retrieval over the static case-study corpus. The index is built once
//! at startup; an empty corpus or an index that could not be built makes
//! every query return no cases instead of failing.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{AgentError, AgentResult, AgentRole, StageOutcome};
use crate::mcp::{create_mcp, CasesPayload, Envelope, Payload};
use crate::memory::{normalize, CaseStudy, Embedder, FlatIpIndex, ScoredCaseStudy, VectorIndex};
use crate::proposal::ProjectBrief;

pub const DEFAULT_TOP_K: usize = 3;

pub struct CaseStudyAgent {
    cases: Vec<CaseStudy>,
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Box<dyn VectorIndex>>,
    top_k: usize,
}

/// Query text for a brief: the non-empty descriptive fields, space-joined.
pub fn query_text(brief: &ProjectBrief) -> String {
    let services = brief.additional_services.join(" ");
    [
        brief.project_type.as_deref().unwrap_or_default(),
        brief.industry.as_deref().unwrap_or_default(),
        brief.project_description.as_deref().unwrap_or_default(),
        brief.complexity.as_deref().unwrap_or_default(),
        services.as_str(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

impl CaseStudyAgent {
    /// Encode the corpus and build the index.
    ///
    /// Records carrying a precomputed embedding skip the encoder. Any
    /// failure leaves the agent without an index.
    pub async fn build(cases: Vec<CaseStudy>, embedder: Option<Arc<dyn Embedder>>, top_k: usize) -> Self {
        let index = if cases.is_empty() {
            warn!("No case studies loaded; retrieval disabled");
            None
        } else if let Some(ref encoder) = embedder {
            match Self::build_index(&cases, encoder.as_ref()).await {
                Ok(index) => {
                    info!(
                        "Case study index built: {} vectors, {} dimensions",
                        index.len(),
                        index.dimension()
                    );
                    Some(index)
                }
                Err(e) => {
                    warn!("Failed to build case study index: {}", e);
                    None
                }
            }
        } else {
            warn!("No embedding service configured; retrieval disabled");
            None
        };

        Self {
            cases,
            embedder,
            index,
            top_k,
        }
    }

    async fn build_index(cases: &[CaseStudy], embedder: &dyn Embedder) -> AgentResult<Box<dyn VectorIndex>> {
        let pending: Vec<(usize, String)> = cases
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_none())
            .map(|(i, c)| (i, c.embedding_text()))
            .collect();

        let mut vectors: Vec<Option<Vec<f32>>> = cases.iter().map(|c| c.embedding.clone()).collect();

        if !pending.is_empty() {
            debug!("Generating embeddings for {} case studies", pending.len());
            let (positions, texts): (Vec<usize>, Vec<String>) = pending.into_iter().unzip();
            let encoded = embedder
                .embed(texts)
                .await
                .map_err(|e| AgentError::Embedding(e.to_string()))?;
            if encoded.len() != positions.len() {
                return Err(AgentError::Embedding(format!(
                    "Encoder returned {} vectors for {} texts",
                    encoded.len(),
                    positions.len()
                )));
            }
            for (pos, vector) in positions.into_iter().zip(encoded) {
                vectors[pos] = Some(vector);
            }
        }

        let mut vectors: Vec<Vec<f32>> = vectors.into_iter().flatten().collect();
        for v in vectors.iter_mut() {
            normalize(v);
        }

        let dimension = vectors.first().map(Vec::len).unwrap_or_default();
        let mut index = FlatIpIndex::new(dimension);
        index.add(vectors).map_err(|e| AgentError::Embedding(e.to_string()))?;
        Ok(Box::new(index))
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn is_ready(&self) -> bool {
        self.index.as_ref().is_some_and(|i| !i.is_empty())
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Up to `k` cases most similar to the brief, best first.
    pub async fn retrieve(&self, brief: &ProjectBrief, k: usize) -> StageOutcome<Vec<ScoredCaseStudy>> {
        let (Some(index), Some(embedder)) = (self.index.as_deref(), self.embedder.as_deref()) else {
            return if self.cases.is_empty() {
                StageOutcome::Success(Vec::new())
            } else {
                StageOutcome::degraded(Vec::new(), "Case study index unavailable")
            };
        };

        let query = query_text(brief);
        info!("Searching for cases similar to: '{}'", super::truncate(&query, 100));

        let mut query_vec = match embedder.embed(vec![query]).await {
            Ok(mut vs) if !vs.is_empty() => vs.swap_remove(0),
            Ok(_) => return StageOutcome::degraded(Vec::new(), "Encoder returned no query vector"),
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return StageOutcome::degraded(Vec::new(), format!("Query embedding failed: {}", e));
            }
        };
        normalize(&mut query_vec);

        let relevant: Vec<ScoredCaseStudy> = index
            .search(&query_vec, k)
            .into_iter()
            .filter_map(|hit| {
                self.cases.get(hit.position).map(|case| ScoredCaseStudy {
                    case: case.clone(),
                    similarity_score: hit.score,
                })
            })
            .collect();

        info!("Found {} relevant case studies", relevant.len());
        for (i, scored) in relevant.iter().enumerate() {
            debug!("{}. {} (similarity: {:.3})", i + 1, scored.case.title, scored.similarity_score);
        }
        StageOutcome::Success(relevant)
    }

    /// Answer a `PROPOSAL_REQUEST` envelope with `CASE_STUDIES_RETRIEVED`.
    pub async fn retrieve_relevant_cases(&self, request: &Envelope) -> AgentResult<Envelope> {
        let Payload::ProposalRequest(brief) = request.payload() else {
            return Err(AgentError::Protocol(format!(
                "CaseStudyAgent expects PROPOSAL_REQUEST, got {}",
                request.message_type()
            )));
        };

        let (relevant_cases, note) = self.retrieve(brief, self.top_k).await.into_parts();
        Ok(create_mcp(
            AgentRole::CaseStudyAgent.as_str(),
            AgentRole::Orchestrator.as_str(),
            Payload::CaseStudiesRetrieved(CasesPayload { relevant_cases, note }),
        ))
    }
}
