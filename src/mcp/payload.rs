//! Envelope payloads, one schema per message type

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::memory::ScoredCaseStudy;
use crate::proposal::{
    CombinedProposal, FinalProposal, PartialProposal, PricingBreakdown, ProjectBrief,
    ProposalSections, RenderedDocument,
};

/// Type tag carried in every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    ProposalRequest,
    PricingCalculated,
    ProposalSectionsGenerated,
    CaseStudiesRetrieved,
    GeneratePdf,
    PdfGenerated,
    HtmlGenerated,
    /// Tag of every successful run's final envelope, whichever document
    /// was produced. The payload's `format` says PDF or HTML; the
    /// document stage's own `PDF_GENERATED`/`HTML_GENERATED` envelope
    /// never leaves the orchestrator.
    ProposalCompleted,
    GenerationError,
}

impl MessageType {
    pub const ALL: [MessageType; 9] = [
        MessageType::ProposalRequest,
        MessageType::PricingCalculated,
        MessageType::ProposalSectionsGenerated,
        MessageType::CaseStudiesRetrieved,
        MessageType::GeneratePdf,
        MessageType::PdfGenerated,
        MessageType::HtmlGenerated,
        MessageType::ProposalCompleted,
        MessageType::GenerationError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::ProposalRequest => "PROPOSAL_REQUEST",
            MessageType::PricingCalculated => "PRICING_CALCULATED",
            MessageType::ProposalSectionsGenerated => "PROPOSAL_SECTIONS_GENERATED",
            MessageType::CaseStudiesRetrieved => "CASE_STUDIES_RETRIEVED",
            MessageType::GeneratePdf => "GENERATE_PDF",
            MessageType::PdfGenerated => "PDF_GENERATED",
            MessageType::HtmlGenerated => "HTML_GENERATED",
            MessageType::ProposalCompleted => "PROPOSAL_COMPLETED",
            MessageType::GenerationError => "GENERATION_ERROR",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown message type '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPayload {
    pub pricing: PricingBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionsPayload {
    pub sections: ProposalSections,
    /// Set when the sections are the deterministic fallback text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasesPayload {
    pub relevant_cases: Vec<ScoredCaseStudy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub partial_data: PartialProposal,
}

/// Message body. The variant determines the envelope's type tag, so a
/// typed envelope can never carry a payload that disagrees with its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    ProposalRequest(ProjectBrief),
    PricingCalculated(PricingPayload),
    ProposalSectionsGenerated(SectionsPayload),
    CaseStudiesRetrieved(CasesPayload),
    GeneratePdf(Box<CombinedProposal>),
    PdfGenerated(Box<RenderedDocument>),
    HtmlGenerated(Box<RenderedDocument>),
    ProposalCompleted(Box<FinalProposal>),
    GenerationError(Box<ErrorPayload>),
}

impl Payload {
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::ProposalRequest(_) => MessageType::ProposalRequest,
            Payload::PricingCalculated(_) => MessageType::PricingCalculated,
            Payload::ProposalSectionsGenerated(_) => MessageType::ProposalSectionsGenerated,
            Payload::CaseStudiesRetrieved(_) => MessageType::CaseStudiesRetrieved,
            Payload::GeneratePdf(_) => MessageType::GeneratePdf,
            Payload::PdfGenerated(_) => MessageType::PdfGenerated,
            Payload::HtmlGenerated(_) => MessageType::HtmlGenerated,
            Payload::ProposalCompleted(_) => MessageType::ProposalCompleted,
            Payload::GenerationError(_) => MessageType::GenerationError,
        }
    }

    /// Document-stage payload for a rendered document, tagged by format.
    pub fn document(document: RenderedDocument) -> Self {
        match document.format {
            crate::proposal::DocumentFormat::Pdf => Payload::PdfGenerated(Box::new(document)),
            crate::proposal::DocumentFormat::Html => Payload::HtmlGenerated(Box::new(document)),
        }
    }

    /// Decode the body of an envelope whose tag is `msg_type`.
    pub fn from_content(msg_type: MessageType, content: Value) -> serde_json::Result<Self> {
        use serde_json::from_value;

        Ok(match msg_type {
            MessageType::ProposalRequest => Payload::ProposalRequest(from_value(content)?),
            MessageType::PricingCalculated => Payload::PricingCalculated(from_value(content)?),
            MessageType::ProposalSectionsGenerated => {
                Payload::ProposalSectionsGenerated(from_value(content)?)
            }
            MessageType::CaseStudiesRetrieved => Payload::CaseStudiesRetrieved(from_value(content)?),
            MessageType::GeneratePdf => Payload::GeneratePdf(from_value(content)?),
            MessageType::PdfGenerated => Payload::PdfGenerated(from_value(content)?),
            MessageType::HtmlGenerated => Payload::HtmlGenerated(from_value(content)?),
            MessageType::ProposalCompleted => Payload::ProposalCompleted(from_value(content)?),
            MessageType::GenerationError => Payload::GenerationError(from_value(content)?),
        })
    }
}

/// Serializes only the body of a payload, without its tag.
pub(crate) struct PayloadContent<'a>(pub &'a Payload);

impl Serialize for PayloadContent<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Payload::ProposalRequest(p) => p.serialize(serializer),
            Payload::PricingCalculated(p) => p.serialize(serializer),
            Payload::ProposalSectionsGenerated(p) => p.serialize(serializer),
            Payload::CaseStudiesRetrieved(p) => p.serialize(serializer),
            Payload::GeneratePdf(p) => p.serialize(serializer),
            Payload::PdfGenerated(p) | Payload::HtmlGenerated(p) => p.serialize(serializer),
            Payload::ProposalCompleted(p) => p.serialize(serializer),
            Payload::GenerationError(p) => p.serialize(serializer),
        }
    }
}
