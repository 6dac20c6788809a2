//! Proposal Data Model
//!
//! The caller's brief, the pricing rules table, and the artefacts each
//! pipeline stage produces from them.

pub mod brief;
pub mod document;
pub mod pricing;
pub mod sections;

pub use brief::ProjectBrief;
pub use document::{
    CombinedProposal, DocumentFormat, FinalProposal, PartialProposal, RenderedDocument,
    PDF_UNAVAILABLE_NOTE,
};
pub use pricing::{PricingBreakdown, PricingRules, ProjectDetails};
pub use sections::{ProposalSections, SECTION_NAMES};
