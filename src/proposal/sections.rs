//! Generated proposal text

use serde::{Deserialize, Serialize};

pub const SECTION_NAMES: [&str; 3] = ["executive_summary", "project_overview", "methodology"];

/// The three named sections every proposal carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSections {
    pub executive_summary: String,
    pub project_overview: String,
    pub methodology: String,
}

impl ProposalSections {
    /// Sections in document order, keyed by their snake_case name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        SECTION_NAMES.into_iter().zip([
            self.executive_summary.as_str(),
            self.project_overview.as_str(),
            self.methodology.as_str(),
        ])
    }

    /// True when every section has visible text.
    pub fn is_complete(&self) -> bool {
        self.iter().all(|(_, text)| !text.trim().is_empty())
    }
}
