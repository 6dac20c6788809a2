//! Project brief submitted by the caller

use serde::{Deserialize, Serialize};

pub const DEFAULT_PROJECT_TYPE: &str = "website";
pub const DEFAULT_COMPLEXITY: &str = "medium";
pub const DEFAULT_CLIENT_TYPE: &str = "enterprise";
pub const DEFAULT_TIMELINE_WEEKS: u32 = 4;

/// Everything the caller knows about the project.
///
/// Every field is optional on the wire; each stage substitutes its own
/// defaults for what it needs. Once handed to the pipeline the brief is
/// never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectBrief {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "description")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_weeks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub additional_services: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub target_technologies: Vec<String>,
    #[serde(default, alias = "recurring_client")]
    pub is_recurring_client: bool,
    #[serde(default)]
    pub priority_client: bool,
    #[serde(default)]
    pub projects_completed_before: u32,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "submission_date")]
    pub date: Option<String>,
}

impl ProjectBrief {
    pub fn project_type_or_default(&self) -> &str {
        self.project_type.as_deref().unwrap_or(DEFAULT_PROJECT_TYPE)
    }

    pub fn complexity_or_default(&self) -> &str {
        self.complexity.as_deref().unwrap_or(DEFAULT_COMPLEXITY)
    }

    pub fn client_type_or_default(&self) -> &str {
        self.client_type.as_deref().unwrap_or(DEFAULT_CLIENT_TYPE)
    }

    /// Timeline length in weeks used for the multiplier lookup.
    ///
    /// Only `timeline_weeks` counts; `timeline_months` feeds the prose.
    pub fn timeline_weeks_or_default(&self) -> u32 {
        self.timeline_weeks.unwrap_or(DEFAULT_TIMELINE_WEEKS)
    }

    /// Intake check for the required fields of the submission form.
    ///
    /// Returns the names of the missing fields. The pipeline itself does
    /// not call this; it tolerates sparse briefs.
    pub fn validate(&self) -> Result<(), Vec<&'static str>> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.client_name) {
            missing.push("client_name");
        }
        if blank(&self.project_title) {
            missing.push("project_title");
        }
        if blank(&self.project_description) {
            missing.push("project_description");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}
