//! Pricing rules table and the breakdown computed from it

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

pub const DEFAULT_RECURRING_DISCOUNT: f64 = 0.10;

/// Business rules loaded once at startup. Read-only afterwards.
///
/// Every table defaults to empty so that a missing rules document still
/// yields a usable (if useless) table: the first base price lookup fails
/// with a configuration error instead of the process refusing to start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingRules {
    /// project type -> complexity -> base price
    #[serde(default)]
    pub base_pricing: HashMap<String, HashMap<String, f64>>,
    /// timeline length in weeks (as a string key) -> multiplier
    #[serde(default)]
    pub timeline_multipliers: HashMap<String, f64>,
    /// service name -> flat add-on cost
    #[serde(default)]
    pub additional_services: HashMap<String, f64>,
    /// client type -> multiplier
    #[serde(default)]
    pub client_type_multipliers: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_client_discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
}

impl PricingRules {
    /// Load the rules document. A missing file gives an empty table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Pricing rules file not found at {:?}; starting with an empty table", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pricing rules from {:?}", path))?;
        let rules: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse pricing rules from {:?}", path))?;

        info!(
            "Loaded pricing rules: {} project types, {} services",
            rules.base_pricing.len(),
            rules.additional_services.len()
        );
        Ok(rules)
    }

    pub fn base_price(&self, project_type: &str, complexity: &str) -> Option<f64> {
        self.base_pricing.get(project_type)?.get(complexity).copied()
    }

    pub fn recurring_discount(&self) -> f64 {
        self.recurring_client_discount.unwrap_or(DEFAULT_RECURRING_DISCOUNT)
    }
}

/// Echo of the brief attributes the price was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(rename = "type")]
    pub project_type: String,
    pub complexity: String,
    pub timeline_weeks: u32,
    pub services: Vec<String>,
    pub client_type: String,
    pub is_recurring_client: bool,
    pub projects_completed_before: u32,
}

/// Full price derivation, every intermediate value retained for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub base_price: f64,
    pub timeline_multiplier: f64,
    pub additional_services_cost: f64,
    pub base_subtotal: f64,
    pub client_type_multiplier: f64,
    pub recurring_discount_rate: f64,
    pub discount_amount: f64,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub project_details: ProjectDetails,
}

impl PricingBreakdown {
    /// Discount expressed against the base price, as shown in summaries.
    pub fn discount_percent_of_base(&self) -> f64 {
        if self.base_price > 0.0 {
            self.discount_amount / self.base_price * 100.0
        } else {
            0.0
        }
    }
}
