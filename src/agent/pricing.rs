//! Pricing Agent
//!
//! Deterministic rule-based pricing: a pure function of the brief and
//! the rules table. No fallback exists here; a price that cannot be
//! derived from the table is a configuration error.

use std::sync::Arc;
use tracing::{debug, info};

use super::{AgentError, AgentResult, AgentRole};
use crate::mcp::{create_mcp, Envelope, Payload, PricingPayload};
use crate::proposal::{PricingBreakdown, PricingRules, ProjectBrief, ProjectDetails};

/// Extra recurring-client discount for the number of earlier projects.
///
/// Only the highest matching tier applies.
pub fn loyalty_bonus(projects_completed_before: u32) -> f64 {
    match projects_completed_before {
        n if n >= 5 => 0.05,
        n if n >= 3 => 0.03,
        n if n >= 1 => 0.02,
        _ => 0.0,
    }
}

/// Compute the full price breakdown for a brief.
pub fn calculate(brief: &ProjectBrief, rules: &PricingRules) -> AgentResult<PricingBreakdown> {
    let project_type = brief.project_type_or_default();
    let complexity = brief.complexity_or_default();
    let client_type = brief.client_type_or_default();
    let timeline_weeks = brief.timeline_weeks_or_default();

    let base_price = rules.base_price(project_type, complexity).ok_or_else(|| {
        AgentError::Configuration(format!(
            "No base price for project type '{}' with complexity '{}'",
            project_type, complexity
        ))
    })?;

    let timeline_multiplier = rules
        .timeline_multipliers
        .get(&timeline_weeks.to_string())
        .copied()
        .unwrap_or(1.0);

    // Unknown services are priced at zero.
    let additional_services_cost: f64 = brief
        .additional_services
        .iter()
        .map(|name| rules.additional_services.get(name).copied().unwrap_or(0.0))
        .sum();

    let base_subtotal = base_price * timeline_multiplier + additional_services_cost;

    let client_type_multiplier = rules
        .client_type_multipliers
        .get(client_type)
        .copied()
        .unwrap_or(1.0);

    let recurring_discount_rate = if brief.is_recurring_client {
        rules.recurring_discount() + loyalty_bonus(brief.projects_completed_before)
    } else {
        0.0
    };

    let tax_rate = rules
        .tax_rate
        .ok_or_else(|| AgentError::Configuration("Pricing rules define no tax_rate".to_string()))?;

    let adjusted_price = base_subtotal * client_type_multiplier;
    let discount_amount = adjusted_price * recurring_discount_rate;
    let subtotal = adjusted_price - discount_amount;
    let tax = subtotal * tax_rate;
    let total = subtotal + tax;

    debug!(
        base_price,
        timeline_multiplier,
        additional_services_cost,
        client_type_multiplier,
        recurring_discount_rate,
        "Pricing derivation"
    );

    Ok(PricingBreakdown {
        base_price,
        timeline_multiplier,
        additional_services_cost,
        base_subtotal,
        client_type_multiplier,
        recurring_discount_rate,
        discount_amount,
        subtotal,
        tax,
        total,
        project_details: ProjectDetails {
            project_type: project_type.to_string(),
            complexity: complexity.to_string(),
            timeline_weeks,
            services: brief.additional_services.clone(),
            client_type: client_type.to_string(),
            is_recurring_client: brief.is_recurring_client,
            projects_completed_before: brief.projects_completed_before,
        },
    })
}

pub struct PricingAgent {
    rules: Arc<PricingRules>,
}

impl PricingAgent {
    pub fn new(rules: Arc<PricingRules>) -> Self {
        Self { rules }
    }

    /// Price the brief carried by a `PROPOSAL_REQUEST` envelope.
    pub fn calculate_pricing(&self, request: &Envelope) -> AgentResult<Envelope> {
        let Payload::ProposalRequest(brief) = request.payload() else {
            return Err(AgentError::Protocol(format!(
                "PricingAgent expects PROPOSAL_REQUEST, got {}",
                request.message_type()
            )));
        };

        let pricing = calculate(brief, &self.rules)?;
        info!("Pricing calculated: ${:.2}", pricing.total);

        Ok(create_mcp(
            AgentRole::PricingAgent.as_str(),
            AgentRole::Orchestrator.as_str(),
            Payload::PricingCalculated(PricingPayload { pricing }),
        ))
    }
}
