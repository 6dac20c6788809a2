mod common;

use anyhow::anyhow;
use std::sync::Arc;

use common::{orchestrator, website_brief, BrokenPdfRenderer, FakePdfRenderer, ScriptedProvider};
use proposal_agency::agent::AgentRole;
use proposal_agency::mcp::{create_mcp, validate_mcp, validate_raw, Envelope, MessageType, Payload};
use proposal_agency::proposal::{DocumentFormat, PricingBreakdown, ProjectBrief, PDF_UNAVAILABLE_NOTE};

fn completed(result: Envelope) -> proposal_agency::proposal::FinalProposal {
    match result.into_payload() {
        Payload::ProposalCompleted(done) => *done,
        other => panic!("expected PROPOSAL_COMPLETED, got {:?}", other),
    }
}

#[tokio::test]
async fn test_full_run_produces_pdf() {
    let agents = orchestrator(
        Some(Arc::new(ScriptedProvider::fluent())),
        Some(Arc::new(FakePdfRenderer)),
    )
    .await;

    let result = agents.generate_complete_proposal(website_brief()).await;
    assert!(validate_mcp(&result, Some(MessageType::ProposalCompleted)));
    assert_eq!(result.sender(), AgentRole::Orchestrator.as_str());

    let done = completed(result);
    assert!((done.proposal.pricing.total - 10800.0).abs() < 1e-6);
    assert!(done.proposal.sections.is_complete());
    assert_eq!(
        done.proposal.sections.executive_summary,
        "We deliver measurable value. Our team is ready."
    );
    assert_eq!(done.document.format, DocumentFormat::Pdf);
    assert!(done.document.artifact_bytes().starts_with(b"%PDF"));
    assert!(done.document.html_content.contains("Acme Retail"));
    assert!(done.stage_notes.is_empty());

    assert!(!done.proposal.relevant_cases.is_empty());
    assert!(done.proposal.relevant_cases.len() <= 3);
    assert_eq!(done.proposal.relevant_cases[0].case.title, "Fashion Storefront");
}

#[tokio::test]
async fn test_degraded_services_still_complete() {
    let agents = orchestrator(None, Some(Arc::new(BrokenPdfRenderer))).await;

    let done = completed(agents.generate_complete_proposal(website_brief()).await);

    assert_eq!(done.document.format, DocumentFormat::Html);
    assert!(done.document.pdf_bytes.is_none());
    assert!(done.document.html_content.contains("Storefront Refresh"));
    assert!(done.proposal.sections.is_complete());
    assert!(done.stage_notes.iter().any(|n| n == PDF_UNAVAILABLE_NOTE));
    assert!(done.stage_notes.iter().any(|n| n.contains("not configured")));
    assert!((done.proposal.pricing.total - 10800.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_mid_generation_model_failure_uses_fallback_sections() {
    let provider = ScriptedProvider::new(vec![
        Ok("A fine summary.".to_string()),
        Err(anyhow!("connection reset")),
    ]);
    let agents = orchestrator(Some(Arc::new(provider)), Some(Arc::new(FakePdfRenderer))).await;

    let done = completed(agents.generate_complete_proposal(website_brief()).await);

    assert_ne!(done.proposal.sections.executive_summary, "A fine summary.");
    assert!(done.proposal.sections.executive_summary.contains("Acme Retail"));
    assert_eq!(done.stage_notes.len(), 1);
    assert_eq!(done.document.format, DocumentFormat::Pdf);
}

#[tokio::test]
async fn test_missing_price_returns_error_with_partial_data() {
    let agents = orchestrator(None, None).await;
    let mut brief = website_brief();
    brief.complexity = Some("extreme".into());

    let result = agents.generate_complete_proposal(brief.clone()).await;
    assert!(validate_mcp(&result, Some(MessageType::GenerationError)));

    let Payload::GenerationError(failed) = result.into_payload() else {
        panic!("expected GENERATION_ERROR");
    };
    assert!(failed.error.contains("No base price"));
    assert_eq!(failed.partial_data.brief, brief);
    assert!(failed.partial_data.pricing.is_none());
    assert!(failed.partial_data.sections.is_none());
}

#[tokio::test]
async fn test_recurring_client_discount() {
    let agents = orchestrator(None, Some(Arc::new(FakePdfRenderer))).await;
    let mut brief = website_brief();
    brief.is_recurring_client = true;
    brief.projects_completed_before = 3;

    let done = completed(agents.generate_complete_proposal(brief).await);
    let pricing: &PricingBreakdown = &done.proposal.pricing;

    // 10% recurring + 3% loyalty on 10,000, then 8% tax.
    assert!((pricing.recurring_discount_rate - 0.13).abs() < 1e-9);
    assert!((pricing.discount_amount - 1300.0).abs() < 1e-6);
    assert!((pricing.total - 9396.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_wrong_request_type_is_rejected() {
    let agents = orchestrator(None, None).await;
    let request = create_mcp(
        "UserInterface",
        "Orchestrator",
        Payload::document(proposal_agency::proposal::RenderedDocument::html_only("<p/>".into())),
    );

    let result = agents.handle_request(request).await;
    let Payload::GenerationError(failed) = result.into_payload() else {
        panic!("expected GENERATION_ERROR");
    };
    assert!(failed.error.contains("PROPOSAL_REQUEST"));
}

#[tokio::test]
async fn test_final_envelope_survives_json() {
    let agents = orchestrator(
        Some(Arc::new(ScriptedProvider::fluent())),
        Some(Arc::new(FakePdfRenderer)),
    )
    .await;
    let result = agents.generate_complete_proposal(website_brief()).await;

    let value = result.to_value().unwrap();
    assert!(validate_raw(&value, Some("PROPOSAL_COMPLETED")));

    let parsed = Envelope::from_value(value.clone()).unwrap();
    assert_eq!(parsed.trace_id(), result.trace_id());
    assert_eq!(parsed.to_value().unwrap(), value);
}

#[tokio::test]
async fn test_html_fallback_is_still_proposal_completed() {
    let agents = orchestrator(None, Some(Arc::new(BrokenPdfRenderer))).await;
    let value = agents.generate_complete_proposal(website_brief()).await.to_value().unwrap();

    assert_eq!(value["type"], "PROPOSAL_COMPLETED");
    assert_eq!(value["payload"]["format"], "html");
    assert!(value["payload"].get("pdf_bytes").is_none());
}

#[tokio::test]
async fn test_each_run_gets_its_own_trace() {
    let agents = orchestrator(None, None).await;
    let first = agents.generate_complete_proposal(website_brief()).await;
    let second = agents.generate_complete_proposal(website_brief()).await;
    assert_ne!(first.trace_id(), second.trace_id());
}

#[tokio::test]
async fn test_save_keeps_client_name_inside_output_dir() {
    let agents = orchestrator(None, Some(Arc::new(FakePdfRenderer))).await;
    let brief = ProjectBrief {
        client_name: Some("Smith/Jones ../LLC".into()),
        ..website_brief()
    };
    let done = completed(agents.generate_complete_proposal(brief).await);
    assert_eq!(done.file_name(), "proposal_Smith_Jones____LLC.pdf");

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let (document_path, data_path) = done.save(&out).await.unwrap();

    assert_eq!(document_path.parent(), Some(out.as_path()));
    assert_eq!(data_path.parent(), Some(out.as_path()));
    assert!(std::fs::read(&document_path).unwrap().starts_with(b"%PDF"));
    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&data_path).unwrap()).unwrap();
    assert_eq!(saved["client_name"], "Smith/Jones ../LLC");
}
