mod common;

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

use common::{orchestrator, website_brief, FakePdfRenderer};
use proposal_agency::mcp::{create_mcp, Payload};
use proposal_agency::orchestrator::GenerationHistory;
use proposal_agency::server::{serve, AppState};

async fn spawn_server() -> (String, Arc<GenerationHistory>) {
    let history = Arc::new(GenerationHistory::in_memory());
    let state = AppState {
        orchestrator: Arc::new(orchestrator(None, Some(Arc::new(FakePdfRenderer))).await),
        history: history.clone(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, state));
    (format!("http://{}", addr), history)
}

#[tokio::test]
async fn test_health() {
    let (base, _) = spawn_server().await;
    let body: Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_incomplete_brief_is_rejected() {
    let (base, history) = spawn_server().await;
    let response = reqwest::Client::new()
        .post(format!("{}/proposals", base))
        .json(&json!({ "client_name": "Acme" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    let missing = body["missing_fields"].as_array().unwrap();
    assert!(missing.iter().any(|f| f == "project_title"));
    assert!(history.is_empty().await);
}

#[tokio::test]
async fn test_proposal_round_trip_is_recorded() {
    let (base, history) = spawn_server().await;
    let response = reqwest::Client::new()
        .post(format!("{}/proposals", base))
        .json(&website_brief())
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["type"], "PROPOSAL_COMPLETED");
    assert_eq!(body["payload"]["format"], "pdf");
    let total = body["payload"]["pricing"]["total"].as_f64().unwrap();
    assert!((total - 10800.0).abs() < 1e-6);

    let entries = history.entries().await;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].success);
    assert_eq!(entries[0].client_name, "Acme Retail");

    let listed: Value = reqwest::get(format!("{}/history", base)).await.unwrap().json().await.unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mcp_endpoint() {
    let (base, _) = spawn_server().await;
    let client = reqwest::Client::new();

    let request = create_mcp("UserInterface", "Orchestrator", Payload::ProposalRequest(website_brief()));
    let body: Value = client
        .post(format!("{}/mcp", base))
        .json(&request)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["type"], "PROPOSAL_COMPLETED");

    let mut truncated = serde_json::to_value(&request).unwrap();
    truncated.as_object_mut().unwrap().remove("trace_id");
    let response = client.post(format!("{}/mcp", base)).json(&truncated).send().await.unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_examples() {
    let (base, _) = spawn_server().await;

    let listing: Value = reqwest::get(format!("{}/examples", base)).await.unwrap().json().await.unwrap();
    assert_eq!(listing["examples"][0], "demo");
    assert_eq!(listing["budget_ranges"].as_array().unwrap().len(), 6);

    let demo: Value = reqwest::get(format!("{}/examples/demo", base)).await.unwrap().json().await.unwrap();
    assert_eq!(demo["client_name"], "TechCorp Solutions");

    let missing = reqwest::get(format!("{}/examples/nope", base)).await.unwrap();
    assert_eq!(missing.status(), 404);
}
