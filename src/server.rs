use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::mcp::{validate_raw, Envelope, MessageType};
use crate::orchestrator::{
    demo_project, example_project, GenerationHistory, HistoryEntry, ProposalOrchestrator, BUDGET_RANGES,
    EXAMPLE_NAMES,
};
use crate::proposal::ProjectBrief;

struct ServerError(anyhow::Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Proposal server error: {}", self.0) })),
        )
            .into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ProposalOrchestrator>,
    pub history: Arc<GenerationHistory>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/proposals", post(create_proposal))
        .route("/mcp", post(mcp_request))
        .route("/examples", get(list_examples))
        .route("/examples/{name}", get(get_example))
        .route("/history", get(history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("🚀 Proposal server ready: http://{}", addr);
    serve(listener, state).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn create_proposal(State(state): State<AppState>, Json(brief): Json<ProjectBrief>) -> Response {
    if let Err(missing) = brief.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "Please fill in all required fields",
                "missing_fields": missing,
            })),
        )
            .into_response();
    }

    let result = state.orchestrator.generate_complete_proposal(brief).await;
    state.history.record_or_warn(HistoryEntry::from_result(&result)).await;
    Json(result).into_response()
}

async fn mcp_request(State(state): State<AppState>, Json(raw): Json<Value>) -> Response {
    let expected = MessageType::ProposalRequest.as_str();
    if !validate_raw(&raw, Some(expected)) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Expected a complete {} envelope", expected) })),
        )
            .into_response();
    }

    let request = match Envelope::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response();
        }
    };

    info!("MCP request {} from {}", request.trace_id(), request.sender());
    let result = state.orchestrator.handle_request(request).await;
    state.history.record_or_warn(HistoryEntry::from_result(&result)).await;
    Json(result).into_response()
}

async fn list_examples() -> impl IntoResponse {
    let mut names = vec!["demo"];
    names.extend(EXAMPLE_NAMES);
    Json(json!({ "examples": names, "budget_ranges": BUDGET_RANGES }))
}

async fn get_example(Path(name): Path<String>) -> Response {
    let brief = if name == "demo" {
        Some(demo_project())
    } else {
        example_project(&name)
    };

    match brief {
        Some(brief) => Json(brief).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Unknown example '{}'", name) })),
        )
            .into_response(),
    }
}

async fn history(State(state): State<AppState>) -> Result<impl IntoResponse, ServerError> {
    let entries = state.history.recent(50).await;
    Ok(Json(serde_json::to_value(entries)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_example_is_not_found() {
        let response = get_example(Path("healthcare".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = get_example(Path("demo".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
