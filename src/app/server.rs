use crate::app::responses::{status_code, SubmissionResponse};
use crate::core::orchestrator::JobSubmissionOrchestrator;
use crate::core::pricing::PriceTable;
use crate::core::quote::{parse_pane_input, quote_for, QuoteUpdate};
use crate::domain::model::JobRequestPayload;
use crate::utils::error::Result;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub orchestrator: JobSubmissionOrchestrator,
    pub price_table: PriceTable,
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub panes: Option<String>,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // 表單頁面可能放在別的網域
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/quote", get(quote))
        .route("/api/jobs", post(submit_job))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Json<QuoteUpdate> {
    let pane_count = query
        .panes
        .as_deref()
        .and_then(parse_pane_input)
        .unwrap_or(0);
    Json(QuoteUpdate::new(
        pane_count,
        &quote_for(&state.price_table, pane_count),
    ))
}

async fn submit_job(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<JobRequestPayload>, JsonRejection>,
) -> (StatusCode, Json<SubmissionResponse>) {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::info!("❌ Unreadable submission body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(SubmissionResponse::error(format!(
                    "Invalid request body: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    let outcome = state.orchestrator.submit(&payload).await;
    (status_code(&outcome), Json(SubmissionResponse::from(&outcome)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutting down");
}

pub async fn serve(state: Arc<AppState>, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
