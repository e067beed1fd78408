//! HTTP route handlers for the travel-plan API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use uuid::Uuid;

use crate::pipeline::PipelineError;
use crate::plan::{PlanId, PlanRecord, TripRequest};
use crate::storage::StoreError;

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/{id}", delete(delete_plan))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tourplan-agent",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List every persisted plan record.
async fn list_plans(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlanRecord>>, (StatusCode, String)> {
    let plans = state.store.list_all().await.map_err(store_error)?;
    Ok(Json(plans))
}

/// Create a plan: run the pipeline on the submitted trip, persist the result.
///
/// The record is only written after both pipeline stages succeed; a pipeline
/// failure leaves no partial row behind.
async fn create_plan(
    State(state): State<Arc<AppState>>,
    Json(trip): Json<TripRequest>,
) -> Result<(StatusCode, Json<PlanRecord>), (StatusCode, String)> {
    let draft = state
        .pipeline
        .produce_plan_and_budget(&trip)
        .await
        .map_err(pipeline_error)?;

    let record = PlanRecord::new(trip, draft);
    state.store.insert(&record).await.map_err(store_error)?;

    tracing::info!(id = %record.id, destination = %record.destination, "plan created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete a plan record by id.
async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .store
        .delete_by_id(PlanId::from(id))
        .await
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Map a pipeline failure onto a client-visible upstream error.
fn pipeline_error(err: PipelineError) -> (StatusCode, String) {
    (StatusCode::BAD_GATEWAY, format!("plan generation failed: {err}"))
}

/// Map a store failure onto a client-visible error.
fn store_error(err: StoreError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}
