use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::error::HttpError;
use crate::models::Snapshot;
use crate::state::AppContext;
use crate::utils::errors::TickError;

pub fn routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/health", get(health))
        .route("/scheduler/status", get(scheduler_status))
        .route("/scheduler/pause", post(pause))
        .route("/scheduler/resume", post(resume))
        .route("/scheduler/run", post(run_once))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn scheduler_status(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    Json(json!({ "status": ctx.scheduler.status() }))
}

/// POST /scheduler/pause
///
/// 409 unless the scheduler was running.
async fn pause(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<Value>) {
    let changed = ctx.scheduler.pause();
    let code = if changed { StatusCode::OK } else { StatusCode::CONFLICT };
    (code, Json(json!({ "status": ctx.scheduler.status() })))
}

/// POST /scheduler/resume
async fn resume(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<Value>) {
    let changed = ctx.scheduler.resume();
    let code = if changed { StatusCode::OK } else { StatusCode::CONFLICT };
    (code, Json(json!({ "status": ctx.scheduler.status() })))
}

/// POST /scheduler/run
///
/// Ingest one snapshot immediately.
async fn run_once(State(ctx): State<Arc<AppContext>>) -> Result<Json<Snapshot>, HttpError> {
    match ctx.scheduler.run_once().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(TickError::Fetch(e)) => Err(e.into()),
        Err(TickError::Store(e)) => Err(e.into()),
    }
}
