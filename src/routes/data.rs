use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::error::HttpError;
use crate::models::{HistoricalSeries, Snapshot, Window, WindowStatistics};
use crate::services::{current_service, history_service, stats_service};
use crate::state::AppContext;

const CURRENT_DATA_CACHE_KEY: &str = "/currency-data";

pub fn routes() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/currency-data", get(currency_data))
        .route("/historical-data/24h", get(historical_24h))
        .route("/historical-data/7d", get(historical_7d))
        .route("/historical-data", get(historical_30d))
        .route("/analysis", get(analysis))
        .route("/logs", get(logs))
}

/// GET /currency-data
///
/// Live rates and bitcoin price, cached for the configured TTL.
async fn currency_data(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, HttpError> {
    if let Some(cached) = ctx.cache.get(CURRENT_DATA_CACHE_KEY).await {
        return Ok(Json(cached));
    }

    let data = current_service::get_current_data(
        ctx.rate_source.as_ref(),
        ctx.price_source.as_ref(),
        &ctx.store,
    )
    .await?;

    let value = serde_json::to_value(&data).map_err(|e| HttpError::Internal(e.to_string()))?;
    ctx.cache.insert(CURRENT_DATA_CACHE_KEY, value.clone()).await;
    Ok(Json(value))
}

async fn historical_24h(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<HistoricalSeries>, HttpError> {
    Ok(Json(history_service::historical_for(&ctx.store, Window::Day).await?))
}

async fn historical_7d(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<HistoricalSeries>, HttpError> {
    Ok(Json(history_service::historical_for(&ctx.store, Window::Week).await?))
}

async fn historical_30d(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<HistoricalSeries>, HttpError> {
    Ok(Json(history_service::historical_for(&ctx.store, Window::Month).await?))
}

/// GET /analysis
///
/// First/latest/highest/lowest/percent change/trend per series over the last 30 days.
async fn analysis(State(ctx): State<Arc<AppContext>>) -> Result<Json<WindowStatistics>, HttpError> {
    let stats = stats_service::stats_for_window(&ctx.store, Window::Month.duration()).await?;
    Ok(Json(stats))
}

/// GET /logs
///
/// Every stored snapshot, newest first.
async fn logs(State(ctx): State<Arc<AppContext>>) -> Result<Json<Vec<Snapshot>>, HttpError> {
    Ok(Json(ctx.store.query_all_desc().await?))
}
