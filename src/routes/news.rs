use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::error::HttpError;
use crate::models::Article;
use crate::state::AppContext;
use crate::utils::errors::FetchError;

pub fn routes() -> Router<Arc<AppContext>> {
    Router::new().route("/news", get(news))
}

/// GET /news
async fn news(State(ctx): State<Arc<AppContext>>) -> Result<Json<Vec<Article>>, HttpError> {
    match ctx.news.latest_articles().await {
        Ok(articles) => Ok(Json(articles)),
        Err(FetchError::Status(429)) => Err(HttpError::UpstreamRateLimited(
            "External News API rate limit reached. Please try again later.".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}
