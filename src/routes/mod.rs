pub mod data;
pub mod error;
pub mod news;
pub mod system;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::state::AppContext;
use crate::utils::ratelimit::{RateLimit, CURRENT_DATA_LIMIT, DEFAULT_LIMIT, NEWS_LIMIT};
use error::HttpError;

/// Assemble the application router
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .merge(data::routes())
        .merge(news::routes())
        .merge(system::routes())
        .layer(middleware::from_fn_with_state(Arc::clone(&ctx), limit_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Routes with their own budget use it instead of the default one
fn budget_for(path: &str) -> (&'static str, RateLimit) {
    match path {
        "/currency-data" => ("currency-data", CURRENT_DATA_LIMIT),
        "/news" => ("news", NEWS_LIMIT),
        _ => ("default", DEFAULT_LIMIT),
    }
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

async fn limit_requests(
    State(ctx): State<Arc<AppContext>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    let (bucket, limit) = budget_for(request.uri().path());

    if let Err(wait) = ctx.limiter.check(ip, bucket, limit).await {
        debug!("Rate limited {} on {} for {:?}", ip, bucket, wait);
        return HttpError::RateLimited(wait).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{build_http_client, NewsClient};
    use crate::config::Config;
    use crate::db::memory_store;
    use crate::models::{ExchangeRates, Snapshot};
    use crate::services::ingestion_service::fakes::{FixedPrice, FixedRates};
    use chrono::{Duration, Utc};
    use reqwest::StatusCode;
    use serde_json::Value;

    struct TestServer {
        base: String,
        ctx: Arc<AppContext>,
        rates: Arc<FixedRates>,
    }

    async fn spawn_server() -> TestServer {
        let config = Config::from_lookup(|name| match name {
            "NEWS_API_KEY" => Some("test-key".to_string()),
            _ => None,
        })
        .unwrap();

        let rates = Arc::new(FixedRates::ok());
        let news = NewsClient::new(
            build_http_client(std::time::Duration::from_secs(2)).unwrap(),
            "http://127.0.0.1:1/v2/everything".to_string(),
            config.news_api_key.clone(),
        );
        let ctx = AppContext::with_sources(
            &config,
            memory_store().await,
            rates.clone(),
            Arc::new(FixedPrice::ok(64_000.0)),
            news,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(Arc::clone(&ctx)).into_make_service_with_connect_info::<SocketAddr>();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base: format!("http://{}", addr),
            ctx,
            rates,
        }
    }

    async fn get(server: &TestServer, path: &str) -> (StatusCode, Value) {
        let response = reqwest::get(format!("{}{}", server.base, path)).await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn seed(ctx: &AppContext, hours_ago: &[i64]) {
        for (i, h) in hours_ago.iter().enumerate() {
            let snap = Snapshot::new(
                Utc::now() - Duration::hours(*h),
                ExchangeRates {
                    cad: 1.3 + i as f64 / 100.0,
                    mxn: 17.0,
                    cny: 7.2,
                    jpy: 150.0,
                },
                60_000.0,
            );
            ctx.store.append(&snap).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_health_and_scheduler_status() {
        let server = spawn_server().await;
        let (status, body) = get(&server, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = get(&server, "/scheduler/status").await;
        assert_eq!(body["status"], "stopped");
    }

    #[tokio::test]
    async fn test_scheduler_controls() {
        let server = spawn_server().await;
        let client = reqwest::Client::new();
        let post = |path: &str| client.post(format!("{}{}", server.base, path)).send();

        let response = post("/scheduler/pause").await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = post("/scheduler/run").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: Value = response.json().await.unwrap();
        assert_eq!(snapshot["bitcoin_price"], 64_000.0);
        assert_eq!(server.ctx.store.query_all_desc().await.unwrap().len(), 1);

        server.ctx.scheduler.start().await;
        let response = post("/scheduler/pause").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let (_, body) = get(&server, "/scheduler/status").await;
        assert_eq!(body["status"], "paused");

        let response = post("/scheduler/resume").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        server.ctx.scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_historical_not_found_then_aligned_series() {
        let server = spawn_server().await;
        let (status, body) = get(&server, "/historical-data/24h").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No historical data available for 24 hours");

        seed(&server.ctx, &[200, 30, 2, 1]).await;

        let (status, body) = get(&server, "/historical-data/7d").await;
        assert_eq!(status, StatusCode::OK);
        for key in ["dates", "cad", "mxn", "cny", "jpy", "bitcoin"] {
            assert_eq!(body[key].as_array().unwrap().len(), 3, "series {}", key);
        }

        let (_, body) = get(&server, "/historical-data").await;
        assert_eq!(body["dates"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_analysis() {
        let server = spawn_server().await;
        let (status, body) = get(&server, "/analysis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not enough data for analysis");

        seed(&server.ctx, &[3, 2]).await;
        let (status, body) = get(&server, "/analysis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["USD_vs_CAD"]["trend"], "strengthening");
        assert_eq!(body["USD_vs_JPY"]["trend"], "weakening");
        assert_eq!(body["Bitcoin"]["percent_change"], 0.0);
    }

    #[tokio::test]
    async fn test_currency_data_is_cached() {
        let server = spawn_server().await;
        let (status, first) = get(&server, "/currency-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["CAD"]["current"], 1.36);

        let (_, second) = get(&server, "/currency-data").await;
        assert_eq!(first, second);
        assert_eq!(server.rates.call_count(), 1);
    }

    #[tokio::test]
    async fn test_logs_newest_first() {
        let server = spawn_server().await;
        seed(&server.ctx, &[5, 1]).await;
        let (status, body) = get(&server, "/logs").await;
        assert_eq!(status, StatusCode::OK);
        let logs = body.as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["rate_cad"].as_f64(), Some(1.3 + 1.0 / 100.0));
    }

    #[tokio::test]
    async fn test_news_upstream_failure_and_rate_limit() {
        let server = spawn_server().await;
        for _ in 0..NEWS_LIMIT.max_requests {
            let (status, body) = get(&server, "/news").await;
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert!(body["error"].is_string());
        }

        let response = reqwest::get(format!("{}/news", server.base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("retry-after"));
    }
}
