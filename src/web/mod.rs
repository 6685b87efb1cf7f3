//! HTTP surface: a per-user statistics page and the Prometheus scrape
//! endpoint. Reads the store directly and never touches the cache.

mod page;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;

use crate::db::ExpenseStore;

#[derive(Clone)]
pub struct WebState {
    pub store: Arc<dyn ExpenseStore>,
    /// `None` serves an empty scrape body.
    pub metrics: Option<PrometheusHandle>,
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/stats/:user_id", get(stats_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on {}", addr);
    Ok(listener)
}

/// Serves until the process exits.
pub async fn serve(listener: TcpListener, state: WebState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn stats_handler(State(state): State<WebState>, Path(raw_id): Path<String>) -> Response {
    let Ok(user_id) = raw_id.parse::<i64>() else {
        crate::telemetry::record_web_request("stats", 400);
        return (StatusCode::BAD_REQUEST, "Invalid userID format").into_response();
    };

    match state.store.all_for_user(user_id).await {
        Ok(expenses) => {
            crate::telemetry::record_web_request("stats", 200);
            Html(page::render(user_id, &expenses)).into_response()
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "DB error in stats page");
            crate::telemetry::record_web_request("stats", 500);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data").into_response()
        }
    }
}

async fn metrics_handler(State(state): State<WebState>) -> String {
    crate::telemetry::record_web_request("metrics", 200);
    state.metrics.as_ref().map(|h| h.render()).unwrap_or_default()
}
