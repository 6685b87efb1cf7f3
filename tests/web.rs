use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use rust_decimal_macros::dec;
use tower::ServiceExt;

use expense_tracker_bot::bot::commands::{reply_for, BotCommand};
use expense_tracker_bot::bot::AppState;
use expense_tracker_bot::cache::MemoryCache;
use expense_tracker_bot::db::models::NewExpense;
use expense_tracker_bot::db::{ExpenseStore, MemoryStore};
use expense_tracker_bot::web::{router, WebState};

mod common;
use common::DownStore;

async fn get(state: WebState, uri: &str) -> (StatusCode, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn state_with(store: Arc<dyn ExpenseStore>) -> WebState {
    WebState {
        store,
        metrics: None,
    }
}

#[tokio::test]
async fn test_stats_page_lists_only_that_user() {
    let store = Arc::new(MemoryStore::new());
    for (user_id, amount, category) in [(7, dec!(12.5), "coffee"), (7, dec!(3), "bus"), (8, dec!(1), "secret")] {
        store
            .create(NewExpense {
                user_id,
                amount,
                category: category.to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    let (status, body) = get(state_with(store), "/stats/7").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<td>coffee</td>"));
    assert!(body.contains("<td>bus</td>"));
    assert!(!body.contains("secret"));
    assert!(body.contains("Total: 15.50"));
}

#[tokio::test]
async fn test_stats_page_rejects_bad_id() {
    let (status, body) = get(state_with(Arc::new(MemoryStore::new())), "/stats/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid userID format");
}

#[tokio::test]
async fn test_stats_page_reports_store_failure() {
    let (status, _) = get(state_with(Arc::new(DownStore)), "/stats/7").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_metrics_without_recorder_is_empty() {
    let (status, body) = get(state_with(Arc::new(MemoryStore::new())), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_stats_page_survives_total_overflow() {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Arc::new(MemoryCache::new()));
    for args in ["70000000000000000000000000000 a", "70000000000000000000000000000 b"] {
        let reply = reply_for(&state, 1, BotCommand::Add(args.to_string())).await;
        assert!(reply.starts_with("✅ Added"), "{}", reply);
    }

    let (status, body) = get(state_with(store), "/stats/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Records: 2"));
    assert!(body.contains("Total: unavailable"));
}
