use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::json;

use super::AppState;

/// Service index
pub async fn index() -> impl IntoResponse {
    Json(json!({
        "service": "nordflytt-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/gpt-rag/calculate-price",
            "/gpt-rag/customer-lookup",
            "/gpt-rag/booking-details",
            "/gpt-rag/create-ticket",
            "/health",
        ],
    }))
}

/// Health check endpoint
/// Returns 200 OK if the service is running
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "nordflytt-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "database_connected": state.database_connected(),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK if the service is ready to accept traffic
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "ready",
        "service": "nordflytt-api",
        "store": state.store.name(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;
    use crate::store::InMemoryStore;
    use arc_swap::ArcSwap;
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::new(
            Arc::new(ArcSwap::from_pointee(create_test_config())),
            Arc::new(InMemoryStore::seeded()),
        )
    }

    #[tokio::test]
    async fn test_health_check_reports_memory_store() {
        let response = health_check(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database_connected"], false);
    }

    #[tokio::test]
    async fn test_readiness_check_returns_ok() {
        let response = readiness_check(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
