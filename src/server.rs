use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    auth,
    config::Config,
    handlers::{self, AppState},
    metrics,
    rate_limit::{self, RateLimiter},
    signals::setup_signal_handlers,
    store::{CrmStore, InMemoryStore, SupabaseStore},
};

/// Start the Nordflytt API server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Connects the CRM store
/// 3. Sets up signal handlers for graceful shutdown and config reload
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let store = build_store(&config)?;
    let app_state = AppState::new(config_swap.clone(), store);

    let limiter = RateLimiter::new(config_swap.clone());
    tokio::spawn(limiter.clone().cleanup_loop());

    let app = create_router(app_state, limiter, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting Nordflytt API on {}", addr);
    info!(
        "Configuration: {} API keys, rate limit {} req / {}s, locale {:?}",
        config.api_keys.len(),
        config.rate_limit.max_requests,
        config.rate_limit.window_seconds,
        config.server.locale
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown_rx.recv().await;
        info!("Shutdown signal received, draining connections...");
    })
    .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Supabase when credentials are configured, otherwise the seeded in-memory store
pub fn build_store(config: &Config) -> Result<Arc<dyn CrmStore>> {
    match config.supabase.credentials() {
        Some((url, key)) => {
            let client = reqwest::Client::builder().build()?;
            let store = SupabaseStore::new(client, url, key, config.supabase.timeout_seconds)?;
            info!(url = %url, "Using Supabase store");
            Ok(Arc::new(store))
        }
        None => {
            info!("Supabase not configured, using seeded in-memory store");
            Ok(Arc::new(InMemoryStore::seeded()))
        }
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    app_state: AppState,
    limiter: RateLimiter,
    metrics_handle: Option<Arc<PrometheusHandle>>,
) -> Router {
    let config = app_state.config.clone();

    // Authenticated, rate-limited routes
    let gpt_routes = Router::new()
        .route("/gpt-rag/calculate-price", post(handlers::pricing::calculate_price))
        .route("/gpt-rag/customer-lookup", post(handlers::customers::customer_lookup))
        .route("/gpt-rag/booking-details", post(handlers::bookings::booking_details))
        .route("/gpt-rag/create-ticket", post(handlers::tickets::create_ticket))
        .layer(middleware::from_fn_with_state(config.clone(), auth::auth_middleware))
        .layer(middleware::from_fn_with_state(limiter, rate_limit::rate_limit_middleware))
        .route_layer(middleware::from_fn(handlers::track_requests));

    let mut app = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .merge(gpt_routes)
        .with_state(app_state);

    if let Some(handle) = metrics_handle {
        let endpoint = config.load().metrics.endpoint.clone();
        app = app.merge(
            Router::new()
                .route(&endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    let origins = config.load().server.cors_origins.clone();
    if !origins.is_empty() {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        app = app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        );
    }

    app
        // Quote and ticket bodies are small
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %uuid::Uuid::new_v4(),
                )
            }),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;

    #[test]
    fn test_build_store_without_supabase() {
        let store = build_store(&create_test_config()).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_build_store_with_supabase() {
        let mut config = create_test_config();
        config.supabase.url = Some("https://nordflytt.supabase.co".to_string());
        config.supabase.service_role_key = Some("service-role".to_string());
        assert_eq!(build_store(&config).unwrap().name(), "supabase");

        config.supabase.url = Some("nordflytt.supabase.co".to_string());
        assert!(build_store(&config).is_err());
    }

    #[tokio::test]
    async fn test_create_router() {
        let config = Arc::new(ArcSwap::from_pointee(create_test_config()));
        let state = AppState::new(config.clone(), Arc::new(InMemoryStore::seeded()));
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();

        let _app = create_router(state, RateLimiter::new(config), Some(Arc::new(recorder.handle())));
        // Router created successfully - no panic
    }
}
