pub mod bookings;
pub mod customers;
pub mod health;
pub mod metrics_handler;
pub mod pricing;
pub mod tickets;

use arc_swap::ArcSwap;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::{
    config::Config,
    metrics,
    pricing::PriceCalculator,
    store::{CrmStore, InMemoryStore},
};

/// Application state shared by the `/gpt-rag` handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<Config>>,
    pub calculator: Arc<PriceCalculator>,
    /// Primary store (Supabase when configured)
    pub store: Arc<dyn CrmStore>,
    /// Seeded data consulted when the primary store fails
    pub fallback: InMemoryStore,
}

impl AppState {
    pub fn new(config: Arc<ArcSwap<Config>>, store: Arc<dyn CrmStore>) -> Self {
        Self {
            config,
            calculator: Arc::new(PriceCalculator::default()),
            store,
            fallback: InMemoryStore::seeded(),
        }
    }

    /// True when requests go to a real database rather than the seeded data
    pub fn database_connected(&self) -> bool {
        self.store.name() != "memory"
    }
}

/// Record count and latency of every routed request
pub async fn track_requests(req: Request, next: Next) -> Response {
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    metrics::record_request(&endpoint, response.status().as_u16(), start.elapsed());
    response
}
