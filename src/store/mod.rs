//! Customer, booking and ticket persistence.
//!
//! Handlers talk to a [`CrmStore`]. Production deployments point it at
//! Supabase; without credentials the seeded in-memory store stands in.

pub mod memory;
pub mod models;
pub mod supabase;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryStore;
pub use models::{AnalyticsEvent, BookingQuery, BookingRecord, CustomerRecord, Materials, TicketRecord};
pub use supabase::SupabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid store configuration: {0}")]
    Config(String),
}

#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Short identifier used in logs and metrics
    fn name(&self) -> &'static str;

    async fn find_customer(&self, email: &str) -> Result<Option<CustomerRecord>, StoreError>;

    /// All bookings of a customer, newest first
    async fn bookings_for_customer(&self, email: &str) -> Result<Vec<BookingRecord>, StoreError>;

    /// Newest booking matching the query
    async fn find_booking(&self, query: &BookingQuery) -> Result<Option<BookingRecord>, StoreError>;

    async fn insert_ticket(&self, ticket: &TicketRecord) -> Result<(), StoreError>;

    async fn record_analytics(&self, event: &AnalyticsEvent) -> Result<(), StoreError>;
}
