use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{AnalyticsEvent, BookingQuery, BookingRecord, CustomerRecord, Materials, TicketRecord};
use super::{CrmStore, StoreError};

/// Tickets and analytics events kept in memory; the oldest are dropped first
pub const MAX_RETAINED_ENTRIES: usize = 1000;

#[derive(Debug, Default)]
struct Tables {
    customers: Vec<CustomerRecord>,
    bookings: Vec<BookingRecord>,
    tickets: VecDeque<TicketRecord>,
    analytics: VecDeque<AnalyticsEvent>,
}

fn push_bounded<T>(log: &mut VecDeque<T>, entry: T) {
    if log.len() >= MAX_RETAINED_ENTRIES {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Process-local store, also the fallback when Supabase is unreachable
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(customers: Vec<CustomerRecord>, bookings: Vec<BookingRecord>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                customers,
                bookings,
                ..Tables::default()
            })),
        }
    }

    /// Demo customers used by the support GPT when no database is configured
    pub fn seeded() -> Self {
        let customers = vec![
            CustomerRecord {
                email: "anna.svensson@gmail.com".to_string(),
                name: Some("Anna Svensson".to_string()),
                phone: Some("+46701234567".to_string()),
            },
            CustomerRecord {
                email: "erik.larsson@hotmail.com".to_string(),
                name: Some("Erik Larsson".to_string()),
                phone: None,
            },
        ];

        let mut bookings = vec![BookingRecord {
            id: "12345678-1234-1234-1234-123456789012".to_string(),
            reference_number: Some("BK-2024-001234".to_string()),
            customer_email: "anna.svensson@gmail.com".to_string(),
            date: "2024-12-15".to_string(),
            services: vec!["flytt".into(), "packning".into(), "städning".into()],
            total_amount: 8500.0,
            status: Some("completed".to_string()),
            photos_available: true,
            from_address: "Vasagatan 10, Stockholm".to_string(),
            to_address: "Östermalm 25, Stockholm".to_string(),
            volume_m3: 25.0,
            materials: Materials::default(),
            invoice_sent: true,
            payment_status: Some("paid".to_string()),
        }];

        let erik_moves = [
            ("2024-11-20", vec!["flytt", "städning", "magasinering"], 14200.0),
            ("2023-08-02", vec!["flytt"], 6400.0),
            ("2022-05-14", vec!["flytt", "packning"], 9100.0),
            ("2021-09-30", vec!["flytt"], 5800.0),
            ("2020-04-11", vec!["flytt", "städning"], 7900.0),
        ];
        for (i, (date, services, amount)) in erik_moves.into_iter().enumerate() {
            bookings.push(BookingRecord {
                id: format!("erik-{:04}", i + 1),
                reference_number: Some(format!("BK-{}-{:06}", &date[..4], 2000 + i)),
                customer_email: "erik.larsson@hotmail.com".to_string(),
                date: date.to_string(),
                services: services.into_iter().map(String::from).collect(),
                total_amount: amount,
                status: Some("completed".to_string()),
                photos_available: false,
                from_address: String::new(),
                to_address: String::new(),
                volume_m3: 0.0,
                materials: Materials::default(),
                invoice_sent: true,
                payment_status: Some("paid".to_string()),
            });
        }

        Self::with_data(customers, bookings)
    }

    pub async fn tickets(&self) -> Vec<TicketRecord> {
        self.tables.read().await.tickets.iter().cloned().collect()
    }

    pub async fn analytics(&self) -> Vec<AnalyticsEvent> {
        self.tables.read().await.analytics.iter().cloned().collect()
    }
}

fn newest_first(mut bookings: Vec<BookingRecord>) -> Vec<BookingRecord> {
    // ISO dates sort lexically
    bookings.sort_by(|a, b| b.date.cmp(&a.date));
    bookings
}

#[async_trait]
impl CrmStore for InMemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find_customer(&self, email: &str) -> Result<Option<CustomerRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.customers.iter().find(|c| c.email == email).cloned())
    }

    async fn bookings_for_customer(&self, email: &str) -> Result<Vec<BookingRecord>, StoreError> {
        let tables = self.tables.read().await;
        let bookings = tables
            .bookings
            .iter()
            .filter(|b| b.customer_email == email)
            .cloned()
            .collect();
        Ok(newest_first(bookings))
    }

    async fn find_booking(&self, query: &BookingQuery) -> Result<Option<BookingRecord>, StoreError> {
        let tables = self.tables.read().await;
        let matches: Vec<BookingRecord> = tables
            .bookings
            .iter()
            .filter(|b| match query {
                BookingQuery::ByReference(reference) => {
                    b.reference_number.as_deref() == Some(reference.as_str())
                }
                BookingQuery::ByCustomer { email, date } => {
                    b.customer_email == *email && date.as_ref().map_or(true, |d| b.date == *d)
                }
            })
            .cloned()
            .collect();
        Ok(newest_first(matches).into_iter().next())
    }

    async fn insert_ticket(&self, ticket: &TicketRecord) -> Result<(), StoreError> {
        push_bounded(&mut self.tables.write().await.tickets, ticket.clone());
        Ok(())
    }

    async fn record_analytics(&self, event: &AnalyticsEvent) -> Result<(), StoreError> {
        push_bounded(&mut self.tables.write().await.analytics, event.clone());
        Ok(())
    }
}
