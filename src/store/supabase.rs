use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::models::{AnalyticsEvent, BookingQuery, BookingRecord, CustomerRecord, TicketRecord};
use super::{CrmStore, StoreError};

/// Supabase tables reached through the PostgREST API
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    rest_url: String,
    service_key: String,
    timeout: Duration,
}

impl SupabaseStore {
    pub fn new(
        client: Client,
        project_url: &str,
        service_key: &str,
        timeout_seconds: u64,
    ) -> Result<Self, StoreError> {
        let project_url = project_url.trim_end_matches('/');
        if !project_url.starts_with("http://") && !project_url.starts_with("https://") {
            return Err(StoreError::Config(format!(
                "Supabase URL must be http(s): {}",
                project_url
            )));
        }

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", project_url),
            service_key: service_key.to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        })
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .timeout(self.timeout)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}/{}", self.rest_url, table);
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend(filters.iter().cloned());

        let response = self
            .authorize(self.client.get(&url))
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.rest_url, table);

        let response = self
            .authorize(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl CrmStore for SupabaseStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn find_customer(&self, email: &str) -> Result<Option<CustomerRecord>, StoreError> {
        let rows: Vec<CustomerRecord> = self
            .select("customers", &[("email", eq(email)), ("limit", "1".to_string())])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn bookings_for_customer(&self, email: &str) -> Result<Vec<BookingRecord>, StoreError> {
        self.select(
            "jobs",
            &[("customer_email", eq(email)), ("order", "date.desc".to_string())],
        )
        .await
    }

    async fn find_booking(&self, query: &BookingQuery) -> Result<Option<BookingRecord>, StoreError> {
        let mut filters = match query {
            BookingQuery::ByReference(reference) => vec![("reference_number", eq(reference))],
            BookingQuery::ByCustomer { email, date } => {
                let mut filters = vec![("customer_email", eq(email))];
                if let Some(date) = date {
                    filters.push(("date", eq(date)));
                }
                filters
            }
        };
        filters.push(("order", "date.desc".to_string()));
        filters.push(("limit", "1".to_string()));

        let rows: Vec<BookingRecord> = self.select("jobs", &filters).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_ticket(&self, ticket: &TicketRecord) -> Result<(), StoreError> {
        self.insert("support_tickets", ticket).await
    }

    async fn record_analytics(&self, event: &AnalyticsEvent) -> Result<(), StoreError> {
        self.insert("gpt_analytics", event).await
    }
}
