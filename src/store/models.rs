use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `customers` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomerRecord {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Packing materials delivered with a booking
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Materials {
    #[serde(default)]
    pub boxes: i64,
}

/// Row of the `jobs` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BookingRecord {
    pub id: String,
    #[serde(default)]
    pub reference_number: Option<String>,
    pub customer_email: String,
    /// ISO date or timestamp of the move
    pub date: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub photos_available: bool,
    #[serde(default)]
    pub from_address: String,
    #[serde(default)]
    pub to_address: String,
    #[serde(default)]
    pub volume_m3: f64,
    #[serde(default)]
    pub materials: Materials,
    #[serde(default)]
    pub invoice_sent: bool,
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl BookingRecord {
    /// Move date as a naive local timestamp
    ///
    /// Accepts plain dates (midnight is assumed), RFC 3339 timestamps and
    /// timestamps without offset.
    pub fn move_datetime(&self) -> Option<NaiveDateTime> {
        if let Ok(date) = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(ts.naive_utc());
        }
        NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    pub fn has_service(&self, service: &str) -> bool {
        self.services.iter().any(|s| s == service)
    }
}

/// Booking selector: by reference number, or the newest booking of a customer
#[derive(Debug, Clone, PartialEq)]
pub enum BookingQuery {
    ByReference(String),
    ByCustomer { email: String, date: Option<String> },
}

/// Row of the `support_tickets` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TicketRecord {
    pub ticket_number: String,
    pub customer_email: String,
    pub issue_type: String,
    pub description: String,
    pub priority: String,
    pub booking_reference: Option<String>,
    pub status: String,
    pub assigned_team: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the `gpt_analytics` table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalyticsEvent {
    pub endpoint: String,
    pub customer_email: String,
    pub success: bool,
    pub response_time_ms: u64,
    pub request_data: serde_json::Value,
    pub response_data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(date: &str) -> BookingRecord {
        serde_json::from_value(serde_json::json!({
            "id": "b1",
            "customer_email": "a@b.se",
            "date": date,
        }))
        .unwrap()
    }

    #[test]
    fn test_booking_defaults_from_sparse_row() {
        let b = booking("2025-03-01");
        assert!(b.services.is_empty());
        assert_eq!(b.total_amount, 0.0);
        assert_eq!(b.materials.boxes, 0);
        assert!(b.reference_number.is_none());
    }

    #[test]
    fn test_move_datetime_formats() {
        let midnight = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(booking("2025-03-01").move_datetime(), Some(midnight));
        assert_eq!(booking("2025-03-01T00:00:00+00:00").move_datetime(), Some(midnight));
        assert_eq!(booking("2025-03-01T00:00:00").move_datetime(), Some(midnight));
        assert_eq!(booking("next tuesday").move_datetime(), None);
    }
}
