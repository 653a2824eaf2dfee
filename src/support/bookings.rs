use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::store::{BookingQuery, BookingRecord};

/// Days before the move after which changes are no longer accepted
pub const MODIFY_CUTOFF_DAYS: i64 = 2;
/// Days before the move after which cancellation is no longer accepted
pub const CANCEL_CUTOFF_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BookingDetailsRequest {
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
}

impl BookingDetailsRequest {
    /// A given `customer_email` must be a syntactically valid address
    pub fn validate(&self) -> Result<(), String> {
        match self.customer_email.as_deref().filter(|e| !e.is_empty()) {
            Some(email) if !super::is_valid_email(email) => {
                Err("Invalid email format".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Reference number wins over e-mail; `None` when neither is given
    pub fn query(&self) -> Option<BookingQuery> {
        if let Some(reference) = self.booking_id.as_ref().filter(|r| !r.is_empty()) {
            return Some(BookingQuery::ByReference(reference.clone()));
        }
        self.customer_email
            .as_ref()
            .filter(|e| !e.is_empty())
            .map(|email| BookingQuery::ByCustomer {
                email: email.clone(),
                date: self.booking_date.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingData {
    pub booking_id: String,
    pub reference_number: String,
    pub date: String,
    pub services: Vec<String>,
    pub total_amount: f64,
    pub status: String,
    pub packed_by_nordflytt: bool,
    pub photos_available: bool,
    pub from_address: String,
    pub to_address: String,
    pub volume_m3: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceContext {
    pub has_packing_service: bool,
    pub has_cleaning: bool,
    pub has_boxes: bool,
    pub has_storage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdditionalInfo {
    pub can_modify: bool,
    pub can_cancel: bool,
    pub invoice_sent: bool,
    pub payment_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingDetailsResponse {
    pub booking_found: bool,
    pub booking_data: Option<BookingData>,
    pub service_context: Option<ServiceContext>,
    pub additional_info: Option<AdditionalInfo>,
}

impl BookingDetailsResponse {
    pub fn not_found() -> Self {
        Self {
            booking_found: false,
            booking_data: None,
            service_context: None,
            additional_info: None,
        }
    }
}

/// Whole days from `now` until the move; unparseable dates count as past
pub fn days_until_move(booking: &BookingRecord, now: NaiveDateTime) -> i64 {
    booking
        .move_datetime()
        .map(|date| (date - now).num_days())
        .unwrap_or(i64::MIN)
}

pub fn describe_booking(booking: &BookingRecord, now: NaiveDateTime) -> BookingDetailsResponse {
    let days = days_until_move(booking, now);
    let has_packing = booking.has_service("packning");

    let reference_number = booking.reference_number.clone().unwrap_or_else(|| {
        let prefix: String = booking.id.chars().take(8).collect();
        format!("BK-{}", prefix)
    });

    BookingDetailsResponse {
        booking_found: true,
        booking_data: Some(BookingData {
            booking_id: booking.id.clone(),
            reference_number,
            date: booking.date.clone(),
            services: booking.services.clone(),
            total_amount: booking.total_amount,
            status: booking.status.clone().unwrap_or_else(|| "confirmed".to_string()),
            packed_by_nordflytt: has_packing,
            photos_available: booking.photos_available,
            from_address: booking.from_address.clone(),
            to_address: booking.to_address.clone(),
            volume_m3: booking.volume_m3,
        }),
        service_context: Some(ServiceContext {
            has_packing_service: has_packing,
            has_cleaning: booking.has_service("städning"),
            has_boxes: booking.materials.boxes > 0,
            has_storage: booking.has_service("magasinering"),
        }),
        additional_info: Some(AdditionalInfo {
            can_modify: days > MODIFY_CUTOFF_DAYS,
            can_cancel: days > CANCEL_CUTOFF_DAYS,
            invoice_sent: booking.invoice_sent,
            payment_status: booking
                .payment_status
                .clone()
                .unwrap_or_else(|| "pending".to_string()),
        }),
    }
}
