use serde::{Deserialize, Serialize};

use crate::store::{BookingRecord, CustomerRecord};

/// Booking count at which a customer counts as VIP
pub const VIP_MIN_BOOKINGS: usize = 3;
/// Lifetime spend (kr) above which a customer counts as VIP
pub const VIP_MIN_SPENT: f64 = 50_000.0;

const NEW_CUSTOMER_GREETING: &str =
    "Hej och välkommen till Nordflytt! Jag heter Maja och hjälper dig gärna med din flytt. Vad kan jag göra för dig idag?";
const DAMAGE_ADDENDUM: &str = " Jag förstår att du har ett problem - låt mig hjälpa dig direkt.";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomerLookupRequest {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub query_context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseContext {
    VipCustomer,
    ReturningCustomer,
    NewCustomer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastBooking {
    pub date: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerData {
    pub name: String,
    pub is_vip: bool,
    pub total_bookings: usize,
    pub last_booking: Option<LastBooking>,
    pub is_returning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerLookupResponse {
    pub customer_found: bool,
    pub customer_data: Option<CustomerData>,
    pub response_context: ResponseContext,
    pub suggested_greeting: String,
}

impl CustomerLookupResponse {
    pub fn not_found() -> Self {
        Self {
            customer_found: false,
            customer_data: None,
            response_context: ResponseContext::NewCustomer,
            suggested_greeting: NEW_CUSTOMER_GREETING.to_string(),
        }
    }
}

/// Build the lookup answer for a known customer
///
/// `bookings` must be ordered newest first.
pub fn summarize_customer(
    customer: &CustomerRecord,
    bookings: &[BookingRecord],
    query_context: Option<&str>,
) -> CustomerLookupResponse {
    let name = customer.name.clone().unwrap_or_default();
    let total_bookings = bookings.len();
    let total_spent: f64 = bookings.iter().map(|b| b.total_amount).sum();
    let is_vip = total_bookings >= VIP_MIN_BOOKINGS || total_spent > VIP_MIN_SPENT;
    let last_booking = bookings.first().map(|b| LastBooking {
        date: b.date.clone(),
        services: b.services.clone(),
    });

    let (response_context, mut greeting) = if is_vip {
        let display = customer.name.as_deref().unwrap_or("kära kund");
        (
            ResponseContext::VipCustomer,
            format!("Hej {}! ⭐ Som en av våra värdefulla VIP-kunder, hur kan jag hjälpa dig idag?", display),
        )
    } else if let Some(last) = &last_booking {
        (
            ResponseContext::ReturningCustomer,
            format!(
                "Hej {}! Jag ser din senaste bokning från {}. Hur kan jag hjälpa dig?",
                name, last.date
            ),
        )
    } else {
        (
            ResponseContext::NewCustomer,
            format!("Hej {}! Välkommen till Nordflytt. Hur kan jag hjälpa dig med din flytt?", name),
        )
    };

    if query_context.is_some_and(|ctx| ctx.to_lowercase().contains("damage")) {
        greeting.push_str(DAMAGE_ADDENDUM);
    }

    CustomerLookupResponse {
        customer_found: true,
        customer_data: Some(CustomerData {
            name,
            is_vip,
            total_bookings,
            last_booking,
            is_returning: total_bookings > 0,
        }),
        response_context,
        suggested_greeting: greeting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Materials;

    fn customer(name: Option<&str>) -> CustomerRecord {
        CustomerRecord {
            email: "kund@example.se".to_string(),
            name: name.map(String::from),
            phone: None,
        }
    }

    fn booking(date: &str, amount: f64) -> BookingRecord {
        BookingRecord {
            id: format!("id-{date}"),
            reference_number: None,
            customer_email: "kund@example.se".to_string(),
            date: date.to_string(),
            services: vec!["flytt".to_string()],
            total_amount: amount,
            status: None,
            photos_available: false,
            from_address: String::new(),
            to_address: String::new(),
            volume_m3: 0.0,
            materials: Materials::default(),
            invoice_sent: false,
            payment_status: None,
        }
    }

    #[test]
    fn test_new_customer_without_bookings() {
        let response = summarize_customer(&customer(Some("Lisa")), &[], None);
        assert!(response.customer_found);
        assert_eq!(response.response_context, ResponseContext::NewCustomer);
        assert!(response.suggested_greeting.starts_with("Hej Lisa! Välkommen till Nordflytt."));
        assert!(!response.customer_data.unwrap().is_returning);
    }

    #[test]
    fn test_returning_customer_mentions_last_booking() {
        let bookings = [booking("2025-02-01", 9000.0), booking("2024-01-01", 4000.0)];
        let response = summarize_customer(&customer(Some("Lisa")), &bookings, None);

        assert_eq!(response.response_context, ResponseContext::ReturningCustomer);
        assert!(response.suggested_greeting.contains("2025-02-01"));
        let data = response.customer_data.unwrap();
        assert_eq!(data.total_bookings, 2);
        assert_eq!(data.last_booking.unwrap().date, "2025-02-01");
        assert!(!data.is_vip);
    }

    #[test]
    fn test_vip_by_booking_count() {
        let bookings = [booking("2025-01-01", 1.0), booking("2024-01-01", 1.0), booking("2023-01-01", 1.0)];
        let response = summarize_customer(&customer(None), &bookings, None);
        assert_eq!(response.response_context, ResponseContext::VipCustomer);
        assert!(response.suggested_greeting.starts_with("Hej kära kund! ⭐"));
    }

    #[test]
    fn test_vip_by_spend() {
        let response = summarize_customer(&customer(Some("Olle")), &[booking("2025-01-01", 50_001.0)], None);
        assert!(response.customer_data.unwrap().is_vip);

        let response = summarize_customer(&customer(Some("Olle")), &[booking("2025-01-01", 50_000.0)], None);
        assert!(!response.customer_data.unwrap().is_vip);
    }

    #[test]
    fn test_damage_context_appends_empathy() {
        let response = summarize_customer(&customer(Some("Lisa")), &[], Some("Reporting DAMAGE to sofa"));
        assert!(response.suggested_greeting.ends_with("låt mig hjälpa dig direkt."));
    }

    #[test]
    fn test_not_found_serializes_context() {
        let json = serde_json::to_value(CustomerLookupResponse::not_found()).unwrap();
        assert_eq!(json["response_context"], "new_customer");
        assert!(json["customer_data"].is_null());
    }
}
