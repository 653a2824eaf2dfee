//! Customer-service flows behind the support GPT endpoints.

pub mod bookings;
pub mod customers;
pub mod tickets;

use regex::Regex;
use std::sync::OnceLock;

pub use bookings::{describe_booking, BookingDetailsRequest, BookingDetailsResponse};
pub use customers::{summarize_customer, CustomerLookupRequest, CustomerLookupResponse};
pub use tickets::{generate_ticket_number, CreateTicketRequest, CreateTicketResponse, NewTicket};

/// Syntactic e-mail check (local part, `@`, dotted domain)
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("e-mail regex compiles")
    });
    re.is_match(email)
}
