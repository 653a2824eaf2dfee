use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use std::time::Instant;

use super::AppState;
use crate::{
    error::AppError,
    logging::MaskedEmail,
    metrics,
    store::AnalyticsEvent,
    support::{generate_ticket_number, CreateTicketRequest, CreateTicketResponse, NewTicket},
};

/// Handle /gpt-rag/create-ticket
///
/// Persisting the ticket and the analytics event is best-effort; the
/// customer gets a ticket number either way.
pub async fn create_ticket(
    State(state): State<AppState>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<Json<CreateTicketResponse>, AppError> {
    let start = Instant::now();
    let Json(request) = payload?;
    let request_data = serde_json::to_value(&request).unwrap_or_default();

    let ticket = NewTicket::try_from(request).map_err(|msg| {
        metrics::record_validation_error("ticket");
        AppError::BadRequest(msg)
    })?;

    let now = Utc::now();
    let ticket_number = generate_ticket_number(&mut rand::thread_rng(), now);

    if let Err(e) = state.store.insert_ticket(&ticket.to_record(&ticket_number, now)).await {
        tracing::error!(
            store = state.store.name(),
            ticket_number = %ticket_number,
            error = %e,
            "Failed to persist support ticket"
        );
        metrics::record_store_error("insert_ticket");
    }

    let response = ticket.response(&ticket_number, now);

    let event = AnalyticsEvent {
        endpoint: "create-ticket".to_string(),
        customer_email: ticket.customer_email.clone(),
        success: true,
        response_time_ms: start.elapsed().as_millis() as u64,
        request_data,
        response_data: serde_json::to_value(&response).unwrap_or_default(),
        timestamp: now,
    };
    if let Err(e) = state.store.record_analytics(&event).await {
        tracing::warn!(store = state.store.name(), error = %e, "Failed to record analytics event");
        metrics::record_store_error("record_analytics");
    }

    tracing::info!(
        ticket_number = %ticket_number,
        issue_type = %ticket.issue_type,
        priority = ticket.priority.as_str(),
        email = %MaskedEmail::new(&ticket.customer_email),
        "Support ticket created"
    );
    metrics::record_ticket(ticket.issue_type.as_str(), ticket.priority.as_str());

    Ok(Json(response))
}
