use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;

use super::AppState;
use crate::{
    error::AppError,
    metrics,
    store::CrmStore,
    support::{describe_booking, BookingDetailsRequest, BookingDetailsResponse},
};

/// Handle /gpt-rag/booking-details
pub async fn booking_details(
    State(state): State<AppState>,
    payload: Result<Json<BookingDetailsRequest>, JsonRejection>,
) -> Result<Json<BookingDetailsResponse>, AppError> {
    let Json(request) = payload?;

    request.validate().map_err(|msg| {
        metrics::record_validation_error("customer_email");
        AppError::BadRequest(msg)
    })?;

    let Some(query) = request.query() else {
        metrics::record_validation_error("booking_id");
        return Err(AppError::BadRequest(
            "Either booking_id or customer_email is required".to_string(),
        ));
    };

    let booking = match state.store.find_booking(&query).await {
        Ok(booking) => booking,
        Err(e) => {
            tracing::warn!(
                store = state.store.name(),
                error = %e,
                "Booking lookup failed, using seeded data"
            );
            metrics::record_store_error("booking_details");
            state.fallback.find_booking(&query).await?
        }
    };

    let response = match booking {
        Some(booking) => describe_booking(&booking, Utc::now().naive_utc()),
        None => BookingDetailsResponse::not_found(),
    };

    tracing::info!(booking_found = response.booking_found, "Booking details");

    Ok(Json(response))
}
