use axum::{extract::rejection::JsonRejection, extract::State, Json};

use super::AppState;
use crate::{
    error::AppError,
    logging::MaskedEmail,
    metrics,
    store::{BookingRecord, CrmStore, CustomerRecord, StoreError},
    support::{is_valid_email, summarize_customer, CustomerLookupRequest, CustomerLookupResponse},
};

/// Handle /gpt-rag/customer-lookup
pub async fn customer_lookup(
    State(state): State<AppState>,
    payload: Result<Json<CustomerLookupRequest>, JsonRejection>,
) -> Result<Json<CustomerLookupResponse>, AppError> {
    let Json(request) = payload?;

    if !is_valid_email(&request.email) {
        metrics::record_validation_error("email");
        return Err(AppError::BadRequest("Invalid email format".to_string()));
    }

    let found = match lookup(state.store.as_ref(), &request.email).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                store = state.store.name(),
                email = %MaskedEmail::new(&request.email),
                error = %e,
                "Customer lookup failed, using seeded data"
            );
            metrics::record_store_error("customer_lookup");
            lookup(&state.fallback, &request.email).await?
        }
    };

    let response = match found {
        Some((customer, bookings)) => {
            summarize_customer(&customer, &bookings, request.query_context.as_deref())
        }
        None => CustomerLookupResponse::not_found(),
    };

    tracing::info!(
        email = %MaskedEmail::new(&request.email),
        customer_found = response.customer_found,
        "Customer lookup"
    );

    Ok(Json(response))
}

async fn lookup(
    store: &dyn CrmStore,
    email: &str,
) -> Result<Option<(CustomerRecord, Vec<BookingRecord>)>, StoreError> {
    let Some(customer) = store.find_customer(email).await? else {
        return Ok(None);
    };
    let bookings = store.bookings_for_customer(email).await?;
    Ok(Some((customer, bookings)))
}
