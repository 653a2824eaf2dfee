use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use serde::Serialize;

use super::AppState;
use crate::{
    auth::AuthInfo,
    error::AppError,
    metrics,
    pricing::{
        CalculatePriceRequest, Locale, MoveRequest, PriceBreakdown, PricingPolicy, QuoteMessages,
        ValidationError,
    },
};

#[derive(Debug, Serialize)]
pub struct PricingData {
    pub total_price: i64,
    pub volume_discount: String,
    pub savings_explanation: String,
}

#[derive(Debug, Serialize)]
pub struct PriceBreakdownView {
    pub personnel_cost: i64,
    pub truck_cost: i64,
    pub stairs_fee: i64,
    /// "<label>: <cost> kr", in request order
    pub additional_services: Vec<String>,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub rut_savings: i64,
}

impl From<&PriceBreakdown> for PriceBreakdownView {
    fn from(b: &PriceBreakdown) -> Self {
        Self {
            personnel_cost: b.personnel_cost,
            truck_cost: b.truck_cost,
            stairs_fee: b.stairs_fee,
            additional_services: b.additional_services.iter().map(|s| s.to_string()).collect(),
            subtotal: b.subtotal,
            discount_amount: b.discount_amount,
            rut_savings: b.rut_savings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CalculatePriceResponse {
    pub price_calculated: bool,
    pub pricing_data: PricingData,
    pub price_breakdown: PriceBreakdownView,
    pub suggested_response: String,
}

impl CalculatePriceResponse {
    pub fn new(
        policy: &PricingPolicy,
        request: &MoveRequest,
        breakdown: &PriceBreakdown,
        locale: Locale,
    ) -> Self {
        let messages = QuoteMessages::new(policy, locale);
        let volume = request.volume_m3;

        Self {
            price_calculated: true,
            pricing_data: PricingData {
                total_price: breakdown.total_price,
                volume_discount: messages.volume_discount(volume),
                savings_explanation: messages.savings_explanation(volume, breakdown),
            },
            price_breakdown: PriceBreakdownView::from(breakdown),
            suggested_response: messages.suggested_response(
                volume,
                &request.additional_services,
                breakdown,
            ),
        }
    }
}

/// Handle /gpt-rag/calculate-price
pub async fn calculate_price(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthInfo>,
    payload: Result<Json<CalculatePriceRequest>, JsonRejection>,
) -> Result<Json<CalculatePriceResponse>, AppError> {
    let Json(request) = payload?;

    let locale = match request.locale.as_deref() {
        Some(tag) => tag.parse::<Locale>().map_err(AppError::BadRequest)?,
        None => state.config.load().server.locale,
    };

    let move_request = MoveRequest::try_from(request).map_err(rejected)?;
    let breakdown = state.calculator.calculate(&move_request).map_err(rejected)?;

    tracing::info!(
        api_key = %auth.api_key_name,
        volume_m3 = move_request.volume_m3,
        hours = breakdown.hours,
        total_price = breakdown.total_price,
        discount_rate = breakdown.discount_rate,
        "Price calculated"
    );
    metrics::record_quote(
        &metrics::discount_tier_label(breakdown.discount_rate),
        breakdown.total_price,
    );

    Ok(Json(CalculatePriceResponse::new(
        state.calculator.policy(),
        &move_request,
        &breakdown,
        locale,
    )))
}

fn rejected(err: ValidationError) -> AppError {
    tracing::debug!(field = err.field(), error = %err, "Rejected move request");
    metrics::record_validation_error(err.field());
    AppError::Validation(err)
}
