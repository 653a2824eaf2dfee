use crate::pricing::models::{MoveRequest, PriceBreakdown, ServiceCharge, MAX_VOLUME_M3};
use crate::pricing::policy::PricingPolicy;
use crate::pricing::ValidationError;

/// Absorbs binary drift (e.g. `590.0 * 4.2`) before flooring to whole kronor
const ROUNDING_TOLERANCE: f64 = 1e-6;

/// Floor a currency amount to whole kronor
fn to_kronor(amount: f64) -> i64 {
    (amount + ROUNDING_TOLERANCE).floor().max(0.0) as i64
}

/// Price a move under the given policy
///
/// Pure and deterministic: identical inputs give identical breakdowns.
/// Service names outside the policy table are ignored.
pub fn calculate_price(
    policy: &PricingPolicy,
    request: &MoveRequest,
) -> Result<PriceBreakdown, ValidationError> {
    request.validate()?;

    let hours = (request.volume_m3 / policy.volume_per_hour).max(policy.min_hours);
    let vat = 1.0 + policy.vat_rate;

    let personnel_with_vat = policy.hourly_rate * hours * f64::from(policy.crew_size) * vat;
    let rut_savings = personnel_with_vat * policy.rut_rate;
    let personnel_cost = personnel_with_vat - rut_savings;

    // Truck time is not RUT eligible
    let truck_cost = policy.truck_hourly_rate * hours * vat;

    let stairs_fee = policy.stairs.fee(request.floors_from, request.elevator_from)
        + policy.stairs.fee(request.floors_to, request.elevator_to);

    let additional_services: Vec<ServiceCharge> = request
        .additional_services
        .iter()
        .filter_map(|name| {
            policy.service(name).map(|service| ServiceCharge {
                key: name.to_lowercase(),
                label: service.label.to_string(),
                cost: service.price,
            })
        })
        .collect();

    let personnel_cost = to_kronor(personnel_cost);
    let truck_cost = to_kronor(truck_cost);
    let services_total: i64 = additional_services.iter().map(|c| c.cost).sum();
    let subtotal = [personnel_cost, truck_cost, stairs_fee, services_total]
        .into_iter()
        .try_fold(0i64, i64::checked_add)
        .ok_or(ValidationError::VolumeTooLarge {
            value: request.volume_m3,
            max: MAX_VOLUME_M3,
        })?;

    let discount_rate = policy.discount_rate(request.volume_m3);
    let discount_amount = to_kronor(subtotal as f64 * discount_rate);

    Ok(PriceBreakdown {
        hours,
        personnel_cost,
        truck_cost,
        stairs_fee,
        additional_services,
        subtotal,
        discount_rate,
        discount_amount,
        total_price: subtotal - discount_amount,
        rut_savings: to_kronor(rut_savings),
    })
}

/// Calculator bound to a policy
#[derive(Debug, Clone, Default)]
pub struct PriceCalculator {
    policy: PricingPolicy,
}

impl PriceCalculator {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn calculate(&self, request: &MoveRequest) -> Result<PriceBreakdown, ValidationError> {
        calculate_price(&self.policy, request)
    }
}
