use anyhow::Result;
use colored::Colorize;
use nordflytt_api::{
    handlers::pricing::CalculatePriceResponse,
    pricing::{CalculatePriceRequest, Locale, MoveRequest, PriceCalculator},
};

use crate::cli::QuoteArgs;

/// Execute the quote command
///
/// Prices a move with the built-in pricing policy; no config or network needed.
pub fn execute(args: QuoteArgs) -> Result<()> {
    let locale: Locale = args.locale.parse().map_err(anyhow::Error::msg)?;

    let request = MoveRequest::try_from(CalculatePriceRequest {
        volume_m3: args.volume,
        floors_from: args.floors_from,
        floors_to: args.floors_to,
        elevator_from: args.elevator_from,
        elevator_to: args.elevator_to,
        additional_services: args.services,
        distance_km: args.distance,
        locale: None,
    })?;

    let calculator = PriceCalculator::default();
    let breakdown = calculator.calculate(&request)?;
    let response = CalculatePriceResponse::new(calculator.policy(), &request, &breakdown, locale);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("{}", "Price breakdown".bold());
    println!("  {}: {:.2} h", "Hours".cyan(), breakdown.hours);
    println!("  {}: {} kr", "Personnel (after RUT)".cyan(), breakdown.personnel_cost);
    println!("  {}: {} kr", "Truck".cyan(), breakdown.truck_cost);
    println!("  {}: {} kr", "Stairs fee".cyan(), breakdown.stairs_fee);
    for service in &breakdown.additional_services {
        println!("  {}: {} kr", service.label.as_str().cyan(), service.cost);
    }
    println!("  {}: {} kr", "Subtotal".cyan(), breakdown.subtotal);
    if breakdown.has_discount() {
        println!(
            "  {}: -{} kr ({})",
            "Volume discount".cyan(),
            breakdown.discount_amount,
            response.pricing_data.volume_discount
        );
    }
    println!("  {}: {} kr", "Total".green().bold(), breakdown.total_price);
    println!("  {}: {} kr", "RUT savings".cyan(), breakdown.rut_savings);
    println!();
    println!("{}", response.suggested_response);

    Ok(())
}
