pub mod calculator;
pub mod error;
pub mod messages;
pub mod models;
pub mod policy;

pub use calculator::{calculate_price, PriceCalculator};
pub use error::ValidationError;
pub use messages::{Locale, QuoteMessages};
pub use models::{CalculatePriceRequest, Elevator, MoveRequest, PriceBreakdown, ServiceCharge};
pub use policy::{DiscountTier, PricingPolicy, ServicePrice, StairsPolicy};
