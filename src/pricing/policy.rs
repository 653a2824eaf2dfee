use serde::Serialize;

use super::models::Elevator;

/// A volume discount tier; the highest qualifying tier applies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiscountTier {
    pub min_volume_m3: f64,
    pub rate: f64,
}

/// A fixed-price additional service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServicePrice {
    /// Lowercase names that select this service
    pub aliases: &'static [&'static str],
    pub label: &'static str,
    pub price: i64,
}

/// Stairs surcharge for one end of the move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StairsPolicy {
    /// Floors at or above this level are charged when the elevator is unusable
    pub min_floor: i32,
    pub no_elevator_fee: i64,
    pub broken_elevator_fee: i64,
}

impl StairsPolicy {
    pub fn fee(&self, floor: i32, elevator: Elevator) -> i64 {
        if floor < self.min_floor {
            return 0;
        }
        match elevator {
            Elevator::None => self.no_elevator_fee,
            Elevator::Broken => self.broken_elevator_fee,
            Elevator::Yes | Elevator::Small => 0,
        }
    }
}

/// Immutable pricing tables and rates
///
/// Held read-only and shared between requests; there is no way to alter a
/// policy once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingPolicy {
    /// Labour rate per mover and hour, excluding VAT
    pub hourly_rate: f64,
    pub truck_hourly_rate: f64,
    pub vat_rate: f64,
    /// RUT credit on labour cost including VAT
    pub rut_rate: f64,
    pub min_hours: f64,
    /// Cubic meters a crew handles per hour
    pub volume_per_hour: f64,
    pub crew_size: u32,
    pub stairs: StairsPolicy,
    /// Sorted by descending `min_volume_m3`
    pub discount_tiers: Vec<DiscountTier>,
    pub services: Vec<ServicePrice>,
}

const PACKING_HOURLY: i64 = 250;
const PACKING_MIN_HOURS: i64 = 3;

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            hourly_rate: 590.0,
            truck_hourly_rate: 295.0,
            vat_rate: 0.25,
            rut_rate: 0.5,
            min_hours: 3.0,
            volume_per_hour: 5.0,
            crew_size: 2,
            stairs: StairsPolicy {
                min_floor: 3,
                no_elevator_fee: 500,
                broken_elevator_fee: 300,
            },
            discount_tiers: vec![
                DiscountTier { min_volume_m3: 30.0, rate: 0.20 },
                DiscountTier { min_volume_m3: 20.0, rate: 0.15 },
                DiscountTier { min_volume_m3: 15.0, rate: 0.10 },
                DiscountTier { min_volume_m3: 10.0, rate: 0.05 },
            ],
            services: vec![
                ServicePrice {
                    aliases: &["packing", "packning"],
                    label: "Packning (3h)",
                    price: PACKING_HOURLY * PACKING_MIN_HOURS,
                },
                ServicePrice {
                    aliases: &["cleaning", "städning"],
                    label: "Flyttstädning",
                    price: 1200,
                },
                ServicePrice {
                    aliases: &["piano"],
                    label: "Pianoflytt",
                    price: 2500,
                },
                ServicePrice {
                    aliases: &["storage", "magasinering"],
                    label: "Magasinering",
                    price: 500,
                },
            ],
        }
    }
}

impl PricingPolicy {
    /// Highest tier whose threshold the volume reaches
    pub fn discount_tier(&self, volume_m3: f64) -> Option<(usize, &DiscountTier)> {
        self.discount_tiers
            .iter()
            .enumerate()
            .find(|(_, tier)| volume_m3 >= tier.min_volume_m3)
    }

    pub fn discount_rate(&self, volume_m3: f64) -> f64 {
        self.discount_tier(volume_m3)
            .map(|(_, tier)| tier.rate)
            .unwrap_or(0.0)
    }

    /// Case-insensitive service lookup; `None` for names outside the table
    pub fn service(&self, name: &str) -> Option<&ServicePrice> {
        let needle = name.to_lowercase();
        self.services
            .iter()
            .find(|s| s.aliases.iter().any(|alias| *alias == needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_are_descending() {
        let policy = PricingPolicy::default();
        let mins: Vec<f64> = policy.discount_tiers.iter().map(|t| t.min_volume_m3).collect();
        let mut sorted = mins.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(mins, sorted);
    }

    #[test]
    fn test_discount_rate_takes_highest_tier() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.discount_rate(45.0), 0.20);
        assert_eq!(policy.discount_rate(30.0), 0.20);
        assert_eq!(policy.discount_rate(29.9), 0.15);
        assert_eq!(policy.discount_rate(15.0), 0.10);
        assert_eq!(policy.discount_rate(10.0), 0.05);
        assert_eq!(policy.discount_rate(9.99), 0.0);
        assert!(policy.discount_tier(0.0).is_none());
    }

    #[test]
    fn test_service_lookup_is_case_insensitive() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.service("Piano").map(|s| s.price), Some(2500));
        assert_eq!(policy.service("PACKNING").map(|s| s.price), Some(750));
        assert_eq!(policy.service("Städning").map(|s| s.label), Some("Flyttstädning"));
        assert!(policy.service("helicopter").is_none());
    }

    #[test]
    fn test_stairs_fee_per_end() {
        let stairs = PricingPolicy::default().stairs;
        assert_eq!(stairs.fee(3, Elevator::None), 500);
        assert_eq!(stairs.fee(5, Elevator::Broken), 300);
        assert_eq!(stairs.fee(2, Elevator::None), 0);
        assert_eq!(stairs.fee(2, Elevator::Broken), 0);
        assert_eq!(stairs.fee(8, Elevator::Yes), 0);
        assert_eq!(stairs.fee(8, Elevator::Small), 0);
    }
}
