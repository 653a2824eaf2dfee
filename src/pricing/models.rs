use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Elevator condition at one end of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Elevator {
    Yes,
    Small,
    None,
    Broken,
}

impl Elevator {
    pub const ALL: [Elevator; 4] = [Elevator::Yes, Elevator::Small, Elevator::None, Elevator::Broken];

    pub fn as_str(&self) -> &'static str {
        match self {
            Elevator::Yes => "yes",
            Elevator::Small => "small",
            Elevator::None => "none",
            Elevator::Broken => "broken",
        }
    }
}

impl fmt::Display for Elevator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Elevator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Elevator::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Largest volume a single quote accepts; keeps every amount within `i64`
pub const MAX_VOLUME_M3: f64 = 10_000.0;

/// Validated description of a move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub volume_m3: f64,
    pub floors_from: i32,
    pub floors_to: i32,
    pub elevator_from: Elevator,
    pub elevator_to: Elevator,
    pub additional_services: Vec<String>,
    /// Advisory only, not used in the price
    pub distance_km: f64,
}

impl MoveRequest {
    /// Check the invariants the calculator relies on
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.volume_m3.is_finite() {
            return Err(ValidationError::InvalidVolume(self.volume_m3));
        }
        if self.volume_m3 < 0.0 {
            return Err(ValidationError::NegativeVolume(self.volume_m3));
        }
        if self.volume_m3 > MAX_VOLUME_M3 {
            return Err(ValidationError::VolumeTooLarge {
                value: self.volume_m3,
                max: MAX_VOLUME_M3,
            });
        }
        Ok(())
    }
}

/// Wire format of a price request, before validation
///
/// Elevator values stay as plain strings here so that an unknown value is
/// reported as a validation failure naming the field rather than a generic
/// deserialization error.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalculatePriceRequest {
    pub volume_m3: f64,
    pub floors_from: i32,
    pub floors_to: i32,
    pub elevator_from: String,
    pub elevator_to: String,
    #[serde(default)]
    pub additional_services: Vec<String>,
    #[serde(default)]
    pub distance_km: f64,
    /// Message locale for the explanation strings ("sv" or "en")
    #[serde(default)]
    pub locale: Option<String>,
}

impl TryFrom<CalculatePriceRequest> for MoveRequest {
    type Error = ValidationError;

    fn try_from(req: CalculatePriceRequest) -> Result<Self, Self::Error> {
        let elevator_from = parse_elevator("elevator_from", &req.elevator_from)?;
        let elevator_to = parse_elevator("elevator_to", &req.elevator_to)?;

        let request = MoveRequest {
            volume_m3: req.volume_m3,
            floors_from: req.floors_from,
            floors_to: req.floors_to,
            elevator_from,
            elevator_to,
            additional_services: req.additional_services,
            distance_km: req.distance_km,
        };
        request.validate()?;
        Ok(request)
    }
}

fn parse_elevator(field: &'static str, value: &str) -> Result<Elevator, ValidationError> {
    value
        .parse()
        .map_err(|value| ValidationError::InvalidElevator { field, value })
}

/// A priced additional service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCharge {
    /// Normalized key the service matched on (e.g. "packning")
    pub key: String,
    /// Display label (e.g. "Packning (3h)")
    pub label: String,
    pub cost: i64,
}

impl fmt::Display for ServiceCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} kr", self.label, self.cost)
    }
}

/// Result of a price calculation
///
/// All currency amounts are whole kronor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub hours: f64,
    pub personnel_cost: i64,
    pub truck_cost: i64,
    pub stairs_fee: i64,
    /// Recognized services in request order
    pub additional_services: Vec<ServiceCharge>,
    pub subtotal: i64,
    pub discount_rate: f64,
    pub discount_amount: i64,
    pub total_price: i64,
    pub rut_savings: i64,
}

impl PriceBreakdown {
    /// Service costs keyed by display label; repeated labels are summed
    pub fn additional_service_costs(&self) -> BTreeMap<String, i64> {
        let mut costs = BTreeMap::new();
        for charge in &self.additional_services {
            *costs.entry(charge.label.clone()).or_insert(0) += charge.cost;
        }
        costs
    }

    pub fn additional_services_total(&self) -> i64 {
        self.additional_services.iter().map(|c| c.cost).sum()
    }

    pub fn has_discount(&self) -> bool {
        self.discount_rate > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(elevator_from: &str, elevator_to: &str, volume: f64) -> CalculatePriceRequest {
        CalculatePriceRequest {
            volume_m3: volume,
            floors_from: 0,
            floors_to: 0,
            elevator_from: elevator_from.to_string(),
            elevator_to: elevator_to.to_string(),
            additional_services: vec![],
            distance_km: 12.0,
            locale: None,
        }
    }

    #[test]
    fn test_elevator_parsing() {
        assert_eq!("yes".parse::<Elevator>(), Ok(Elevator::Yes));
        assert_eq!("broken".parse::<Elevator>(), Ok(Elevator::Broken));
        assert!("escalator".parse::<Elevator>().is_err());
        assert!("YES".parse::<Elevator>().is_err());
    }

    #[test]
    fn test_try_from_valid_request() {
        let req = MoveRequest::try_from(wire("small", "none", 18.5)).unwrap();
        assert_eq!(req.elevator_from, Elevator::Small);
        assert_eq!(req.elevator_to, Elevator::None);
        assert_eq!(req.volume_m3, 18.5);
    }

    #[test]
    fn test_try_from_names_invalid_elevator_field() {
        let err = MoveRequest::try_from(wire("yes", "stairs", 10.0)).unwrap_err();
        assert_eq!(err.field(), "elevator_to");
        assert!(err.to_string().contains("stairs"));
    }

    #[test]
    fn test_try_from_rejects_negative_volume() {
        let err = MoveRequest::try_from(wire("yes", "yes", -1.0)).unwrap_err();
        assert_eq!(err, ValidationError::NegativeVolume(-1.0));
        assert_eq!(err.field(), "volume_m3");
    }

    #[test]
    fn test_try_from_rejects_oversized_volume() {
        assert!(MoveRequest::try_from(wire("yes", "yes", MAX_VOLUME_M3)).is_ok());

        let err = MoveRequest::try_from(wire("yes", "yes", 1e18)).unwrap_err();
        assert!(matches!(err, ValidationError::VolumeTooLarge { .. }));
        assert_eq!(err.field(), "volume_m3");
    }

    #[test]
    fn test_service_costs_sum_repeated_labels() {
        let breakdown = PriceBreakdown {
            hours: 3.0,
            personnel_cost: 0,
            truck_cost: 0,
            stairs_fee: 0,
            additional_services: vec![
                ServiceCharge { key: "packing".into(), label: "Packning (3h)".into(), cost: 750 },
                ServiceCharge { key: "packning".into(), label: "Packning (3h)".into(), cost: 750 },
                ServiceCharge { key: "piano".into(), label: "Pianoflytt".into(), cost: 2500 },
            ],
            subtotal: 4000,
            discount_rate: 0.0,
            discount_amount: 0,
            total_price: 4000,
            rut_savings: 0,
        };

        let costs = breakdown.additional_service_costs();
        assert_eq!(costs.get("Packning (3h)"), Some(&1500));
        assert_eq!(costs.get("Pianoflytt"), Some(&2500));
        assert_eq!(breakdown.additional_services_total(), 4000);
        assert_eq!(breakdown.additional_services[2].to_string(), "Pianoflytt: 2500 kr");
    }
}
