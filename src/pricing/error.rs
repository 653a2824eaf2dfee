use thiserror::Error;

/// Input rejected before any price is computed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("volume_m3 must not be negative (got {0})")]
    NegativeVolume(f64),

    #[error("volume_m3 must be a finite number (got {0})")]
    InvalidVolume(f64),

    #[error("volume_m3 must be at most {max} (got {value})")]
    VolumeTooLarge { value: f64, max: f64 },

    #[error("{field} must be one of yes, small, none, broken (got '{value}')")]
    InvalidElevator { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the request field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            Self::NegativeVolume(_) | Self::InvalidVolume(_) | Self::VolumeTooLarge { .. } => {
                "volume_m3"
            }
            Self::InvalidElevator { field, .. } => *field,
        }
    }
}
