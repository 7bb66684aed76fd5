use thiserror::Error;

use super::event::EventType;

/// Failures of the probability computation itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbabilityError {
    #[error("rate must be a finite non-negative number, got {rate}")]
    InvalidRate { rate: f64 },

    #[error("probability mass at k={k} is not finite for rate {rate}")]
    DomainOverflow { rate: f64, k: u32 },
}

/// Rejections of user-supplied match input, raised before anything is computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{team}: {event} rate {rate} is outside 0..={max}")]
    RateOutOfRange {
        team: String,
        event: EventType,
        rate: f64,
        max: f64,
    },

    #[error("{team}: sample size {size} exceeds {max} matches")]
    SampleSizeOutOfRange { team: String, size: u32, max: u32 },

    #[error("{team}: {source}")]
    Probability {
        team: String,
        #[source]
        source: ProbabilityError,
    },
}
