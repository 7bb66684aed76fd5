//! Per-team "at least one occurrence" summaries and the A − B comparison.

use super::error::ProbabilityError;
use super::event::PerEvent;
use super::table::{probability_at_least_one, round_to};

/// P(X ≥ 1) in percent for each event type, computed independently.
pub fn build_summary(rates: &PerEvent<f64>) -> Result<PerEvent<f64>, ProbabilityError> {
    PerEvent::try_from_fn(|event| probability_at_least_one(rates[event]))
}

/// Percentage-point difference `a − b` per event, rounded to 2 decimals.
pub fn percentage_point_diff(a: &PerEvent<f64>, b: &PerEvent<f64>) -> PerEvent<f64> {
    PerEvent::from_fn(|event| round_to(a[event] - b[event], 2))
}
