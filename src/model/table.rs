//! Poisson probability tables.
//!
//! For a mean rate λ the table lists, for every count `k` in `0..=k_max`:
//!   exact      = 100 · P(X = k) = 100 · e^(−λ) · λ^k / k!
//!   cumulative = 100 · P(X ≤ k)
//!
//! Both columns are percentages rounded to [`DISPLAY_DECIMALS`] places, but
//! they are rounded independently: `exact` is rounded per term while
//! `cumulative` is the rounded running sum of the *unrounded* masses. The
//! cumulative column therefore need not equal the running sum of the exact
//! column in the last decimal.
//!
//! The pmf is evaluated in log-space (`−λ + k·ln λ − ln k!`) so that k! never
//! overflows, whatever rate passes validation.

use serde::{Deserialize, Serialize};

use super::error::ProbabilityError;

/// Highest count shown in every table.
pub const K_MAX: u32 = 10;

/// Decimal places kept in the exact and cumulative columns.
pub const DISPLAY_DECIMALS: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRow {
    pub k: u32,
    /// P(X = k) in percent.
    pub exact: f64,
    /// P(X ≤ k) in percent.
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    pub lambda: f64,
    pub rows: Vec<ProbabilityRow>,
}

impl ProbabilityTable {
    /// Build the table for counts `0..=k_max`.
    pub fn compute(lambda: f64, k_max: u32) -> Result<Self, ProbabilityError> {
        check_rate(lambda)?;

        let mut rows = Vec::with_capacity(k_max as usize + 1);
        let mut running = 0.0;
        let mut ln_factorial = 0.0;
        for k in 0..=k_max {
            if k > 0 {
                ln_factorial += (k as f64).ln();
            }
            let mass = poisson_mass(lambda, k, ln_factorial);
            if !mass.is_finite() {
                return Err(ProbabilityError::DomainOverflow { rate: lambda, k });
            }
            running += mass;
            rows.push(ProbabilityRow {
                k,
                exact: round_to(mass * 100.0, DISPLAY_DECIMALS),
                cumulative: round_to(running * 100.0, DISPLAY_DECIMALS),
            });
        }

        Ok(ProbabilityTable { lambda, rows })
    }

    /// Cumulative percentage not covered by the truncated support.
    pub fn truncation_residual(&self) -> f64 {
        self.rows
            .last()
            .map(|row| 100.0 - row.cumulative)
            .unwrap_or(100.0)
    }
}

/// P(X ≥ 1) in percent, i.e. `100 · (1 − e^(−λ))`.
pub fn probability_at_least_one(lambda: f64) -> Result<f64, ProbabilityError> {
    check_rate(lambda)?;
    Ok(-(-lambda).exp_m1() * 100.0)
}

/// Round to `decimals` places, ties away from zero (not banker's rounding).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn check_rate(lambda: f64) -> Result<(), ProbabilityError> {
    if lambda.is_finite() && lambda >= 0.0 {
        Ok(())
    } else {
        Err(ProbabilityError::InvalidRate { rate: lambda })
    }
}

fn poisson_mass(lambda: f64, k: u32, ln_factorial: f64) -> f64 {
    // ln(0) is -inf; the degenerate distribution is handled explicitly.
    if lambda == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    (-lambda + k as f64 * lambda.ln() - ln_factorial).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATES: [f64; 9] = [0.0, 0.1, 0.5, 1.8, 2.3, 6.2, 13.4, 40.0, 80.0];

    fn table(lambda: f64) -> ProbabilityTable {
        ProbabilityTable::compute(lambda, K_MAX).unwrap()
    }

    #[test]
    fn has_one_row_per_count() {
        let t = table(1.8);
        assert_eq!(t.rows.len(), 11);
        for (i, row) in t.rows.iter().enumerate() {
            assert_eq!(row.k as usize, i);
        }
    }

    #[test]
    fn exact_column_stays_within_percent_bounds() {
        for lambda in SAMPLE_RATES {
            for row in &table(lambda).rows {
                assert!(
                    (0.0..=100.0).contains(&row.exact),
                    "exact out of range at λ={} k={}: {}",
                    lambda,
                    row.k,
                    row.exact
                );
            }
        }
    }

    #[test]
    fn cumulative_is_non_decreasing_and_capped() {
        for lambda in SAMPLE_RATES {
            let t = table(lambda);
            assert_eq!(t.rows[0].cumulative, t.rows[0].exact);
            for pair in t.rows.windows(2) {
                assert!(
                    pair[1].cumulative >= pair[0].cumulative,
                    "cumulative decreased at λ={} k={}",
                    lambda,
                    pair[1].k
                );
            }
            assert!(t.rows[10].cumulative <= 100.0);
        }
    }

    #[test]
    fn zero_rate_is_degenerate() {
        let t = table(0.0);
        assert_eq!(t.rows[0].exact, 100.0);
        for row in &t.rows[1..] {
            assert_eq!(row.exact, 0.0);
        }
        for row in &t.rows {
            assert_eq!(row.cumulative, 100.0);
        }
        assert_eq!(probability_at_least_one(0.0).unwrap(), 0.0);
    }

    #[test]
    fn goals_default_team_a() {
        let t = table(1.8);
        assert_relative_eq!(t.rows[0].exact, 16.5299, epsilon = 1e-9);
        assert_relative_eq!(t.rows[1].exact, 29.7538, epsilon = 1e-9);
        assert_relative_eq!(t.rows[2].exact, 26.7784, epsilon = 1e-9);
        assert_relative_eq!(t.rows[10].cumulative, 99.9997, epsilon = 1e-9);
        let p = probability_at_least_one(1.8).unwrap();
        assert_relative_eq!(p, 83.470_111, epsilon = 1e-5);
    }

    #[test]
    fn cards_default_two_cards() {
        let t = table(2.3);
        assert_relative_eq!(t.rows[2].exact, 26.5185, epsilon = 1e-9);
    }

    #[test]
    fn at_least_one_is_complement_of_zero_row() {
        for lambda in SAMPLE_RATES {
            let t = table(lambda);
            let p = probability_at_least_one(lambda).unwrap();
            // exact[0] carries 4-decimal display rounding.
            assert!(
                (p - (100.0 - t.rows[0].exact)).abs() <= 5e-5 + 1e-9,
                "λ={}: {} vs {}",
                lambda,
                p,
                100.0 - t.rows[0].exact
            );
        }
    }

    #[test]
    fn at_least_one_is_monotonic() {
        let mut prev = probability_at_least_one(0.0).unwrap();
        for step in 1..200 {
            let p = probability_at_least_one(step as f64 * 0.1).unwrap();
            assert!(p >= prev);
            assert!(p <= 100.0);
            prev = p;
        }
        assert!(prev > 99.99);
    }

    #[test]
    fn exact_peaks_near_matching_rate() {
        // For fixed k the mass, as a function of λ, peaks at λ = k.
        for k in 1..=6u32 {
            let at = |lambda: f64| table(lambda).rows[k as usize].exact;
            let peak = at(k as f64);
            assert!(peak > at(k as f64 - 0.5), "k={} below", k);
            assert!(peak > at(k as f64 + 0.5), "k={} above", k);
            assert!(at(k as f64 - 0.5) > at(k as f64 - 1.0));
            assert!(at(k as f64 + 0.5) > at(k as f64 + 1.0));
        }
    }

    #[test]
    fn rounded_exact_sum_tracks_cumulative() {
        let t = table(1.8);
        let sum: f64 = t.rows.iter().map(|row| row.exact).sum();
        // 11 rounded terms plus the once-rounded cumulative, each off by at
        // most half a unit of the 4th decimal.
        assert!((sum - t.rows[10].cumulative).abs() <= 12.0 * 5e-5 + 1e-9);
    }

    #[test]
    fn cumulative_rounds_unrounded_running_sum() {
        // exact[0] + exact[1] = 0.2029 + 1.2582 = 1.4611, but the unrounded
        // running sum rounds to 1.4612.
        let t = table(6.2);
        assert_relative_eq!(t.rows[0].exact, 0.2029, epsilon = 1e-9);
        assert_relative_eq!(t.rows[1].exact, 1.2582, epsilon = 1e-9);
        assert_relative_eq!(t.rows[1].cumulative, 1.4612, epsilon = 1e-9);
    }

    #[test]
    fn large_rate_leaves_truncation_residual() {
        let t = table(13.4);
        assert_relative_eq!(t.rows[10].cumulative, 21.8921, epsilon = 1e-9);
        assert_relative_eq!(t.truncation_residual(), 78.1079, epsilon = 1e-9);
    }

    #[test]
    fn very_large_rate_does_not_overflow() {
        let t = ProbabilityTable::compute(500.0, 600).unwrap();
        assert!(t.rows.iter().all(|row| row.exact.is_finite()));
        assert!(t.rows[500].exact > 1.0);
    }

    #[test]
    fn rejects_negative_and_non_finite_rates() {
        assert_eq!(
            ProbabilityTable::compute(-0.1, K_MAX),
            Err(ProbabilityError::InvalidRate { rate: -0.1 })
        );
        assert!(ProbabilityTable::compute(f64::NAN, K_MAX).is_err());
        assert!(ProbabilityTable::compute(f64::INFINITY, K_MAX).is_err());
        assert!(probability_at_least_one(-1.0).is_err());
    }

    #[test]
    fn zero_k_max_has_single_row() {
        let t = ProbabilityTable::compute(3.0, 0).unwrap();
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].exact, t.rows[0].cumulative);
        assert!(t.rows.get(1).is_none());
    }

    #[test]
    fn round_to_keeps_requested_places() {
        assert_relative_eq!(round_to(16.529_888_8, 4), 16.5299, epsilon = 1e-12);
        assert_relative_eq!(round_to(5.783_127, 2), 5.78, epsilon = 1e-12);
    }

    #[test]
    fn round_to_breaks_ties_away_from_zero() {
        // Exactly representable halves; banker's rounding would go to even.
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(-0.125, 2), -0.13);
    }
}
