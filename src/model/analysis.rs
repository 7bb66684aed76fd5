use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::error::InputError;
use super::event::PerEvent;
use super::summary::{build_summary, percentage_point_diff};
use super::table::{round_to, ProbabilityTable, K_MAX};

/// Largest sample size (matches behind the means) accepted as input.
pub const MAX_SAMPLE_SIZE: u32 = 1000;

/// Means supplied for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInput {
    pub name: String,
    /// Matches the means were derived from. Display only.
    pub sample_size: u32,
    pub rates: PerEvent<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    pub team_a: TeamInput,
    pub team_b: TeamInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamAnalysis {
    pub name: String,
    pub sample_size: u32,
    pub rates: PerEvent<f64>,
    pub tables: PerEvent<ProbabilityTable>,
    /// P(X ≥ 1) in percent, rounded to 2 decimals.
    pub at_least_one: PerEvent<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchAnalysis {
    pub generated_at: DateTime<Local>,
    pub team_a: TeamAnalysis,
    pub team_b: TeamAnalysis,
    /// Team A minus team B at-least-one probability, in percentage points.
    pub insights: PerEvent<f64>,
}

impl TeamInput {
    /// Trim the name, falling back to `default_name` when it is blank.
    pub fn normalized(mut self, default_name: &str) -> Self {
        let trimmed = self.name.trim();
        self.name = if trimmed.is_empty() {
            default_name.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }

    pub fn validate(&self) -> Result<(), InputError> {
        for (event, &rate) in self.rates.iter() {
            let max = event.max_rate();
            if !(0.0..=max).contains(&rate) {
                return Err(InputError::RateOutOfRange {
                    team: self.name.clone(),
                    event,
                    rate,
                    max,
                });
            }
        }
        if self.sample_size > MAX_SAMPLE_SIZE {
            return Err(InputError::SampleSizeOutOfRange {
                team: self.name.clone(),
                size: self.sample_size,
                max: MAX_SAMPLE_SIZE,
            });
        }
        Ok(())
    }
}

impl MatchInput {
    pub fn validate(&self) -> Result<(), InputError> {
        self.team_a.validate()?;
        self.team_b.validate()
    }
}

/// Validate `input` and compute every table and summary for both teams.
pub fn analyze(input: &MatchInput) -> Result<MatchAnalysis, InputError> {
    input.validate()?;

    let (team_a, raw_a) = analyze_team(&input.team_a)?;
    let (team_b, raw_b) = analyze_team(&input.team_b)?;
    let insights = percentage_point_diff(&raw_a, &raw_b);

    Ok(MatchAnalysis {
        generated_at: Local::now(),
        team_a,
        team_b,
        insights,
    })
}

/// Returns the analysis along with the unrounded at-least-one percentages.
fn analyze_team(team: &TeamInput) -> Result<(TeamAnalysis, PerEvent<f64>), InputError> {
    let wrap = |source| InputError::Probability {
        team: team.name.clone(),
        source,
    };

    let tables = PerEvent::try_from_fn(|event| ProbabilityTable::compute(team.rates[event], K_MAX))
        .map_err(wrap)?;
    let raw = build_summary(&team.rates).map_err(wrap)?;

    Ok((
        TeamAnalysis {
            name: team.name.clone(),
            sample_size: team.sample_size,
            rates: team.rates,
            tables,
            at_least_one: PerEvent::from_fn(|event| round_to(raw[event], 2)),
        },
        raw,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::EventType;
    use approx::assert_relative_eq;

    fn team(name: &str, sample_size: u32, rates: [f64; 4]) -> TeamInput {
        TeamInput {
            name: name.into(),
            sample_size,
            rates: PerEvent {
                shots: rates[0],
                corners: rates[1],
                cards: rates[2],
                goals: rates[3],
            },
        }
    }

    fn default_match() -> MatchInput {
        MatchInput {
            team_a: team("Team A", 20, [13.4, 6.2, 2.3, 1.8]),
            team_b: team("Team B", 18, [12.9, 5.8, 2.0, 1.5]),
        }
    }

    #[test]
    fn analyze_builds_eight_tables() {
        let analysis = analyze(&default_match()).unwrap();
        for team in [&analysis.team_a, &analysis.team_b] {
            for (_, table) in team.tables.iter() {
                assert_eq!(table.rows.len(), K_MAX as usize + 1);
            }
        }
        assert_relative_eq!(analysis.team_a.tables.goals.lambda, 1.8);
        assert_relative_eq!(analysis.team_b.tables.cards.lambda, 2.0);
    }

    #[test]
    fn analyze_rounds_summary_and_insights() {
        let analysis = analyze(&default_match()).unwrap();
        assert_relative_eq!(analysis.team_a.at_least_one.goals, 83.47, epsilon = 1e-9);
        assert_relative_eq!(analysis.team_b.at_least_one.goals, 77.69, epsilon = 1e-9);
        // Difference comes from unrounded values: 83.4701 − 77.6870.
        assert_relative_eq!(analysis.insights.goals, 5.78, epsilon = 1e-9);
    }

    #[test]
    fn sample_size_does_not_affect_results() {
        let mut other = default_match();
        other.team_a.sample_size = 900;
        let a = analyze(&default_match()).unwrap();
        let b = analyze(&other).unwrap();
        assert_eq!(a.team_a.tables, b.team_a.tables);
        assert_eq!(a.insights, b.insights);
    }

    #[test]
    fn rejects_rate_above_event_maximum() {
        let mut input = default_match();
        input.team_b.rates.goals = 25.0;
        let err = analyze(&input).unwrap_err();
        assert_eq!(
            err,
            InputError::RateOutOfRange {
                team: "Team B".into(),
                event: EventType::Goals,
                rate: 25.0,
                max: 20.0,
            }
        );
        assert_eq!(err.to_string(), "Team B: Goals rate 25 is outside 0..=20");
    }

    #[test]
    fn rejects_negative_and_nan_rates() {
        let mut input = default_match();
        input.team_a.rates.corners = -0.5;
        assert!(matches!(
            analyze(&input),
            Err(InputError::RateOutOfRange {
                event: EventType::Corners,
                ..
            })
        ));

        input.team_a.rates.corners = f64::NAN;
        assert!(analyze(&input).is_err());
    }

    #[test]
    fn rejects_oversized_sample() {
        let mut input = default_match();
        input.team_a.sample_size = 1001;
        assert!(matches!(
            input.validate(),
            Err(InputError::SampleSizeOutOfRange { size: 1001, .. })
        ));
    }

    #[test]
    fn blank_names_fall_back_to_default() {
        let t = team("   ", 0, [0.0; 4]).normalized("Team A");
        assert_eq!(t.name, "Team A");
        let t = team("  Flamengo ", 0, [0.0; 4]).normalized("Team A");
        assert_eq!(t.name, "Flamengo");
    }

    #[test]
    fn analysis_serializes_to_json() {
        let analysis = analyze(&default_match()).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["team_a"]["name"], "Team A");
        assert_eq!(json["team_a"]["tables"]["goals"]["rows"][0]["k"], 0);
        assert!(json["insights"]["goals"].as_f64().unwrap() > 0.0);
        assert!(json["generated_at"].is_string());
    }
}
