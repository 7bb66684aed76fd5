use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::model::{MatchInput, PerEvent, TeamInput};

/// Poisson probability tables for shots, corners, cards and goals
#[derive(Parser, Debug, Clone)]
#[command(name = "golpro", version, about)]
pub struct Config {
    /// Team A display name
    #[arg(long, env = "TEAM_A", default_value = "Team A")]
    pub team_a: String,

    /// Number of matches Team A's means were computed from (display only)
    #[arg(long, env = "MATCHES_A", default_value = "20")]
    pub matches_a: u32,

    /// Team A mean shots per match
    #[arg(long, env = "SHOTS_A", default_value = "13.4")]
    pub shots_a: f64,

    /// Team A mean corners per match
    #[arg(long, env = "CORNERS_A", default_value = "6.2")]
    pub corners_a: f64,

    /// Team A mean cards per match
    #[arg(long, env = "CARDS_A", default_value = "2.3")]
    pub cards_a: f64,

    /// Team A mean goals per match
    #[arg(long, env = "GOALS_A", default_value = "1.8")]
    pub goals_a: f64,

    /// Team B display name
    #[arg(long, env = "TEAM_B", default_value = "Team B")]
    pub team_b: String,

    /// Number of matches Team B's means were computed from (display only)
    #[arg(long, env = "MATCHES_B", default_value = "18")]
    pub matches_b: u32,

    /// Team B mean shots per match
    #[arg(long, env = "SHOTS_B", default_value = "12.9")]
    pub shots_b: f64,

    /// Team B mean corners per match
    #[arg(long, env = "CORNERS_B", default_value = "5.8")]
    pub corners_b: f64,

    /// Team B mean cards per match
    #[arg(long, env = "CARDS_B", default_value = "2.0")]
    pub cards_b: f64,

    /// Team B mean goals per match
    #[arg(long, env = "GOALS_B", default_value = "1.5")]
    pub goals_b: f64,

    /// Format of the analysis printed to stdout
    #[arg(long, env = "OUTPUT_FORMAT", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write a PDF report to this path
    #[arg(long, env = "PDF_PATH")]
    pub pdf: Option<PathBuf>,

    /// PNG or JPEG logo shown in the PDF report header
    #[arg(long, env = "LOGO_PATH")]
    pub logo: Option<PathBuf>,

    /// Serve the interactive dashboard instead of printing once
    #[arg(long, env = "SERVE", default_value = "false")]
    pub serve: bool,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "127.0.0.1:8080")]
    pub dashboard_addr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Text,
    /// The full analysis as JSON
    Json,
    /// Print nothing (useful with --pdf)
    Quiet,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.match_input().validate()?;
        if self.serve && self.dashboard_addr.trim().is_empty() {
            anyhow::bail!("dashboard_addr must not be empty when --serve is set");
        }
        Ok(())
    }

    /// Both teams' inputs, with blank names replaced by defaults.
    pub fn match_input(&self) -> MatchInput {
        MatchInput {
            team_a: TeamInput {
                name: self.team_a.clone(),
                sample_size: self.matches_a,
                rates: PerEvent {
                    shots: self.shots_a,
                    corners: self.corners_a,
                    cards: self.cards_a,
                    goals: self.goals_a,
                },
            }
            .normalized("Team A"),
            team_b: TeamInput {
                name: self.team_b.clone(),
                sample_size: self.matches_b,
                rates: PerEvent {
                    shots: self.shots_b,
                    corners: self.corners_b,
                    cards: self.cards_b,
                    goals: self.goals_b,
                },
            }
            .normalized("Team B"),
        }
    }
}
