use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, warn};

mod config;
mod dashboard;
mod model;
mod report;

use config::{Config, OutputFormat};
use dashboard::AppState;
use model::{analyze, EventType};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    let input = config.match_input();

    if config.serve {
        let state = AppState {
            defaults: input,
            logo: load_logo(&config),
        };
        let app = dashboard::router(state);
        let addr: SocketAddr = config
            .dashboard_addr
            .parse()
            .with_context(|| format!("Invalid dashboard address {}", config.dashboard_addr))?;
        info!("Dashboard listening on http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
        return Ok(());
    }

    let analysis = analyze(&input)?;
    for event in EventType::ALL {
        info!(
            "{}: {} P(X>=1) {:.2}% vs {} {:.2}%",
            event,
            analysis.team_a.name,
            analysis.team_a.at_least_one[event],
            analysis.team_b.name,
            analysis.team_b.at_least_one[event]
        );
    }

    match config.format {
        OutputFormat::Text => print!("{}", report::text::render(&analysis)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Quiet => {}
    }

    if let Some(path) = &config.pdf {
        let logo = load_logo(&config);
        let pdf = report::document::render(&analysis, logo.as_deref())
            .context("Failed to render PDF report")?;
        std::fs::write(path, &pdf)
            .with_context(|| format!("Failed to write PDF report to {}", path.display()))?;
        info!("PDF report written to {} ({} bytes)", path.display(), pdf.len());
    }

    Ok(())
}

/// Read the optional report logo; a missing file only costs the logo.
fn load_logo(config: &Config) -> Option<Vec<u8>> {
    let path = config.logo.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Could not read logo {}: {}", path.display(), e);
            None
        }
    }
}
