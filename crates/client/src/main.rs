//! Roster client binary.
//!
//! Composition root that assembles a file-backed [`Runtime`], logs the
//! configured identity in, and prints each team's compliance status and
//! export card.
//!
//! # Examples
//!
//! ```bash
//! ROSTER_IDENTITY=coach@example.com cargo run -p roster-client
//! ```

mod config;
mod logging;

use anyhow::Result;
use roster_core::{ComplianceReport, ExportCard, TeamStatus};
use roster_runtime::{FileRosterRepository, Runtime, RuntimeConfig, SessionHandle};

use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let client_config = ClientConfig::from_env();
    let runtime_config = RuntimeConfig::from_env();

    logging::setup_logging()?;

    tracing::info!("Starting roster client");
    tracing::info!("Identity: {}", client_config.identity);
    tracing::info!("Data dir: {}", client_config.data_dir.display());

    let repository = FileRosterRepository::new(&client_config.data_dir)?;
    let mut runtime = Runtime::builder()
        .config(runtime_config)
        .repository(repository)
        .build()?;

    let status = runtime.login(client_config.identity.clone()).await?;
    if status.load_failed {
        tracing::warn!("Stored roster could not be read; showing an empty roster");
    }

    print_roster(&runtime.handle()).await?;

    runtime.shutdown().await?;
    tracing::info!("Client shutdown complete");
    Ok(())
}

async fn print_roster(handle: &SessionHandle) -> Result<()> {
    let snapshot = handle.snapshot().await?;
    let unassigned = handle.unassigned_players().await?;
    println!(
        "{} players, {} teams, {} unassigned",
        snapshot.players.len(),
        snapshot.teams.len(),
        unassigned.len()
    );

    for (report, team) in handle.reports().await?.iter().zip(&snapshot.teams) {
        print_report(&team.name, report);
    }

    for card in handle.export_cards().await? {
        print_card(&card);
    }
    Ok(())
}

fn print_report(name: &str, report: &ComplianceReport) {
    let marker = match report.status() {
        TeamStatus::Complete => "ok",
        TeamStatus::Incomplete => "..",
        TeamStatus::Invalid => "!!",
    };
    println!(
        "[{marker}] {name}: {}/{} ({})",
        report.player_count,
        report.size,
        report.status()
    );
    for message in report.messages() {
        println!("       {message}");
    }
}

fn print_card(card: &ExportCard) {
    println!();
    println!("== {} ({}) ==", card.file_stem(), card.headline());
    for line in &card.lines {
        match &line.player {
            Some(player) => println!(
                "  {:>2}. {} - {} ({})",
                line.slot + 1,
                player.name,
                player.skill,
                player.gender
            ),
            None => println!("  {:>2}. (empty)", line.slot + 1),
        }
    }
}
