//! Midnight Walk - a short narrative walk where the mask you wear decides the ending
//!
//! This binary loads settings and a level definition, wires the narrative
//! core to its presentation collaborators, and plays a scripted walk.

mod demo;
mod level_file;
mod settings;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use demo::DemoWalk;
use settings::GameSettings;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Midnight Walk...");

    let settings = GameSettings::load();
    if std::env::args().any(|arg| arg == "--write-settings") {
        settings.save().context("Failed to save settings")?;
    }

    let definition = level_file::load(settings.demo.level_path.as_deref())?;
    let mut level = demo::build_level(&settings, definition)?;

    let ending = &settings.presentation.ending;
    let ending_seconds = ending.fade_to_black + ending.text_delay + ending.text_fade;
    let report = DemoWalk::new(&mut level, &settings.demo).run(ending_seconds)?;

    for (npc, mask) in &report.choices {
        info!("  {} saw {}", npc, mask);
    }
    if let Some(item) = &report.held_item {
        info!("  Carried home: {}", item);
    }
    match report.ending {
        Some(ending) => info!(
            "Walk finished with the {} ending after {} frames (health {:.0})",
            ending, report.frames, report.health
        ),
        None => info!("Walk finished without an ending after {} frames", report.frames),
    }
    Ok(())
}
