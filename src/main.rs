// Main entry point - Parses arguments, loads settings and prints the dashboard
mod application;
mod domain;
mod error;
mod infrastructure;
mod presentation;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::{load_settings, DEFAULT_SETTINGS_FILE};
use crate::presentation::cli::Cli;
use crate::presentation::handlers::render_dashboard;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the dashboard
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = load_settings(DEFAULT_SETTINGS_FILE).context("failed to load settings")?;

    let output = render_dashboard(&cli, &settings)
        .with_context(|| format!("failed to generate dashboard for {}", cli.name))?;

    println!("{output}");

    Ok(())
}
