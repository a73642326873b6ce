//! CityScout CLI: ask about a city, get a summary, a 7-day forecast, and photos.
//!
//! Loads `.env` from the working directory so API keys can live next to the
//! project instead of the shell profile.

mod commands;
mod report;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }
    commands::run(cli).await
}
