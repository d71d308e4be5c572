//! # Lecturas del Día
//!
//! A small service that returns the daily Mass readings published by Vatican
//! News as JSON. The page is rendered client-side, so it is loaded in a
//! headless Chromium (remote Browserless when a token is configured, a local
//! browser otherwise) before the readings are extracted.
//!
//! ## Usage
//!
//! ```sh
//! lecturas_del_dia                            # HTTP API on :3000
//! lecturas_del_dia fetch --fecha 2025-12-03   # one-shot JSON on stdout
//! ```
//!
//! ## Architecture
//!
//! Each request runs the same pipeline:
//! 1. **Resolve**: validate the date and build the page URL
//! 2. **Acquire**: get a browser (remote with retries, then local fallback)
//! 3. **Fetch**: navigate and wait for the network to settle (30s budget)
//! 4. **Extract**: pull the season label, first reading and gospel from the HTML

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod browser;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod scrapers;
mod server;
mod utils;

use browser::chromium::ChromiumBackend;
use cli::{Cli, Command};
use config::Settings;
use pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let args = Cli::parse();
    let settings = Arc::new(Settings::from_cli(&args)?);

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());
    if settings.production {
        builder.json().init();
    } else {
        builder.init();
    }

    info!(
        production = settings.production,
        remote = settings.has_token(),
        "lecturas_del_dia starting up"
    );
    debug!(?settings, "Resolved settings");

    let backend = ChromiumBackend::new(settings.chrome_executable.clone());
    let pipeline = Pipeline::new(backend, Arc::clone(&settings));

    match args.command() {
        Command::Serve => {
            server::serve(&args.listen_addr(), Arc::new(pipeline)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch { fecha } => {
            let fecha = fecha.unwrap_or_else(utils::today);
            let outcome = pipeline.run(&fecha).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
