//! Command-line interface definitions for Lecturas del Día.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also be provided through an environment variable, which
//! is how the service is normally configured when deployed.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Lecturas del Día service.
///
/// # Examples
///
/// ```sh
/// # Serve the API on the default port (3000) with a local browser
/// lecturas_del_dia
///
/// # Use Browserless, falling back to a local browser
/// BROWSERLESS_TOKEN=... lecturas_del_dia --port 8080 serve
///
/// # One-shot fetch, JSON on stdout
/// lecturas_del_dia fetch --fecha 2025-12-03
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Browserless API token; without it a local browser is always used
    #[arg(long, env = "BROWSERLESS_TOKEN", hide_env_values = true)]
    pub browserless_token: Option<String>,

    /// Browserless websocket endpoint (the token is appended as a query parameter)
    #[arg(
        long,
        env = "BROWSERLESS_ENDPOINT",
        default_value = "wss://chrome.browserless.io"
    )]
    pub browserless_endpoint: String,

    /// Deployment environment; `production` switches logs to JSON
    #[arg(long, env = "APP_ENV", default_value = "development")]
    pub app_env: String,

    /// Base URL of the daily readings pages
    #[arg(
        long,
        env = "LECTURAS_BASE_URL",
        default_value = "https://www.vaticannews.va/es/evangelio-de-hoy"
    )]
    pub base_url: String,

    /// Chrome/Chromium binary for local launches (auto-detected when omitted)
    #[arg(long, env = "CHROME_EXECUTABLE")]
    pub chrome_executable: Option<PathBuf>,

    /// Address the HTTP API binds to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP API listens on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Fetch one date and print the JSON result
    Fetch {
        /// Date as YYYY-MM-DD; defaults to today
        #[arg(short, long)]
        fecha: Option<String>,
    },
}

impl Cli {
    /// The subcommand to run; `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    /// `host:port` for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_subcommand() {
        let cli = Cli::parse_from(["lecturas_del_dia", "fetch", "--fecha", "2025-12-03"]);

        assert_eq!(
            cli.command(),
            Command::Fetch {
                fecha: Some("2025-12-03".to_string())
            }
        );
    }

    #[test]
    fn test_cli_serve_port() {
        let cli = Cli::parse_from(["lecturas_del_dia", "--port", "8080", "--host", "127.0.0.1", "serve"]);

        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::parse_from(["lecturas_del_dia"]);

        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.base_url, "https://www.vaticannews.va/es/evangelio-de-hoy");
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::parse_from([
            "lecturas_del_dia",
            "--browserless-token",
            "abcdefghij0123456789VWXYZ",
            "--app-env",
            "production",
            "fetch",
        ]);

        assert_eq!(cli.browserless_token.as_deref(), Some("abcdefghij0123456789VWXYZ"));
        assert_eq!(cli.app_env, "production");
        assert_eq!(cli.command(), Command::Fetch { fecha: None });
    }
}
