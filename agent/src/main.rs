use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dealflow::{AdvisorError, Config, DealAdvisor, DealParameters};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "dealflow", about = "AI real estate deal analysis and creative financing advisor")]
struct Cli {
    /// Load config from a specific .env file
    #[arg(long, global = true)]
    config_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full analysis: recommendation, financing, risk, cash flow, structures, next steps
    Analyze {
        /// Deal parameters as JSON
        #[arg(long)]
        deal: PathBuf,
    },
    /// Creative financing options only
    Financing {
        #[arg(long)]
        deal: PathBuf,
    },
    /// Step-by-step deal structuring advice
    Structuring {
        #[arg(long)]
        deal: PathBuf,
    },
    /// Send a minimal request to check the key and endpoint
    TestConnection,
    /// Show whether a key is configured, without calling the API
    Status,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Status<'a> {
    configured: bool,
    model: &'a str,
    api_base: &'a str,
    structured_output: bool,
    production: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = Config::from_env_file(cli.config_file.as_deref())?;

    // stdout is reserved for JSON results
    let default_filter = if cfg.production { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cfg.production)
        .init();

    let advisor = DealAdvisor::from_config(&cfg)?;
    info!(
        "Gemini model {} | structured output: {} | key: {}",
        cfg.gemini_model,
        cfg.structured_output,
        if advisor.is_configured() { "set" } else { "NOT SET" }
    );

    let outcome = match cli.command {
        Command::Analyze { deal } => {
            let deal = read_deal(&deal)?;
            print_json(advisor.analyze_deal(&deal).await)
        }
        Command::Financing { deal } => {
            let deal = read_deal(&deal)?;
            print_json(advisor.financing_options(&deal).await)
        }
        Command::Structuring { deal } => {
            let deal = read_deal(&deal)?;
            print_json(advisor.structuring_advice(&deal).await)
        }
        Command::TestConnection => print_json(advisor.test_connection().await),
        Command::Status => print_json(Ok(Status {
            configured: advisor.is_configured(),
            model: &cfg.gemini_model,
            api_base: &cfg.gemini_api_base,
            structured_output: cfg.structured_output,
            production: cfg.production,
        })),
    };

    if let Err(message) = outcome? {
        error!("{message}");
        eprintln!("error: {message}");
        std::process::exit(1);
    }
    Ok(())
}

fn read_deal(path: &Path) -> Result<DealParameters> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Read deal file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse deal file {}", path.display()))
}

/// Pretty JSON on stdout. The inner error is the advisor's user-facing failure.
fn print_json<T: Serialize>(
    result: dealflow::Result<T>,
) -> Result<std::result::Result<(), AdvisorError>> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).context("Serialize result")?);
            Ok(Ok(()))
        }
        Err(e) => Ok(Err(e)),
    }
}
