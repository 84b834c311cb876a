use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finsight_agents::{AgentError, FinanceAgent, UseCase};
use finsight_models::ReplyError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "finsight", about = "LLM-assisted financial analysis")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/finsight.toml")]
    config: String,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a PDF financial document
    Document {
        file: String,
    },
    /// Predict the outlook for a stock ticker
    Stock {
        ticker: String,
    },
    /// Categorize an expense receipt (stdin unless --input is given)
    Expense {
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Assess fraud risk in transaction descriptions (stdin unless --input is given)
    Fraud {
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn read_text(input: Option<&str>) -> Result<String> {
    match input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read input: {path}"))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

async fn run_use_case(agent: &FinanceAgent, command: Command) -> Result<serde_json::Value> {
    let (use_case, reply) = match command {
        Command::Document { file } => {
            let bytes =
                std::fs::read(&file).with_context(|| format!("Failed to read document: {file}"))?;
            let value = match agent.analyze_document(&file, &bytes).await {
                Ok(report) => serde_json::to_value(report)?,
                Err(e) => {
                    if !matches!(e, AgentError::UnsupportedFormat { .. }) {
                        warn!(error = %e, "Document analysis failed");
                    }
                    serde_json::json!({ "error": e.to_string() })
                }
            };
            return Ok(value);
        }
        Command::Stock { ticker } => (UseCase::StockOutlook, agent.stock_outlook(&ticker).await),
        Command::Expense { input } => {
            let receipt = read_text(input.as_deref())?;
            (
                UseCase::ExpenseCategorization,
                agent.categorize_expense(&receipt).await,
            )
        }
        Command::Fraud { input } => {
            let transactions = read_text(input.as_deref())?;
            (
                UseCase::FraudRisk,
                agent.assess_fraud_risk(&transactions).await,
            )
        }
    };

    Ok(match reply {
        Ok(value) => {
            if let Some(line) = finsight::summarize(use_case, &value) {
                eprintln!("{line}");
            }
            value
        }
        Err(ReplyError { kind, error }) => {
            info!(use_case = use_case.name(), ?kind, "Request failed");
            serde_json::json!({ "error": error })
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = finsight::load_config(&cli.config)?;
    let agent = finsight::build_agent(&config).context("Failed to build agent")?;

    let cancel = agent.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request");
            cancel.cancel();
        }
    });

    let output = run_use_case(&agent, cli.command).await?;
    println!("{}", render(&output, cli.pretty)?);
    eprintln!("{}", finsight::DISCLAIMER);

    Ok(())
}
