use anyhow::{Context, Result};
use bulk_bot_core::{markets, ConfigLoader, ContractType, TradeRecord, TradeRequest};
use bulk_bot_orchestrator::{spawn_bot, BotHandle, RunSpec};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::sync::broadcast;

#[derive(Parser)]
#[command(name = "bulk-bot")]
#[command(about = "Bulk binary-option batch trader for Deriv", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire batches of trades and stream the results
    Run {
        /// API token (falls back to the DERIV_API_TOKEN environment variable)
        #[arg(long, env = "DERIV_API_TOKEN", hide_env_values = true)]
        token: String,
        /// Market symbol or label (see `bulk-bot markets`); unknown symbols
        /// are passed through as overrides
        #[arg(long, default_value = "R_10")]
        market: String,
        /// Contract type: digitmatch, digitdiff, digitover, digitunder,
        /// digiteven, digitodd, rise, fall
        #[arg(long, default_value = "digitmatch")]
        contract_type: ContractType,
        /// Stake per trade
        #[arg(long, default_value = "1.0")]
        stake: Decimal,
        /// Barrier digit 0-9 (digit-threshold contract types only)
        #[arg(long, default_value_t = 5)]
        digit: u8,
        /// Currency for stake and payout
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Trades per batch
        #[arg(long, default_value_t = 10)]
        batch_size: u32,
        /// Keep firing batches until Ctrl-C
        #[arg(long)]
        repeat: bool,
        /// Config profile (overlays config/Config.{profile}.toml)
        #[arg(long)]
        profile: Option<String>,
    },
    /// List the known volatility markets
    Markets,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            token,
            market,
            contract_type,
            stake,
            digit,
            currency,
            batch_size,
            repeat,
            profile,
        } => {
            let request = build_request(&market, contract_type, stake, digit, currency);
            run(token, request, batch_size, repeat, profile.as_deref()).await?;
        }
        Commands::Markets => list_markets(),
    }
    Ok(())
}

fn build_request(
    market: &str,
    contract_type: ContractType,
    stake: Decimal,
    digit: u8,
    currency: String,
) -> TradeRequest {
    let symbol = match markets::resolve(market) {
        Some(symbol) => symbol.to_string(),
        None => {
            tracing::warn!(%market, "unknown market, using it as a symbol override");
            market.to_string()
        }
    };
    TradeRequest {
        symbol,
        contract_type,
        stake,
        barrier_digit: contract_type.requires_barrier().then_some(digit),
        currency,
    }
}

async fn run(
    token: String,
    request: TradeRequest,
    batch_size: u32,
    repeat: bool,
    profile: Option<&str>,
) -> Result<()> {
    let config = match profile {
        Some(profile) => ConfigLoader::load_with_profile(profile),
        None => ConfigLoader::load(),
    }
    .context("loading configuration")?;

    let handle = spawn_bot(config, SecretString::from(token));
    let mut records = handle.subscribe();
    handle
        .start(RunSpec {
            request,
            batch_size,
            repeat,
        })
        .await?;

    stream_records(&handle, &mut records).await?;
    print_summary(&handle);
    handle.shutdown().await?;
    Ok(())
}

/// Renders records as they arrive until the runner emits its stopped marker.
/// Ctrl-C maps to a cooperative stop: the in-flight batch finishes first.
async fn stream_records(
    handle: &BotHandle,
    records: &mut broadcast::Receiver<TradeRecord>,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stop requested, letting the current batch finish");
                handle.stop().await?;
            }
            record = records.recv() => match record {
                Ok(TradeRecord::RunnerStopped { .. }) => break,
                Ok(record) => print_record(&record),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "renderer lagged behind the record stream");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

fn print_record(record: &TradeRecord) {
    match record {
        TradeRecord::Outcome(outcome) => {
            let detail = outcome
                .error
                .as_deref()
                .map(|err| format!("  [{err}]"))
                .unwrap_or_default();
            println!(
                "#{:<4} {:<13} stake {:>8}  payout {:>8}  p/l {:>8}  entry {:<10} exit {:<10}{detail}",
                outcome.sequence,
                outcome.status.to_string(),
                outcome.stake,
                outcome.payout,
                outcome.profit_loss,
                outcome.entry_tick.as_deref().unwrap_or("-"),
                outcome.exit_tick.as_deref().unwrap_or("-"),
            );
        }
        TradeRecord::BatchStarted { batch_no, at } => {
            println!("--- batch {batch_no} started @ {}", at.format("%H:%M:%S"));
        }
        TradeRecord::BatchCompleted { batch_no, at } => {
            println!("--- batch {batch_no} completed @ {}", at.format("%H:%M:%S"));
        }
        TradeRecord::RunnerStopped { at } => {
            println!("--- stopped @ {}", at.format("%H:%M:%S"));
        }
    }
}

fn print_summary(handle: &BotHandle) {
    let stats = handle.stats();
    println!();
    println!("session summary");
    println!("  total stake   {:>10}", stats.stake_total);
    println!("  total payout  {:>10}", stats.payout_total);
    println!("  wins          {:>10}", stats.wins);
    println!("  losses        {:>10}", stats.losses);
    println!("  profit/loss   {:>10}", stats.profit);
}

fn list_markets() {
    for (label, symbol) in markets::VOLATILITY_MARKETS {
        println!("{symbol:<10} {label}");
    }
}
