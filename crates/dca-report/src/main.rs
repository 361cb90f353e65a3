//! Dollar-cost-averaging backtest over a CSV ticker list.
//!
//! For each ticker, simulates investing a fixed amount at every monthly
//! close from Jan 1 of the start year through today, then prints per-symbol
//! and aggregate performance.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backtest_engine::{run_dca, DcaConfig, DcaReport};
use watchlist_core::PricePoint;
use yahoo_client::YahooClient;

#[derive(Parser)]
#[command(name = "dca-report", about = "Monthly dollar-cost-averaging backtest", version)]
struct Cli {
    /// CSV file with a `Company` column of ticker symbols
    #[arg(short, long, default_value = "stocks.csv")]
    csv: PathBuf,

    /// Amount invested each month
    #[arg(short, long, default_value = "25")]
    monthly: Decimal,

    /// Contributions start at Jan 1 of this year
    #[arg(short, long, default_value_t = 2020)]
    year: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let symbols = load_symbols(&cli.csv)?;
    if symbols.is_empty() {
        anyhow::bail!("no ticker symbols found in {}", cli.csv.display());
    }

    let config = DcaConfig {
        monthly_contribution: cli.monthly,
        start_year: cli.year,
    };

    let client = YahooClient::new();
    let start = Utc
        .with_ymd_and_hms(config.start_year, 1, 1, 0, 0, 0)
        .single()
        .context("invalid start year")?;
    let today = Utc::now();

    let mut historical_data: HashMap<String, Vec<PricePoint>> = HashMap::new();
    for symbol in &symbols {
        let series = match client
            .get_history_between(symbol, start, today, "1mo")
            .await
        {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "history fetch failed");
                Vec::new()
            }
        };
        historical_data.insert(symbol.clone(), series);
    }

    let report = run_dca(&historical_data, &config);
    print_report(&report, &config, today.format("%Y-%m-%d").to_string());

    Ok(())
}

/// Unique uppercased symbols from the `Company` column, sorted.
fn load_symbols(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h == "Company")
        .context("CSV has no `Company` column")?;

    let mut symbols = BTreeSet::new();
    for record in reader.records() {
        let record = record?;
        if let Some(symbol) = record.get(column) {
            let symbol = symbol.trim().to_uppercase();
            if !symbol.is_empty() {
                symbols.insert(symbol);
            }
        }
    }

    Ok(symbols.into_iter().collect())
}

fn print_report(report: &DcaReport, config: &DcaConfig, as_of: String) {
    for result in &report.symbols {
        println!(
            "--- {} monthly investment performance (from {}) ---",
            result.symbol, config.start_year
        );
        println!("Monthly investment: ${}", config.monthly_contribution);
        println!("Total invested: ${:.2}", result.invested);
        println!("Total shares accumulated: {:.4}", result.shares);
        println!("Current value: ${:.2}", result.current_value);
        println!(
            "Gain/loss: ${:.2} ({:.2}%)",
            result.gain, result.return_pct
        );
        println!();
    }

    for symbol in &report.skipped {
        println!("{}: no data available for this period, skipped.", symbol);
    }

    println!("--- Overall portfolio value as of {} ---", as_of);
    println!("Total invested value: ${:.2}", report.totals.invested);
    println!("Total current value: ${:.2}", report.totals.current_value);
    println!("Total gain/loss: ${:.2}", report.totals.gain);
    println!("Total return (%): {:.2}%", report.totals.return_pct);
    println!("Total number of stocks analyzed: {}", report.symbols.len());
}
