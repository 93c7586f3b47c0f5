use anyhow::{Context, Result};
use clap::Parser;
use sma_crossover::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.resolve()?;

    let default_level = if config.output.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    println!("SMA Crossover - Moving Average Backtester\n");

    let data_file = config.data_file()?;
    info!(path = %data_file.display(), ticker = %config.market.ticker, "loading market data");
    let prices = load_prices(data_file).with_context(|| {
        format!(
            "Could not load data for {} from {}",
            config.market.ticker,
            data_file.display()
        )
    })?;
    info!(
        days = prices.len(),
        first = %prices.first_date(),
        last = %prices.last_date(),
        "market data loaded"
    );

    match config.mode {
        Mode::Analyze => {
            run_analysis(&prices, &config)?;
        }
        Mode::Optimize => {
            run_optimization(&prices, &config)?;
        }
    }

    Ok(())
}
