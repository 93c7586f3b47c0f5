use anyhow::Result;
use backtesting::report::{
    generate_json_report, generate_text_report, summary_table, write_series_csv,
};
use backtesting::{run_backtest, BacktestResult, PriceSeries};
use tracing::{info, warn};

use crate::config::Config;

/// Backtest the configured window pair, print the summary and write reports.
pub fn run_analysis(prices: &PriceSeries, config: &Config) -> Result<BacktestResult> {
    let short = config.analysis.short_window;
    let long = config.analysis.long_window;
    let ticker = &config.market.ticker;

    if short >= long {
        warn!(short, long, "short window is not below long window, signal will be degenerate");
    }
    if prices.len() < long {
        warn!(
            days = prices.len(),
            long, "history shorter than the long window, no position will be taken"
        );
    }

    info!(%ticker, short, long, days = prices.len(), "running backtest");
    let result = run_backtest(prices, short, long)?;

    println!("\n{} - {}", ticker, result.strategy_name());
    println!("{} to {}\n", prices.first_date(), prices.last_date());
    print!("{}", summary_table(&result));
    println!("Crossovers: {}", result.crossovers.len());

    if config.output.write_reports {
        let dir = &config.output.output_dir;
        let stem = format!("{}_{}_{}", ticker, short, long);

        write_series_csv(&result, dir.join(format!("{}_series.csv", stem)))?;
        generate_json_report(&result, dir.join(format!("{}_report.json", stem)))?;
        generate_text_report(&result, dir.join(format!("{}_report.txt", stem)))?;
        info!(dir = %dir.display(), "backtest reports written");
    }

    Ok(result)
}
