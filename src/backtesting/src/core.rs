use indicators::crossovers;
use tracing::debug;

use crate::error::Result;
use crate::metrics::summarize;
use crate::models::{BacktestResult, PriceSeries, WindowPair};
use crate::{returns, signal};

/// Backtest the moving-average crossover rule for one window pair.
///
/// Runs signal generation, return computation and risk metrics in sequence.
/// The input prices are only read, so repeated runs with different windows on
/// the same series are independent and identical inputs give identical
/// results. `short_window >= long_window` is evaluated as-is; filtering such
/// pairs is left to the optimizer.
///
/// # Arguments
/// * `prices` - Daily closes, oldest first
/// * `short_window` - Lookback of the fast moving average (>= 1)
/// * `long_window` - Lookback of the slow moving average (>= 1)
pub fn run_backtest(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<BacktestResult> {
    let signals = signal::generate(prices, short_window, long_window)?;
    let returns = returns::compute(prices, &signals.signal)?;

    let strategy_risk = summarize(&returns.strategy);
    let market_risk = summarize(&returns.market);
    let crossovers = crossovers(&signals.sma_short, &signals.sma_long);

    debug!(
        short_window,
        long_window,
        strategy_sharpe = strategy_risk.sharpe,
        strategy_max_dd = strategy_risk.max_drawdown,
        crossings = crossovers.len(),
        "backtest complete"
    );

    Ok(BacktestResult {
        windows: WindowPair::new(short_window, long_window),
        dates: prices.dates().to_vec(),
        closes: prices.closes().to_vec(),
        signals,
        returns,
        crossovers,
        strategy_risk,
        market_risk,
    })
}
