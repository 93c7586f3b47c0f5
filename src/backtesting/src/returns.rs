//! Daily and compounded returns for the market and the strategy.

use tracing::debug;

use crate::error::{BacktestError, Result};
use crate::models::{Position, PriceSeries, ReturnSeries};

/// Turn prices and a position signal into return series.
///
/// The position held over day `i` is the one decided at the close of day
/// `i - 1`, so `strategy[i] = exposure(signal[i - 1]) * market[i]`. During the
/// moving-average warm-up the strategy is out of the market and earns 0.0; only
/// day 0 has no strategy return.
pub fn compute(prices: &PriceSeries, signal: &[Option<Position>]) -> Result<ReturnSeries> {
    if signal.len() != prices.len() {
        return Err(BacktestError::LengthMismatch {
            expected: prices.len(),
            actual: signal.len(),
        });
    }

    let market = market_returns(prices.closes());
    let strategy = strategy_returns(signal, &market);
    let cumulative_market = cumulative(&market);
    let cumulative_strategy = cumulative(&strategy);

    debug!(
        days = prices.len(),
        invested_days = signal.iter().filter(|s| **s == Some(Position::Long)).count(),
        "computed returns"
    );

    Ok(ReturnSeries {
        market,
        strategy,
        cumulative_market,
        cumulative_strategy,
    })
}

/// Simple close-to-close returns; the first day has none.
pub fn market_returns(closes: &[f64]) -> Vec<Option<f64>> {
    std::iter::once(None)
        .chain(closes.windows(2).map(|w| Some(w[1] / w[0] - 1.0)))
        .take(closes.len())
        .collect()
}

/// Apply yesterday's position to today's market return.
///
/// An undefined position counts as flat.
pub fn strategy_returns(signal: &[Option<Position>], market: &[Option<f64>]) -> Vec<Option<f64>> {
    let n = signal.len().min(market.len());
    (0..n)
        .map(|i| {
            if i == 0 {
                return None;
            }
            let exposure = signal[i - 1].map_or(0.0, Position::exposure);
            market[i].map(|ret| exposure * ret)
        })
        .collect()
}

/// Running product of `1 + r`, anchored at 1.0; undefined days leave it unchanged.
pub fn cumulative(returns: &[Option<f64>]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |growth, r| {
            if let Some(r) = r {
                *growth *= 1.0 + r;
            }
            Some(*growth)
        })
        .collect()
}
