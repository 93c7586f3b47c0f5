//! Moving-average crossover signal.

use indicators::moving_average;
use tracing::debug;

use crate::error::{BacktestError, Result};
use crate::models::{Position, PriceSeries, SignalSeries};

/// Compute both moving averages and the long/flat signal.
///
/// The signal at `i` is `Long` when the short average is strictly above the
/// long one, `Flat` otherwise, and `None` while either average is undefined.
/// `short_window >= long_window` is allowed and evaluated point-wise.
pub fn generate(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<SignalSeries> {
    check_window("short", short_window)?;
    check_window("long", long_window)?;

    let sma_short = moving_average(prices.closes(), short_window);
    let sma_long = moving_average(prices.closes(), long_window);
    let signal = positions(&sma_short, &sma_long);

    debug!(
        short_window,
        long_window,
        defined = signal.iter().filter(|s| s.is_some()).count(),
        "generated crossover signal"
    );

    Ok(SignalSeries {
        sma_short,
        sma_long,
        signal,
    })
}

/// Point-wise comparison of two aligned averages.
pub(crate) fn positions(short: &[Option<f64>], long: &[Option<f64>]) -> Vec<Option<Position>> {
    short
        .iter()
        .zip(long)
        .map(|pair| match pair {
            (Some(s), Some(l)) if s > l => Some(Position::Long),
            (Some(_), Some(_)) => Some(Position::Flat),
            _ => None,
        })
        .collect()
}

pub(crate) fn check_window(name: &'static str, window: usize) -> Result<()> {
    if window == 0 {
        return Err(BacktestError::ZeroWindow { name });
    }
    Ok(())
}
