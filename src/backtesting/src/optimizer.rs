//! Brute-force grid search over moving-average window pairs.
//!
//! Every cell of the grid is a pure function of the price series and its own
//! window pair. Cells are evaluated on the rayon pool and written back in grid
//! order, so the surface does not depend on scheduling.

use std::collections::BTreeSet;

use indicators::moving_average;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{total_return, PriceSeries, WindowPair};
use crate::returns::{cumulative, market_returns, strategy_returns};
use crate::signal::{check_window, positions};

/// Total strategy return for each (short, long) pair of a sweep.
///
/// Rows follow the short windows and columns the long windows, both ascending.
/// A cell is `None` when the pair is not a valid crossover rule
/// (`short >= long`) or the history is shorter than the long window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationSurface {
    short_windows: Vec<usize>,
    long_windows: Vec<usize>,
    cells: Vec<Option<f64>>,
}

impl OptimizationSurface {
    pub fn short_windows(&self) -> &[usize] {
        &self.short_windows
    }

    pub fn long_windows(&self) -> &[usize] {
        &self.long_windows
    }

    /// True if the pair is part of the grid, whether or not it has a value.
    pub fn contains(&self, short: usize, long: usize) -> bool {
        self.position(short, long).is_some()
    }

    /// Total return of the pair, `None` if missing or outside the grid.
    pub fn get(&self, short: usize, long: usize) -> Option<f64> {
        self.position(short, long).and_then(|idx| self.cells[idx])
    }

    /// One row per short window, cells ordered by long window.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Option<f64>])> + '_ {
        let width = self.long_windows.len().max(1);
        self.short_windows
            .iter()
            .copied()
            .zip(self.cells.chunks(width))
    }

    /// Every cell in grid order.
    pub fn cells(&self) -> impl Iterator<Item = (WindowPair, Option<f64>)> + '_ {
        grid(&self.short_windows, &self.long_windows)
            .into_iter()
            .zip(self.cells.iter().copied())
    }

    /// Number of cells holding a value.
    pub fn evaluated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Pair with the highest total return. Ties keep the first pair in grid order.
    pub fn best(&self) -> Option<(WindowPair, f64)> {
        self.cells()
            .filter_map(|(pair, value)| value.map(|v| (pair, v)))
            .fold(None, |best: Option<(WindowPair, f64)>, (pair, v)| match best {
                Some((_, top)) if top >= v => best,
                _ => Some((pair, v)),
            })
    }

    fn position(&self, short: usize, long: usize) -> Option<usize> {
        let row = self.short_windows.binary_search(&short).ok()?;
        let col = self.long_windows.binary_search(&long).ok()?;
        Some(row * self.long_windows.len() + col)
    }
}

/// Sweep every (short, long) combination of the candidate windows.
///
/// Candidates are treated as ordered sets: they are sorted and duplicates
/// collapsed. Every candidate must be at least 1.
pub fn sweep(
    prices: &PriceSeries,
    short_candidates: &[usize],
    long_candidates: &[usize],
) -> Result<OptimizationSurface> {
    let short_windows = ordered_set("short", short_candidates)?;
    let long_windows = ordered_set("long", long_candidates)?;

    // Read-only tables shared by all cells
    let market = market_returns(prices.closes());
    let averages: FxHashMap<usize, Vec<Option<f64>>> = short_windows
        .iter()
        .chain(&long_windows)
        .copied()
        .filter(|&w| w <= prices.len())
        .collect::<BTreeSet<_>>()
        .into_par_iter()
        .map(|w| (w, moving_average(prices.closes(), w)))
        .collect();

    debug!(
        windows = averages.len(),
        days = prices.len(),
        "precomputed moving averages"
    );

    let pairs = grid(&short_windows, &long_windows);
    let cells: Vec<Option<f64>> = pairs
        .par_iter()
        .map(|pair| {
            if !is_evaluable(*pair, prices.len()) {
                return None;
            }
            match (averages.get(&pair.short), averages.get(&pair.long)) {
                (Some(short), Some(long)) => Some(cell_return(short, long, &market)),
                _ => None,
            }
        })
        .collect();

    let surface = OptimizationSurface {
        short_windows,
        long_windows,
        cells,
    };

    info!(
        cells = pairs.len(),
        evaluated = surface.evaluated(),
        "parameter sweep complete"
    );

    Ok(surface)
}

/// Evaluate a single grid cell on its own.
///
/// Gives the same value the sweep stores for this pair, and the same value as
/// the total strategy return of a full backtest.
pub fn evaluate_cell(prices: &PriceSeries, short: usize, long: usize) -> Result<Option<f64>> {
    check_window("short", short)?;
    check_window("long", long)?;

    let pair = WindowPair::new(short, long);
    if !is_evaluable(pair, prices.len()) {
        return Ok(None);
    }

    let market = market_returns(prices.closes());
    let sma_short = moving_average(prices.closes(), short);
    let sma_long = moving_average(prices.closes(), long);
    Ok(Some(cell_return(&sma_short, &sma_long, &market)))
}

fn is_evaluable(pair: WindowPair, days: usize) -> bool {
    pair.is_valid() && days >= pair.short.max(pair.long)
}

/// Reduced pipeline: only the final compounded strategy return is kept.
fn cell_return(short: &[Option<f64>], long: &[Option<f64>], market: &[Option<f64>]) -> f64 {
    let strategy = strategy_returns(&positions(short, long), market);
    total_return(&cumulative(&strategy))
}

fn ordered_set(name: &'static str, candidates: &[usize]) -> Result<Vec<usize>> {
    for &window in candidates {
        check_window(name, window)?;
    }
    Ok(candidates
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect())
}

fn grid(short_windows: &[usize], long_windows: &[usize]) -> Vec<WindowPair> {
    short_windows
        .iter()
        .flat_map(|&s| long_windows.iter().map(move |&l| WindowPair::new(s, l)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::run_backtest;
    use crate::error::BacktestError;
    use chrono::NaiveDate;

    fn wave(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + (i as f64 / 15.0).sin() * 10.0 + i as f64 * 0.02)
            .collect();
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(), &closes).unwrap()
    }

    #[test]
    fn test_invalid_pairs_are_missing() {
        let prices = wave(200);
        let surface = sweep(&prices, &[5, 10, 20], &[5, 10, 30]).unwrap();

        assert!(surface.contains(10, 10));
        assert_eq!(surface.get(10, 10), None);
        assert_eq!(surface.get(10, 5), None);
        assert_eq!(surface.get(20, 10), None);
        assert!(surface.get(5, 10).is_some());
        assert!(surface.get(20, 30).is_some());
        // 5/10, 5/30, 10/30, 20/30
        assert_eq!(surface.evaluated(), 4);
    }

    #[test]
    fn test_missing_cell_after_valid_cell_stays_missing() {
        // (10, 20) is valid and is evaluated right before the invalid (30, 20)
        let prices = wave(120);
        let surface = sweep(&prices, &[10, 30], &[20]).unwrap();
        assert!(surface.get(10, 20).is_some());
        assert!(surface.contains(30, 20));
        assert_eq!(surface.get(30, 20), None);
    }

    #[test]
    fn test_short_history_is_missing() {
        let prices = wave(50);
        let surface = sweep(&prices, &[10], &[40, 50, 60]).unwrap();
        assert!(surface.get(10, 40).is_some());
        assert!(surface.get(10, 50).is_some());
        assert_eq!(surface.get(10, 60), None);
    }

    #[test]
    fn test_cells_match_full_backtest() {
        let prices = wave(400);
        let surface = sweep(&prices, &[10, 20], &[50, 100]).unwrap();

        for (pair, value) in surface.cells() {
            let full = run_backtest(&prices, pair.short, pair.long).unwrap();
            assert_eq!(value, Some(full.total_strategy_return()));
            assert_eq!(
                evaluate_cell(&prices, pair.short, pair.long).unwrap(),
                value
            );
        }
    }

    #[test]
    fn test_candidates_are_ordered_sets() {
        let prices = wave(100);
        let surface = sweep(&prices, &[20, 5, 20], &[60, 30]).unwrap();
        assert_eq!(surface.short_windows(), &[5, 20]);
        assert_eq!(surface.long_windows(), &[30, 60]);

        let rows: Vec<usize> = surface.rows().map(|(s, _)| s).collect();
        assert_eq!(rows, vec![5, 20]);
        assert!(surface.rows().all(|(_, row)| row.len() == 2));
    }

    #[test]
    fn test_zero_candidate_rejected() {
        let prices = wave(10);
        assert_eq!(
            sweep(&prices, &[0, 2], &[5]).unwrap_err(),
            BacktestError::ZeroWindow { name: "short" }
        );
        assert_eq!(
            evaluate_cell(&prices, 2, 0).unwrap_err(),
            BacktestError::ZeroWindow { name: "long" }
        );
    }

    #[test]
    fn test_best_pair() {
        let prices = wave(300);
        let surface = sweep(&prices, &[5, 10, 15], &[30, 60]).unwrap();
        let (pair, value) = surface.best().unwrap();

        for (_, other) in surface.cells() {
            if let Some(other) = other {
                assert!(value >= other);
            }
        }
        assert_eq!(surface.get(pair.short, pair.long), Some(value));
    }

    #[test]
    fn test_empty_grid() {
        let prices = wave(10);
        let surface = sweep(&prices, &[], &[5]).unwrap();
        assert_eq!(surface.cells().count(), 0);
        assert_eq!(surface.best(), None);
    }
}
