use chrono::NaiveDate;
use indicators::Cross;
use serde::Serialize;

use crate::error::{BacktestError, Result};

/// Ordered daily closing prices.
///
/// Always holds at least one point, with strictly increasing dates and
/// positive, finite closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from `(date, close)` pairs, oldest first.
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if points.is_empty() {
            return Err(BacktestError::EmptyPriceSeries);
        }

        let mut dates = Vec::with_capacity(points.len());
        let mut closes = Vec::with_capacity(points.len());

        for (index, (date, close)) in points.into_iter().enumerate() {
            if !close.is_finite() || close <= 0.0 {
                return Err(BacktestError::InvalidClose { index, date, close });
            }
            if let Some(&previous) = dates.last() {
                if date <= previous {
                    return Err(BacktestError::UnorderedDates {
                        index,
                        date,
                        previous,
                    });
                }
            }
            dates.push(date);
            closes.push(close);
        }

        Ok(Self { dates, closes })
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        Self::new(start.iter_days().zip(closes.iter().copied()).collect())
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Never true for a constructed series; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }
}

/// A (short, long) pair of moving-average windows.
///
/// Pairs with `short >= long` are representable; they simply never make a
/// meaningful crossover rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowPair {
    pub short: usize,
    pub long: usize,
}

impl WindowPair {
    pub fn new(short: usize, long: usize) -> Self {
        Self { short, long }
    }

    pub fn is_valid(&self) -> bool {
        self.short < self.long
    }

    /// Display name used in reports: the classic 50/200 pair is the Golden Cross.
    pub fn strategy_name(&self) -> String {
        if self.short == 50 && self.long == 200 {
            "Golden Cross".to_string()
        } else {
            format!("SMA {}/{}", self.short, self.long)
        }
    }
}

/// Binary market exposure decided at a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Position {
    Flat,
    Long,
}

impl Position {
    /// Fraction of the market return captured while holding this position.
    pub fn exposure(self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Position::Flat => 0,
            Position::Long => 1,
        }
    }
}

/// Moving averages and the position signal derived from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSeries {
    pub sma_short: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    /// `None` wherever either average is still warming up.
    pub signal: Vec<Option<Position>>,
}

/// Daily and compounded returns of the market and the strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    pub market: Vec<Option<f64>>,
    pub strategy: Vec<Option<f64>>,
    pub cumulative_market: Vec<f64>,
    pub cumulative_strategy: Vec<f64>,
}

/// Risk-adjusted summary of one return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSummary {
    /// Annualized Sharpe ratio, zero for degenerate series.
    pub sharpe: f64,
    /// Worst peak-to-trough decline as a fraction, always <= 0.
    pub max_drawdown: f64,
}

/// Everything produced by one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub windows: WindowPair,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
    pub signals: SignalSeries,
    pub returns: ReturnSeries,
    pub crossovers: Vec<Cross>,
    pub strategy_risk: RiskSummary,
    pub market_risk: RiskSummary,
}

impl BacktestResult {
    pub fn total_strategy_return(&self) -> f64 {
        total_return(&self.returns.cumulative_strategy)
    }

    pub fn total_market_return(&self) -> f64 {
        total_return(&self.returns.cumulative_market)
    }

    pub fn strategy_name(&self) -> String {
        self.windows.strategy_name()
    }
}

/// Total return implied by a cumulative series anchored at 1.0.
pub(crate) fn total_return(cumulative: &[f64]) -> f64 {
    cumulative.last().copied().unwrap_or(1.0) - 1.0
}
