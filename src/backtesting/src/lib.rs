//! Moving-average crossover backtesting engine.
//!
//! - `signal` - rolling averages and the long/flat signal
//! - `returns` - lagged strategy returns and compounded growth
//! - `metrics` - Sharpe ratio and maximum drawdown
//! - `core` - one backtest for one window pair
//! - `optimizer` - grid search over window pairs
//! - `report` - tables, CSV and JSON output

pub mod core;
pub mod error;
pub mod metrics;
pub mod models;
pub mod optimizer;
pub mod report;
pub mod returns;
pub mod signal;

pub use self::core::run_backtest;
pub use error::{BacktestError, Result};
pub use metrics::summarize;
pub use models::{
    BacktestResult, Position, PriceSeries, ReturnSeries, RiskSummary, SignalSeries, WindowPair,
};
pub use optimizer::{evaluate_cell, sweep, OptimizationSurface};
