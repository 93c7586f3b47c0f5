//! Price indicators used by the crossover backtester.

pub mod trend;

pub use trend::{crossovers, moving_average, Cross, CrossDirection};
