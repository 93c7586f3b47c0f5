pub mod analysis;
pub mod config;
pub mod data;
pub mod optimization;

pub use analysis::run_analysis;
pub use config::{Args, Config, Mode};
pub use data::{load_prices, DataError};
pub use optimization::run_optimization;
