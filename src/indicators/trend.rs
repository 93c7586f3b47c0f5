mod cross;
mod ma;

pub use cross::{crossovers, Cross, CrossDirection};
pub use ma::moving_average;
