use serde::{Deserialize, Serialize};

/// Which way the short average moved through the long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossDirection {
    /// Short average moved strictly above the long average.
    Golden,
    /// Short average fell back to or below the long average.
    Death,
}

/// A crossover event at a given index of the underlying series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cross {
    pub index: usize,
    pub direction: CrossDirection,
}

/// Find the points where `short` crosses `long`.
///
/// A cross is reported at index `i` when both averages are defined at `i - 1`
/// and `i` and the strict "short above long" state flips between them.
/// Equality counts as "not above", matching the long/flat signal.
pub fn crossovers(short: &[Option<f64>], long: &[Option<f64>]) -> Vec<Cross> {
    let n = short.len().min(long.len());
    let above = |i: usize| match (short[i], long[i]) {
        (Some(s), Some(l)) => Some(s > l),
        _ => None,
    };

    (1..n)
        .filter_map(|i| match (above(i - 1), above(i)) {
            (Some(false), Some(true)) => Some(Cross {
                index: i,
                direction: CrossDirection::Golden,
            }),
            (Some(true), Some(false)) => Some(Cross {
                index: i,
                direction: CrossDirection::Death,
            }),
            _ => None,
        })
        .collect()
}
