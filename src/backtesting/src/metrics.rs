use crate::models::RiskSummary;
use crate::returns::cumulative;

/// Trading days per year used to annualize daily figures.
pub const TRADING_DAYS: f64 = 252.0;

/// Sharpe ratio and maximum drawdown of a daily return series.
///
/// Undefined days are skipped by the Sharpe ratio and act as flat days for the
/// drawdown.
pub fn summarize(returns: &[Option<f64>]) -> RiskSummary {
    RiskSummary {
        sharpe: sharpe_ratio(returns),
        max_drawdown: max_drawdown(&cumulative(returns)),
    }
}

/// Annualized Sharpe ratio (zero risk-free rate, sample standard deviation).
///
/// Returns 0.0 when fewer than two values are defined or the values have no
/// dispersion.
pub fn sharpe_ratio(returns: &[Option<f64>]) -> f64 {
    let values: Vec<f64> = returns.iter().flatten().copied().collect();
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    // Deviations from the first value: identical samples give exactly zero variance
    let shift = values[0];
    let mean_dev = values.iter().map(|r| r - shift).sum::<f64>() / n as f64;
    let variance = values
        .iter()
        .map(|r| (r - shift - mean_dev).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    let std_dev = variance.sqrt();

    if !std_dev.is_finite() || std_dev <= 0.0 {
        return 0.0;
    }

    let mean = shift + mean_dev;
    let sharpe = mean / std_dev * TRADING_DAYS.sqrt();
    if sharpe.is_finite() { sharpe } else { 0.0 }
}

/// Largest fractional decline from a running peak, as a value <= 0.
///
/// The peak starts at the 1.0 anchor that precedes the first day.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;

    for &value in cumulative {
        peak = peak.max(value);
        worst = worst.min(value / peak - 1.0);
    }

    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_variance_sharpe_is_zero() {
        let returns = vec![Some(0.01); 300];
        assert_eq!(sharpe_ratio(&returns), 0.0);

        let mut with_gaps = vec![None];
        with_gaps.extend(vec![Some(0.0123); 17]);
        assert_eq!(sharpe_ratio(&with_gaps), 0.0);
    }

    #[test]
    fn test_sharpe_degenerate_sample_sizes() {
        assert_eq!(sharpe_ratio(&[]), 0.0);
        assert_eq!(sharpe_ratio(&[None, None]), 0.0);
        assert_eq!(sharpe_ratio(&[None, Some(0.05)]), 0.0);
    }

    #[test]
    fn test_sharpe_known_value() {
        // mean = 0.02, sample std = 0.01
        let returns = vec![None, Some(0.01), Some(0.02), Some(0.03)];
        let expected = 2.0 * TRADING_DAYS.sqrt();
        assert!((sharpe_ratio(&returns) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_negative_sharpe() {
        let returns = vec![Some(-0.01), Some(-0.03)];
        assert!(sharpe_ratio(&returns) < 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        // 1.0 -> 1.2 -> 0.9 -> 1.3 -> 1.04
        let cumulative = vec![1.0, 1.2, 0.9, 1.3, 1.04];
        assert!((max_drawdown(&cumulative) - (-0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_no_drawdown_when_rising() {
        assert_eq!(max_drawdown(&[1.0, 1.1, 1.2, 1.2]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_drawdown_counts_first_day_loss() {
        let summary = summarize(&[Some(-0.1), Some(0.0)]);
        assert!((summary.max_drawdown - (-0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_flat_strategy() {
        let summary = summarize(&[None, Some(0.0), Some(0.0), Some(0.0)]);
        assert_eq!(summary.sharpe, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
    }
}
