use anyhow::Result;
use backtesting::report::{generate_surface_json, surface_table, write_surface_csv};
use backtesting::{sweep, OptimizationSurface, PriceSeries};
use std::time::Instant;
use tracing::info;

use crate::config::Config;

/// Sweep the configured window grid and report the return surface.
pub fn run_optimization(prices: &PriceSeries, config: &Config) -> Result<OptimizationSurface> {
    let ticker = &config.market.ticker;
    let shorts = config.optimization.short.values();
    let longs = config.optimization.long.values();

    println!("\nOptimizing parameters for {}...", ticker);
    info!(
        %ticker,
        short_windows = shorts.len(),
        long_windows = longs.len(),
        "starting grid search"
    );

    let started = Instant::now();
    let surface = sweep(prices, &shorts, &longs)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "grid search finished");

    println!("\nTotal strategy return by window pair ({})\n", ticker);
    print!("{}", surface_table(&surface));

    if config.output.write_reports {
        let dir = &config.output.output_dir;
        write_surface_csv(&surface, dir.join(format!("{}_surface.csv", ticker)))?;
        generate_surface_json(&surface, dir.join(format!("{}_surface.json", ticker)))?;
        info!(dir = %dir.display(), "optimization reports written");
    }

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowRange;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_run_optimization() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.market.data_file = Some(PathBuf::from("unused.txt"));
        config.market.ticker = "GRID".to_string();
        config.optimization.short = WindowRange { start: 5, end: 25, step: 5 };
        config.optimization.long = WindowRange { start: 20, end: 50, step: 10 };
        config.output.output_dir = dir.path().to_path_buf();

        let closes: Vec<f64> = (0..200)
            .map(|i| 80.0 + (i as f64 / 12.0).sin() * 9.0 + i as f64 * 0.03)
            .collect();
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let prices = PriceSeries::from_closes(start, &closes).unwrap();

        let surface = run_optimization(&prices, &config).unwrap();
        assert_eq!(surface.short_windows(), &[5, 10, 15, 20]);
        assert_eq!(surface.long_windows(), &[20, 30, 40]);
        assert_eq!(surface.get(20, 20), None);
        assert!(surface.get(5, 20).is_some());
        assert!(surface.best().is_some());
        assert!(dir.path().join("GRID_surface.csv").exists());
        assert!(dir.path().join("GRID_surface.json").exists());
    }
}
