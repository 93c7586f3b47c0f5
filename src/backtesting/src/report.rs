use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::models::{BacktestResult, Position};
use crate::optimizer::OptimizationSurface;
use indicators::CrossDirection;

/// Side-by-side strategy vs. buy & hold table.
pub fn summary_table(result: &BacktestResult) -> String {
    let strategy = &result.strategy_risk;
    let market = &result.market_risk;
    let rule = "-".repeat(45);

    let lines = [
        row("Metric", "Strategy", "Buy & Hold"),
        rule.clone(),
        row(
            "Total Return",
            &pct(result.total_strategy_return()),
            &pct(result.total_market_return()),
        ),
        row(
            "Sharpe Ratio",
            &format!("{:.2}", strategy.sharpe),
            &format!("{:.2}", market.sharpe),
        ),
        row(
            "Max Drawdown",
            &pct(strategy.max_drawdown),
            &pct(market.max_drawdown),
        ),
        rule,
        format!(
            "Sharpe delta vs. buy & hold: {:+.2}",
            strategy.sharpe - market.sharpe
        ),
    ];
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Surface as a short x long table, "n/a" for missing cells.
pub fn surface_table(surface: &OptimizationSurface) -> String {
    let header: String = surface
        .long_windows()
        .iter()
        .map(|long| format!(" {:>9}", long))
        .collect();
    let mut out = format!("{:>10}{}\n", "short\\long", header);

    for (short, row) in surface.rows() {
        let cells: String = row
            .iter()
            .map(|cell| match cell {
                Some(v) => format!(" {:>9.2}", v),
                None => format!(" {:>9}", "n/a"),
            })
            .collect();
        out.push_str(&format!("{:>10}{}\n", short, cells));
    }

    match surface.best() {
        Some((pair, value)) => out.push_str(&format!(
            "\nBest pair: {} (total return {})\n",
            pair.strategy_name(),
            pct(value)
        )),
        None => out.push_str("\nNo window pair could be evaluated\n"),
    }

    out
}

/// Generate a text report
pub fn generate_text_report<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let mut file = create(path.as_ref())?;

    writeln!(file, "Backtest Report: {}", result.strategy_name())?;
    writeln!(file, "{}", "=".repeat(45))?;
    if let (Some(first), Some(last)) = (result.dates.first(), result.dates.last()) {
        writeln!(file, "Period: {} to {} ({} days)", first, last, result.dates.len())?;
    }
    writeln!(file)?;
    write!(file, "{}", summary_table(result))?;
    writeln!(file)?;

    writeln!(file, "Crossovers:")?;
    if result.crossovers.is_empty() {
        writeln!(file, "  none")?;
    }
    for cross in &result.crossovers {
        let label = match cross.direction {
            CrossDirection::Golden => "golden cross",
            CrossDirection::Death => "death cross",
        };
        writeln!(file, "  {}  {}", result.dates[cross.index], label)?;
    }

    Ok(())
}

/// Generate a JSON report
pub fn generate_json_report<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let file = create(path.as_ref())?;
    serde_json::to_writer_pretty(file, result)?;
    Ok(())
}

/// Per-date series for charting: price, averages, signal, returns, growth.
pub fn write_series_csv<P: AsRef<Path>>(result: &BacktestResult, path: P) -> Result<()> {
    let mut file = create(path.as_ref())?;
    let signals = &result.signals;
    let returns = &result.returns;

    writeln!(
        file,
        "date,close,sma_short,sma_long,signal,market_return,strategy_return,cumulative_market,cumulative_strategy"
    )?;
    for i in 0..result.dates.len() {
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            result.dates[i],
            result.closes[i],
            opt(signals.sma_short[i]),
            opt(signals.sma_long[i]),
            signals.signal[i]
                .map(|s: Position| s.as_u8().to_string())
                .unwrap_or_default(),
            opt(returns.market[i]),
            opt(returns.strategy[i]),
            returns.cumulative_market[i],
            returns.cumulative_strategy[i],
        )?;
    }
    Ok(())
}

/// Surface as a CSV matrix (heatmap input); missing cells are empty.
pub fn write_surface_csv<P: AsRef<Path>>(surface: &OptimizationSurface, path: P) -> Result<()> {
    let mut file = create(path.as_ref())?;

    let header: Vec<String> = surface.long_windows().iter().map(|l| l.to_string()).collect();
    writeln!(file, "short,{}", header.join(","))?;
    for (short, row) in surface.rows() {
        let cells: Vec<String> = row.iter().map(|c| opt(*c)).collect();
        writeln!(file, "{},{}", short, cells.join(","))?;
    }
    Ok(())
}

/// Surface as JSON
pub fn generate_surface_json<P: AsRef<Path>>(surface: &OptimizationSurface, path: P) -> Result<()> {
    let file = create(path.as_ref())?;
    serde_json::to_writer_pretty(file, surface)?;
    Ok(())
}

fn row(label: &str, strategy: &str, market: &str) -> String {
    format!("{:<15} {:<15} {:<15}", label, strategy, market)
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Create a file, making parent directories first.
fn create(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::run_backtest;
    use crate::models::PriceSeries;
    use crate::optimizer::sweep;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn prices() -> PriceSeries {
        let closes: Vec<f64> = (0..60)
            .map(|i| 20.0 + (i as f64 / 4.0).sin() * 3.0)
            .collect();
        PriceSeries::from_closes(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), &closes).unwrap()
    }

    #[test]
    fn test_summary_table() {
        let result = run_backtest(&prices(), 3, 8).unwrap();
        let table = summary_table(&result);
        assert!(table.starts_with("Metric"));
        assert!(table.contains("Total Return"));
        assert!(table.contains("Sharpe Ratio"));
        assert!(table.contains("Max Drawdown"));
        assert!(table.contains('%'));
    }

    #[test]
    fn test_surface_table_marks_missing() {
        let surface = sweep(&prices(), &[3, 10], &[5, 8]).unwrap();
        let table = surface_table(&surface);
        assert!(table.contains("n/a"));
        assert!(table.contains("Best pair: SMA 3/"));
    }

    #[test]
    fn test_table_layout() {
        let surface = sweep(&prices(), &[3, 10], &[5, 8]).unwrap();
        let table = surface_table(&surface);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "short\\long         5         8");
        assert_eq!(lines[2], "        10       n/a       n/a");
        assert_eq!(lines[1].len(), lines[0].len());
        assert_eq!(lines[3], "");

        let result = run_backtest(&prices(), 3, 8).unwrap();
        let summary = summary_table(&result);
        assert_eq!(summary.lines().count(), 7);
        assert_eq!(summary.lines().nth(1), Some("-".repeat(45).as_str()));
        assert!(summary.ends_with('\n'));
    }

    #[test]
    fn test_reports_written() {
        let dir = tempdir().unwrap();
        let result = run_backtest(&prices(), 3, 8).unwrap();

        let series_path = dir.path().join("out/series.csv");
        write_series_csv(&result, &series_path).unwrap();
        let csv = fs::read_to_string(&series_path).unwrap();
        assert_eq!(csv.lines().count(), 61);
        assert!(csv.lines().nth(1).unwrap().starts_with("2023-01-01,20,,,,,,1,1"));

        let json_path = dir.path().join("out/report.json");
        generate_json_report(&result, &json_path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["windows"]["short"], 3);
        assert!(value["signals"]["sma_long"][0].is_null());

        let text_path = dir.path().join("report.txt");
        generate_text_report(&result, &text_path).unwrap();
        let text = fs::read_to_string(&text_path).unwrap();
        assert!(text.contains("Backtest Report: SMA 3/8"));
        assert!(text.contains("Crossovers:"));
    }

    #[test]
    fn test_surface_csv() {
        let dir = tempdir().unwrap();
        let surface = sweep(&prices(), &[3, 10], &[5, 8]).unwrap();
        let path = dir.path().join("surface.csv");
        write_surface_csv(&surface, &path).unwrap();

        let csv = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "short,5,8");
        assert!(lines[2].starts_with("10,,"));
        assert!(lines[2].ends_with(','));
    }
}
