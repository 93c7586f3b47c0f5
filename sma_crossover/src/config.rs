//! Configuration for the crossover tool: TOML file plus command-line overrides.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the tool should do with the loaded prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Backtest one window pair against buy & hold
    Analyze,
    /// Sweep a grid of window pairs
    Optimize,
}

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "sma_crossover")]
#[command(about = "Moving average crossover backtester and window optimizer")]
pub struct Args {
    /// Path to market data file (YYYYMMDD Price format)
    #[arg(value_name = "DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Mode of operation
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Symbol used in report titles and file names
    #[arg(long)]
    pub ticker: Option<String>,

    /// Short moving average window (analyze mode)
    #[arg(long)]
    pub short_window: Option<usize>,

    /// Long moving average window (analyze mode)
    #[arg(long)]
    pub long_window: Option<usize>,

    /// Directory for report files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Load the configuration file (or defaults) and apply command-line overrides.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(path) = &self.data_file {
            config.market.data_file = Some(path.clone());
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(ticker) = &self.ticker {
            config.market.ticker = ticker.trim().to_uppercase();
        }
        if let Some(short) = self.short_window {
            config.analysis.short_window = short;
        }
        if let Some(long) = self.long_window {
            config.analysis.long_window = long;
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = dir.clone();
        }
        if self.verbose {
            config.output.verbose = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Main configuration for the crossover tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Mode of operation: "analyze" or "optimize"
    #[serde(default = "default_mode")]
    pub mode: Mode,

    #[serde(default)]
    pub market: MarketConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub optimization: OptimizationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Market data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Path to the market data file (YYYYMMDD Price format)
    pub data_file: Option<PathBuf>,

    /// Symbol of the loaded series
    #[serde(default = "default_ticker")]
    pub ticker: String,
}

/// Single backtest parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    #[serde(default = "default_long_window")]
    pub long_window: usize,
}

/// Grid search ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    #[serde(default = "default_short_range")]
    pub short: WindowRange,

    #[serde(default = "default_long_range")]
    pub long: WindowRange,
}

/// Half-open range of window lengths, `start..end` by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for report files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write CSV/JSON/text reports next to the console summary
    #[serde(default = "default_write_reports")]
    pub write_reports: bool,

    /// Enable debug logging
    #[serde(default)]
    pub verbose: bool,
}

// Default value functions
fn default_mode() -> Mode { Mode::Analyze }
fn default_ticker() -> String { "PRICES".to_string() }
fn default_short_window() -> usize { 50 }
fn default_long_window() -> usize { 200 }
fn default_short_range() -> WindowRange { WindowRange { start: 10, end: 60, step: 5 } }
fn default_long_range() -> WindowRange { WindowRange { start: 100, end: 220, step: 10 } }
fn default_output_dir() -> PathBuf { PathBuf::from("results") }
fn default_write_reports() -> bool { true }

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            market: MarketConfig::default(),
            analysis: AnalysisConfig::default(),
            optimization: OptimizationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            ticker: default_ticker(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            short: default_short_range(),
            long: default_long_range(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            write_reports: default_write_reports(),
            verbose: false,
        }
    }
}

impl WindowRange {
    /// All window lengths in the range, ascending.
    pub fn values(&self) -> Vec<usize> {
        if self.step == 0 {
            return Vec::new();
        }
        (self.start..self.end).step_by(self.step).collect()
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.step == 0 {
            anyhow::bail!("{} range step must be greater than 0", name);
        }
        if self.start == 0 {
            anyhow::bail!("{} range must start at 1 or more", name);
        }
        if self.start >= self.end {
            anyhow::bail!(
                "{} range is empty: start {} must be below end {}",
                name,
                self.start,
                self.end
            );
        }
        Ok(())
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.market.data_file.is_none() {
            anyhow::bail!("No market data file given (DATA_FILE argument or [market] data_file)");
        }

        if self.analysis.short_window == 0 {
            anyhow::bail!("short_window must be greater than 0");
        }

        if self.analysis.long_window == 0 {
            anyhow::bail!("long_window must be greater than 0");
        }

        self.optimization.short.validate("short")?;
        self.optimization.long.validate("long")?;

        Ok(())
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the market data file; present once validated.
    pub fn data_file(&self) -> Result<&Path> {
        self.market
            .data_file
            .as_deref()
            .context("No market data file configured")
    }
}
