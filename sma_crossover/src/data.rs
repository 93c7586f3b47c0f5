use backtesting::{BacktestError, PriceSeries};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while reading a price history file.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Cannot open market history file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error reading line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("{reason} on line {line}")]
    Parse { line: usize, reason: String },

    #[error("No data found in {}", .0.display())]
    NoData(PathBuf),

    #[error(transparent)]
    Series(#[from] BacktestError),
}

/// Read a daily close file into a price series.
///
/// Each line holds a date (`YYYYMMDD` or `YYYY-MM-DD`) followed by the close,
/// separated by spaces, tabs or a comma. Blank lines are skipped and a first
/// line that does not start with a date is treated as a header.
pub fn load_prices<P: AsRef<Path>>(path: P) -> Result<PriceSeries, DataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = BufReader::new(file);
    let mut points = Vec::new();
    let mut seen_content = false;
    let mut previous: Option<NaiveDate> = None;

    for (idx, line_result) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line = line_result.map_err(|source| DataError::Read {
            line: line_num,
            source,
        })?;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split([' ', '\t', ',']).filter(|s| !s.is_empty());
        let date_str = fields.next().unwrap_or_default();

        let Some(date) = parse_date(date_str) else {
            if !seen_content && !date_str.starts_with(|c: char| c.is_ascii_digit()) {
                // Header row
                seen_content = true;
                continue;
            }
            return Err(parse_error(line_num, "Invalid date"));
        };
        seen_content = true;

        match previous {
            Some(prev) if date == prev => return Err(parse_error(line_num, "Duplicate date")),
            Some(prev) if date < prev => return Err(parse_error(line_num, "Date out of order")),
            _ => previous = Some(date),
        }

        let price_str = fields
            .next()
            .ok_or_else(|| parse_error(line_num, "No price found"))?;
        let price = price_str
            .parse::<f64>()
            .map_err(|_| parse_error(line_num, "Invalid price"))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(parse_error(line_num, "Non-positive price"));
        }

        points.push((date, price));
    }

    if points.is_empty() {
        return Err(DataError::NoData(path.to_path_buf()));
    }

    Ok(PriceSeries::new(points)?)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

fn parse_error(line: usize, reason: &str) -> DataError {
    DataError::Parse {
        line,
        reason: reason.to_string(),
    }
}
