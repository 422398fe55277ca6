//! Filename Date Parser
//!
//! Infers the calendar date a fragment covers from its file name:
//!
//! - `BTCUSDT-1m-2024-01-15.csv` → 2024-01-15 (daily)
//! - `BTCUSDT-1m-2024-02.csv`    → 2024-02-29 (monthly, last day of month)
//!
//! Monthly fragments map to the last day of their month so they sort after
//! every daily fragment of the same month. Names without a trailing date fall
//! back to `NaiveDate::MIN` so they are never mistaken for the newest file.

use chrono::NaiveDate;
use std::path::Path;
use tracing::warn;

use crate::models::{Granularity, SourceFragment};

/// Parse the covered date and granularity from a fragment file name
///
/// Pure function of the name; the file system is never touched.
pub fn parse_date_from_filename(file_name: &str) -> (NaiveDate, Granularity) {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    // Trailing tokens, last first: [DD, MM, YYYY, rest] or [MM, YYYY, rest]
    let tokens: Vec<&str> = stem.rsplitn(4, '-').collect();

    if tokens.len() == 4 && is_digits(tokens[2], 4) && is_digits(tokens[1], 2) && is_digits(tokens[0], 2) {
        if let Some(date) = ymd(tokens[2], tokens[1], tokens[0]) {
            return (date, Granularity::Daily);
        }
    } else if tokens.len() >= 3 && is_digits(tokens[1], 4) && is_digits(tokens[0], 2) {
        let month_end = tokens[1]
            .parse::<i32>()
            .ok()
            .zip(tokens[0].parse::<u32>().ok())
            .and_then(|(year, month)| last_day_of_month(year, month));
        if let Some(date) = month_end {
            return (date, Granularity::Monthly);
        }
    }

    warn!(
        file = file_name,
        "Could not parse date from filename, using minimum date for sorting"
    );
    (NaiveDate::MIN, Granularity::Unknown)
}

/// Build a `SourceFragment` for `path`, inferring its date from the name
pub fn fragment_from_path(symbol: &str, path: &Path) -> SourceFragment {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (inferred_date, granularity) = parse_date_from_filename(&file_name);
    SourceFragment::new(symbol, path, inferred_date, granularity)
}

/// Last calendar day of `year`-`month`, `None` for an invalid month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next_month.pred_opt().filter(|d| *d >= first)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn is_digits(token: &str, len: usize) -> bool {
    token.len() == len && token.bytes().all(|b| b.is_ascii_digit())
}
