use chrono::NaiveDate;
use std::fmt;

use super::{CanonicalSchema, NormalizedRow};
use crate::constants::ARTIFACT_DATE_FORMAT;
use crate::error::{AppError, Result};

/// Parsed form of `{SYMBOL}_{YYYYMMDD}_{YYYYMMDD}.csv`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ArtifactName {
    pub fn new(symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            start_date,
            end_date,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.csv",
            self.symbol,
            self.start_date.format(ARTIFACT_DATE_FORMAT),
            self.end_date.format(ARTIFACT_DATE_FORMAT)
        )
    }

    /// Parse any artifact filename, taking the symbol from the name itself
    pub fn parse(file_name: &str) -> Result<Self> {
        let stem = file_name
            .strip_suffix(".csv")
            .ok_or_else(|| AppError::Parse(format!("Not a CSV artifact: {}", file_name)))?;

        let mut parts = stem.rsplitn(3, '_');
        let (end, start, symbol) = match (parts.next(), parts.next(), parts.next()) {
            (Some(end), Some(start), Some(symbol)) if !symbol.is_empty() => (end, start, symbol),
            _ => {
                return Err(AppError::Parse(format!(
                    "Artifact name {} is not SYMBOL_STARTDATE_ENDDATE.csv",
                    file_name
                )))
            }
        };

        Ok(Self {
            symbol: symbol.to_string(),
            start_date: parse_artifact_date(start, file_name)?,
            end_date: parse_artifact_date(end, file_name)?,
        })
    }

    /// Parse a filename only if it belongs to `symbol`
    ///
    /// Returns `Ok(None)` for files of other symbols or other extensions,
    /// and an error when the name looks like an artifact of `symbol` but its
    /// date section is malformed.
    pub fn parse_for_symbol(file_name: &str, symbol: &str) -> Result<Option<Self>> {
        let prefix = format!("{}_", symbol.to_uppercase());
        let dates_section = match file_name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".csv"))
        {
            Some(section) => section,
            None => return Ok(None),
        };

        let date_strings: Vec<&str> = dates_section.split('_').collect();
        if date_strings.len() != 2 {
            return Err(AppError::Parse(format!(
                "Artifact name {} for symbol {} not in expected format SYMBOL_STARTDATE_ENDDATE.csv (dates part: {})",
                file_name, symbol, dates_section
            )));
        }

        Ok(Some(Self {
            symbol: symbol.to_uppercase(),
            start_date: parse_artifact_date(date_strings[0], file_name)?,
            end_date: parse_artifact_date(date_strings[1], file_name)?,
        }))
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

fn parse_artifact_date(value: &str, file_name: &str) -> Result<NaiveDate> {
    if value.len() != 8 {
        return Err(AppError::Parse(format!(
            "Invalid date '{}' in artifact name {}",
            value, file_name
        )));
    }
    NaiveDate::parse_from_str(value, ARTIFACT_DATE_FORMAT).map_err(|e| {
        AppError::Parse(format!("Invalid date '{}' in artifact name {}: {}", value, file_name, e))
    })
}

/// A row after timestamp coercion; `timestamp` is epoch milliseconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub timestamp: i64,
    pub row: NormalizedRow,
}

/// Merged, sorted, deduplicated rows for one symbol
///
/// Timestamps are strictly increasing; `start_date`/`end_date` are the UTC
/// calendar days of the first and last row.
#[derive(Debug, Clone)]
pub struct MergedArtifact {
    pub symbol: String,
    pub schema: CanonicalSchema,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rows: Vec<MergedRow>,
}

impl MergedArtifact {
    pub fn name(&self) -> ArtifactName {
        ArtifactName::new(&self.symbol, self.start_date, self.end_date)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
