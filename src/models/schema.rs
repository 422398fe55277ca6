use std::fmt;

use crate::constants::{CANONICAL_KLINES_HEADERS, CLOSE_TIME_COLUMN};
use crate::error::{AppError, Result};

/// How the canonical column set for a symbol is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Header of the most recent readable fragment
    #[default]
    Recency,
    /// Fixed 12-column Binance kline header
    Kline,
}

impl SchemaPolicy {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "recency" | "latest" => Ok(SchemaPolicy::Recency),
            "kline" | "klines" | "fixed" => Ok(SchemaPolicy::Kline),
            _ => Err(format!("Invalid schema policy: {}. Valid options: recency, kline", s)),
        }
    }
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPolicy::Recency => write!(f, "recency"),
            SchemaPolicy::Kline => write!(f, "kline"),
        }
    }
}

/// Ordered column names for one symbol's merge run
///
/// The first column is always the primary epoch-millisecond timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema {
    columns: Vec<String>,
}

impl CanonicalSchema {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_string()).collect();
        match columns.first() {
            None => Err(AppError::Schema("Schema has no columns".to_string())),
            Some(first) if first.is_empty() => Err(AppError::Schema(
                "Schema timestamp column has an empty name".to_string(),
            )),
            Some(_) => Ok(Self { columns }),
        }
    }

    pub fn kline() -> Self {
        Self {
            columns: CANONICAL_KLINES_HEADERS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns; never zero
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn timestamp_column(&self) -> &str {
        &self.columns[0]
    }

    /// Index of the secondary timestamp column, if the schema carries one
    ///
    /// Matches `close_time`, `Close Time`, `CLOSE_TIME`, ...
    pub fn close_time_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, c)| c.to_lowercase().replace(' ', "_") == CLOSE_TIME_COLUMN)
            .map(|(i, _)| i)
    }
}
