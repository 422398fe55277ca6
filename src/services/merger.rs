//! Merge-Sort-Dedup Engine
//!
//! Combines the normalized rows of every admitted fragment into one ordered
//! sequence with unique timestamps.
//!
//! Overlap policy: fragments are concatenated newest first (ties by path)
//! and the sort is stable, so when two fragments disagree on a timestamp the
//! row from the most recent fragment is the one kept.

use chrono::{DateTime, NaiveDate};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::{CanonicalSchema, MergedArtifact, MergedRow, NormalizedRow, SourceFragment};

/// Normalized rows read from one fragment
#[derive(Debug, Clone)]
pub struct FragmentRows {
    pub fragment: SourceFragment,
    pub rows: Vec<NormalizedRow>,
}

/// Merge, sort and deduplicate all rows for `symbol`
///
/// Returns `AppError::EmptyMerge` when nothing survives coercion.
pub fn merge_fragments(
    symbol: &str,
    schema: &CanonicalSchema,
    mut batches: Vec<FragmentRows>,
) -> Result<MergedArtifact> {
    batches.sort_by(|a, b| SourceFragment::recency_order(&a.fragment, &b.fragment));

    let total: usize = batches.iter().map(|b| b.rows.len()).sum();
    let mut merged: Vec<MergedRow> = Vec::with_capacity(total);
    let mut dropped = 0usize;

    for batch in batches {
        for mut row in batch.rows {
            match row.timestamp_field().and_then(coerce_timestamp) {
                Some(timestamp) => {
                    if let Some(first) = row.values.first_mut() {
                        *first = Some(timestamp.to_string());
                    }
                    merged.push(MergedRow { timestamp, row });
                }
                None => dropped += 1,
            }
        }
    }

    if dropped > 0 {
        warn!(
            symbol,
            dropped,
            column = schema.timestamp_column(),
            "Dropped rows with unusable timestamps"
        );
    }

    if merged.is_empty() {
        return Err(AppError::EmptyMerge(format!(
            "No rows with valid timestamps for {} ({} rows read)",
            symbol, total
        )));
    }

    sort_and_dedup(&mut merged);

    let duplicates = total - dropped - merged.len();
    debug!(symbol, rows = merged.len(), duplicates, "Merged rows");

    let start_date = utc_date(merged[0].timestamp)?;
    let end_date = utc_date(merged[merged.len() - 1].timestamp)?;

    Ok(MergedArtifact {
        symbol: symbol.to_uppercase(),
        schema: schema.clone(),
        start_date,
        end_date,
        rows: merged,
    })
}

/// Stable sort by timestamp, keeping the first row of each timestamp
pub fn sort_and_dedup(rows: &mut Vec<MergedRow>) {
    rows.sort_by_key(|r| r.timestamp);
    rows.dedup_by_key(|r| r.timestamp);
}

/// Coerce a raw field to epoch milliseconds
///
/// Accepts integers and integral floats (`1700000000000.0`); anything else,
/// or a value outside the representable date range, yields `None`.
pub fn coerce_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let millis = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let v = raw.parse::<f64>().ok()?;
            if !v.is_finite() || v.fract() != 0.0 || v.abs() >= i64::MAX as f64 {
                return None;
            }
            v as i64
        }
    };

    DateTime::from_timestamp_millis(millis).map(|_| millis)
}

fn utc_date(millis: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| AppError::Parse(format!("Timestamp out of range: {}", millis)))
}
