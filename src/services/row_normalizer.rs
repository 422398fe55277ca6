//! Row Normalizer
//!
//! Reads fragment files into `NormalizedRow`s aligned to the symbol's
//! canonical schema. Fragments are inconsistent about header rows, so each
//! file is classified once (see [`read_source_table`]) and both variants go
//! through the same alignment step.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::{FIELD_DELIMITER, MICROS_TIMESTAMP_DIGITS, MICROS_TO_MILLIS_DIGITS};
use crate::error::{AppError, Result};
use crate::models::{CanonicalSchema, NormalizedRow, SourceFragment, SourceTable};

/// Whether the first field of a line is numeric, i.e. the line is data
pub fn looks_like_data(first_field: &str) -> bool {
    first_field
        .trim()
        .trim_start_matches('\u{feff}')
        .parse::<f64>()
        .is_ok()
}

/// Read a fragment and classify it as headered or headerless
///
/// Returns `Ok(None)` for empty files. Records that are not valid CSV/UTF-8
/// are skipped with a warning.
pub fn read_source_table(path: &Path) -> Result<Option<SourceTable>> {
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open {}: {}", path.display(), e)))?;
    if file.metadata().map(|m| m.len() == 0).unwrap_or(false) {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(FIELD_DELIMITER)
        .from_reader(BufReader::new(file));

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut bad_records = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) => {
                if record.iter().all(|f| f.trim().is_empty()) {
                    continue;
                }
                rows.push(record.iter().map(|f| f.to_string()).collect());
            }
            Err(e) => {
                bad_records += 1;
                debug!(file = %path.display(), error = %e, "Skipping unreadable record");
            }
        }
    }

    if bad_records > 0 {
        warn!(file = %path.display(), bad_records, "Skipped unreadable records");
    }

    let mut rows = rows.into_iter();
    let first = match rows.next() {
        Some(first) => first,
        None => return Ok(None),
    };

    let first_field = first.first().map(String::as_str).unwrap_or("");
    if looks_like_data(first_field) {
        let mut records = Vec::with_capacity(rows.len() + 1);
        records.push(first);
        records.extend(rows);
        Ok(Some(SourceTable::Headerless { records }))
    } else {
        let header = first
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();
        Ok(Some(SourceTable::Headered {
            header,
            records: rows.collect(),
        }))
    }
}

/// Align a source table to `schema` and repair timestamp precision
pub fn normalize_table(table: &SourceTable, schema: &CanonicalSchema) -> Vec<NormalizedRow> {
    let mapping = table.column_mapping(schema);
    let close_time = schema.close_time_index();

    table
        .records()
        .iter()
        .map(|record| {
            let mut values: Vec<Option<String>> = mapping
                .iter()
                .map(|source_index| {
                    source_index
                        .and_then(|i| record.get(i))
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                })
                .collect();

            repair_column(&mut values, 0);
            if let Some(index) = close_time {
                repair_column(&mut values, index);
            }

            NormalizedRow::new(values)
        })
        .collect()
}

/// Read and normalize one fragment
///
/// Empty fragments yield an empty vector and a warning.
pub fn normalize_fragment(
    fragment: &SourceFragment,
    schema: &CanonicalSchema,
) -> Result<Vec<NormalizedRow>> {
    let table = match read_source_table(&fragment.path)? {
        Some(table) => table,
        None => {
            warn!(symbol = %fragment.symbol, file = %fragment.path.display(), "Skipping empty file");
            return Ok(Vec::new());
        }
    };

    let rows = normalize_table(&table, schema);
    if rows.is_empty() {
        warn!(
            symbol = %fragment.symbol,
            file = %fragment.path.display(),
            has_header = table.has_header(),
            "Skipping file without data rows"
        );
    } else {
        debug!(
            symbol = %fragment.symbol,
            file = %fragment.path.display(),
            has_header = table.has_header(),
            rows = rows.len(),
            "Normalized fragment"
        );
    }

    Ok(rows)
}

/// Truncate a microsecond epoch value (16 digits) to milliseconds
///
/// Every other value is returned unchanged.
pub fn repair_timestamp(value: &str) -> &str {
    if value.len() == MICROS_TIMESTAMP_DIGITS && value.bytes().all(|b| b.is_ascii_digit()) {
        &value[..MICROS_TIMESTAMP_DIGITS - MICROS_TO_MILLIS_DIGITS]
    } else {
        value
    }
}

fn repair_column(values: &mut [Option<String>], index: usize) {
    if let Some(Some(value)) = values.get_mut(index) {
        let keep = repair_timestamp(value).len();
        value.truncate(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Granularity;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn schema(columns: &[&str]) -> CanonicalSchema {
        CanonicalSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_looks_like_data() {
        assert!(looks_like_data("1700000000000"));
        assert!(looks_like_data(" 1.5 "));
        assert!(!looks_like_data("open_time"));
        assert!(!looks_like_data(""));
    }

    #[test]
    fn test_repair_timestamp() {
        assert_eq!(repair_timestamp("1700000000000123"), "1700000000000");
        assert_eq!(repair_timestamp("1700000000000"), "1700000000000");
        assert_eq!(repair_timestamp("170000000000012"), "170000000000012");
        assert_eq!(repair_timestamp("17000000000001x3"), "17000000000001x3");
    }

    #[test]
    fn test_headerless_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BTCUSDT-1m-2024-01-01.csv");
        fs::write(&path, "1704067200000,1.0,2.0\n1704067260000,1.1,2.1\n").unwrap();

        let table = read_source_table(&path).unwrap().unwrap();
        assert!(!table.has_header());
        assert_eq!(table.records().len(), 2);
    }

    #[test]
    fn test_headered_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BTCUSDT-1m-2024-01-01.csv");
        fs::write(&path, "open_time,open\n1704067200000,1.0\n").unwrap();

        let table = read_source_table(&path).unwrap().unwrap();
        assert!(table.has_header());
        assert_eq!(table.records().len(), 1);
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(read_source_table(&path).unwrap().is_none());

        fs::write(&path, "\n\n").unwrap();
        assert!(read_source_table(&path).unwrap().is_none());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(read_source_table(&dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn test_headered_alignment_by_name() {
        let table = SourceTable::Headered {
            header: vec!["open".into(), "open_time".into(), "extra".into()],
            records: vec![vec!["1.5".into(), "1704067200000".into(), "zzz".into()]],
        };
        let rows = normalize_table(&table, &schema(&["open_time", "open", "volume"]));
        assert_eq!(
            rows,
            vec![NormalizedRow::new(vec![
                Some("1704067200000".into()),
                Some("1.5".into()),
                None
            ])]
        );
    }

    #[test]
    fn test_headerless_alignment_positional() {
        let table = SourceTable::Headerless {
            records: vec![
                vec!["1".into(), "a".into(), "b".into(), "dropped".into()],
                vec!["2".into()],
            ],
        };
        let rows = normalize_table(&table, &schema(&["ts", "x", "y"]));
        assert_eq!(rows[0].values, vec![Some("1".into()), Some("a".into()), Some("b".into())]);
        assert_eq!(rows[1].values, vec![Some("2".into()), None, None]);
    }

    #[test]
    fn test_repair_is_per_value() {
        let table = SourceTable::Headerless {
            records: vec![
                vec!["1700000000000123".into(), "1.0".into(), "1700000059999999".into()],
                vec!["1700000060000".into(), "1.0".into(), "1700000119999".into()],
            ],
        };
        let rows = normalize_table(&table, &schema(&["open_time", "open", "close_time"]));
        assert_eq!(rows[0].get(0), Some("1700000000000"));
        assert_eq!(rows[0].get(2), Some("1700000059999"));
        assert_eq!(rows[1].get(0), Some("1700000060000"));
        assert_eq!(rows[1].get(2), Some("1700000119999"));
    }

    #[test]
    fn test_repair_skips_other_columns() {
        let table = SourceTable::Headerless {
            records: vec![vec!["1".into(), "1700000000000123".into()]],
        };
        let rows = normalize_table(&table, &schema(&["open_time", "quote_volume"]));
        assert_eq!(rows[0].get(1), Some("1700000000000123"));
    }

    #[test]
    fn test_normalize_fragment_empty_is_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BTCUSDT-1m-2024-01-01.csv");
        fs::write(&path, "open_time,open\n").unwrap();

        let fragment = SourceFragment::new(
            "BTCUSDT",
            &path,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Granularity::Daily,
        );
        let rows = normalize_fragment(&fragment, &schema(&["open_time", "open"])).unwrap();
        assert!(rows.is_empty());
    }
}
