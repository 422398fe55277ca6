//! Resume Cursor Resolver
//!
//! Artifact filenames are the only state carried between runs. The newest
//! `{SYMBOL}_{START}_{END}.csv` decides where the next run resumes.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{ArtifactName, Granularity, ResumeCursor, SourceFragment};

/// Compute the resume cursor for `symbol` from artifacts in `output_dir`
///
/// resume = max(start_date, newest artifact end + 1 day), or `start_date`
/// when the symbol has no artifact yet. Malformed artifact names are logged
/// and ignored.
pub fn resolve_resume_cursor(
    symbol: &str,
    output_dir: &Path,
    start_date: NaiveDate,
) -> Result<ResumeCursor> {
    let mut artifacts = list_symbol_artifacts(symbol, output_dir)?;
    artifacts.sort_by_key(|a| (a.end_date, a.start_date));

    let latest_end = artifacts.iter().map(|a| a.end_date).max();
    let resume_date = match latest_end {
        Some(end) => {
            let next_day = end.succ_opt().unwrap_or(end);
            std::cmp::max(start_date, next_day)
        }
        None => start_date,
    };

    match latest_end {
        Some(end) => debug!(
            symbol,
            latest_end = %end,
            resume = %resume_date,
            artifacts = artifacts.len(),
            "Found existing merged data"
        ),
        None => debug!(symbol, resume = %resume_date, "No merged data yet"),
    }

    Ok(ResumeCursor {
        symbol: symbol.to_uppercase(),
        resume_date,
        latest_end,
        artifacts,
    })
}

/// All well-formed artifacts for `symbol` in `output_dir`
pub fn list_symbol_artifacts(symbol: &str, output_dir: &Path) -> Result<Vec<ArtifactName>> {
    if !output_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(output_dir).map_err(|e| {
        AppError::Io(format!("Failed to read output dir {}: {}", output_dir.display(), e))
    })?;

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::Io(format!("Failed to read entry: {}", e)))?;
        if !entry.path().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        match ArtifactName::parse_for_symbol(&file_name, symbol) {
            Ok(Some(artifact)) => artifacts.push(artifact),
            Ok(None) => {}
            Err(e) => warn!(symbol, file = %file_name, error = %e, "Ignoring malformed artifact name"),
        }
    }

    Ok(artifacts)
}

/// Symbols that have at least one artifact in `output_dir`
pub fn list_artifact_symbols(output_dir: &Path) -> Result<Vec<String>> {
    if !output_dir.exists() {
        return Ok(Vec::new());
    }

    let mut symbols = BTreeSet::new();
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        if let Ok(artifact) = ArtifactName::parse(&entry.file_name().to_string_lossy()) {
            symbols.insert(artifact.symbol);
        }
    }

    Ok(symbols.into_iter().collect())
}

/// Keep the fragments that can still contribute data after `cursor`
///
/// A fragment is admitted when the days it covers intersect
/// `[cursor.resume_date, end_date]`. Undated fragments are admitted only on
/// a bootstrap run, since they cannot be placed relative to earlier output.
pub fn admit_fragments(
    cursor: &ResumeCursor,
    fragments: Vec<SourceFragment>,
    end_date: NaiveDate,
) -> Vec<SourceFragment> {
    let total = fragments.len();
    let admitted: Vec<SourceFragment> = fragments
        .into_iter()
        .filter(|fragment| match fragment.granularity {
            Granularity::Unknown => cursor.is_bootstrap(),
            _ => fragment.overlaps(cursor.resume_date, end_date),
        })
        .collect();

    if admitted.len() < total {
        info!(
            symbol = %cursor.symbol,
            admitted = admitted.len(),
            skipped = total - admitted.len(),
            resume = %cursor.resume_date,
            "Skipping fragments outside the resume window"
        );
    }

    admitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_resume_after_latest_artifact() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "BTCUSDT_20230101_20230131.csv");
        touch(dir.path(), "BTCUSDT_20230201_20230228.csv");

        let cursor = resolve_resume_cursor("BTCUSDT", dir.path(), date(2017, 1, 1)).unwrap();
        assert_eq!(cursor.resume_date, date(2023, 3, 1));
        assert_eq!(cursor.latest_end, Some(date(2023, 2, 28)));
        assert_eq!(cursor.artifacts.len(), 2);
        assert_eq!(cursor.artifacts[0].end_date, date(2023, 1, 31));
    }

    #[test]
    fn test_no_artifacts_uses_start_date() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "ETHUSDT_20230101_20230131.csv");

        let cursor = resolve_resume_cursor("BTCUSDT", dir.path(), date(2020, 5, 1)).unwrap();
        assert_eq!(cursor.resume_date, date(2020, 5, 1));
        assert!(cursor.is_bootstrap());
    }

    #[test]
    fn test_missing_output_dir_is_bootstrap() {
        let dir = tempdir().unwrap();
        let cursor =
            resolve_resume_cursor("BTCUSDT", &dir.path().join("missing"), date(2020, 5, 1)).unwrap();
        assert!(cursor.is_bootstrap());
    }

    #[test]
    fn test_start_date_wins_over_older_artifacts() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "BTCUSDT_20230101_20230131.csv");

        let cursor = resolve_resume_cursor("BTCUSDT", dir.path(), date(2024, 1, 1)).unwrap();
        assert_eq!(cursor.resume_date, date(2024, 1, 1));
    }

    #[test]
    fn test_malformed_names_are_ignored() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "BTCUSDT_20230101_20230131.csv");
        touch(dir.path(), "BTCUSDT_garbage.csv");
        touch(dir.path(), "BTCUSDT_20230201_2023XX28.csv");
        touch(dir.path(), ".BTCUSDT_20230201_20231231.csv.tmp");

        let cursor = resolve_resume_cursor("BTCUSDT", dir.path(), date(2017, 1, 1)).unwrap();
        assert_eq!(cursor.resume_date, date(2023, 2, 1));
        assert_eq!(cursor.artifacts.len(), 1);
    }

    #[test]
    fn test_list_artifact_symbols() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "BTCUSDT_20230101_20230131.csv");
        touch(dir.path(), "BTCUSDT_20230201_20230228.csv");
        touch(dir.path(), "ETHUSDT_20230101_20230131.csv");
        touch(dir.path(), "readme.txt");

        let symbols = list_artifact_symbols(dir.path()).unwrap();
        assert_eq!(symbols, vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()]);

        assert!(list_artifact_symbols(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_admit_fragments() {
        let cursor = ResumeCursor {
            symbol: "BTCUSDT".into(),
            resume_date: date(2024, 2, 15),
            latest_end: Some(date(2024, 2, 14)),
            artifacts: vec![],
        };
        let fragments = vec![
            SourceFragment::new("BTCUSDT", "jan.csv", date(2024, 1, 31), Granularity::Monthly),
            SourceFragment::new("BTCUSDT", "feb.csv", date(2024, 2, 29), Granularity::Monthly),
            SourceFragment::new("BTCUSDT", "d14.csv", date(2024, 2, 14), Granularity::Daily),
            SourceFragment::new("BTCUSDT", "d15.csv", date(2024, 2, 15), Granularity::Daily),
            SourceFragment::new("BTCUSDT", "late.csv", date(2024, 4, 1), Granularity::Daily),
            SourceFragment::new("BTCUSDT", "odd.csv", NaiveDate::MIN, Granularity::Unknown),
        ];

        let admitted = admit_fragments(&cursor, fragments.clone(), date(2024, 3, 31));
        let names: Vec<String> = admitted.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["feb.csv", "d15.csv"]);

        let bootstrap = ResumeCursor { latest_end: None, ..cursor };
        let admitted = admit_fragments(&bootstrap, fragments, date(2024, 3, 31));
        assert!(admitted.iter().any(|f| f.file_name() == "odd.csv"));
    }
}
