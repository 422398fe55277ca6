use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::Path;

use crate::cli::StatusArgs;
use crate::error::{AppError, Error};
use crate::services::{list_artifact_symbols, resolve_resume_cursor};
use crate::utils::{get_output_dir, parse_cli_date, parse_symbols, should_process_symbol};

/// Resume state of one symbol
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SymbolStatus {
    pub symbol: String,
    pub artifacts: usize,
    pub latest_artifact: Option<String>,
    pub latest_end: Option<NaiveDate>,
    pub resume_date: NaiveDate,
    pub has_work: bool,
}

pub fn run(args: StatusArgs) -> Result<(), Error> {
    let output_dir = args.output_dir.unwrap_or_else(get_output_dir);
    let start_date = parse_cli_date(&args.start_date)?;
    let end_date = match args.end_date.as_deref() {
        Some(value) => parse_cli_date(value)?,
        None => Utc::now().date_naive(),
    };
    if start_date > end_date {
        return Err(AppError::Config(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }
    let symbols = parse_symbols(args.symbols)?;

    let statuses = collect_status(&output_dir, &symbols, start_date, end_date)?;

    if args.json {
        let json = serde_json::to_string_pretty(&statuses)
            .map_err(|e| AppError::Other(format!("Failed to serialize status: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    println!("📊 Merged Data Status\n");
    println!("📁 Output: {}", output_dir.display());

    if statuses.is_empty() {
        println!("⚠️  No merged artifacts found. Run 'merge' first.");
        return Ok(());
    }

    println!("📈 Symbols: {}\n", statuses.len());
    println!("═══════════════════════════════════════════════════════════\n");

    for status in &statuses {
        let marker = if status.has_work { "🔄" } else { "✅" };
        println!("{} {}", marker, status.symbol);
        println!("   Artifacts: {}", status.artifacts);
        if let Some(latest) = &status.latest_artifact {
            println!("   Latest:    {}", latest);
        }
        match status.latest_end {
            Some(end) => println!("   Covered:   → {}", end),
            None => println!("   Covered:   nothing yet"),
        }
        if status.has_work {
            println!("   Resume:    {} (through {})", status.resume_date, end_date);
        } else {
            println!("   Resume:    up to date");
        }
        println!();
    }

    let pending = statuses.iter().filter(|s| s.has_work).count();
    println!("═══════════════════════════════════════════════════════════\n");
    println!("💡 {} of {} symbols have data left to merge", pending, statuses.len());

    Ok(())
}

/// Status of every symbol with artifacts in `output_dir`
pub fn collect_status(
    output_dir: &Path,
    symbols: &Option<Vec<String>>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<SymbolStatus>, Error> {
    let mut statuses = Vec::new();

    for symbol in list_artifact_symbols(output_dir)? {
        if !should_process_symbol(&symbol, symbols) {
            continue;
        }

        let cursor = resolve_resume_cursor(&symbol, output_dir, start_date)?;
        statuses.push(SymbolStatus {
            symbol: cursor.symbol.clone(),
            artifacts: cursor.artifacts.len(),
            latest_artifact: cursor.artifacts.last().map(|a| a.file_name()),
            latest_end: cursor.latest_end,
            resume_date: cursor.resume_date,
            has_work: cursor.has_work(end_date),
        });
    }

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_collect_status() {
        let dir = tempdir().unwrap();
        for name in [
            "BTCUSDT_20230101_20230131.csv",
            "BTCUSDT_20230201_20230228.csv",
            "ETHUSDT_20230101_20230331.csv",
            "notes.txt",
        ] {
            File::create(dir.path().join(name)).unwrap();
        }

        let statuses = collect_status(dir.path(), &None, date(2023, 1, 1), date(2023, 3, 31)).unwrap();
        assert_eq!(statuses.len(), 2);

        let btc = &statuses[0];
        assert_eq!(btc.symbol, "BTCUSDT");
        assert_eq!(btc.artifacts, 2);
        assert_eq!(btc.latest_artifact.as_deref(), Some("BTCUSDT_20230201_20230228.csv"));
        assert_eq!(btc.resume_date, date(2023, 3, 1));
        assert!(btc.has_work);

        let eth = &statuses[1];
        assert_eq!(eth.resume_date, date(2023, 4, 1));
        assert!(!eth.has_work);
    }

    #[test]
    fn test_collect_status_filter_and_missing_dir() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("BTCUSDT_20230101_20230131.csv")).unwrap();
        File::create(dir.path().join("ETHUSDT_20230101_20230131.csv")).unwrap();

        let only_eth = Some(vec!["ETHUSDT".to_string()]);
        let statuses = collect_status(dir.path(), &only_eth, date(2023, 1, 1), date(2023, 3, 31)).unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].symbol, "ETHUSDT");

        let missing = collect_status(&dir.path().join("missing"), &None, date(2023, 1, 1), date(2023, 3, 31));
        assert!(missing.unwrap().is_empty());
    }

    #[test]
    fn test_status_serializes() {
        let status = SymbolStatus {
            symbol: "BTCUSDT".into(),
            artifacts: 1,
            latest_artifact: Some("BTCUSDT_20230101_20230131.csv".into()),
            latest_end: Some(date(2023, 1, 31)),
            resume_date: date(2023, 2, 1),
            has_work: true,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["resume_date"], "2023-02-01");
        assert_eq!(json["latest_end"], "2023-01-31");
    }
}
