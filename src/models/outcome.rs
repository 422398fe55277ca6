use chrono::NaiveDate;
use std::path::PathBuf;

/// Result of running the pipeline for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    /// A new artifact was written
    Written {
        symbol: String,
        path: PathBuf,
        rows: usize,
        fragments: usize,
    },
    /// Existing artifacts already reach the configured end date
    UpToDate { symbol: String, resume_date: NaiveDate },
    /// No fragment fell inside the window still needing data
    NoFragments { symbol: String },
    /// The symbol produced nothing this run (schema, empty merge, lock)
    Skipped { symbol: String, reason: String },
}

/// Statistics for a merge run
#[derive(Debug, Default)]
pub struct MergeStats {
    pub symbols_processed: usize,
    pub artifacts_written: usize,
    pub rows_written: usize,
    pub fragments_merged: usize,
    pub up_to_date: usize,
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

impl MergeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &SymbolOutcome) {
        self.symbols_processed += 1;
        match outcome {
            SymbolOutcome::Written { rows, fragments, .. } => {
                self.artifacts_written += 1;
                self.rows_written += rows;
                self.fragments_merged += fragments;
            }
            SymbolOutcome::UpToDate { .. } => self.up_to_date += 1,
            SymbolOutcome::NoFragments { symbol } => {
                self.skipped.push(format!("{}: no fragments to merge", symbol))
            }
            SymbolOutcome::Skipped { symbol, reason } => {
                self.skipped.push(format!("{}: {}", symbol, reason))
            }
        }
    }

    pub fn record_error(&mut self, symbol: &str, error: impl std::fmt::Display) {
        self.symbols_processed += 1;
        self.errors.push(format!("{}: {}", symbol, error));
    }

    pub fn print_summary(&self) {
        println!("\n📊 Merge Summary:");
        println!("  ✅ Symbols processed: {}", self.symbols_processed);
        println!("  ✅ Artifacts written: {}", self.artifacts_written);
        println!("  ✅ Rows written: {}", self.rows_written);
        println!("  ✅ Fragments merged: {}", self.fragments_merged);
        println!("  ⏭️  Up to date: {}", self.up_to_date);

        if !self.skipped.is_empty() {
            println!("  ⏭️  Skipped: {}", self.skipped.len());
            for skipped in &self.skipped[0..std::cmp::min(5, self.skipped.len())] {
                println!("    ⏭️  {}", skipped);
            }
            if self.skipped.len() > 5 {
                println!("    ... and {} more", self.skipped.len() - 5);
            }
        }

        if !self.errors.is_empty() {
            println!("  ⚠️  Errors encountered: {}", self.errors.len());
            for error in &self.errors[0..std::cmp::min(5, self.errors.len())] {
                println!("    ❌ {}", error);
            }
            if self.errors.len() > 5 {
                println!("    ... and {} more errors", self.errors.len() - 5);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = MergeStats::new();
        stats.record(&SymbolOutcome::Written {
            symbol: "BTCUSDT".into(),
            path: PathBuf::from("BTCUSDT_20240101_20240102.csv"),
            rows: 10,
            fragments: 2,
        });
        stats.record(&SymbolOutcome::UpToDate {
            symbol: "ETHUSDT".into(),
            resume_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        });
        stats.record(&SymbolOutcome::Skipped {
            symbol: "XRPUSDT".into(),
            reason: "no schema".into(),
        });
        stats.record_error("BNBUSDT", "disk full");

        assert_eq!(stats.symbols_processed, 4);
        assert_eq!(stats.artifacts_written, 1);
        assert_eq!(stats.rows_written, 10);
        assert_eq!(stats.up_to_date, 1);
        assert_eq!(stats.skipped, vec!["XRPUSDT: no schema".to_string()]);
        assert_eq!(stats.errors.len(), 1);
    }
}
