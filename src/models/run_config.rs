use chrono::{NaiveDate, Utc};
use std::path::PathBuf;

use super::{ArtifactName, SchemaPolicy};
use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_START_DATE};
use crate::error::{AppError, Result};

/// Configuration for one consolidation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// First day of data to consolidate (inclusive)
    pub start_date: NaiveDate,

    /// Last day of data to consolidate (inclusive, usually today)
    pub end_date: NaiveDate,

    /// Directory holding merged artifacts
    pub output_dir: PathBuf,

    /// How the canonical header is chosen
    pub schema_policy: SchemaPolicy,

    /// Symbols processed in parallel (0 = rayon default)
    pub jobs: usize,

    /// Take a per-symbol lock file while writing
    pub lock: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::parse_from_str(DEFAULT_START_DATE, "%Y-%m-%d")
                .unwrap_or(NaiveDate::MIN),
            end_date: Utc::now().date_naive(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            schema_policy: SchemaPolicy::default(),
            jobs: 0,
            lock: false,
        }
    }
}

impl RunConfig {
    /// Create new config with custom values
    pub fn new(
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        output_dir: PathBuf,
        schema_policy: SchemaPolicy,
    ) -> Result<Self> {
        let end_date = end_date.unwrap_or_else(|| Utc::now().date_naive());
        if start_date > end_date {
            return Err(AppError::Config(format!(
                "Start date {} is after end date {}",
                start_date, end_date
            )));
        }

        Ok(Self {
            start_date,
            end_date,
            output_dir,
            schema_policy,
            ..Self::default()
        })
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }
}

/// Where a symbol's next run starts, derived from its existing artifacts
#[derive(Debug, Clone)]
pub struct ResumeCursor {
    pub symbol: String,
    /// Earliest day still needing data
    pub resume_date: NaiveDate,
    /// End date of the newest artifact, if any
    pub latest_end: Option<NaiveDate>,
    /// Artifacts found for the symbol, oldest first
    pub artifacts: Vec<ArtifactName>,
}

impl ResumeCursor {
    /// No artifact exists yet for this symbol
    pub fn is_bootstrap(&self) -> bool {
        self.latest_end.is_none()
    }

    pub fn has_work(&self, end_date: NaiveDate) -> bool {
        self.resume_date <= end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_run_config_default() {
        let config = RunConfig::default();
        assert_eq!(config.start_date, date(2017, 1, 1));
        assert_eq!(config.schema_policy, SchemaPolicy::Recency);
        assert!(!config.lock);
    }

    #[test]
    fn test_run_config_rejects_inverted_range() {
        let result = RunConfig::new(
            date(2024, 6, 1),
            Some(date(2024, 5, 31)),
            PathBuf::from("out"),
            SchemaPolicy::Recency,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_resume_cursor_work() {
        let cursor = ResumeCursor {
            symbol: "BTCUSDT".into(),
            resume_date: date(2024, 6, 1),
            latest_end: Some(date(2024, 5, 31)),
            artifacts: vec![],
        };
        assert!(!cursor.has_work(date(2024, 5, 31)));
        assert!(cursor.has_work(date(2024, 6, 1)));
        assert!(!cursor.is_bootstrap());
    }
}
