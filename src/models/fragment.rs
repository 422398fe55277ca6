use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Time span covered by a single fragment file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// SYMBOL-INTERVAL-YYYY-MM-DD.csv
    Daily,
    /// SYMBOL-INTERVAL-YYYY-MM.csv
    Monthly,
    /// Filename carried no recognizable date
    Unknown,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// One physical source file for a symbol
///
/// `inferred_date` is the last calendar day the file covers: the day itself
/// for daily fragments, the last day of the month for monthly fragments and
/// `NaiveDate::MIN` when the name could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    pub symbol: String,
    pub path: PathBuf,
    pub inferred_date: NaiveDate,
    pub granularity: Granularity,
}

impl SourceFragment {
    pub fn new(
        symbol: impl Into<String>,
        path: impl Into<PathBuf>,
        inferred_date: NaiveDate,
        granularity: Granularity,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            path: path.into(),
            inferred_date,
            granularity,
        }
    }

    /// First calendar day covered by this fragment
    pub fn first_day(&self) -> NaiveDate {
        match self.granularity {
            Granularity::Monthly => self.inferred_date.with_day(1).unwrap_or(self.inferred_date),
            Granularity::Daily | Granularity::Unknown => self.inferred_date,
        }
    }

    /// Whether the covered days intersect `[from, to]` (inclusive)
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.granularity != Granularity::Unknown && self.first_day() <= to && self.inferred_date >= from
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Newest first, ties broken by path so the order is deterministic
    pub fn recency_order(a: &SourceFragment, b: &SourceFragment) -> Ordering {
        b.inferred_date
            .cmp(&a.inferred_date)
            .then_with(|| a.path.cmp(&b.path))
    }
}
