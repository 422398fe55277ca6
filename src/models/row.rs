use super::CanonicalSchema;

/// A row aligned to a `CanonicalSchema`; `None` marks a column the source
/// file did not provide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub values: Vec<Option<String>>,
}

impl NormalizedRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Raw value of the primary timestamp column
    pub fn timestamp_field(&self) -> Option<&str> {
        self.values.first().and_then(|v| v.as_deref())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// Fields ready for a CSV writer (nulls become empty fields)
    pub fn to_record(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.as_deref().unwrap_or("")).collect()
    }
}

/// Contents of one fragment file, classified once by the header heuristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceTable {
    /// First line was a header; columns are matched by name
    Headered {
        header: Vec<String>,
        records: Vec<Vec<String>>,
    },
    /// First line was already data; columns are taken positionally
    Headerless { records: Vec<Vec<String>> },
}

impl SourceTable {
    pub fn records(&self) -> &[Vec<String>] {
        match self {
            SourceTable::Headered { records, .. } => records,
            SourceTable::Headerless { records } => records,
        }
    }

    pub fn has_header(&self) -> bool {
        matches!(self, SourceTable::Headered { .. })
    }

    /// For each canonical column, the source position it is read from
    pub fn column_mapping(&self, schema: &CanonicalSchema) -> Vec<Option<usize>> {
        match self {
            SourceTable::Headered { header, .. } => schema
                .columns()
                .iter()
                .map(|column| header.iter().position(|h| h.trim() == column))
                .collect(),
            SourceTable::Headerless { .. } => (0..schema.width()).map(Some).collect(),
        }
    }
}
