//! Canonical Schema Resolver
//!
//! Picks the column set used for a symbol's merged output. Under the
//! `recency` policy the header of the newest readable fragment wins; files
//! that are missing, empty, unreadable or header-less are passed over in
//! favour of the next most recent one.

use std::path::Path;
use tracing::{info, warn};

use super::row_normalizer::read_source_table;
use crate::error::{AppError, Result};
use crate::models::{CanonicalSchema, SchemaPolicy, SourceFragment, SourceTable};

/// Choose the canonical schema for `symbol`
///
/// Fails with `AppError::Schema` only when no candidate yields a header.
pub fn resolve_schema(
    symbol: &str,
    fragments: &[SourceFragment],
    policy: SchemaPolicy,
) -> Result<CanonicalSchema> {
    if policy == SchemaPolicy::Kline {
        return Ok(CanonicalSchema::kline());
    }

    let mut candidates: Vec<&SourceFragment> = fragments.iter().collect();
    candidates.sort_by(|a, b| SourceFragment::recency_order(a, b));

    for (rank, candidate) in candidates.iter().enumerate() {
        match read_header(&candidate.path) {
            Ok(schema) => {
                if rank > 0 {
                    warn!(
                        symbol,
                        file = %candidate.path.display(),
                        passed_over = rank,
                        "Fell back to an older fragment for the canonical header"
                    );
                }
                info!(
                    symbol,
                    file = %candidate.file_name(),
                    columns = ?schema.columns(),
                    "Using canonical header"
                );
                return Ok(schema);
            }
            Err(e) => {
                warn!(
                    symbol,
                    file = %candidate.path.display(),
                    error = %e,
                    "Header candidate unusable, trying next"
                );
            }
        }
    }

    Err(AppError::Schema(format!(
        "Could not determine a canonical header for {} after checking {} files",
        symbol,
        candidates.len()
    )))
}

/// Read the header row of a fragment
///
/// Classified by `read_source_table`, the same as during normalization.
fn read_header(path: &Path) -> Result<CanonicalSchema> {
    match read_source_table(path)? {
        None => Err(AppError::Schema("file has no records".to_string())),
        Some(SourceTable::Headerless { .. }) => {
            Err(AppError::Schema("file has no header row".to_string()))
        }
        Some(SourceTable::Headered { header, .. }) => CanonicalSchema::new(header),
    }
}
