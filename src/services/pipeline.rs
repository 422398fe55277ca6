//! Per-symbol consolidation pipeline
//!
//! resume cursor -> fragment gate -> schema -> normalize -> merge -> write.
//! Each symbol is independent; `run_all` fans symbols out over a rayon pool
//! and folds the outcomes into `MergeStats` in symbol order.

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use super::artifact_writer::write_artifact;
use super::merger::{merge_fragments, FragmentRows};
use super::resume_cursor::{admit_fragments, resolve_resume_cursor};
use super::row_normalizer::normalize_fragment;
use super::schema_resolver::resolve_schema;
use super::symbol_lock::SymbolLock;
use crate::error::{AppError, Result};
use crate::models::{FragmentsBySymbol, MergeStats, RunConfig, SourceFragment, SymbolOutcome};

/// Run the pipeline for one symbol
///
/// Symbol-scoped failures (no usable header, nothing to merge, lock held)
/// become `SymbolOutcome::Skipped`. Anything else is returned as an error.
pub fn process_symbol(
    symbol: &str,
    fragments: Vec<SourceFragment>,
    config: &RunConfig,
) -> Result<SymbolOutcome> {
    match merge_symbol(symbol, fragments, config) {
        Err(e) if e.is_symbol_scoped() => {
            warn!(symbol, reason = %e, "Skipping symbol");
            Ok(SymbolOutcome::Skipped {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            })
        }
        other => other,
    }
}

fn merge_symbol(
    symbol: &str,
    fragments: Vec<SourceFragment>,
    config: &RunConfig,
) -> Result<SymbolOutcome> {
    let _lock = if config.lock {
        Some(SymbolLock::acquire(&config.output_dir, symbol)?)
    } else {
        None
    };

    let cursor = resolve_resume_cursor(symbol, &config.output_dir, config.start_date)?;
    if !cursor.has_work(config.end_date) {
        info!(
            symbol,
            resume = %cursor.resume_date,
            end = %config.end_date,
            "No new data to merge"
        );
        return Ok(SymbolOutcome::UpToDate {
            symbol: symbol.to_string(),
            resume_date: cursor.resume_date,
        });
    }

    let admitted = admit_fragments(&cursor, fragments, config.end_date);
    if admitted.is_empty() {
        info!(symbol, resume = %cursor.resume_date, "No fragments after resume date");
        return Ok(SymbolOutcome::NoFragments {
            symbol: symbol.to_string(),
        });
    }

    let schema = resolve_schema(symbol, &admitted, config.schema_policy)?;

    let mut batches = Vec::with_capacity(admitted.len());
    for fragment in admitted {
        match normalize_fragment(&fragment, &schema) {
            Ok(rows) if rows.is_empty() => {}
            Ok(rows) => batches.push(FragmentRows { fragment, rows }),
            Err(e) => warn!(
                symbol,
                file = %fragment.path.display(),
                error = %e,
                "Skipping unreadable fragment"
            ),
        }
    }

    let fragments_used = batches.len();
    let artifact = merge_fragments(symbol, &schema, batches)?;
    let path = write_artifact(&artifact, &config.output_dir)?;

    Ok(SymbolOutcome::Written {
        symbol: artifact.symbol.clone(),
        path,
        rows: artifact.row_count(),
        fragments: fragments_used,
    })
}

/// Process every symbol, `config.jobs` at a time
///
/// Per-symbol errors are collected into the returned stats; only failing to
/// build the thread pool is an error here.
pub fn run_all(
    by_symbol: FragmentsBySymbol,
    config: &RunConfig,
    progress: Option<&ProgressBar>,
) -> Result<MergeStats> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .map_err(|e| AppError::Other(format!("Failed to build thread pool: {}", e)))?;

    debug!(symbols = by_symbol.len(), threads = pool.current_num_threads(), "Starting merge");

    let work: Vec<(String, Vec<SourceFragment>)> = by_symbol.into_iter().collect();
    let results: Vec<(String, Result<SymbolOutcome>)> = pool.install(|| {
        work.into_par_iter()
            .map(|(symbol, fragments)| {
                let result = process_symbol(&symbol, fragments, config);
                if let Some(pb) = progress {
                    pb.set_message(symbol.clone());
                    pb.inc(1);
                }
                (symbol, result)
            })
            .collect()
    });

    let mut stats = MergeStats::new();
    for (symbol, result) in results {
        match result {
            Ok(outcome) => stats.record(&outcome),
            Err(e) => {
                error!(symbol = %symbol, error = %e, "Symbol failed");
                stats.record_error(&symbol, e);
            }
        }
    }

    Ok(stats)
}
