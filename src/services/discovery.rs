//! Fragment discovery
//!
//! Enumerates fragment files per symbol from an input tree. Two layouts are
//! understood:
//!
//! ```text
//! symbol-dirs: {input}/{SYMBOL}/**/*.csv
//! vision:      {input}/data/{market}/{daily|monthly}/klines/{SYMBOL}/{interval}/*.csv
//! ```

use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::filename_date::fragment_from_path;
use crate::error::{AppError, Result};
use crate::models::FragmentsBySymbol;
use crate::utils::{should_process_symbol, validate_symbol};

/// Directory layout of the input tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One subdirectory per symbol
    #[default]
    SymbolDirs,
    /// Binance Vision download tree
    Vision,
}

impl Layout {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "symbol-dirs" | "symbols" | "dirs" => Ok(Layout::SymbolDirs),
            "vision" | "binance" => Ok(Layout::Vision),
            _ => Err(format!("Invalid layout: {}. Valid options: symbol-dirs, vision", s)),
        }
    }
}

/// Options controlling fragment discovery
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub layout: Layout,
    pub recursive: bool,
    /// Shell-style filename pattern (`*`, `?`, `[...]`)
    pub file_pattern: Pattern,
    /// Vision layout only: restrict to one kline interval directory (e.g. `1m`)
    pub interval: Option<String>,
    pub symbols: Option<Vec<String>>,
}

impl DiscoveryOptions {
    pub fn new(file_pattern: &str) -> Result<Self> {
        Ok(Self {
            layout: Layout::default(),
            recursive: false,
            file_pattern: Pattern::new(file_pattern).map_err(|e| {
                AppError::InvalidInput(format!("Invalid file pattern '{}': {}", file_pattern, e))
            })?,
            interval: None,
            symbols: None,
        })
    }
}

/// Discover fragments under `input_dir`, grouped by uppercase symbol
pub fn discover_fragments(input_dir: &Path, options: &DiscoveryOptions) -> Result<FragmentsBySymbol> {
    if !input_dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "Input directory not found: {}",
            input_dir.display()
        )));
    }

    let mut by_symbol = FragmentsBySymbol::new();
    for (symbol, dir, depth) in symbol_dirs(input_dir, options)? {
        let files = matching_files(&dir, depth, &options.file_pattern);
        if files.is_empty() {
            debug!(symbol = %symbol, dir = %dir.display(), "No matching files");
            continue;
        }

        let fragments = by_symbol.entry(symbol.clone()).or_default();
        fragments.extend(files.iter().map(|path| fragment_from_path(&symbol, path)));
    }

    for (symbol, fragments) in by_symbol.iter_mut() {
        fragments.sort_by(|a, b| a.path.cmp(&b.path));
        fragments.dedup_by(|a, b| a.path == b.path);
        info!(symbol = %symbol, fragments = fragments.len(), "Discovered fragments");
    }

    Ok(by_symbol)
}

/// (symbol, directory, max walk depth) triples to scan
fn symbol_dirs(input_dir: &Path, options: &DiscoveryOptions) -> Result<Vec<(String, PathBuf, usize)>> {
    let depth = if options.recursive { usize::MAX } else { 1 };
    let mut dirs = Vec::new();

    match options.layout {
        Layout::SymbolDirs => {
            for dir in subdirectories(input_dir)? {
                if let Some(symbol) = accepted_symbol(&dir, options) {
                    dirs.push((symbol, dir, depth));
                }
            }
        }
        Layout::Vision => {
            let data_dir = input_dir.join("data");
            if !data_dir.is_dir() {
                return Err(AppError::NotFound(format!(
                    "Binance Vision data directory not found: {}",
                    data_dir.display()
                )));
            }

            for market_dir in subdirectories(&data_dir)? {
                for period in ["monthly", "daily"] {
                    let klines_dir = market_dir.join(period).join("klines");
                    if !klines_dir.is_dir() {
                        continue;
                    }
                    for symbol_dir in subdirectories(&klines_dir)? {
                        let symbol = match accepted_symbol(&symbol_dir, options) {
                            Some(symbol) => symbol,
                            None => continue,
                        };
                        for interval_dir in subdirectories(&symbol_dir)? {
                            let interval = dir_name(&interval_dir).unwrap_or_default();
                            if options.interval.as_deref().is_some_and(|wanted| wanted != interval) {
                                continue;
                            }
                            dirs.push((symbol.clone(), interval_dir, depth));
                        }
                    }
                }
            }
        }
    }

    Ok(dirs)
}

fn accepted_symbol(dir: &Path, options: &DiscoveryOptions) -> Option<String> {
    let symbol = dir_name(dir)?.to_uppercase();
    if let Err(e) = validate_symbol(&symbol) {
        warn!(dir = %dir.display(), error = %e, "Skipping directory with invalid symbol name");
        return None;
    }
    should_process_symbol(&symbol, &options.symbols).then_some(symbol)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::Io(format!("Failed to read {}: {}", dir.display(), e)))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::Io(format!("Failed to read directory entry: {}", e)))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn matching_files(dir: &Path, max_depth: usize, pattern: &Pattern) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to read entry during discovery");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| !name.starts_with('.') && pattern.matches(name))
        })
        .map(|entry| entry.into_path())
        .collect()
}

fn dir_name(dir: &Path) -> Option<String> {
    dir.file_name().and_then(|n| n.to_str()).map(str::to_string)
}
