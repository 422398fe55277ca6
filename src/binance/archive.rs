//! Binance Vision archive extraction
//!
//! Vision downloads arrive as one ZIP per fragment:
//! ```text
//! data/spot/{daily|monthly}/klines/{SYMBOL}/{interval}/{SYMBOL}-{interval}-{date}.zip
//! ```
//! Each CSV member is extracted next to its archive so discovery picks it up
//! like any other fragment. The archive is removed once every member has been
//! written, unless the caller asks to keep it.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::read::ZipArchive;

use crate::error::{AppError, Result};

/// Statistics for an extraction pass
#[derive(Debug, Default)]
pub struct ExtractStats {
    pub archives_found: usize,
    pub archives_extracted: usize,
    pub archives_removed: usize,
    pub csv_files_written: usize,
    pub errors: Vec<String>,
}

impl ExtractStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        println!("\n📦 Extract Summary:");
        println!("  ✅ Archives found: {}", self.archives_found);
        println!("  ✅ Archives extracted: {}", self.archives_extracted);
        println!("  ✅ CSV files written: {}", self.csv_files_written);
        println!("  🗑️  Archives removed: {}", self.archives_removed);

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

/// All `.zip` files under `input_dir`, sorted by path
pub fn list_archives(input_dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "Input directory not found: {}",
            input_dir.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 2 };
    let mut archives: Vec<PathBuf> = WalkDir::new(input_dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
        })
        .collect();

    archives.sort();
    Ok(archives)
}

/// Extract every CSV member of `zip_path` into `dest_dir`
///
/// Members are written under their base file name only; directory
/// components inside the archive are ignored.
pub fn extract_csv_from_zip(zip_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(zip_path)
        .map_err(|e| AppError::Io(format!("Failed to open {}: {}", zip_path.display(), e)))?;
    let mut archive = ZipArchive::new(file)?;

    if archive.len() == 0 {
        return Err(AppError::Zip(format!("Empty ZIP file: {}", zip_path.display())));
    }

    let mut written = Vec::new();
    for index in 0..archive.len() {
        let mut member = archive.by_index(index)?;
        if member.is_dir() {
            continue;
        }

        let file_name = match Path::new(member.name()).file_name().and_then(|n| n.to_str()) {
            Some(name) if name.to_lowercase().ends_with(".csv") => name.to_string(),
            _ => {
                debug!(archive = %zip_path.display(), member = member.name(), "Skipping non-CSV member");
                continue;
            }
        };

        let target = dest_dir.join(&file_name);
        let temp = dest_dir.join(format!(".{}.tmp", file_name));

        let copied = File::create(&temp)
            .and_then(|mut out| io::copy(&mut member, &mut out).and_then(|_| out.sync_all()))
            .and_then(|_| fs::rename(&temp, &target));
        if let Err(e) = copied {
            let _ = fs::remove_file(&temp);
            return Err(AppError::Io(format!(
                "Failed to extract {} from {}: {}",
                file_name,
                zip_path.display(),
                e
            )));
        }

        written.push(target);
    }

    if written.is_empty() {
        return Err(AppError::Zip(format!(
            "No CSV member found in {}",
            zip_path.display()
        )));
    }

    Ok(written)
}

/// Extract all archives under `input_dir`
///
/// Failures are recorded per archive; a failed archive is never removed.
pub fn extract_archives(input_dir: &Path, recursive: bool, keep_archives: bool) -> Result<ExtractStats> {
    let archives = list_archives(input_dir, recursive)?;
    let mut stats = ExtractStats::new();
    stats.archives_found = archives.len();

    for zip_path in archives {
        let dest_dir = match zip_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => input_dir.to_path_buf(),
        };

        match extract_csv_from_zip(&zip_path, &dest_dir) {
            Ok(files) => {
                stats.archives_extracted += 1;
                stats.csv_files_written += files.len();
                debug!(archive = %zip_path.display(), files = files.len(), "Extracted archive");

                if !keep_archives {
                    match fs::remove_file(&zip_path) {
                        Ok(()) => stats.archives_removed += 1,
                        Err(e) => {
                            warn!(archive = %zip_path.display(), error = %e, "Failed to remove archive");
                            stats.errors.push(format!("{}: {}", zip_path.display(), e));
                        }
                    }
                }
            }
            Err(e) => {
                warn!(archive = %zip_path.display(), error = %e, "Failed to extract archive");
                stats.errors.push(format!("{}: {}", zip_path.display(), e));
            }
        }
    }

    info!(
        found = stats.archives_found,
        extracted = stats.archives_extracted,
        files = stats.csv_files_written,
        "Archive extraction finished"
    );

    Ok(stats)
}
