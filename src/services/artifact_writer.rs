//! Output Writer
//!
//! Artifacts are written to a hidden temp file in the output directory and
//! renamed into place, so a reader never sees a partially written file under
//! an artifact name.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info};

use crate::constants::FIELD_DELIMITER;
use crate::error::{AppError, Result};
use crate::models::MergedArtifact;

/// Create the output directory if needed and check that it is writable
///
/// Failure here is fatal for the whole run.
pub fn ensure_output_dir(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir).map_err(|e| {
        AppError::Io(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    if !output_dir.is_dir() {
        return Err(AppError::Io(format!(
            "Output path {} is not a directory",
            output_dir.display()
        )));
    }

    // Removed again when dropped
    NamedTempFile::new_in(output_dir).map_err(|e| {
        AppError::Io(format!(
            "Output directory {} is not writable: {}",
            output_dir.display(),
            e
        ))
    })?;

    Ok(())
}

/// Temp path used while writing `file_name`
pub fn temp_path_for(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(format!(".{}.tmp", file_name))
}

/// Write `artifact` into `output_dir`, returning the final path
pub fn write_artifact(artifact: &MergedArtifact, output_dir: &Path) -> Result<PathBuf> {
    let file_name = artifact.name().file_name();
    let final_path = output_dir.join(&file_name);
    let temp_path = temp_path_for(output_dir, &file_name);

    if let Err(e) = write_rows(artifact, &temp_path) {
        error!(file = %temp_path.display(), error = %e, "Failed to write artifact");
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if let Err(e) = fs::rename(&temp_path, &final_path) {
        error!(error = %e, "Failed to rename temp artifact");
        let _ = fs::remove_file(&temp_path);
        return Err(AppError::Io(format!(
            "Failed to move artifact into {}: {}",
            final_path.display(),
            e
        )));
    }

    info!(
        symbol = %artifact.symbol,
        path = %final_path.display(),
        rows = artifact.row_count(),
        "Artifact saved"
    );

    Ok(final_path)
}

fn write_rows(artifact: &MergedArtifact, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create {}: {}", path.display(), e)))?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .from_writer(file);

    wtr.write_record(artifact.schema.columns())?;
    for merged in &artifact.rows {
        wtr.write_record(merged.row.to_record())?;
    }

    let file = wtr
        .into_inner()
        .map_err(|e| AppError::Io(format!("Failed to flush {}: {}", path.display(), e.error())))?;
    file.sync_all()
        .map_err(|e| AppError::Io(format!("Failed to sync {}: {}", path.display(), e)))?;

    Ok(())
}
