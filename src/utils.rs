use chrono::NaiveDate;
use std::path::PathBuf;

use crate::constants::{CLI_DATE_FORMAT, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, MAX_SYMBOL_LEN};
use crate::error::{AppError, Result};

/// Get fragment input directory from environment variable or use default
pub fn get_input_dir() -> PathBuf {
    std::env::var("KLINEMERGE_INPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_INPUT_DIR))
}

/// Get artifact output directory from environment variable or use default
pub fn get_output_dir() -> PathBuf {
    std::env::var("KLINEMERGE_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// Parse a `YYYY-MM-DD` command line date
pub fn parse_cli_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), CLI_DATE_FORMAT)
        .map_err(|e| AppError::InvalidInput(format!("Invalid date '{}': {}", value, e)))
}

/// Parse symbols from command line argument
pub fn parse_symbols(symbols_arg: Option<String>) -> Result<Option<Vec<String>>> {
    match symbols_arg {
        None => Ok(None), // Process all symbols
        Some(symbols_str) => {
            let symbols: Vec<String> = symbols_str
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();

            if symbols.is_empty() {
                return Err(AppError::InvalidInput("No valid symbols specified".to_string()));
            }

            for symbol in &symbols {
                validate_symbol(symbol)?;
            }

            Ok(Some(symbols))
        }
    }
}

/// Check if a symbol should be processed based on target symbols filter
pub fn should_process_symbol(symbol: &str, target_symbols: &Option<Vec<String>>) -> bool {
    match target_symbols {
        None => true,
        Some(symbols) => symbols.contains(&symbol.to_uppercase()),
    }
}

/// Validate symbol format
pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(AppError::InvalidInput("Symbol cannot be empty".to_string()));
    }

    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(AppError::InvalidInput(format!("Symbol too long: {}", symbol)));
    }

    // Artifact names use '_' as separator, so only alphanumerics are allowed
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid symbol format: {}. Only alphanumeric characters allowed",
            symbol
        )));
    }

    Ok(())
}
