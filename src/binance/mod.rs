//! Binance Vision Data Module
//!
//! Helpers for the ZIP archives published by data.binance.vision.

pub mod archive;

pub use archive::{extract_archives, extract_csv_from_zip, list_archives, ExtractStats};
