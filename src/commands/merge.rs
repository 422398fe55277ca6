//! Merge Command
//!
//! Consolidates every symbol's new fragments into one artifact per symbol.
//! Symbols already covered up to the end date are left untouched.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::binance::extract_archives;
use crate::cli::MergeArgs;
use crate::error::{AppError, Error};
use crate::models::{RunConfig, SchemaPolicy};
use crate::services::{discover_fragments, ensure_output_dir, run_all, DiscoveryOptions, Layout};
use crate::utils::{get_input_dir, get_output_dir, parse_cli_date, parse_symbols};

/// Run the merge command
pub fn run(args: MergeArgs) -> Result<(), Error> {
    let start_time = std::time::Instant::now();

    let input_dir = args.input_dir.unwrap_or_else(get_input_dir);
    let output_dir = args.output_dir.unwrap_or_else(get_output_dir);
    let start_date = parse_cli_date(&args.start_date)?;
    let end_date = args.end_date.as_deref().map(parse_cli_date).transpose()?;
    let schema_policy = SchemaPolicy::from_str(&args.schema).map_err(AppError::InvalidInput)?;
    let layout = Layout::from_str(&args.layout).map_err(AppError::InvalidInput)?;
    let symbols = parse_symbols(args.symbols)?;

    let config = RunConfig::new(start_date, end_date, output_dir, schema_policy)?
        .with_jobs(args.jobs)
        .with_lock(args.lock);

    println!("🔧 Starting kline merge...");
    println!("  Input: {}", input_dir.display());
    println!("  Output: {}", config.output_dir.display());
    println!("  Window: {} → {}", config.start_date, config.end_date);
    println!("  Schema: {}", config.schema_policy);
    match &symbols {
        Some(list) => println!("  Symbols: {}", list.join(", ")),
        None => println!("  Symbols: ALL"),
    }
    println!();

    if args.extract {
        let recursive = args.recursive || layout == Layout::Vision;
        let stats = extract_archives(&input_dir, recursive, args.keep_archives)?;
        stats.print_summary();
        println!();
    }

    ensure_output_dir(&config.output_dir)?;

    let options = DiscoveryOptions {
        layout,
        recursive: args.recursive,
        interval: args.interval,
        symbols,
        ..DiscoveryOptions::new(&args.file_pattern)?
    };
    let by_symbol = discover_fragments(&input_dir, &options)?;

    if by_symbol.is_empty() {
        println!("⚠️  No fragments found in {}", input_dir.display());
        return Ok(());
    }

    let fragment_count: usize = by_symbol.values().map(Vec::len).sum();
    info!(symbols = by_symbol.len(), fragments = fragment_count, "Discovery complete");

    let pb = ProgressBar::new(by_symbol.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| Error::Other(format!("Invalid progress template: {}", e)))?
            .progress_chars("#>-"),
    );

    let stats = run_all(by_symbol, &config, Some(&pb))?;
    pb.finish_with_message("Merge complete");

    stats.print_summary();
    println!("\n⏱️  Completed in {:.2}s", start_time.elapsed().as_secs_f64());

    if !stats.errors.is_empty() {
        return Err(Error::Other(format!(
            "{} symbol(s) failed to merge",
            stats.errors.len()
        )));
    }

    Ok(())
}
