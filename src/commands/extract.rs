//! Extract Command
//!
//! Unpacks downloaded Binance Vision ZIP archives next to themselves so the
//! merge command can read the CSV fragments.

use crate::binance::extract_archives;
use crate::cli::ExtractArgs;
use crate::error::{AppError, Error};
use crate::utils::get_input_dir;

pub fn run(args: ExtractArgs) -> Result<(), Error> {
    let input_dir = args.input_dir.unwrap_or_else(get_input_dir);

    println!("📦 Extracting archives in {}", input_dir.display());
    if args.keep_archives {
        println!("  Archives will be kept");
    }

    let stats = extract_archives(&input_dir, args.recursive, args.keep_archives)?;
    stats.print_summary();

    if !stats.errors.is_empty() {
        return Err(AppError::Zip(format!(
            "{} archive(s) could not be processed",
            stats.errors.len()
        )));
    }

    Ok(())
}
