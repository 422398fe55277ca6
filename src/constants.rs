//! Kline Format Constants
//!
//! Column layout and naming conventions for Binance kline fragments and the
//! merged artifacts produced from them.
//!
//! ## Kline CSV Layout
//!
//! Binance publishes 12 columns per kline. Older spot archives ship without a
//! header row, newer ones (and futures archives) include one:
//!
//! ```text
//! open_time,open,high,low,close,volume,close_time,quote_volume,count,
//! taker_buy_volume,taker_buy_quote_volume,ignore
//! ```
//!
//! Since 2025 some spot archives record `open_time`/`close_time` in
//! microseconds (16 digits) instead of milliseconds (13 digits).

/// Fixed header used by the `kline` schema policy
pub const CANONICAL_KLINES_HEADERS: [&str; 12] = [
    "open_time",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "close_time",
    "quote_volume",
    "count",
    "taker_buy_volume",
    "taker_buy_quote_volume",
    "ignore",
];

/// Normalized name of the secondary timestamp column
pub const CLOSE_TIME_COLUMN: &str = "close_time";

/// Field delimiter for fragments and artifacts
pub const FIELD_DELIMITER: u8 = b',';

/// Digit count of an epoch timestamp recorded in microseconds
pub const MICROS_TIMESTAMP_DIGITS: usize = 16;

/// Digits dropped to bring a microsecond timestamp back to milliseconds
pub const MICROS_TO_MILLIS_DIGITS: usize = 3;

/// Date format embedded in artifact filenames
pub const ARTIFACT_DATE_FORMAT: &str = "%Y%m%d";

/// Date format accepted on the command line
pub const CLI_DATE_FORMAT: &str = "%Y-%m-%d";

/// First day Binance Vision publishes spot klines for
pub const DEFAULT_START_DATE: &str = "2017-01-01";

/// Default location of downloaded fragments
pub const DEFAULT_INPUT_DIR: &str = "downloaded_klines";

/// Default location of merged artifacts
pub const DEFAULT_OUTPUT_DIR: &str = "merged_klines";

/// Default filename glob for fragment discovery
pub const DEFAULT_FILE_PATTERN: &str = "*.csv";

/// Maximum accepted symbol length
pub const MAX_SYMBOL_LEN: usize = 20;
