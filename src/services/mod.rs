pub mod artifact_writer;
pub mod discovery;
pub mod filename_date;
pub mod merger;
pub mod pipeline;
pub mod resume_cursor;
pub mod row_normalizer;
pub mod schema_resolver;
pub mod symbol_lock;

pub use artifact_writer::{ensure_output_dir, write_artifact};
pub use discovery::{discover_fragments, DiscoveryOptions, Layout};
pub use filename_date::{fragment_from_path, parse_date_from_filename};
pub use merger::{merge_fragments, FragmentRows};
pub use pipeline::{process_symbol, run_all};
pub use resume_cursor::{admit_fragments, list_artifact_symbols, list_symbol_artifacts, resolve_resume_cursor};
pub use row_normalizer::{normalize_fragment, read_source_table};
pub use schema_resolver::resolve_schema;
pub use symbol_lock::SymbolLock;
