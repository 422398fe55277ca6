mod artifact;
mod fragment;
mod outcome;
mod row;
mod run_config;
mod schema;

pub use artifact::{ArtifactName, MergedArtifact, MergedRow};
pub use fragment::{Granularity, SourceFragment};
pub use outcome::{MergeStats, SymbolOutcome};
pub use row::{NormalizedRow, SourceTable};
pub use run_config::{ResumeCursor, RunConfig};
pub use schema::{CanonicalSchema, SchemaPolicy};

use std::collections::BTreeMap;

/// Fragments grouped by symbol (symbol -> fragments)
pub type FragmentsBySymbol = BTreeMap<String, Vec<SourceFragment>>;
