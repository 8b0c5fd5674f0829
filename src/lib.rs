// lib.rs - wicscan library root

//! # wicscan - Recombination scanner based on weighted information content
//!
//! Given an aligned set of sequences, a query and a list of candidate parental
//! lineages, wicscan scores how much each lineage explains the query at every
//! site, slides a window over those scores, merges windows where a single
//! lineage dominates into recombinant regions, picks the major parent and
//! tests every other parent's regions with a Mann-Whitney U test.
//!
//! ## Features
//!
//! - **Weighted information content**: per-site conservation of each lineage weighted by its match to the query
//! - **Region detection**: greedy, length-capped merging of dominant windows, parallel across lineages
//! - **Significance**: exact or tie-corrected normal Mann-Whitney U, with an explicit indeterminate outcome
//! - **Breakpoint scan**: optional single-step `-lg(p)` signal per lineage
//! - **Outputs**: TSV tables, a text report, run records and a JSON summary
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use wicscan::prelude::*;
//!
//! let matrix = AlignmentMatrix::from_fasta(std::path::Path::new("alignment.fasta"))?;
//! let engine = ScanEngine::new(ScanConfig::default())?;
//! let report = engine.run(&matrix, &["BA.1".to_string(), "BA.2".to_string()], "XE_")?;
//!
//! if let Some(parent) = &report.parent {
//!     println!("major parent: {}", parent.major_parent);
//! }
//! # Ok::<(), wicscan::ScanError>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, Config, ValidationResult};
    pub use crate::core::{GapHandling, MergePolicy, ScanConfig, SiteMode};
    pub use crate::core::{RankSumOutcome, RecombinantRegion, ScanEngine, ScanReport};
    pub use crate::data::{load_lineage_markers, AlignmentMatrix};
    pub use crate::error::{Result, ScanError};
    pub use crate::output::{default_output_dir, write_all};
}

// Re-export main types at the root level for convenience
pub use crate::core::{ScanConfig, ScanEngine, ScanReport};
pub use crate::data::AlignmentMatrix;
pub use crate::error::ScanError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "wicscan v{} - Recombination scanner based on weighted information content",
        VERSION
    )
}
