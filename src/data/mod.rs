// mod.rs - Data structures module

pub mod alignment;
pub mod groups;

// Re-export main types for convenience
pub use alignment::{AlignmentMatrix, FilteredAlignment, GAP};
pub use groups::{load_lineage_markers, resolve_lineages, LineageGroup, QueryGroup};
