// mod.rs - Core logic module

pub mod breakpoint;
pub mod config;
pub mod engine;
pub mod information;
pub mod parents;
pub mod recombination;
pub mod scoring;
pub mod significance;
pub mod window;

// Re-export main types for convenience
pub use breakpoint::{breakpoint_strength, scan_breakpoints, BreakpointTable};
pub use config::{GapHandling, MergePolicy, ScanConfig, SiteMode};
pub use engine::{ScanEngine, ScanReport, SiteFiltering};
pub use information::{information_content, SymbolCounts};
pub use parents::{assign_major_parent, ParentAssignment};
pub use recombination::{detect_regions, LineageRegions, RecombinantRegion};
pub use scoring::{score_sites, SiteScoreTable};
pub use significance::{
    assess_regions, mann_whitney_u, RankSumOutcome, SignificanceResult, SignificanceSummary,
};
pub use window::{aggregate_windows, Window, WindowScoreTable};
