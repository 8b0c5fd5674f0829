// mod.rs - Recombinant region detection
//
// Windows where one lineage dominates every other lineage are merged into
// contiguous, length-capped regions attributable to that lineage alone.

use serde::Serialize;

pub mod candidates;
pub mod detector;
pub mod merge;

pub use candidates::candidate_centers;
pub use detector::{detect_lineage_regions, detect_regions};
pub use merge::{RegionMerger, Transition, Trial};

/// A maximal merge of dominant windows for one lineage.
///
/// `left`/`right` are row indices into the filtered site table; the labels
/// are the matching original alignment coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecombinantRegion {
    pub left: usize,
    pub right: usize,
    pub left_label: usize,
    pub right_label: usize,
}

impl RecombinantRegion {
    /// Number of rows counted against the fragment cap
    pub fn length(&self) -> usize {
        self.right - self.left + 1
    }

    /// Contribution to the lineage's total coverage
    pub fn span(&self) -> usize {
        self.right - self.left
    }
}

/// Every region found for one lineage, in emission order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineageRegions {
    pub lineage: String,
    pub regions: Vec<RecombinantRegion>,
}

impl LineageRegions {
    pub fn coverage(&self) -> usize {
        self.regions.iter().map(|r| r.span()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
