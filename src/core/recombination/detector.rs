// detector.rs - Per-lineage region detection

use log::debug;
use rayon::prelude::*;

use super::candidates::candidate_centers;
use super::merge::RegionMerger;
use super::{LineageRegions, RecombinantRegion};
use crate::core::config::ScanConfig;
use crate::core::scoring::SiteScoreTable;
use crate::core::window::WindowScoreTable;

/// Regions of one lineage. Reads only the shared tables.
pub fn detect_lineage_regions(
    sites: &SiteScoreTable,
    windows: &WindowScoreTable,
    lineage: usize,
    config: &ScanConfig,
) -> LineageRegions {
    let max_entropy = config.max_entropy();
    let centers = candidate_centers(windows, lineage, max_entropy, config.confidence_threshold);

    let merger = RegionMerger {
        sites,
        lineage,
        centers: &centers,
        step_size: config.step_size,
        max_fragment_length: config.max_fragment_length,
        max_entropy,
        confidence_threshold: config.confidence_threshold,
        policy: config.merge_policy,
    };

    let labels = sites.site_labels();
    let last_row = sites.site_count().saturating_sub(1);
    let regions: Vec<RecombinantRegion> = merger
        .run()
        .into_iter()
        .map(|(left, right)| RecombinantRegion {
            left,
            right,
            left_label: labels[left.min(last_row)],
            right_label: labels[right.min(last_row)],
        })
        .collect();

    debug!(
        "Lineage '{}': {} candidate centres, {} regions",
        sites.lineages()[lineage],
        centers.len(),
        regions.len()
    );

    LineageRegions {
        lineage: sites.lineages()[lineage].clone(),
        regions,
    }
}

/// Regions for every lineage, in lineage order
pub fn detect_regions(
    sites: &SiteScoreTable,
    windows: &WindowScoreTable,
    config: &ScanConfig,
) -> Vec<LineageRegions> {
    (0..sites.lineage_count())
        .into_par_iter()
        .map(|lineage| detect_lineage_regions(sites, windows, lineage, config))
        .collect()
}
