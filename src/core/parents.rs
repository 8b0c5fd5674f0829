// parents.rs - Major parent assignment

use serde::Serialize;

use crate::core::recombination::LineageRegions;
use crate::core::scoring::SiteScoreTable;

/// Below this share of the maximum entropy the major parent is flagged weak
pub const WEAK_PARENT_SHARE: f64 = 0.5;

/// The lineage covering the most of the query, with its genome-wide mWIC
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentAssignment {
    pub major_parent: String,
    pub lineage_index: usize,
    pub coverage: usize,
    pub genome_mean_wic: f64,
    pub weak: bool,
    /// Total region coverage of every lineage with at least one region
    pub coverages: Vec<(String, usize)>,
}

impl ParentAssignment {
    pub fn is_major(&self, lineage: &str) -> bool {
        self.major_parent == lineage
    }
}

/// Pick the lineage with the largest total region coverage.
///
/// Ties go to the lineage listed first. `None` when no lineage has a region.
pub fn assign_major_parent(
    sites: &SiteScoreTable,
    lineage_regions: &[LineageRegions],
    max_entropy: f64,
) -> Option<ParentAssignment> {
    let coverages: Vec<(String, usize)> = lineage_regions
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| (l.lineage.clone(), l.coverage()))
        .collect();

    let mut best: Option<&(String, usize)> = None;
    for entry in &coverages {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    let (major_parent, coverage) = best.cloned()?;

    let lineage_index = sites.lineage_index(&major_parent)?;
    let genome_mean_wic = sites.genome_mean(lineage_index);

    Some(ParentAssignment {
        major_parent,
        lineage_index,
        coverage,
        genome_mean_wic,
        weak: genome_mean_wic / max_entropy < WEAK_PARENT_SHARE,
        coverages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recombination::RecombinantRegion;

    fn region(left: usize, right: usize) -> RecombinantRegion {
        RecombinantRegion {
            left,
            right,
            left_label: left + 1,
            right_label: right + 1,
        }
    }

    fn sites() -> SiteScoreTable {
        SiteScoreTable::new(
            (1..=4).collect(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![vec![2.0; 4], vec![0.5; 4], vec![1.0; 4]],
        ).unwrap()
    }

    #[test]
    fn test_largest_coverage_wins() {
        let regions = vec![
            LineageRegions { lineage: "A".into(), regions: vec![region(0, 10)] },
            LineageRegions { lineage: "B".into(), regions: vec![region(0, 8), region(20, 30)] },
            LineageRegions { lineage: "C".into(), regions: vec![] },
        ];
        let parent = assign_major_parent(&sites(), &regions, 2.0).unwrap();
        assert_eq!(parent.major_parent, "B");
        assert_eq!(parent.coverage, 18);
        assert_eq!(parent.genome_mean_wic, 0.5);
        assert!(parent.weak);
        assert_eq!(parent.coverages.len(), 2);
    }

    #[test]
    fn test_tie_goes_to_first_lineage() {
        let regions = vec![
            LineageRegions { lineage: "C".into(), regions: vec![region(0, 10)] },
            LineageRegions { lineage: "A".into(), regions: vec![region(5, 15)] },
        ];
        let parent = assign_major_parent(&sites(), &regions, 2.0).unwrap();
        assert_eq!(parent.major_parent, "C");
        assert!(!parent.weak);
    }

    #[test]
    fn test_no_regions_means_no_parent() {
        let regions = vec![LineageRegions { lineage: "A".into(), regions: vec![] }];
        assert!(assign_major_parent(&sites(), &regions, 2.0).is_none());
    }
}
