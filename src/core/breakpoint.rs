// breakpoint.rs - Single-step breakpoint strength scan

use indicatif::ProgressBar;
use log::warn;
use rayon::prelude::*;

use crate::core::scoring::SiteScoreTable;
use crate::core::significance::{mann_whitney_u, RankSumOutcome};

/// `-log10(p)` of a left/right rank-sum comparison at every window centre
#[derive(Debug, Clone)]
pub struct BreakpointTable {
    center_rows: Vec<usize>,
    center_labels: Vec<usize>,
    lineages: Vec<String>,
    strengths: Vec<Vec<f64>>,
}

impl BreakpointTable {
    pub fn center_labels(&self) -> &[usize] {
        &self.center_labels
    }

    pub fn center_rows(&self) -> &[usize] {
        &self.center_rows
    }

    pub fn lineages(&self) -> &[String] {
        &self.lineages
    }

    pub fn lineage_strengths(&self, lineage: usize) -> &[f64] {
        &self.strengths[lineage]
    }

    pub fn is_empty(&self) -> bool {
        self.center_rows.is_empty()
    }

    /// Centre label and value of a lineage's strongest signal (first on ties)
    pub fn strongest(&self, lineage: usize) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &s) in self.strengths[lineage].iter().enumerate() {
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((i, s));
            }
        }
        best.map(|(i, s)| (self.center_labels[i], s))
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, Vec<f64>)> + '_ {
        self.center_labels.iter().enumerate().map(move |(w, &label)| {
            (label, self.strengths.iter().map(|col| col[w]).collect())
        })
    }
}

/// Breakpoint strength for one test outcome; indeterminate counts as p = 1
pub fn breakpoint_strength(outcome: RankSumOutcome) -> f64 {
    let p = outcome.p_value_or_neutral().max(f64::MIN_POSITIVE);
    (-p.log10()).max(0.0)
}

/// Slide a `window_size` window by one row and compare its two halves.
///
/// The window `start..start+window_size` is split at `mid = start + window_size / 2`
/// into `start..mid` and `mid+1..end`; only the midpoint row belongs to neither half.
pub fn scan_breakpoints(sites: &SiteScoreTable, window_size: usize, progress: &ProgressBar) -> BreakpointTable {
    let site_count = sites.site_count();
    let labels = sites.site_labels();

    let window_count = if window_size > 0 && window_size <= site_count {
        site_count - window_size + 1
    } else {
        warn!(
            "Breakpoint window ({}) exceeds the {} scanned sites; no breakpoint signal produced",
            window_size, site_count
        );
        0
    };

    let center_rows: Vec<usize> = (0..window_count)
        .map(|start| (2 * start + window_size) / 2)
        .collect();

    let strengths = (0..sites.lineage_count())
        .into_par_iter()
        .map(|lineage| {
            let column = sites.lineage_scores(lineage);
            let signal: Vec<f64> = (0..window_count)
                .map(|start| {
                    let end = start + window_size;
                    let mid = (start + end) / 2;
                    let left = &column[start..mid];
                    let right = &column[(mid + 1).min(end)..end];
                    breakpoint_strength(mann_whitney_u(left, right))
                })
                .collect();
            progress.inc(1);
            signal
        })
        .collect();

    BreakpointTable {
        center_labels: center_rows.iter().map(|&r| labels[r]).collect(),
        center_rows,
        lineages: sites.lineages().to_vec(),
        strengths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_of_neutral_outcomes_is_zero() {
        assert_eq!(breakpoint_strength(RankSumOutcome::Indeterminate), 0.0);
        assert_eq!(breakpoint_strength(RankSumOutcome::Computed(1.0)), 0.0);
        assert!((breakpoint_strength(RankSumOutcome::Computed(0.01)) - 2.0).abs() < 1e-12);
        assert!(breakpoint_strength(RankSumOutcome::Computed(0.0)).is_finite());
    }

    #[test]
    fn test_step_change_peaks_at_midpoint() {
        let n = 400;
        let a: Vec<f64> = (0..n).map(|i| if i < 200 { 2.0 } else { 0.0 }).collect();
        let sites = SiteScoreTable::new((1..=n).collect(), vec!["A".to_string()], vec![a]).unwrap();
        let table = scan_breakpoints(&sites, 200, &ProgressBar::hidden());

        assert_eq!(table.center_rows().len(), 201);
        assert_eq!(table.center_rows()[0], 100);
        let (label, strength) = table.strongest(0).unwrap();
        assert!((label as i64 - 200).abs() <= 2);
        assert!(strength > 10.0);
    }

    #[test]
    fn test_halves_exclude_only_the_midpoint_row() {
        // left = [0, 1], right = [2]: exact p = 2/3. Dropping row 1 as well would give p = 1
        let sites = SiteScoreTable::new((1..=4).collect(), vec!["A".to_string()], vec![vec![0.0, 1.0, 5.0, 2.0]]).unwrap();
        let table = scan_breakpoints(&sites, 4, &ProgressBar::hidden());

        assert_eq!(table.center_rows(), &[2]);
        let expected = -(2.0f64 / 3.0).log10();
        assert!((table.lineage_strengths(0)[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_flat_signal_has_no_breakpoint() {
        let sites = SiteScoreTable::new((1..=50).collect(), vec!["A".to_string()], vec![vec![1.0; 50]]).unwrap();
        let table = scan_breakpoints(&sites, 20, &ProgressBar::hidden());
        assert!(table.lineage_strengths(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_window_larger_than_sites() {
        let sites = SiteScoreTable::new((1..=10).collect(), vec!["A".to_string()], vec![vec![1.0; 10]]).unwrap();
        let table = scan_breakpoints(&sites, 200, &ProgressBar::hidden());
        assert!(table.is_empty());
        assert!(table.strongest(0).is_none());
    }
}
