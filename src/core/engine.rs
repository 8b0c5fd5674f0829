// engine.rs - Recombination scan pipeline
//
// filter sites → score (site, lineage) → window means → regions per lineage
// → major parent → significance of the other parents → optional breakpoints

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;

use crate::core::breakpoint::{scan_breakpoints, BreakpointTable};
use crate::core::config::{GapHandling, ScanConfig, SiteMode};
use crate::core::parents::{assign_major_parent, ParentAssignment};
use crate::core::recombination::{detect_regions, LineageRegions};
use crate::core::scoring::{score_sites, SiteScoreTable};
use crate::core::significance::{assess_regions, SignificanceSummary};
use crate::core::window::{aggregate_windows, WindowScoreTable};
use crate::data::{resolve_lineages, AlignmentMatrix, QueryGroup};
use crate::error::{Result, ScanError};

/// Which columns survived filtering
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteFiltering {
    pub sites_total: usize,
    pub sites_scanned: usize,
    pub gap_sites_removed: Vec<usize>,
    pub monomorphic_sites_removed: Vec<usize>,
}

/// Everything one scan produces
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub query: String,
    pub config: ScanConfig,
    pub max_entropy: f64,
    pub filtering: SiteFiltering,
    pub site_scores: SiteScoreTable,
    pub window_scores: WindowScoreTable,
    pub regions: Vec<LineageRegions>,
    pub parent: Option<ParentAssignment>,
    pub significance: Option<SignificanceSummary>,
    pub breakpoints: Option<BreakpointTable>,
}

impl ScanReport {
    /// True when at least one minor-parent region is significant
    pub fn recombination_detected(&self) -> bool {
        self.significance
            .as_ref()
            .is_some_and(|s| s.recombination_detected)
    }

    /// Lineages with regions, excluding the major parent
    pub fn other_parents(&self) -> impl Iterator<Item = &LineageRegions> + '_ {
        self.regions.iter().filter(move |l| {
            !l.is_empty()
                && self
                    .parent
                    .as_ref()
                    .map_or(true, |p| !p.is_major(&l.lineage))
        })
    }
}

/// Configured scan engine; holds no per-run state
pub struct ScanEngine {
    config: ScanConfig,
    show_progress: bool,
}

impl ScanEngine {
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            show_progress: false,
        })
    }

    /// Draw progress bars for the per-lineage stages
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Apply the gap and site-mode filters, gaps first
    pub fn prepare_sites(&self, matrix: &AlignmentMatrix) -> Result<(AlignmentMatrix, SiteFiltering)> {
        let mut filtering = SiteFiltering {
            sites_total: matrix.site_count(),
            ..Default::default()
        };

        let mut current = matrix.clone();
        if self.config.gap_handling == GapHandling::Discard {
            let filtered = current.discard_gap_sites();
            filtering.gap_sites_removed = filtered.removed_sites;
            current = filtered.matrix;
        }
        if self.config.site_mode == SiteMode::PolymorphicOnly {
            let filtered = current.retain_polymorphic_sites();
            filtering.monomorphic_sites_removed = filtered.removed_sites;
            current = filtered.matrix;
        }

        filtering.sites_scanned = current.site_count();
        if current.site_count() == 0 {
            return Err(ScanError::invalid_alignment(format!(
                "no sites left after filtering ({}, {})",
                self.config.gap_handling.description(),
                self.config.site_mode.description()
            )));
        }

        info!(
            "Scanning {} of {} sites ({} gap sites, {} monomorphic sites removed)",
            filtering.sites_scanned,
            filtering.sites_total,
            filtering.gap_sites_removed.len(),
            filtering.monomorphic_sites_removed.len()
        );
        Ok((current, filtering))
    }

    pub fn run(
        &self,
        matrix: &AlignmentMatrix,
        lineage_markers: &[String],
        query_marker: &str,
    ) -> Result<ScanReport> {
        let lineages = resolve_lineages(matrix, lineage_markers)?;
        let query = QueryGroup::resolve(matrix, query_marker)?;
        let (filtered, filtering) = self.prepare_sites(matrix)?;
        let max_entropy = self.config.max_entropy();

        info!("Calculating weighted information content for {} lineages", lineages.len());
        let progress = self.progress_bar(lineages.len(), "Scoring lineages");
        let site_scores = score_sites(&filtered, &lineages, &query, max_entropy, &progress)?;
        progress.finish_and_clear();

        info!(
            "Sliding-window scan (window {}, step {})",
            self.config.window_size, self.config.step_size
        );
        let window_scores = aggregate_windows(&site_scores, self.config.window_size, self.config.step_size);

        let regions = detect_regions(&site_scores, &window_scores, &self.config);
        let parent = assign_major_parent(&site_scores, &regions, max_entropy);

        let significance = match &parent {
            Some(parent) => {
                info!(
                    "Major parent: {} (global mWIC: {:.4})",
                    parent.major_parent, parent.genome_mean_wic
                );
                Some(assess_regions(&site_scores, &regions, parent))
            }
            None => {
                info!("No lineage dominates any region of {}", query_marker);
                None
            }
        };

        let breakpoints = if self.config.breakpoint_scan_enabled() {
            info!(
                "Breakpoint scan (window {}, step 1)",
                self.config.breakpoint_window_size
            );
            let progress = self.progress_bar(lineages.len(), "Breakpoint scan");
            let table = scan_breakpoints(&site_scores, self.config.breakpoint_window_size, &progress);
            progress.finish_and_clear();
            Some(table)
        } else {
            if self.config.run_breakpoint_scan {
                warn!("Breakpoint scan is only run over polymorphic sites; skipped");
            }
            None
        };

        Ok(ScanReport {
            query: query_marker.to_string(),
            config: self.config.clone(),
            max_entropy,
            filtering,
            site_scores,
            window_scores,
            regions,
            parent,
            significance,
            breakpoints,
        })
    }

    fn progress_bar(&self, len: usize, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MergePolicy;
    use crate::data::GAP;

    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

    /// Deterministic "random" base that differs from `avoid`
    fn other_base(avoid: u8, salt: usize) -> u8 {
        let candidates: Vec<u8> = BASES.iter().copied().filter(|&b| b != avoid).collect();
        candidates[salt % candidates.len()]
    }

    fn query_sequence(len: usize) -> Vec<u8> {
        (0..len).map(|i| BASES[(i * 7 + i / 3) % 4]).collect()
    }

    /// Copy of `query` that matches it where `matches(site)` and differs elsewhere
    fn lineage_sequence<F: Fn(usize) -> bool>(query: &[u8], salt: usize, matches: F) -> Vec<u8> {
        query
            .iter()
            .enumerate()
            .map(|(i, &b)| if matches(i) { b } else { other_base(b, i + salt) })
            .collect()
    }

    fn matrix(records: Vec<(&str, Vec<u8>)>) -> AlignmentMatrix {
        AlignmentMatrix::from_records(
            records
                .into_iter()
                .map(|(id, seq)| (id.to_string(), seq))
                .collect(),
        )
        .unwrap()
    }

    fn markers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn config() -> ScanConfig {
        ScanConfig {
            window_size: 100,
            step_size: 20,
            confidence_threshold: 0.9,
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_lineage_is_single_region_major_parent() {
        let n = 1000;
        let query = query_sequence(n);
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("LA_1", query.clone()),
            ("LA_2", query.clone()),
            ("LB_1", lineage_sequence(&query, 1, |_| false)),
            ("LB_2", lineage_sequence(&query, 1, |_| false)),
        ]);

        let report = ScanEngine::new(config())
            .unwrap()
            .run(&m, &markers(&["LA", "LB"]), "QRY")
            .unwrap();

        assert_eq!(report.filtering.sites_scanned, n);
        let la = &report.regions[0];
        assert_eq!(la.regions.len(), 1);
        let region = la.regions[0];
        assert!(region.left <= 50);
        assert!(region.right >= n - 50);
        assert!(report.regions[1].is_empty());

        let parent = report.parent.as_ref().unwrap();
        assert_eq!(parent.major_parent, "LA");
        assert!((parent.genome_mean_wic - 2.0).abs() < 1e-9);
        assert!(!parent.weak);
        assert_eq!(report.other_parents().count(), 0);
        assert!(!report.recombination_detected());
    }

    #[test]
    fn test_mirror_lineages_give_two_regions_and_midpoint_breakpoint() {
        let n = 1000;
        let half = n / 2;
        let query = query_sequence(n);
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("LA_1", lineage_sequence(&query, 1, |i| i < half)),
            ("LA_2", lineage_sequence(&query, 1, |i| i < half)),
            ("LB_1", lineage_sequence(&query, 2, |i| i >= half)),
            ("LB_2", lineage_sequence(&query, 2, |i| i >= half)),
        ]);

        let scan_config = ScanConfig {
            run_breakpoint_scan: true,
            max_fragment_length: 600,
            ..config()
        };
        let report = ScanEngine::new(scan_config)
            .unwrap()
            .run(&m, &markers(&["LA", "LB"]), "QRY")
            .unwrap();

        let la = &report.regions[0].regions;
        let lb = &report.regions[1].regions;
        assert_eq!(la.len(), 1);
        assert_eq!(lb.len(), 1);
        assert!(la[0].right <= lb[0].left + 20);

        // Both halves have the same coverage; the first listed lineage wins
        let parent = report.parent.as_ref().unwrap();
        assert_eq!(parent.major_parent, "LA");
        let significance = report.significance.as_ref().unwrap();
        assert_eq!(significance.results.len(), 1);
        assert_eq!(significance.results[0].lineage, "LB");
        assert!(significance.results[0].significant);
        assert!(report.recombination_detected());

        let breakpoints = report.breakpoints.as_ref().unwrap();
        let (label, strength) = breakpoints.strongest(0).unwrap();
        assert!((label as i64 - half as i64).abs() <= 5);
        assert!(strength > 10.0);
    }

    #[test]
    fn test_no_confident_lineage_reports_nothing() {
        let n = 600;
        let query = query_sequence(n);
        // Each lineage matches the query on only one site in three
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("LA_1", lineage_sequence(&query, 1, |i| i % 3 == 0)),
            ("LB_1", lineage_sequence(&query, 2, |i| i % 3 == 1)),
        ]);

        let report = ScanEngine::new(config())
            .unwrap()
            .run(&m, &markers(&["LA", "LB"]), "QRY")
            .unwrap();

        assert!(report.regions.iter().all(|l| l.is_empty()));
        assert!(report.parent.is_none());
        assert!(report.significance.is_none());
        assert!(!report.recombination_detected());
    }

    #[test]
    fn test_long_region_is_truncated_to_cap() {
        let n = 1000;
        let query = query_sequence(n);
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("LA_1", query.clone()),
            ("LB_1", lineage_sequence(&query, 1, |_| false)),
        ]);

        let capped = ScanConfig {
            max_fragment_length: 300,
            ..config()
        };
        let report = ScanEngine::new(capped)
            .unwrap()
            .run(&m, &markers(&["LA", "LB"]), "QRY")
            .unwrap();

        let regions = &report.regions[0].regions;
        assert!(!regions.is_empty());
        for region in regions {
            assert!(region.length() <= 300);
        }
        // Truncated to the longest fitting extension rather than dropped
        assert!(regions[0].length() > 300 - 20);
    }

    #[test]
    fn test_continue_policy_collects_every_block() {
        let n = 1200;
        let query = query_sequence(n);
        let la_block = |i: usize| i < 400 || i >= 800;
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("LA_1", lineage_sequence(&query, 1, la_block)),
            ("LB_1", lineage_sequence(&query, 2, |i| !la_block(i))),
        ]);

        let terminal = ScanEngine::new(config())
            .unwrap()
            .run(&m, &markers(&["LA", "LB"]), "QRY")
            .unwrap();
        assert_eq!(terminal.regions[0].regions.len(), 1);

        let continuing = ScanEngine::new(ScanConfig {
            merge_policy: MergePolicy::Continue,
            ..config()
        })
        .unwrap()
        .run(&m, &markers(&["LA", "LB"]), "QRY")
        .unwrap();
        assert_eq!(continuing.regions[0].regions.len(), 2);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let n = 500;
        let query = query_sequence(n);
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("QRY_2", lineage_sequence(&query, 3, |i| i % 5 != 0)),
            ("LA_1", lineage_sequence(&query, 1, |i| i < 300)),
            ("LB_1", lineage_sequence(&query, 2, |i| i >= 200)),
        ]);
        let engine = ScanEngine::new(ScanConfig {
            window_size: 50,
            step_size: 10,
            confidence_threshold: 0.5,
            run_breakpoint_scan: true,
            breakpoint_window_size: 60,
            ..Default::default()
        })
        .unwrap();

        let first = engine.run(&m, &markers(&["LA", "LB"]), "QRY").unwrap();
        let second = engine.run(&m, &markers(&["LA", "LB"]), "QRY").unwrap();

        for l in 0..2 {
            assert_eq!(
                first.site_scores.lineage_scores(l),
                second.site_scores.lineage_scores(l)
            );
            assert_eq!(
                first.window_scores.lineage_scores(l),
                second.window_scores.lineage_scores(l)
            );
        }
        assert_eq!(first.regions, second.regions);
        assert_eq!(first.parent, second.parent);
        let p1: Vec<f64> = first.significance.iter().flat_map(|s| s.results.iter().map(|r| r.outcome.p_value_or_neutral())).collect();
        let p2: Vec<f64> = second.significance.iter().flat_map(|s| s.results.iter().map(|r| r.outcome.p_value_or_neutral())).collect();
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_retained_gaps_and_all_sites_mode() {
        let n = 600;
        let gapped = |i: usize| i % 50 == 0;
        let query: Vec<u8> = query_sequence(n)
            .into_iter()
            .enumerate()
            .map(|(i, b)| if gapped(i) { GAP } else { b })
            .collect();
        // Gap columns are shared by every row, so they are also monomorphic
        let m = matrix(vec![
            ("QRY_1", query.clone()),
            ("LA_1", query.clone()),
            ("LB_1", lineage_sequence(&query, 1, gapped)),
        ]);

        let engine = ScanEngine::new(ScanConfig {
            gap_handling: GapHandling::Retain,
            site_mode: SiteMode::AllSites,
            run_breakpoint_scan: true,
            ..config()
        })
        .unwrap();
        let report = engine.run(&m, &markers(&["LA", "LB"]), "QRY").unwrap();

        let max = 5f64.log2();
        assert!((report.max_entropy - max).abs() < 1e-12);
        assert_eq!(report.filtering.sites_total, n);
        assert_eq!(report.filtering.sites_scanned, n);
        assert!(report.filtering.gap_sites_removed.is_empty());
        assert!(report.filtering.monomorphic_sites_removed.is_empty());

        // A shared gap is scored like any conserved symbol
        assert!((report.site_scores.lineage_scores(0)[0] - max).abs() < 1e-12);
        assert!((report.site_scores.lineage_scores(1)[0] - max).abs() < 1e-12);
        assert_eq!(report.site_scores.lineage_scores(1)[1], 0.0);

        let parent = report.parent.as_ref().unwrap();
        assert_eq!(parent.major_parent, "LA");
        assert!((parent.genome_mean_wic - max).abs() < 1e-9);
        assert_eq!(report.regions[0].regions.len(), 1);
        assert!(report.regions[1].is_empty());

        assert!(!engine.config().breakpoint_scan_enabled());
        assert!(report.breakpoints.is_none());
    }

    #[test]
    fn test_missing_query_is_fatal() {
        let m = matrix(vec![("LA_1", b"ACGT".to_vec()), ("LB_1", b"ACGA".to_vec())]);
        let result = ScanEngine::new(config()).unwrap().run(&m, &markers(&["LA", "LB"]), "QRY");
        assert!(matches!(result, Err(ScanError::EmptyGroup { role: "query", .. })));
    }

    #[test]
    fn test_monomorphic_alignment_is_rejected() {
        let m = matrix(vec![("QRY_1", b"ACGT".to_vec()), ("LA_1", b"ACGT".to_vec())]);
        let result = ScanEngine::new(config()).unwrap().run(&m, &markers(&["LA"]), "QRY");
        assert!(matches!(result, Err(ScanError::InvalidAlignment { .. })));
    }

    #[test]
    fn test_invalid_config_fails_before_scanning() {
        let result = ScanEngine::new(ScanConfig {
            step_size: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
