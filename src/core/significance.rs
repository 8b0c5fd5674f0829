// significance.rs - Mann-Whitney U rank-sum test and region significance

use log::debug;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::core::parents::ParentAssignment;
use crate::core::recombination::{LineageRegions, RecombinantRegion};
use crate::core::scoring::SiteScoreTable;

/// Regions with a p-value below this are significant
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// The exact null distribution is used when either sample is at most this size
const EXACT_MAX_SAMPLE: usize = 8;

/// Result of a two-sided rank-sum test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "p_value", rename_all = "snake_case")]
pub enum RankSumOutcome {
    Computed(f64),
    /// Empty sample or no variation at all; treated as non-significant
    Indeterminate,
}

impl RankSumOutcome {
    pub fn p_value(&self) -> Option<f64> {
        match self {
            RankSumOutcome::Computed(p) => Some(*p),
            RankSumOutcome::Indeterminate => None,
        }
    }

    /// The computed p-value, or 1 when the test was indeterminate
    pub fn p_value_or_neutral(&self) -> f64 {
        self.p_value().unwrap_or(1.0)
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        matches!(self, RankSumOutcome::Computed(p) if *p < alpha)
    }
}

/// Two-sided Mann-Whitney U test.
///
/// Tie-free samples where either side is small use the exact null
/// distribution of U; otherwise a normal approximation with tie and
/// continuity corrections.
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> RankSumOutcome {
    let (n1, n2) = (x.len(), y.len());
    if n1 == 0 || n2 == 0 {
        return RankSumOutcome::Indeterminate;
    }

    let mut pooled: Vec<(f64, bool)> = x
        .iter()
        .map(|&v| (v, true))
        .chain(y.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = pooled.len();
    let mut rank_sum_x = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && pooled[j].0 == pooled[i].0 {
            j += 1;
        }
        // Average of the 1-based ranks i+1..=j
        let rank = (i + 1 + j) as f64 / 2.0;
        let from_x = pooled[i..j].iter().filter(|(_, in_x)| *in_x).count();
        rank_sum_x += rank * from_x as f64;

        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let nf = n as f64;
    if tie_term >= nf * nf * nf - nf {
        return RankSumOutcome::Indeterminate;
    }

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let u1 = rank_sum_x - n1f * (n1f + 1.0) / 2.0;
    let u = u1.max(n1f * n2f - u1);

    let p = if tie_term == 0.0 && (n1 <= EXACT_MAX_SAMPLE || n2 <= EXACT_MAX_SAMPLE) {
        2.0 * exact_upper_tail(n1, n2, u.round() as usize)
    } else {
        let mu = n1f * n2f / 2.0;
        let sigma = (n1f * n2f / 12.0 * ((nf + 1.0) - tie_term / (nf * (nf - 1.0)))).sqrt();
        let z = (u - mu - 0.5) / sigma;
        2.0 * Normal::standard().sf(z)
    };

    RankSumOutcome::Computed(p.clamp(0.0, 1.0))
}

/// P(U >= u) under the null hypothesis for sample sizes `m` and `n`.
///
/// The number of orderings with U = k is the k-th coefficient of the Gaussian
/// binomial `[m+n choose m]`, built as a product of `(1 - q^(n+i)) / (1 - q^i)`
/// over the smaller sample.
fn exact_upper_tail(m: usize, n: usize, u: usize) -> f64 {
    let (m, n) = (m.min(n), m.max(n));
    let mut counts = vec![0.0; m * n + 1];
    counts[0] = 1.0;
    for i in 1..=m {
        for k in (n + i..counts.len()).rev() {
            counts[k] -= counts[k - n - i];
        }
        for k in i..counts.len() {
            counts[k] += counts[k - i];
        }
    }

    let total: f64 = counts.iter().sum();
    counts.iter().skip(u).sum::<f64>() / total
}

/// Outcome of comparing one minor-parent region against the major parent
#[derive(Debug, Clone, Serialize)]
pub struct SignificanceResult {
    pub lineage: String,
    pub region: RecombinantRegion,
    pub mean_wic: f64,
    pub outcome: RankSumOutcome,
    pub significant: bool,
}

/// Every region of every non-major lineage, tested against the major parent
#[derive(Debug, Clone, Serialize)]
pub struct SignificanceSummary {
    pub results: Vec<SignificanceResult>,
    pub recombination_detected: bool,
}

pub fn assess_regions(
    sites: &SiteScoreTable,
    lineage_regions: &[LineageRegions],
    parent: &ParentAssignment,
) -> SignificanceSummary {
    let mut results = Vec::new();

    for entry in lineage_regions {
        if entry.lineage == parent.major_parent {
            continue;
        }
        let Some(lineage) = sites.lineage_index(&entry.lineage) else {
            continue;
        };

        for region in &entry.regions {
            let own = sites.range(lineage, region.left, region.right);
            let major = sites.range(parent.lineage_index, region.left, region.right);
            let mean_wic = own.iter().sum::<f64>() / region.length() as f64;
            let outcome = mann_whitney_u(own, major);
            let significant = outcome.is_significant(SIGNIFICANCE_LEVEL);

            debug!(
                "Region {}-{} of '{}': mWIC {:.4}, p = {:.4e}",
                region.left_label,
                region.right_label,
                entry.lineage,
                mean_wic,
                outcome.p_value_or_neutral()
            );

            results.push(SignificanceResult {
                lineage: entry.lineage.clone(),
                region: *region,
                mean_wic,
                outcome,
                significant,
            });
        }
    }

    let recombination_detected = results.iter().any(|r| r.significant);
    SignificanceSummary {
        results,
        recombination_detected,
    }
}
