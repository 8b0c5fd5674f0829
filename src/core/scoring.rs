// scoring.rs - Weighted information content per (site, lineage)

use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;

use crate::core::information::{information_content, SymbolCounts};
use crate::data::{AlignmentMatrix, LineageGroup, QueryGroup};
use crate::error::{Result, ScanError};

/// Per-site WIC for every lineage, columns aligned on a shared site sequence.
///
/// Each lineage column carries a prefix-sum array so any half-open row range
/// can be summed in O(1).
#[derive(Debug, Clone)]
pub struct SiteScoreTable {
    site_labels: Vec<usize>,
    lineages: Vec<String>,
    scores: Vec<Vec<f64>>,
    prefix: Vec<Vec<f64>>,
}

impl SiteScoreTable {
    /// `scores[l][s]` is the WIC of lineage `l` at row `s`; every column must
    /// have one value per site label
    pub fn new(site_labels: Vec<usize>, lineages: Vec<String>, scores: Vec<Vec<f64>>) -> Result<Self> {
        if lineages.len() != scores.len() {
            return Err(ScanError::invalid_alignment(format!(
                "{} lineages but {} score columns",
                lineages.len(),
                scores.len()
            )));
        }
        if let Some((l, col)) = scores
            .iter()
            .enumerate()
            .find(|(_, col)| col.len() != site_labels.len())
        {
            return Err(ScanError::invalid_alignment(format!(
                "score column for '{}' has {} values for {} sites",
                lineages[l],
                col.len(),
                site_labels.len()
            )));
        }

        let prefix = scores
            .iter()
            .map(|col| {
                let mut acc = Vec::with_capacity(col.len() + 1);
                acc.push(0.0);
                let mut running = 0.0;
                for &v in col {
                    running += v;
                    acc.push(running);
                }
                acc
            })
            .collect();

        Ok(Self {
            site_labels,
            lineages,
            scores,
            prefix,
        })
    }

    pub fn site_count(&self) -> usize {
        self.site_labels.len()
    }

    pub fn lineage_count(&self) -> usize {
        self.lineages.len()
    }

    pub fn site_labels(&self) -> &[usize] {
        &self.site_labels
    }

    pub fn lineages(&self) -> &[String] {
        &self.lineages
    }

    pub fn lineage_index(&self, name: &str) -> Option<usize> {
        self.lineages.iter().position(|l| l == name)
    }

    pub fn lineage_scores(&self, lineage: usize) -> &[f64] {
        &self.scores[lineage]
    }

    /// Sum of WIC over rows `start..end` (clamped to the table)
    pub fn range_sum(&self, lineage: usize, start: usize, end: usize) -> f64 {
        let end = end.min(self.site_count());
        if start >= end {
            return 0.0;
        }
        let prefix = &self.prefix[lineage];
        prefix[end] - prefix[start]
    }

    /// WIC values over rows `start..end` (clamped to the table)
    pub fn range(&self, lineage: usize, start: usize, end: usize) -> &[f64] {
        let end = end.min(self.site_count());
        let start = start.min(end);
        &self.scores[lineage][start..end]
    }

    /// Mean WIC of a lineage over the whole alignment
    pub fn genome_mean(&self, lineage: usize) -> f64 {
        if self.site_count() == 0 {
            return 0.0;
        }
        self.scores[lineage].iter().sum::<f64>() / self.site_count() as f64
    }

    /// Site label paired with each lineage's score at that row
    pub fn rows(&self) -> impl Iterator<Item = (usize, Vec<f64>)> + '_ {
        (0..self.site_count()).map(move |s| {
            (
                self.site_labels[s],
                self.scores.iter().map(|col| col[s]).collect(),
            )
        })
    }
}

/// Most frequent query symbol at a site and its frequency among query rows.
///
/// A single query sequence is its own consensus with ratio 1. Ties go to the
/// symbol seen first in query row order.
pub fn query_consensus(matrix: &AlignmentMatrix, query: &QueryGroup, site: usize) -> (u8, f64) {
    if query.is_single() {
        return (matrix.symbol(query.rows[0], site), 1.0);
    }

    let counts = SymbolCounts::from_symbols(query.rows.iter().map(|&r| matrix.symbol(r, site)));
    let mut best = matrix.symbol(query.rows[0], site);
    for &row in &query.rows {
        let symbol = matrix.symbol(row, site);
        if counts.count(symbol) > counts.count(best) {
            best = symbol;
        }
    }
    (best, counts.frequency(best))
}

/// WIC of one lineage at one site
pub fn weighted_information(
    matrix: &AlignmentMatrix,
    lineage: &LineageGroup,
    site: usize,
    consensus: (u8, f64),
    max_entropy: f64,
) -> f64 {
    let counts = SymbolCounts::from_symbols(lineage.rows.iter().map(|&r| matrix.symbol(r, site)));
    let (query_symbol, query_ratio) = consensus;
    let lineage_match_ratio = counts.frequency(query_symbol);
    lineage_match_ratio * information_content(&counts, max_entropy) * query_ratio
}

/// Score every (site, lineage) pair of an already-filtered matrix
pub fn score_sites(
    matrix: &AlignmentMatrix,
    lineages: &[LineageGroup],
    query: &QueryGroup,
    max_entropy: f64,
    progress: &ProgressBar,
) -> Result<SiteScoreTable> {
    let consensus: Vec<(u8, f64)> = (0..matrix.site_count())
        .map(|site| query_consensus(matrix, query, site))
        .collect();

    let scores: Vec<Vec<f64>> = lineages
        .par_iter()
        .map(|lineage| {
            let column: Vec<f64> = consensus
                .iter()
                .enumerate()
                .map(|(site, &c)| weighted_information(matrix, lineage, site, c, max_entropy))
                .collect();
            debug!("Scored lineage '{}' over {} sites", lineage.name, column.len());
            progress.inc(1);
            column
        })
        .collect();

    SiteScoreTable::new(
        matrix.site_labels().to_vec(),
        lineages.iter().map(|l| l.name.clone()).collect(),
        scores,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::resolve_lineages;

    fn matrix(rows: &[(&str, &str)]) -> AlignmentMatrix {
        AlignmentMatrix::from_records(
            rows.iter()
                .map(|(id, seq)| (id.to_string(), seq.as_bytes().to_vec()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_query_matching_conserved_lineage() {
        let m = matrix(&[("Q_1", "AC"), ("L1_a", "AC"), ("L1_b", "AG"), ("L2_a", "TC")]);
        let query = QueryGroup::resolve(&m, "Q_").unwrap();
        let groups = resolve_lineages(&m, &["L1".to_string(), "L2".to_string()]).unwrap();
        let table = score_sites(&m, &groups, &query, 2.0, &ProgressBar::hidden()).unwrap();

        // L1 is conserved at site 0 and matches the query
        assert!((table.lineage_scores(0)[0] - 2.0).abs() < 1e-12);
        // L1 is split at site 1: IC = 1, half its rows match
        assert!((table.lineage_scores(0)[1] - 0.5).abs() < 1e-12);
        // L2 never matches at site 0
        assert_eq!(table.lineage_scores(1)[0], 0.0);
        assert!((table.lineage_scores(1)[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_multi_query_consensus_ratio() {
        let m = matrix(&[("Q_1", "A"), ("Q_2", "A"), ("Q_3", "T"), ("L_a", "A")]);
        let query = QueryGroup::resolve(&m, "Q_").unwrap();
        let (symbol, ratio) = query_consensus(&m, &query, 0);
        assert_eq!(symbol, b'A');
        assert!((ratio - 2.0 / 3.0).abs() < 1e-12);

        let groups = resolve_lineages(&m, &["L_".to_string()]).unwrap();
        let table = score_sites(&m, &groups, &query, 2.0, &ProgressBar::hidden()).unwrap();
        assert!((table.lineage_scores(0)[0] - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_consensus_tie_goes_to_first_seen() {
        let m = matrix(&[("Q_1", "T"), ("Q_2", "A"), ("L_a", "A")]);
        let query = QueryGroup::resolve(&m, "Q_").unwrap();
        assert_eq!(query_consensus(&m, &query, 0), (b'T', 0.5));
    }

    #[test]
    fn test_range_sum_matches_direct_sum() {
        let table = SiteScoreTable::new(
            vec![1, 2, 3, 4],
            vec!["L".to_string()],
            vec![vec![0.5, 1.0, 1.5, 2.0]],
        ).unwrap();
        assert_eq!(table.range_sum(0, 1, 3), 2.5);
        assert_eq!(table.range_sum(0, 0, 10), 5.0);
        assert_eq!(table.range_sum(0, 3, 3), 0.0);
        assert_eq!(table.range(0, 2, 10), &[1.5, 2.0]);
        assert_eq!(table.genome_mean(0), 1.25);
    }

    #[test]
    fn test_mismatched_columns_are_rejected() {
        let missing_column = SiteScoreTable::new(vec![1, 2], vec!["A".to_string(), "B".to_string()], vec![vec![0.0; 2]]);
        assert!(matches!(missing_column, Err(ScanError::InvalidAlignment { .. })));

        let short_column = SiteScoreTable::new(vec![1, 2, 3], vec!["A".to_string()], vec![vec![0.0; 2]]);
        assert!(matches!(short_column, Err(ScanError::InvalidAlignment { .. })));
    }

    #[test]
    fn test_scores_bounded_by_max_entropy() {
        let m = matrix(&[
            ("Q_1", "ACGT-A"),
            ("L1_a", "ACGTAA"),
            ("L1_b", "TCG-AC"),
            ("L2_a", "GGCTTA"),
        ]);
        let query = QueryGroup::resolve(&m, "Q_").unwrap();
        let groups = resolve_lineages(&m, &["L1".to_string(), "L2".to_string()]).unwrap();
        let max = 5f64.log2();
        let table = score_sites(&m, &groups, &query, max, &ProgressBar::hidden()).unwrap();
        for (_, row) in table.rows() {
            assert!(row.iter().all(|&v| (0.0..=max).contains(&v)));
        }
    }
}
