// window.rs - Sliding-window aggregation of per-site WIC

use rayon::prelude::*;

use crate::core::scoring::SiteScoreTable;

/// One window over the (filtered) site rows, `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    /// Row index `(start + end) / 2`
    pub center_row: usize,
    /// Original alignment coordinate of the centre row
    pub center_label: usize,
}

/// Half-open row ranges of every window.
///
/// Windows start every `step_size` rows and the sequence ends with the first
/// window reaching `site_count`, which may be shorter than `window_size`.
pub fn window_bounds(site_count: usize, window_size: usize, step_size: usize) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    if site_count == 0 || window_size == 0 || step_size == 0 {
        return bounds;
    }

    let mut start = 0;
    while start < site_count {
        let end = (start + window_size).min(site_count);
        bounds.push((start, end));
        if end == site_count {
            break;
        }
        start += step_size;
    }
    bounds
}

/// Mean WIC per window and lineage; every lineage shares the same windows
#[derive(Debug, Clone)]
pub struct WindowScoreTable {
    windows: Vec<Window>,
    lineages: Vec<String>,
    scores: Vec<Vec<f64>>,
}

impl WindowScoreTable {
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn lineages(&self) -> &[String] {
        &self.lineages
    }

    pub fn lineage_scores(&self, lineage: usize) -> &[f64] {
        &self.scores[lineage]
    }

    pub fn score(&self, lineage: usize, window: usize) -> f64 {
        self.scores[lineage][window]
    }

    /// Highest score of any lineage at a window
    pub fn window_max(&self, window: usize) -> f64 {
        self.scores
            .iter()
            .map(|col| col[window])
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Centre label paired with each lineage's score at that window
    pub fn rows(&self) -> impl Iterator<Item = (usize, Vec<f64>)> + '_ {
        self.windows.iter().enumerate().map(move |(w, window)| {
            (
                window.center_label,
                self.scores.iter().map(|col| col[w]).collect(),
            )
        })
    }
}

/// Average every lineage's site scores over fixed-size, fixed-step windows
pub fn aggregate_windows(sites: &SiteScoreTable, window_size: usize, step_size: usize) -> WindowScoreTable {
    let labels = sites.site_labels();
    let windows: Vec<Window> = window_bounds(sites.site_count(), window_size, step_size)
        .into_iter()
        .map(|(start, end)| {
            let center_row = (start + end) / 2;
            Window {
                start,
                end,
                center_row,
                center_label: labels[center_row],
            }
        })
        .collect();

    let scores = (0..sites.lineage_count())
        .into_par_iter()
        .map(|lineage| {
            let column = sites.lineage_scores(lineage);
            windows
                .iter()
                .map(|w| {
                    let slice = &column[w.start..w.end];
                    slice.iter().sum::<f64>() / slice.len() as f64
                })
                .collect()
        })
        .collect();

    WindowScoreTable {
        windows,
        lineages: sites.lineages().to_vec(),
        scores,
    }
}
