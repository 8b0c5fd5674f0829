// candidates.rs - Lineage-dominant window centres

use crate::core::window::WindowScoreTable;

/// Centre rows of the windows a lineage dominates.
///
/// A window counts when the lineage holds the highest score of all lineages
/// there (ties count for every tied lineage) and its score reaches
/// `confidence_threshold` of the maximum entropy.
pub fn candidate_centers(
    windows: &WindowScoreTable,
    lineage: usize,
    max_entropy: f64,
    confidence_threshold: f64,
) -> Vec<usize> {
    windows
        .windows()
        .iter()
        .enumerate()
        .filter(|(w, _)| {
            let score = windows.score(lineage, *w);
            score >= windows.window_max(*w) && score / max_entropy >= confidence_threshold
        })
        .map(|(_, window)| window.center_row)
        .collect()
}
