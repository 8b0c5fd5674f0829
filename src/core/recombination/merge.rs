// merge.rs - Greedy region merging over candidate centres
//
// The merger is a stepper over an immutable candidate array: every call to
// `step` looks at one cursor position and returns the transition to take.
// The cursor strictly increases on every non-terminal transition, so a scan
// over `k` candidates finishes within `k` steps.

use crate::core::config::MergePolicy;
use crate::core::scoring::SiteScoreTable;

/// Rival sums within this distance of the lineage's own sum count as ties
const SUM_TOLERANCE: f64 = 1e-9;

/// A valid extension from the cursor centre to candidate `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub index: usize,
    pub left: usize,
    pub right: usize,
}

impl Trial {
    pub fn length(&self) -> usize {
        self.right - self.left + 1
    }
}

/// Outcome of examining one cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing emitted; continue at the given cursor
    Advance(usize),
    /// Emit `trial` as a region, then continue at `next` or stop
    Emit { trial: Trial, next: Option<usize> },
    /// The cursor reached the last candidate
    Stop,
}

/// Region merger for one lineage
pub struct RegionMerger<'a> {
    pub sites: &'a SiteScoreTable,
    pub lineage: usize,
    pub centers: &'a [usize],
    pub step_size: usize,
    pub max_fragment_length: usize,
    pub max_entropy: f64,
    pub confidence_threshold: f64,
    pub policy: MergePolicy,
}

impl<'a> RegionMerger<'a> {
    /// Row bounds of the extension from `cursor`'s centre to candidate `index`
    fn bounds(&self, cursor: usize, index: usize) -> (usize, usize) {
        let left = self.centers[cursor].saturating_sub(self.step_size.div_ceil(2));
        let right = (self.centers[index] + self.step_size / 2).min(self.sites.site_count());
        (left, right)
    }

    /// The lineage must out-score every rival over the span and keep a
    /// normalised WIC of at least the confidence threshold.
    fn is_valid(&self, left: usize, right: usize) -> bool {
        let own = self.sites.range_sum(self.lineage, left, right);
        let best_other = (0..self.sites.lineage_count())
            .filter(|&l| l != self.lineage)
            .map(|l| self.sites.range_sum(l, left, right))
            .fold(0.0, f64::max);

        let length = (right - left + 1) as f64;
        own > best_other + SUM_TOLERANCE
            && own / (length * self.max_entropy) >= self.confidence_threshold
    }

    /// Valid extensions from `cursor` to every later candidate, in index order
    pub fn trials(&self, cursor: usize) -> Vec<Trial> {
        (cursor..self.centers.len())
            .filter_map(|index| {
                let (left, right) = self.bounds(cursor, index);
                self.is_valid(left, right).then_some(Trial { index, left, right })
            })
            .collect()
    }

    pub fn step(&self, cursor: usize) -> Transition {
        let trials = self.trials(cursor);

        if cursor + 1 >= self.centers.len() {
            return Transition::Stop;
        }

        let (first, last) = match (trials.first(), trials.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Transition::Advance(cursor + 1),
        };

        // Even the shortest extension overflows the cap
        if first.length() > self.max_fragment_length {
            return Transition::Advance(cursor + 1);
        }

        if last.length() <= self.max_fragment_length {
            let next = match self.policy {
                MergePolicy::Terminal => None,
                MergePolicy::Continue => self.centers.iter().position(|&c| c > last.right),
            };
            return Transition::Emit { trial: last, next };
        }

        // Take the longest extension that still fits, then resume from its
        // candidate (or just past the cursor if that is the cursor itself).
        let overflow = trials
            .iter()
            .position(|t| t.length() > self.max_fragment_length)
            .unwrap_or(trials.len());
        let fitting = trials[overflow - 1];
        let next = if fitting.index == cursor {
            cursor + 1
        } else {
            fitting.index
        };
        Transition::Emit {
            trial: fitting,
            next: Some(next),
        }
    }

    /// Run the stepper from the first candidate; returns `(left, right)` rows
    pub fn run(&self) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        if self.centers.is_empty() {
            return regions;
        }

        let mut cursor = 0;
        loop {
            match self.step(cursor) {
                Transition::Stop => break,
                Transition::Advance(next) => cursor = next,
                Transition::Emit { trial, next } => {
                    regions.push((trial.left, trial.right));
                    match next {
                        Some(next) => cursor = next,
                        None => break,
                    }
                }
            }
        }
        regions
    }
}
