// alignment.rs - Aligned sequence matrix and site filters

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bio::io::fasta;
use log::{debug, info};

use crate::error::{Result, ScanError};

/// Gap symbol in aligned sequences
pub const GAP: u8 = b'-';

/// Aligned sequences keyed by identifier, with original 1-based column labels.
///
/// Rows keep the order in which they were read. Filtering never mutates a
/// matrix in place; it returns a narrower copy together with the labels of
/// the columns that were dropped.
#[derive(Debug, Clone)]
pub struct AlignmentMatrix {
    site_labels: Vec<usize>,
    ids: Vec<String>,
    rows: Vec<Vec<u8>>,
}

/// Result of a column filter: the kept matrix plus the dropped site labels
#[derive(Debug, Clone)]
pub struct FilteredAlignment {
    pub matrix: AlignmentMatrix,
    pub removed_sites: Vec<usize>,
}

impl AlignmentMatrix {
    /// Build a matrix from `(identifier, aligned sequence)` records.
    ///
    /// Symbols are uppercased. Every row must have the same length and
    /// identifiers must be unique.
    pub fn from_records(records: Vec<(String, Vec<u8>)>) -> Result<Self> {
        if records.is_empty() {
            return Err(ScanError::invalid_alignment("alignment contains no sequences"));
        }

        let width = records[0].1.len();
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());

        for (id, seq) in records {
            if seq.len() != width {
                return Err(ScanError::invalid_alignment(format!(
                    "sequence '{}' has length {}, expected {}",
                    id,
                    seq.len(),
                    width
                )));
            }
            if !seen.insert(id.clone()) {
                return Err(ScanError::invalid_alignment(format!(
                    "duplicate sequence identifier '{}'",
                    id
                )));
            }
            ids.push(id);
            rows.push(seq.to_ascii_uppercase());
        }

        if width == 0 {
            return Err(ScanError::invalid_alignment("aligned sequences are empty"));
        }

        Ok(Self {
            site_labels: (1..=width).collect(),
            ids,
            rows,
        })
    }

    /// Load an aligned FASTA file
    pub fn from_fasta(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
        let reader = fasta::Reader::new(BufReader::new(file));

        let mut records = Vec::new();
        for record_result in reader.records() {
            let record = record_result.map_err(|e| {
                ScanError::parse(path.display().to_string(), format!("invalid FASTA record: {}", e))
            })?;
            records.push((record.id().to_string(), record.seq().to_vec()));
        }

        let matrix = Self::from_records(records)?;
        info!(
            "Loaded alignment {}: {} sequences × {} sites",
            path.display(),
            matrix.row_count(),
            matrix.site_count()
        );
        Ok(matrix)
    }

    pub fn site_count(&self) -> usize {
        self.site_labels.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Original alignment coordinate of every retained column
    pub fn site_labels(&self) -> &[usize] {
        &self.site_labels
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn symbol(&self, row: usize, site: usize) -> u8 {
        self.rows[row][site]
    }

    /// Indices of rows whose identifier contains `marker`
    pub fn rows_matching(&self, marker: &str) -> Vec<usize> {
        self.ids
            .iter()
            .enumerate()
            .filter(|(_, id)| id.contains(marker))
            .map(|(i, _)| i)
            .collect()
    }

    /// Drop every column holding a gap in any row
    pub fn discard_gap_sites(&self) -> FilteredAlignment {
        let filtered = self.retain_sites(|site| self.rows.iter().all(|row| row[site] != GAP));
        debug!("Gap filter removed {} sites", filtered.removed_sites.len());
        filtered
    }

    /// Drop every column where all rows share the first row's symbol
    pub fn retain_polymorphic_sites(&self) -> FilteredAlignment {
        let filtered = self.retain_sites(|site| {
            let first = self.rows[0][site];
            self.rows.iter().any(|row| row[site] != first)
        });
        debug!("Monomorphic filter removed {} sites", filtered.removed_sites.len());
        filtered
    }

    fn retain_sites<F: Fn(usize) -> bool>(&self, keep: F) -> FilteredAlignment {
        let (kept, removed): (Vec<usize>, Vec<usize>) = (0..self.site_count()).partition(|&s| keep(s));

        let matrix = Self {
            site_labels: kept.iter().map(|&s| self.site_labels[s]).collect(),
            ids: self.ids.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| kept.iter().map(|&s| row[s]).collect())
                .collect(),
        };

        FilteredAlignment {
            matrix,
            removed_sites: removed.iter().map(|&s| self.site_labels[s]).collect(),
        }
    }
}
