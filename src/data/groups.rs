// groups.rs - Lineage and query groups resolved by identifier markers

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use crate::data::alignment::AlignmentMatrix;
use crate::error::{Result, ScanError};

/// A candidate parental lineage: every row whose identifier contains `name`
#[derive(Debug, Clone, PartialEq)]
pub struct LineageGroup {
    pub name: String,
    pub rows: Vec<usize>,
}

/// The sequence(s) under analysis
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGroup {
    pub marker: String,
    pub rows: Vec<usize>,
}

impl LineageGroup {
    pub fn resolve(matrix: &AlignmentMatrix, marker: &str) -> Result<Self> {
        let rows = matrix.rows_matching(marker);
        if rows.is_empty() {
            return Err(ScanError::EmptyGroup {
                marker: marker.to_string(),
                role: "lineage",
            });
        }
        debug!("Lineage '{}' matched {} sequences", marker, rows.len());
        Ok(Self {
            name: marker.to_string(),
            rows,
        })
    }
}

impl QueryGroup {
    pub fn resolve(matrix: &AlignmentMatrix, marker: &str) -> Result<Self> {
        let rows = matrix.rows_matching(marker);
        if rows.is_empty() {
            return Err(ScanError::EmptyGroup {
                marker: marker.to_string(),
                role: "query",
            });
        }
        debug!("Query '{}' matched {} sequences", marker, rows.len());
        Ok(Self {
            marker: marker.to_string(),
            rows,
        })
    }

    pub fn is_single(&self) -> bool {
        self.rows.len() == 1
    }
}

/// Resolve every lineage marker, keeping the caller's order
pub fn resolve_lineages(matrix: &AlignmentMatrix, markers: &[String]) -> Result<Vec<LineageGroup>> {
    if markers.is_empty() {
        return Err(ScanError::config("at least one lineage marker is required"));
    }
    for (i, marker) in markers.iter().enumerate() {
        if markers[..i].contains(marker) {
            return Err(ScanError::config(format!("lineage marker '{}' is listed twice", marker)));
        }
    }
    markers
        .iter()
        .map(|marker| LineageGroup::resolve(matrix, marker))
        .collect()
}

/// Load lineage markers from a file (one per line, blank lines skipped)
pub fn load_lineage_markers(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut markers = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| ScanError::io(path, e))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            markers.push(trimmed.to_string());
        }
    }

    info!("Loaded {} lineage markers from {}", markers.len(), path.display());
    Ok(markers)
}
