// validation.rs - Input validation utilities

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cli::args::Args;
use crate::core::{GapHandling, MergePolicy, ScanConfig, SiteMode};
use crate::data::load_lineage_markers;
use crate::error::{Result, ScanError};

pub struct ValidationResult {
    pub alignment_path: PathBuf,
    pub query: String,
    pub lineage_markers: Vec<String>,
    pub scan_config: ScanConfig,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult> {
    let alignment_path = match &args.alignment {
        Some(path) => PathBuf::from(path),
        None => return Err(ScanError::config("--alignment is required")),
    };
    if !alignment_path.is_file() {
        return Err(ScanError::config(format!(
            "alignment file '{}' does not exist",
            alignment_path.display()
        )));
    }

    let query = match args.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => query.to_string(),
        _ => return Err(ScanError::config("--query is required")),
    };

    let lineage_markers = match (&args.lineages, &args.lineage_file) {
        (Some(_), Some(_)) => {
            return Err(ScanError::config(
                "--lineages and --lineage-file are mutually exclusive",
            ))
        }
        (Some(list), None) => split_markers(list),
        (None, Some(file)) => load_lineage_markers(Path::new(file))?,
        (None, None) => {
            return Err(ScanError::config(
                "lineage markers are required (--lineages or --lineage-file)",
            ))
        }
    };
    if lineage_markers.contains(&query) {
        return Err(ScanError::config(format!(
            "query marker '{}' is also listed as a lineage",
            query
        )));
    }

    if let Some(0) = args.threads {
        return Err(ScanError::config("thread count must be positive"));
    }

    let scan_config = ScanConfig {
        gap_handling: GapHandling::from_str(&args.gap)?,
        site_mode: SiteMode::from_str(&args.method)?,
        window_size: args.window,
        step_size: args.step,
        max_fragment_length: args.max_region,
        confidence_threshold: args.cp,
        run_breakpoint_scan: args.breakpoint,
        breakpoint_window_size: args.breakwin,
        merge_policy: MergePolicy::from_str(&args.merge_policy)?,
        y_axis_start: args.y_start,
    };
    scan_config.validate()?;

    Ok(ValidationResult {
        alignment_path,
        query,
        lineage_markers,
        scan_config,
    })
}

/// Split a comma-separated marker list, dropping empty entries
fn split_markers(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
