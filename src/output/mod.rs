// mod.rs - Output writers: WIC tables, regions, report, run record, JSON summary

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;

use crate::core::{
    GapHandling, LineageRegions, ParentAssignment, ScanConfig, ScanReport, SignificanceResult, SiteMode,
};
use crate::error::{Result, ScanError};

pub const SITES_TABLE: &str = "sites_wic.tsv";
pub const WINDOWS_TABLE: &str = "windows_wic.tsv";
pub const BREAKPOINTS_TABLE: &str = "breakpoints.tsv";
pub const REGIONS_TABLE: &str = "regions.tsv";
pub const REPORT_FILE: &str = "recombination_report.txt";
pub const SUMMARY_FILE: &str = "summary.json";
pub const RUN_RECORD_DIR: &str = "run_record";
pub const GAP_RECORD: &str = "deleted_gap_sites.txt";
pub const MONOMORPHIC_RECORD: &str = "monomorphic_sites.txt";

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
    }
    Ok(())
}

fn create_file(file_path: &Path) -> Result<BufWriter<File>> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path).map_err(|e| ScanError::io(file_path, e))?;
    Ok(BufWriter::new(file))
}

/// `# Command` / `# Generated` / version lines shared by every text output
fn write_header<W: Write>(writer: &mut W, command_line: &str, path: &Path) -> Result<()> {
    let io = |e| ScanError::io(path, e);
    writeln!(writer, "# Command: {}", command_line).map_err(io)?;
    writeln!(writer, "# Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")).map_err(io)?;
    writeln!(writer, "# wicscan v{}", env!("CARGO_PKG_VERSION")).map_err(io)?;
    Ok(())
}

/// Tab-separated table: first column is a site label, then one column per lineage
fn write_score_table<I>(
    file_path: &Path,
    key_column: &str,
    lineages: &[String],
    rows: I,
    command_line: &str,
) -> Result<usize>
where
    I: Iterator<Item = (usize, Vec<f64>)>,
{
    let mut writer = create_file(file_path)?;
    write_header(&mut writer, command_line, file_path)?;

    let csv_err = |e: csv::Error| ScanError::io(file_path, e.into());
    let mut table = WriterBuilder::new().delimiter(b'\t').from_writer(writer);

    let mut header = Vec::with_capacity(lineages.len() + 1);
    header.push(key_column.to_string());
    header.extend(lineages.iter().cloned());
    table.write_record(&header).map_err(csv_err)?;

    let mut count = 0;
    for (label, values) in rows {
        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(label.to_string());
        record.extend(values.iter().map(|v| format!("{:.6}", v)));
        table.write_record(&record).map_err(csv_err)?;
        count += 1;
    }

    table.flush().map_err(|e| ScanError::io(file_path, e))?;
    Ok(count)
}

/// Per-site WIC table
pub fn write_sites_table(file_path: &Path, report: &ScanReport, command_line: &str) -> Result<()> {
    let sites = &report.site_scores;
    let count = write_score_table(file_path, "Site", sites.lineages(), sites.rows(), command_line)?;
    println!("✅ Site WIC table ({} sites) written to: {}", count, file_path.display());
    Ok(())
}

/// Per-window WIC table, keyed by window centre
pub fn write_windows_table(file_path: &Path, report: &ScanReport, command_line: &str) -> Result<()> {
    let windows = &report.window_scores;
    let count = write_score_table(file_path, "Window_center", windows.lineages(), windows.rows(), command_line)?;
    println!("✅ Window WIC table ({} windows) written to: {}", count, file_path.display());
    Ok(())
}

/// Breakpoint strength table; nothing is written when the scan did not run
pub fn write_breakpoints_table(file_path: &Path, report: &ScanReport, command_line: &str) -> Result<bool> {
    let Some(table) = &report.breakpoints else {
        return Ok(false);
    };
    let count = write_score_table(file_path, "Site", table.lineages(), table.rows(), command_line)?;
    println!("✅ Breakpoint -lg(p) table ({} sites) written to: {}", count, file_path.display());
    Ok(true)
}

fn region_role(parent: Option<&ParentAssignment>, lineage: &str) -> &'static str {
    match parent {
        Some(p) if p.is_major(lineage) => "major",
        _ => "other",
    }
}

/// One row per emitted region
pub fn write_regions_table(file_path: &Path, report: &ScanReport, command_line: &str) -> Result<()> {
    let mut writer = create_file(file_path)?;
    write_header(&mut writer, command_line, file_path)?;

    let csv_err = |e: csv::Error| ScanError::io(file_path, e.into());
    let mut table = WriterBuilder::new().delimiter(b'\t').from_writer(writer);
    table
        .write_record(["Lineage", "Role", "Left_row", "Right_row", "Start", "End", "Length"])
        .map_err(csv_err)?;

    for entry in &report.regions {
        let role = region_role(report.parent.as_ref(), &entry.lineage);
        for region in &entry.regions {
            table
                .write_record([
                    entry.lineage.clone(),
                    role.to_string(),
                    region.left.to_string(),
                    region.right.to_string(),
                    region.left_label.to_string(),
                    region.right_label.to_string(),
                    region.length().to_string(),
                ])
                .map_err(csv_err)?;
        }
    }

    table.flush().map_err(|e| ScanError::io(file_path, e))?;
    println!("✅ Recombinant regions written to: {}", file_path.display());
    Ok(())
}

fn describe_region(result: &SignificanceResult) -> String {
    let p_value = match result.outcome.p_value() {
        Some(p) => format!("{:.6e}", p),
        None => "1 (test indeterminate)".to_string(),
    };
    format!(
        "{} to {} (mWIC: {:.4}), p_value: {}{}",
        result.region.left_label,
        result.region.right_label,
        result.mean_wic,
        p_value,
        if result.significant { " *" } else { "" }
    )
}

/// Human-readable recombination report
pub fn render_report(report: &ScanReport) -> String {
    let mut text = String::new();

    if !report.recombination_detected() {
        text.push_str(&format!(
            "No significant recombination events were found in {}\n\n",
            report.query
        ));
    }

    match &report.parent {
        None => {
            text.push_str("No lineage dominates any region of the query; no major parent assigned.\n");
        }
        Some(parent) => {
            text.push_str(&format!(
                "Possible major parent: {} (global mWIC: {:.4})\n",
                parent.major_parent, parent.genome_mean_wic
            ));
            if parent.weak {
                text.push_str("Note, similarity of major parent is less than 50%!\n");
            }
            text.push_str("\nPossible other parents:\n");

            let results = report
                .significance
                .as_ref()
                .map(|s| s.results.as_slice())
                .unwrap_or(&[]);
            for lineage in report.other_parents() {
                let regions: Vec<String> = results
                    .iter()
                    .filter(|r| r.lineage == lineage.lineage)
                    .map(describe_region)
                    .collect();
                text.push_str(&format!("{}\t{}\n", lineage.lineage, regions.join("\t")));
            }
        }
    }

    if let Some(breakpoints) = &report.breakpoints {
        text.push_str("\nStrongest breakpoint signal per lineage (-lg p):\n");
        for (i, lineage) in breakpoints.lineages().iter().enumerate() {
            match breakpoints.strongest(i) {
                Some((site, strength)) => {
                    text.push_str(&format!("{}\tsite {}\t{:.4}\n", lineage, site, strength))
                }
                None => text.push_str(&format!("{}\tno signal\n", lineage)),
            }
        }
    }

    text.push_str(
        "\nSignificance test of recombinant regions using Mann-Whitney U test with two-tailed \
         probabilities, p-value less than 0.05 indicates a significant difference.\n",
    );
    text
}

pub fn write_report(file_path: &Path, report: &ScanReport, command_line: &str) -> Result<()> {
    let mut writer = create_file(file_path)?;
    write_header(&mut writer, command_line, file_path)?;
    writer
        .write_all(render_report(report).as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ScanError::io(file_path, e))?;
    println!("✅ Recombination report written to: {}", file_path.display());
    Ok(())
}

/// List of removed site labels, one per line
pub fn write_site_record(file_path: &Path, title: &str, sites: &[usize]) -> Result<()> {
    let mut writer = create_file(file_path)?;
    let io = |e| ScanError::io(file_path, e);
    writeln!(writer, "# {} ({} sites)", title, sites.len()).map_err(io)?;
    for site in sites {
        writeln!(writer, "Site {}", site).map_err(io)?;
    }
    writer.flush().map_err(io)?;
    Ok(())
}

/// Machine-readable summary of one run
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated: DateTime<Utc>,
    pub command: &'a str,
    pub query: &'a str,
    pub config: &'a ScanConfig,
    pub max_entropy: f64,
    pub sites_total: usize,
    pub sites_scanned: usize,
    pub gap_sites_removed: usize,
    pub monomorphic_sites_removed: usize,
    pub window_count: usize,
    pub major_parent: Option<&'a ParentAssignment>,
    pub regions: &'a [LineageRegions],
    pub significance: Vec<&'a SignificanceResult>,
    pub recombination_detected: bool,
    pub breakpoints: Option<Vec<BreakpointPeak<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct BreakpointPeak<'a> {
    pub lineage: &'a str,
    pub site: usize,
    pub strength: f64,
}

impl<'a> RunSummary<'a> {
    pub fn from_report(report: &'a ScanReport, command: &'a str) -> Self {
        let breakpoints = report.breakpoints.as_ref().map(|table| {
            table
                .lineages()
                .iter()
                .enumerate()
                .filter_map(|(i, lineage)| {
                    table.strongest(i).map(|(site, strength)| BreakpointPeak {
                        lineage,
                        site,
                        strength,
                    })
                })
                .collect()
        });

        Self {
            tool: "wicscan",
            version: env!("CARGO_PKG_VERSION"),
            generated: Utc::now(),
            command,
            query: &report.query,
            config: &report.config,
            max_entropy: report.max_entropy,
            sites_total: report.filtering.sites_total,
            sites_scanned: report.filtering.sites_scanned,
            gap_sites_removed: report.filtering.gap_sites_removed.len(),
            monomorphic_sites_removed: report.filtering.monomorphic_sites_removed.len(),
            window_count: report.window_scores.window_count(),
            major_parent: report.parent.as_ref(),
            regions: &report.regions,
            significance: report
                .significance
                .iter()
                .flat_map(|s| s.results.iter())
                .collect(),
            recombination_detected: report.recombination_detected(),
            breakpoints,
        }
    }
}

pub fn write_summary(file_path: &Path, report: &ScanReport, command_line: &str) -> Result<()> {
    let summary = RunSummary::from_report(report, command_line);
    let json = serde_json::to_string_pretty(&summary)
        .map_err(|e| ScanError::config(format!("Failed to serialize summary: {}", e)))?;
    let mut writer = create_file(file_path)?;
    writer
        .write_all(json.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ScanError::io(file_path, e))?;
    println!("✅ JSON summary written to: {}", file_path.display());
    Ok(())
}

/// Default output directory: `result_<run id>` next to the alignment
pub fn default_output_dir(alignment: &Path, run_id: &str) -> PathBuf {
    let parent = alignment
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    parent.join(format!("result_{}", run_id))
}

/// Write every output of a run into `dir`; returns the files written
pub fn write_all(dir: &Path, report: &ScanReport, command_line: &str) -> Result<Vec<PathBuf>> {
    create_dir_all(dir).map_err(|e| ScanError::io(dir, e))?;
    let mut written = Vec::new();

    let sites = dir.join(SITES_TABLE);
    write_sites_table(&sites, report, command_line)?;
    written.push(sites);

    let windows = dir.join(WINDOWS_TABLE);
    write_windows_table(&windows, report, command_line)?;
    written.push(windows);

    let breakpoints = dir.join(BREAKPOINTS_TABLE);
    if write_breakpoints_table(&breakpoints, report, command_line)? {
        written.push(breakpoints);
    }

    let regions = dir.join(REGIONS_TABLE);
    write_regions_table(&regions, report, command_line)?;
    written.push(regions);

    let report_path = dir.join(REPORT_FILE);
    write_report(&report_path, report, command_line)?;
    written.push(report_path);

    let record_dir = dir.join(RUN_RECORD_DIR);
    let filtering = &report.filtering;
    if report.config.gap_handling == GapHandling::Discard {
        let path = record_dir.join(GAP_RECORD);
        write_site_record(&path, "Sites with gaps removed from the alignment", &filtering.gap_sites_removed)?;
        written.push(path);
    }
    if report.config.site_mode == SiteMode::PolymorphicOnly {
        let path = record_dir.join(MONOMORPHIC_RECORD);
        write_site_record(&path, "Sites without variation removed from the alignment", &filtering.monomorphic_sites_removed)?;
        written.push(path);
    }

    let summary = dir.join(SUMMARY_FILE);
    write_summary(&summary, report, command_line)?;
    written.push(summary);

    Ok(written)
}
