// main.rs - CLI entry point

use std::path::PathBuf;
use std::time::Instant;

use env_logger::{Builder, Env};
use log::debug;
use wicscan::prelude::*;

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<()> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation = validate_args(&args)?;
    let config = &validation.scan_config;

    println!("🚀 {}", wicscan::get_info());

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| ScanError::config(format!("Failed to configure thread pool: {}", e)))?;
        println!("🧵 Threads: {}", n);
    } else {
        println!("🧵 Threads: {} (auto-detected)", rayon::current_num_threads());
    }

    let total_start = Instant::now();
    let run_id = chrono::Utc::now().timestamp().to_string();

    let matrix = AlignmentMatrix::from_fasta(&validation.alignment_path)?;
    println!(
        "📊 Alignment: {} sequences × {} sites",
        matrix.row_count(),
        matrix.site_count()
    );
    println!("🔍 Query: {}", validation.query);
    println!("🧬 Lineages: {}", validation.lineage_markers.join(", "));
    println!(
        "⚙️  Mode: {}, {} (max entropy {:.4})",
        config.gap_handling.description(),
        config.site_mode.description(),
        config.max_entropy()
    );
    println!(
        "🪟 Window: {} sites, step {}, max region {}, cp {}",
        config.window_size, config.step_size, config.max_fragment_length, config.confidence_threshold
    );

    if args.dry_run {
        for marker in &validation.lineage_markers {
            println!("  • {}: {} sequences", marker, matrix.rows_matching(marker).len());
        }
        println!(
            "  • query {}: {} sequences",
            validation.query,
            matrix.rows_matching(&validation.query).len()
        );
        println!("✅ Dry run completed successfully");
        return Ok(());
    }

    let engine = ScanEngine::new(config.clone())?.with_progress(!args.no_progress);
    let report = engine.run(&matrix, &validation.lineage_markers, &validation.query)?;

    print_summary(&report);

    let output_dir = match &args.output {
        Some(dir) => PathBuf::from(dir),
        None => default_output_dir(&validation.alignment_path, &run_id),
    };
    println!("\n💾 Writing results to: {}", output_dir.display());
    let written = write_all(&output_dir, &report, &command_line)?;
    debug!("Wrote {} files", written.len());

    println!(
        "\n⏱️  Total time: {:.2}s",
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn print_summary(report: &ScanReport) {
    println!("\n📈 === RECOMBINATION SCAN ===");
    println!(
        "  • Sites scanned: {} of {}",
        report.filtering.sites_scanned, report.filtering.sites_total
    );
    println!("  • Windows: {}", report.window_scores.window_count());

    match &report.parent {
        Some(parent) => {
            println!(
                "  • Major parent: {} (global mWIC: {:.4})",
                parent.major_parent, parent.genome_mean_wic
            );
            if parent.weak {
                println!("  🟡 Similarity of the major parent is below 50%");
            }
        }
        None => println!("  • Major parent: none (no lineage dominates any region)"),
    }

    for lineage in report.other_parents() {
        let spans: Vec<String> = lineage
            .regions
            .iter()
            .map(|r| format!("{}-{}", r.left_label, r.right_label))
            .collect();
        println!("  • Other parent {}: {}", lineage.lineage, spans.join(", "));
    }

    if let Some(significance) = &report.significance {
        for result in &significance.results {
            println!(
                "    {} {}-{}: p = {:.4e}{}",
                result.lineage,
                result.region.left_label,
                result.region.right_label,
                result.outcome.p_value_or_neutral(),
                if result.significant { " (significant)" } else { "" }
            );
        }
    }

    if report.recombination_detected() {
        println!("  🔴 Significant recombination detected in {}", report.query);
    } else {
        println!("  🟢 No significant recombination events were found in {}", report.query);
    }
}
