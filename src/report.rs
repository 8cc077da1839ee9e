//! Operator-facing console output for runs and batches.
//!
//! Progress detail flows through `tracing`; the summaries an operator
//! reads at a glance stay on plain stdout.

use std::path::{Path, PathBuf};

use jobscout_pipeline::JobRecord;

/// Prints the version banner.
pub fn print_banner() {
    println!("jobscout v{}", env!("CARGO_PKG_VERSION"));
}

/// Prints the resolved configuration header for one run.
pub fn print_config_summary(profile_name: &str, output_dir: &Path) {
    println!("\n{}", "=".repeat(75));
    println!("CONFIGURATION: {profile_name}");
    println!("{}", "=".repeat(75));
    println!("Output:      {}", output_dir.display());
    println!("{}", "-".repeat(75));
}

/// Prints the five highest scoring results of a run.
///
/// Expects the run's full collection, which arrives already sorted by
/// relevance score descending.
pub fn print_top_results(jobs: &[JobRecord]) {
    if jobs.is_empty() {
        return;
    }
    println!("\nTOP 5 RESULTS:");
    for (i, job) in jobs.iter().take(5).enumerate() {
        println!(
            "{}. {} ({}%)\n   Posted: {}\n   {}\n",
            i + 1,
            job.title,
            job.relevance_score,
            job.posted_at_relative,
            job.link
        );
    }
}

/// Per-profile outcome collected during a batch run.
pub struct ProfileOutcome {
    pub profile: String,
    pub count: usize,
    pub output_dir: Option<PathBuf>,
    pub error: Option<String>,
}

/// Prints the closing summary for a multi-profile batch.
pub fn print_batch_summary(outcomes: &[ProfileOutcome], elapsed_secs: f64) {
    println!("\n{}", "=".repeat(60));
    println!("BATCH SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total time: {elapsed_secs:.1}s\n");

    let mut total = 0;
    for outcome in outcomes {
        match &outcome.error {
            Some(e) => println!("{}: error ({e})", outcome.profile),
            None => println!("{}: {} jobs", outcome.profile, outcome.count),
        }
        if let Some(dir) = &outcome.output_dir {
            println!("   {}", dir.display());
        }
        println!();
        total += outcome.count;
    }
    println!("TOTAL FOUND: {total}");
}
