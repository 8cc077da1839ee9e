//! CLI binary for jobscout.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobscout::config;
use jobscout::output::{run_dir_name, RunWriter};
use jobscout::report::{self, ProfileOutcome};
use jobscout::store::{ResultStore, OUTPUT_RETENTION_DAYS, ROTATION_RETENTION_DAYS};
use jobscout_pipeline::{CandidateProfile, Pipeline, RunOutput, SkillCorpus};

/// jobscout: automated job searching across five boards with relevance
/// scoring against your own skill profile.
#[derive(Parser)]
#[command(name = "jobscout", version, about)]
struct Cli {
    /// Search profile name(s); more than one runs a sequential batch.
    #[arg(long, short = 's', num_args = 1..)]
    search_profile: Vec<String>,

    /// Force-enable only these providers, overriding the profile.
    #[arg(long, short = 'p', num_args = 1..)]
    provider: Vec<String>,

    /// Path to the CV/profile JSON.
    #[arg(long, default_value = config::DEFAULT_CV_PATH)]
    cv: PathBuf,

    /// Path to the market skill corpus JSON.
    #[arg(long, default_value = config::DEFAULT_SKILLS_PATH)]
    skills: PathBuf,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Enrich and score links from a saved file instead of searching.
    Manual {
        /// CSV with a `link` column, or a plain file with one URL per line.
        file: PathBuf,
    },

    /// Merge run exports into the cumulative store and prune old data.
    Sync,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Quiet by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobscout=info,jobscout_pipeline=info")),
        )
        .init();

    let cli = Cli::parse();
    report::print_banner();

    match &cli.command {
        Some(Command::Manual { file }) => run_manual(&cli, file).await,
        Some(Command::Sync) => run_sync(),
        None => run_search(&cli).await,
    }
}

async fn run_search(cli: &Cli) -> anyhow::Result<()> {
    let candidate = config::load_candidate_profile(&cli.cv)?;
    let corpus = config::load_skill_corpus(&cli.skills)?;

    let profiles: Vec<&str> = if cli.search_profile.is_empty() {
        vec!["default"]
    } else {
        cli.search_profile.iter().map(String::as_str).collect()
    };

    if profiles.len() == 1 {
        run_profile(profiles[0], cli, &candidate, &corpus).await?;
        return Ok(());
    }

    println!("\nRunning {} profiles...", profiles.len());
    let started = Instant::now();
    let mut outcomes = Vec::new();
    for name in profiles {
        println!("\n{}", "=".repeat(50));
        println!("PROFILE: {name}");
        println!("{}", "=".repeat(50));
        match run_profile(name, cli, &candidate, &corpus).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => outcomes.push(ProfileOutcome {
                profile: name.to_string(),
                count: 0,
                output_dir: None,
                error: Some(e.to_string()),
            }),
        }
    }
    report::print_batch_summary(&outcomes, started.elapsed().as_secs_f64());
    Ok(())
}

/// One full automated run for a single profile.
async fn run_profile(
    name: &str,
    cli: &Cli,
    candidate: &CandidateProfile,
    corpus: &SkillCorpus,
) -> anyhow::Result<ProfileOutcome> {
    let (mut profile, profile_path) = config::load_search_profile(name)?;
    if !cli.provider.is_empty() {
        profile.force_providers(&cli.provider);
    }

    let dir_name = run_dir_name(&profile, &profile_path, chrono::Utc::now());
    let writer = RunWriter::create(Path::new("outputs"), &dir_name)?;
    report::print_config_summary(&profile.profile_name, writer.dir());

    let formats = profile.output.formats.clone();
    let base = profile.output.base_filename.clone();

    let started = Instant::now();
    let pipeline = Pipeline::new(profile, candidate.clone(), corpus.clone())?;

    // Handle Ctrl+C: finish with whatever has been collected so far.
    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel.cancel();
        }
    });

    let output = pipeline.run().await;
    persist_and_report(&writer, &output, &base, &formats)?;
    println!("\nDone ({:.1}s)", started.elapsed().as_secs_f64());

    Ok(ProfileOutcome {
        profile: name.to_string(),
        count: output.count(),
        output_dir: Some(writer.dir().to_path_buf()),
        error: None,
    })
}

/// Manual mode: enrich and score a saved list of links.
async fn run_manual(cli: &Cli, file: &Path) -> anyhow::Result<()> {
    let candidate = config::load_candidate_profile(&cli.cv)?;
    let corpus = config::load_skill_corpus(&cli.skills)?;
    let name = cli
        .search_profile
        .first()
        .map(String::as_str)
        .unwrap_or("default");
    let (mut profile, profile_path) = config::load_search_profile(name)?;
    if !cli.provider.is_empty() {
        profile.force_providers(&cli.provider);
    }

    let links = config::read_manual_links(file)?;
    anyhow::ensure!(!links.is_empty(), "no links found in {}", file.display());
    let source_label = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("manual")
        .to_string();
    println!("\nMANUAL MODE: {} links from {source_label}", links.len());

    let dir_name = run_dir_name(&profile, &profile_path, chrono::Utc::now());
    let writer = RunWriter::create(Path::new("outputs"), &dir_name)?;
    report::print_config_summary(&profile.profile_name, writer.dir());

    let formats = profile.output.formats.clone();
    let base = profile.output.base_filename.clone();

    let started = Instant::now();
    let pipeline = Pipeline::new(profile, candidate, corpus)?;

    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel.cancel();
        }
    });

    let output = pipeline.run_manual(&links, &source_label).await;
    persist_and_report(&writer, &output, &base, &formats)?;
    println!("\nDone ({:.1}s)", started.elapsed().as_secs_f64());
    Ok(())
}

fn persist_and_report(
    writer: &RunWriter,
    output: &RunOutput,
    base: &str,
    formats: &[String],
) -> anyhow::Result<()> {
    writer.write_raw(&output.jobs, formats)?;
    writer.write_filtered(&output.filtered, base, formats)?;
    report::print_top_results(&output.jobs);
    Ok(())
}

/// Maintenance pass: merge run exports into the store, rotate the archive,
/// delete expired run directories.
fn run_sync() -> anyhow::Result<()> {
    println!("\n=== jobscout maintenance ===");
    let store = ResultStore::open(Path::new("results"))?;

    println!("[1/3] syncing run exports into the store...");
    let synced = store.sync_outputs(Path::new("outputs"))?;

    println!("[2/3] rotating records older than {ROTATION_RETENTION_DAYS} days...");
    let archived = store.rotate(ROTATION_RETENTION_DAYS)?;

    println!("[3/3] removing run directories older than {OUTPUT_RETENTION_DAYS} days...");
    let removed = store.cleanup_outputs(Path::new("outputs"), OUTPUT_RETENTION_DAYS)?;

    println!("\n{synced} new jobs synced, {archived} records archived, {removed} directories removed");
    Ok(())
}
