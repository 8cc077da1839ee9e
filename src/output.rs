//! Per-run output writers: raw and filtered CSV/JSON plus the Markdown report.
//!
//! Every run gets its own timestamped directory under `outputs/`. The raw
//! export (`all_jobs_raw.*`) carries everything the run collected; the
//! filtered export (named after the profile's `base_filename`) carries the
//! curated view. Which formats are written follows the profile's format
//! list.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use jobscout_pipeline::{JobRecord, ProviderKey, SearchProfile};

use crate::error::Result;

/// Column order shared by every CSV this tool writes, including the
/// cumulative store.
pub const CSV_HEADERS: [&str; 16] = [
    "relevance_score",
    "search_criteria",
    "provider",
    "title",
    "company",
    "location",
    "work_location_type",
    "employment_type",
    "matching_skills",
    "missing_skills",
    "detected_language",
    "matched_roles",
    "salary_hint",
    "posted_at_relative",
    "link",
    "scraped_at",
];

/// One CSV row in [`CSV_HEADERS`] order.
pub fn csv_row(job: &JobRecord) -> [String; 16] {
    [
        job.relevance_score.to_string(),
        job.search_criteria.clone(),
        job.provider.clone(),
        job.title.clone(),
        job.company.clone(),
        job.location.clone(),
        job.work_location_type.as_str().to_string(),
        job.employment_type.clone(),
        job.matching_skills.clone(),
        job.missing_skills.clone(),
        job.detected_language.clone(),
        job.matched_roles.clone(),
        job.salary_hint.clone(),
        job.posted_at_relative.clone(),
        job.link.clone(),
        job.scraped_at.to_rfc3339(),
    ]
}

/// Builds the run directory name: UTC stamp, profile stem, active provider
/// keys.
///
/// The stem is cleaned of the `user_` prefix and `_search` suffix so
/// `user_remote_search.json` becomes `remote`. Only enabled providers the
/// catalog knows contribute keys.
pub fn run_dir_name(profile: &SearchProfile, profile_path: &Path, now: DateTime<Utc>) -> String {
    let stem = profile_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("profile");
    let base = stem.replace("user_", "").replace("_search", "");
    let keys: Vec<&str> = profile
        .active_providers
        .iter()
        .filter(|(key, settings)| settings.enabled && ProviderKey::from_key(key).is_some())
        .map(|(key, _)| key.as_str())
        .collect();
    format!("{}_{}_{}", now.format("%Y%m%d_%H%M"), base, keys.join("_"))
}

/// Writer bound to one run's output directory.
pub struct RunWriter {
    dir: PathBuf,
}

impl RunWriter {
    /// Creates the run directory (and parents) and binds a writer to it.
    pub fn create(outputs_dir: &Path, name: &str) -> Result<Self> {
        let dir = outputs_dir.join(name);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The run directory this writer owns.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the unfiltered collection as `all_jobs_raw.{csv,json}`.
    ///
    /// Nothing is written when the collection is empty.
    pub fn write_raw(&self, jobs: &[JobRecord], formats: &[String]) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }
        if formats.iter().any(|f| f == "csv") {
            write_csv(&self.dir.join("all_jobs_raw.csv"), jobs)?;
        }
        if formats.iter().any(|f| f == "json") {
            write_json(&self.dir.join("all_jobs_raw.json"), jobs)?;
        }
        Ok(())
    }

    /// Writes the filtered view as `<base>.{csv,json,md}`.
    ///
    /// Nothing is written when the view is empty.
    pub fn write_filtered(&self, jobs: &[JobRecord], base: &str, formats: &[String]) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }
        if formats.iter().any(|f| f == "csv") {
            write_csv(&self.dir.join(format!("{base}.csv")), jobs)?;
        }
        if formats.iter().any(|f| f == "json") {
            write_json(&self.dir.join(format!("{base}.json")), jobs)?;
        }
        if formats.iter().any(|f| f == "markdown") {
            write_markdown(&self.dir.join(format!("{base}.md")), jobs)?;
        }
        Ok(())
    }
}

fn write_csv(path: &Path, jobs: &[JobRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADERS)?;
    for job in jobs {
        writer.write_record(csv_row(job))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(path: &Path, jobs: &[JobRecord]) -> Result<()> {
    let payload = serde_json::to_string_pretty(jobs)?;
    fs::write(path, payload)?;
    Ok(())
}

fn write_markdown(path: &Path, jobs: &[JobRecord]) -> Result<()> {
    let mut doc = format!(
        "# Job Search Results ({})\n\nTotal processed: {}\n\n",
        Utc::now().format("%Y-%m-%d"),
        jobs.len()
    );
    for (i, job) in jobs.iter().enumerate() {
        doc.push_str(&format!(
            "### {}. {} (**{}%**)\n- **Provider:** {} | **Location:** {}\n- **Matching Skills:** {}\n- **Link:** [View Posting]({})\n\n---\n",
            i + 1,
            job.title,
            job.relevance_score,
            job.provider,
            job.location,
            job.matching_skills,
            job.link
        ));
    }
    fs::write(path, doc)?;
    Ok(())
}
