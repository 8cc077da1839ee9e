//! Cumulative result store: append-only global CSV, archive rotation, and
//! run-directory cleanup.
//!
//! The store lives under `results/` with one `all_found_jobs.csv` holding
//! every link ever seen and a `history/` folder of rotated archives. It is
//! only touched by the `sync` subcommand; search runs write their own
//! directories under `outputs/` and leave the store alone.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use jobscout_pipeline::JobRecord;
use tracing::{debug, warn};

use crate::error::Result;
use crate::output::{csv_row, CSV_HEADERS};

/// Days a record stays in the active store before rotation archives it.
pub const ROTATION_RETENTION_DAYS: i64 = 180;
/// Days a run directory survives under `outputs/` before cleanup.
pub const OUTPUT_RETENTION_DAYS: i64 = 14;

/// Append-only store of every job link collected across runs.
pub struct ResultStore {
    history_dir: PathBuf,
    global_file: PathBuf,
}

impl ResultStore {
    /// Opens the store rooted at `results_dir`, creating its directories.
    pub fn open(results_dir: &Path) -> Result<Self> {
        let history_dir = results_dir.join("history");
        fs::create_dir_all(&history_dir)?;
        Ok(Self {
            history_dir,
            global_file: results_dir.join("all_found_jobs.csv"),
        })
    }

    /// Every link currently in the global file. A missing or unreadable
    /// file reads as empty.
    fn existing_links(&self) -> HashSet<String> {
        let mut links = HashSet::new();
        let Ok(mut reader) = csv::Reader::from_path(&self.global_file) else {
            return links;
        };
        let link_idx = reader
            .headers()
            .ok()
            .and_then(|headers| headers.iter().position(|h| h == "link"));
        let Some(link_idx) = link_idx else {
            return links;
        };
        for record in reader.records().flatten() {
            if let Some(link) = record.get(link_idx) {
                if !link.is_empty() {
                    links.insert(link.to_string());
                }
            }
        }
        links
    }

    /// Appends records whose links the store has not seen, returning how
    /// many were added. Link-less records never enter the store.
    pub fn append_unique(&self, jobs: &[JobRecord]) -> Result<usize> {
        if jobs.is_empty() {
            return Ok(0);
        }
        let mut seen = self.existing_links();
        let fresh: Vec<&JobRecord> = jobs
            .iter()
            .filter(|job| !job.link.is_empty() && seen.insert(job.link.clone()))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let write_header = !self.global_file.exists();
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.global_file)?;
        let mut writer = csv::Writer::from_writer(file);
        if write_header {
            writer.write_record(CSV_HEADERS)?;
        }
        for job in &fresh {
            writer.write_record(csv_row(job))?;
        }
        writer.flush()?;
        Ok(fresh.len())
    }

    /// Scans run directories under `outputs_dir` and merges their exports
    /// into the store. The filtered export (`jobs.json`) is preferred over
    /// the raw one; unreadable exports are skipped with a warning.
    pub fn sync_outputs(&self, outputs_dir: &Path) -> Result<usize> {
        if !outputs_dir.exists() {
            return Ok(0);
        }
        let mut total = 0;
        for entry in fs::read_dir(outputs_dir)? {
            let entry = entry?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let mut export = dir.join("jobs.json");
            if !export.exists() {
                export = dir.join("all_jobs_raw.json");
            }
            if !export.exists() {
                continue;
            }
            let jobs = match read_export(&export) {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!(file = %export.display(), error = %e, "skipping unreadable run export");
                    continue;
                }
            };
            let added = self.append_unique(&jobs)?;
            if added > 0 {
                debug!(
                    dir = %entry.file_name().to_string_lossy(),
                    added,
                    "synced run directory"
                );
            }
            total += added;
        }
        Ok(total)
    }

    /// Moves records older than `retention_days` into a month-range named
    /// archive under `history/` and rewrites the global file with the rest.
    ///
    /// Rows whose `scraped_at` does not parse stay in the active file.
    /// Returns the number of archived records.
    pub fn rotate(&self, retention_days: i64) -> Result<usize> {
        if !self.global_file.exists() {
            return Ok(0);
        }
        let mut reader = csv::Reader::from_path(&self.global_file)?;
        let headers = reader.headers()?.clone();
        let Some(stamp_idx) = headers.iter().position(|h| h == "scraped_at") else {
            return Ok(0);
        };

        let cutoff = Utc::now() - Duration::days(retention_days);
        let mut active = Vec::new();
        let mut archived = Vec::new();
        let mut range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for record in reader.records() {
            let record = record?;
            match record.get(stamp_idx).and_then(parse_stamp) {
                Some(at) if at < cutoff => {
                    range = Some(match range {
                        Some((lo, hi)) => (lo.min(at), hi.max(at)),
                        None => (at, at),
                    });
                    archived.push(record);
                }
                _ => active.push(record),
            }
        }
        let Some((oldest, newest)) = range else {
            return Ok(0);
        };

        let archive_name = format!(
            "{}_{}_archived_jobs.csv",
            oldest.format("%Y%m"),
            newest.format("%Y%m")
        );
        write_records(&self.history_dir.join(archive_name), &headers, &archived)?;
        write_records(&self.global_file, &headers, &active)?;
        Ok(archived.len())
    }

    /// Deletes run directories under `outputs_dir` older than
    /// `retention_days`, judged by the leading `%Y%m%d` segment of the
    /// directory name. Names that do not parse are left alone.
    pub fn cleanup_outputs(&self, outputs_dir: &Path, retention_days: i64) -> Result<usize> {
        if !outputs_dir.exists() {
            return Ok(0);
        }
        let cutoff = Utc::now() - Duration::days(retention_days);
        let mut deleted = 0;
        for entry in fs::read_dir(outputs_dir)? {
            let entry = entry?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(stamp) = name.to_str().and_then(|n| n.split('_').next()) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(stamp, "%Y%m%d") else {
                continue;
            };
            let Some(day_start) = date.and_hms_opt(0, 0, 0) else {
                continue;
            };
            if day_start.and_utc() < cutoff {
                match fs::remove_dir_all(&dir) {
                    Ok(()) => {
                        debug!(dir = %name.to_string_lossy(), "removed expired run directory");
                        deleted += 1;
                    }
                    Err(e) => {
                        warn!(
                            dir = %name.to_string_lossy(),
                            error = %e,
                            "failed to remove run directory"
                        );
                    }
                }
            }
        }
        Ok(deleted)
    }
}

fn read_export(path: &Path) -> Result<Vec<JobRecord>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn parse_stamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn write_records(path: &Path, headers: &csv::StringRecord, rows: &[csv::StringRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
