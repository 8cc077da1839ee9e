//! jobscout: application shell around the search pipeline.
//!
//! This crate wires `jobscout-pipeline` to the filesystem and the console:
//!
//! - **Config**: JSON search profiles, the candidate CV, and the skill
//!   corpus, with a resolution ladder for short profile names
//! - **Output**: per-run directories under `outputs/` with raw and
//!   filtered CSV/JSON/Markdown exports
//! - **Store**: the cumulative `results/all_found_jobs.csv` with archive
//!   rotation and run-directory cleanup
//! - **Report**: operator-facing console summaries
//!
//! The search itself (provider adapters, deduplication, bilingual scoring)
//! lives entirely in the `jobscout-pipeline` crate.

pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod store;

pub use error::{AppError, Result};
