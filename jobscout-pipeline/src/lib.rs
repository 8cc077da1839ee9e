//! # jobscout-pipeline
//!
//! Concurrent job-posting aggregation across public job boards.
//!
//! This crate searches several boards directly by scraping their public
//! pages — no API keys, no external services — and condenses the haul
//! into one deduplicated, relevance-scored list. It compiles into the
//! JobScout binary as a library dependency.
//!
//! ## Design
//!
//! - Scrapes LinkedIn, Hays, SOLCOM, Freelancermap and XING using CSS
//!   selectors on HTML responses (plus JSON-LD and hydration blobs where
//!   boards expose them)
//! - Fans searches out concurrently per provider while keeping each
//!   provider's own query sequence strictly serial and politely paced
//! - Deduplicates across providers by posting id and URL
//! - Scores every posting against a candidate skill profile, bilingual
//!   (English/German) keyword matching included
//! - Optional second pass fetches full detail pages for deeper text
//! - Graceful degradation: a failing board costs its own results, never
//!   the run
//!
//! ## Security
//!
//! - No credentials anywhere; only public pages are fetched
//! - No network listeners — this is a library, not a server
//! - Queries are logged only at trace level

pub mod config;
pub mod error;
mod http;
pub mod orchestrator;
pub mod profile;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod scoring;
pub mod types;

pub use config::{ScoringWeights, SearchProfile};
pub use error::{PipelineError, Result};
pub use orchestrator::{Pipeline, RunOutput};
pub use profile::{CandidateProfile, SkillCorpus, SkillEntry};
pub use provider::{BoundProvider, JobProvider};
pub use registry::ProviderKey;
pub use scoring::Scorer;
pub use types::{DetailFetch, JobRecord, RecordPatch, WorkLocation};

/// Run the automated search pipeline described by `profile`.
///
/// Searches every enabled provider, deduplicates, scores the records
/// against `candidate` and `corpus`, and returns them sorted by
/// relevance together with the filtered view.
///
/// # Errors
///
/// Returns [`PipelineError::Config`] if the profile fails validation.
/// Individual provider failures are logged and cost only that
/// provider's results.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> jobscout_pipeline::Result<()> {
/// use jobscout_pipeline::{CandidateProfile, SearchProfile, SkillCorpus};
///
/// let profile = SearchProfile::default();
/// let output = jobscout_pipeline::run(
///     profile,
///     CandidateProfile::default(),
///     SkillCorpus::default(),
/// )
/// .await?;
/// for job in &output.jobs {
///     println!("{:>3}% {}", job.relevance_score, job.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run(
    profile: SearchProfile,
    candidate: CandidateProfile,
    corpus: SkillCorpus,
) -> Result<RunOutput> {
    let pipeline = Pipeline::new(profile, candidate, corpus)?;
    Ok(pipeline.run().await)
}

/// Run the manual pipeline over a list of posting URLs.
///
/// Every link becomes a pending-extraction stub attributed to the board
/// guessed from its domain; detail fetching, deduplication and scoring
/// then proceed as in an automated run. `source_label` names where the
/// links came from (shown in each record's search criteria).
///
/// # Errors
///
/// Same as [`run`].
pub async fn run_manual(
    profile: SearchProfile,
    candidate: CandidateProfile,
    corpus: SkillCorpus,
    links: &[String],
    source_label: &str,
) -> Result<RunOutput> {
    let pipeline = Pipeline::new(profile, candidate, corpus)?;
    Ok(pipeline.run_manual(links, source_label).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with<F: FnOnce(&mut SearchProfile)>(edit: F) -> SearchProfile {
        let mut profile = SearchProfile::default();
        edit(&mut profile);
        profile
    }

    #[tokio::test]
    async fn run_rejects_zero_timeout() {
        let profile = profile_with(|p| p.api_settings.request_timeout_secs = 0);
        let result = run(profile, CandidateProfile::default(), SkillCorpus::default()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("request_timeout_secs"));
    }

    #[tokio::test]
    async fn run_rejects_oversized_delay() {
        let profile = profile_with(|p| p.api_settings.delay_between_requests = 90.0);
        let result = run(profile, CandidateProfile::default(), SkillCorpus::default()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("delay_between_requests"));
    }

    #[tokio::test]
    async fn run_rejects_unknown_output_format() {
        let profile = profile_with(|p| p.output.formats = vec!["xlsx".into()]);
        let result = run(profile, CandidateProfile::default(), SkillCorpus::default()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("xlsx"));
    }

    #[tokio::test]
    async fn run_without_enabled_providers_is_empty() {
        // The default profile enables nothing, so the run finishes
        // without network traffic and yields no records.
        let profile = SearchProfile::default();
        let output = run(profile, CandidateProfile::default(), SkillCorpus::default())
            .await
            .expect("run");
        assert_eq!(output.count(), 0);
        assert!(output.filtered.is_empty());
    }
}
