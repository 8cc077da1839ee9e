//! The phased search pipeline.
//!
//! A run walks five strictly ordered phases: provider search fan-out,
//! deduplication, local enrichment, optional detail enrichment, and the
//! final sort. Every phase is a full barrier; concurrent work inside a
//! phase collects into task-local buffers that are merged at the join,
//! so no shared collection or lock exists anywhere.

use crate::config::SearchProfile;
use crate::error::Result;
use crate::http::{build_client, pacing_delay};
use crate::orchestrator::dedup::dedup_records;
use crate::profile::{CandidateProfile, SkillCorpus};
use crate::provider::{BoundProvider, JobProvider};
use crate::registry::{self, ProviderKey};
use crate::scoring::Scorer;
use crate::types::JobRecord;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Concurrency budget for the provider search fan-out.
const SEARCH_WORKERS: usize = 6;
/// Concurrency budget for detail-page fetches in automated runs. Manual
/// runs drop to a single worker out of respect for per-site rate limits.
const DETAIL_WORKERS: usize = 5;
/// Total attempts per query unit for providers without location
/// filtering, whose empty pages are often transient.
const MAX_ATTEMPTS_PER_QUERY: usize = 2;
/// Criteria label used when a provider is queried without a location.
const ALL_LOCATIONS: &str = "All Locations";

/// What a finished run hands to the persistence layer.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Every record that survived deduplication, sorted by relevance
    /// score descending.
    pub jobs: Vec<JobRecord>,
    /// The subset passing the profile's score and keyword filters, in the
    /// same order.
    pub filtered: Vec<JobRecord>,
}

impl RunOutput {
    /// Number of unique records the run collected.
    pub fn count(&self) -> usize {
        self.jobs.len()
    }
}

/// Drives searches across all active providers and scores the results.
pub struct Pipeline {
    profile: SearchProfile,
    scorer: Scorer,
    providers: Vec<BoundProvider>,
    client: Client,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Builds a pipeline from a validated profile, resolving enabled
    /// providers against the catalog. All adapters share one HTTP client,
    /// so connections and cookies are pooled across the whole run.
    pub fn new(
        profile: SearchProfile,
        candidate: CandidateProfile,
        corpus: SkillCorpus,
    ) -> Result<Self> {
        profile.validate()?;
        let timeout = Duration::from_secs(profile.api_settings.request_timeout_secs);
        let client = build_client(timeout)?;
        let providers = registry::resolve_active(&profile, &client);
        Ok(Self::assemble(profile, candidate, corpus, providers, client))
    }

    /// Builds a pipeline over caller-supplied adapters instead of the
    /// catalog, for embedding custom boards or driving the pipeline from
    /// tests.
    pub fn with_providers(
        profile: SearchProfile,
        candidate: CandidateProfile,
        corpus: SkillCorpus,
        providers: Vec<BoundProvider>,
    ) -> Result<Self> {
        profile.validate()?;
        let timeout = Duration::from_secs(profile.api_settings.request_timeout_secs);
        let client = build_client(timeout)?;
        Ok(Self::assemble(profile, candidate, corpus, providers, client))
    }

    fn assemble(
        profile: SearchProfile,
        candidate: CandidateProfile,
        corpus: SkillCorpus,
        providers: Vec<BoundProvider>,
        client: Client,
    ) -> Self {
        let scorer = Scorer::new(candidate, corpus, profile.scoring_weights.clone());
        Self {
            profile,
            scorer,
            providers,
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Token the host can trigger to wind the run down gracefully: no new
    /// provider or detail calls are scheduled, and whatever has been
    /// collected is still deduplicated, scored and sorted.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the automated pipeline over all active providers.
    pub async fn run(&self) -> RunOutput {
        info!(
            providers = self.providers.len(),
            queries = self.profile.search_queries.len(),
            "starting search run"
        );
        if self.providers.is_empty() {
            warn!("no providers enabled, run will produce no records");
        }

        // 1. Search: one task per provider, each collecting into its own
        //    buffer; `buffered` preserves catalog order at the merge.
        let buffers: Vec<Vec<JobRecord>> = stream::iter(
            self.providers.iter().map(|p| self.provider_task(p)),
        )
        .buffered(SEARCH_WORKERS)
        .collect()
        .await;
        let collected: Vec<JobRecord> = buffers.into_iter().flatten().collect();
        info!(records = collected.len(), "search phase complete");

        self.finalize(collected, false).await
    }

    /// Runs phases 2–5 over operator-injected links.
    ///
    /// Each link becomes a pending-extraction stub attributed to the
    /// provider guessed from its domain, then the normal dedup, detail
    /// and scoring machinery takes over. Detail fetching always runs
    /// here; the stubs have no text worth scoring without it.
    pub async fn run_manual(&self, links: &[String], source_label: &str) -> RunOutput {
        let stubs: Vec<JobRecord> = links
            .iter()
            .filter(|link| !link.trim().is_empty())
            .map(|link| {
                let key = ProviderKey::from_url(link)
                    .map(|k| k.key())
                    .unwrap_or(ProviderKey::LinkedIn.key());
                JobRecord::manual_stub(link.trim(), key, source_label)
            })
            .collect();
        info!(links = stubs.len(), "manual run over injected links");

        self.finalize(stubs, true).await
    }

    /// Phases 2–5, shared by both run modes.
    async fn finalize(&self, collected: Vec<JobRecord>, manual: bool) -> RunOutput {
        // 2. Deduplicate, first occurrence winning.
        let mut jobs = dedup_records(collected);
        debug!(unique = jobs.len(), "deduplication complete");

        // 3. Local enrichment: first-pass scores from listing text alone,
        //    so even a cancelled or fetch-less run ends fully scored.
        for job in &mut jobs {
            self.scorer.enrich(job);
        }

        // 4. Detail enrichment, gated on mode and profile.
        let fetch = manual || self.profile.search_parameters.fetch_full_description;
        if fetch && !self.cancel.is_cancelled() {
            let workers = if manual { 1 } else { DETAIL_WORKERS };
            debug!(records = jobs.len(), workers, "detail enrichment started");
            jobs = stream::iter(jobs.into_iter().map(|job| self.detail_task(job)))
                .buffered(workers)
                .collect()
                .await;
        }

        // 5. Stable sort by relevance, best first.
        jobs.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

        let filtered = self.filtered_view(&jobs, manual);
        info!(total = jobs.len(), filtered = filtered.len(), "run finalized");
        RunOutput { jobs, filtered }
    }

    /// One provider's full search workload: every query crossed with every
    /// location it should see, serially, with pacing pauses in between.
    async fn provider_task(&self, provider: &BoundProvider) -> Vec<JobRecord> {
        let global = &self.profile.search_parameters.locations;
        let locations = provider.locations_for_run(global);
        let delay = pacing_delay(self.profile.api_settings.delay_between_requests);
        info!(
            provider = provider.adapter.display_name(),
            method = provider.adapter.scraping_method(),
            locations = locations.len(),
            "provider search started"
        );

        let mut buffer = Vec::new();
        'run: for query in &self.profile.search_queries {
            for &location in &locations {
                if self.cancel.is_cancelled() {
                    break 'run;
                }
                buffer.extend(self.query_unit(provider, query, location, delay).await);
                if !self.pause(delay).await {
                    break 'run;
                }
            }
        }
        buffer
    }

    /// One (query, location) search with the retry policy applied.
    ///
    /// Location-filtering providers get a single attempt and their empty
    /// result is final. Keyword-only providers retry empty results and
    /// errors up to the attempt ceiling, pausing twice as long before
    /// each retry.
    async fn query_unit(
        &self,
        provider: &BoundProvider,
        query: &str,
        location: &str,
        delay: Duration,
    ) -> Vec<JobRecord> {
        let adapter = &provider.adapter;
        let supports_location = adapter.supports_location_filter();
        let max_attempts = if supports_location {
            1
        } else {
            MAX_ATTEMPTS_PER_QUERY
        };
        let label = if location.is_empty() {
            ALL_LOCATIONS
        } else {
            location
        };

        let mut attempts = 0;
        while attempts < max_attempts {
            if attempts > 0 && !self.pause(delay * 2).await {
                break;
            }
            match adapter.search(query, location, provider.max_results).await {
                Ok(records) if !records.is_empty() => {
                    debug!(
                        provider = adapter.display_name(),
                        count = records.len(),
                        location = %label,
                        "search unit succeeded"
                    );
                    let mut records = records;
                    for record in &mut records {
                        record.search_criteria = format!("{query} | {label}");
                    }
                    return records;
                }
                Ok(_) if supports_location => {
                    debug!(
                        provider = adapter.display_name(),
                        location = %label,
                        "zero results accepted as final"
                    );
                    return Vec::new();
                }
                Ok(_) => {
                    debug!(
                        provider = adapter.display_name(),
                        attempt = attempts + 1,
                        "empty result, retrying"
                    );
                    attempts += 1;
                }
                Err(e) => {
                    warn!(
                        provider = adapter.display_name(),
                        error = %e,
                        "search attempt failed"
                    );
                    attempts += 1;
                }
            }
        }
        Vec::new()
    }

    /// Pacing sleep that doubles as the cancellation check. Returns
    /// `false` once the token fires, telling the caller to stop
    /// scheduling work.
    async fn pause(&self, delay: Duration) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// Fetches and merges one record's detail page, then rescores it.
    ///
    /// The rescore is unconditional: stale first-pass values must never
    /// survive a metadata change, and a failed fetch simply rescores the
    /// unchanged record to the same values.
    async fn detail_task(&self, mut job: JobRecord) -> JobRecord {
        if !self.cancel.is_cancelled() {
            let adapter = self.detail_adapter(&job.provider);
            match adapter.fetch_detail(&job.link).await {
                Ok(detail) => job.apply_detail(detail),
                Err(e) => warn!(
                    link = %job.link,
                    error = %e,
                    "detail fetch failed, keeping listing data"
                ),
            }
        }
        self.scorer.enrich(&mut job);
        job
    }

    /// Finds the adapter responsible for a record's detail page: the bound
    /// set first, then a fresh catalog instance on the shared client,
    /// defaulting to LinkedIn for records whose provider tag is unknown.
    fn detail_adapter(&self, provider_key: &str) -> Arc<dyn JobProvider> {
        let key = provider_key.to_lowercase();
        if let Some(bound) = self.providers.iter().find(|b| b.adapter.key() == key) {
            return bound.adapter.clone();
        }
        let catalog = ProviderKey::from_key(&key).unwrap_or(ProviderKey::LinkedIn);
        catalog.instantiate(&self.client)
    }

    /// The min-score and keyword-exclusion view over the sorted collection.
    /// Manual runs ignore the score floor so every injected link surfaces.
    fn filtered_view(&self, jobs: &[JobRecord], manual: bool) -> Vec<JobRecord> {
        let min_score = if manual {
            0
        } else {
            self.profile.filtering.min_relevance_score
        };
        let exclude: Vec<String> = self
            .profile
            .filtering
            .exclude_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| k.to_lowercase())
            .collect();
        jobs.iter()
            .filter(|job| job.relevance_score >= min_score)
            .filter(|job| {
                let title = job.title.to_lowercase();
                !exclude.iter().any(|k| title.contains(k))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SkillEntry;
    use std::collections::BTreeMap;

    fn candidate() -> CandidateProfile {
        let mut skills = BTreeMap::new();
        skills.insert(
            "programming".to_string(),
            vec![SkillEntry::Plain("rust".into()), SkillEntry::Plain("python".into())],
        );
        CandidateProfile {
            skills,
            known_companies: Vec::new(),
        }
    }

    fn corpus() -> SkillCorpus {
        let mut categories = BTreeMap::new();
        categories.insert(
            "programming_skills".to_string(),
            vec![SkillEntry::Plain("rust".into()), SkillEntry::Plain("python".into())],
        );
        SkillCorpus { categories }
    }

    fn empty_pipeline(profile: SearchProfile) -> Pipeline {
        Pipeline::with_providers(profile, candidate(), corpus(), Vec::new())
            .expect("valid profile")
    }

    fn scored_record(title: &str, link: &str, description: &str) -> JobRecord {
        JobRecord {
            link: link.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            ..JobRecord::default()
        }
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let mut profile = SearchProfile::default();
        profile.filtering.min_relevance_score = 200;
        let result = Pipeline::with_providers(profile, candidate(), corpus(), Vec::new());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn run_without_providers_completes_empty() {
        let pipeline = empty_pipeline(SearchProfile::default());
        let output = pipeline.run().await;
        assert_eq!(output.count(), 0);
        assert!(output.filtered.is_empty());
    }

    #[tokio::test]
    async fn finalize_dedups_scores_and_sorts() {
        let pipeline = empty_pipeline(SearchProfile::default());
        let collected = vec![
            scored_record("Cook", "https://jobs.example/cook", "no relevant stack"),
            scored_record("Rust Dev", "https://jobs.example/rust", "rust and python daily"),
            scored_record("Cook again", "https://jobs.example/cook", "duplicate link"),
        ];
        let output = pipeline.finalize(collected, false).await;
        assert_eq!(output.count(), 2);
        // Best score first, and every record carries a recomputed score.
        assert_eq!(output.jobs[0].title, "Rust Dev");
        assert!(output.jobs[0].relevance_score >= output.jobs[1].relevance_score);
    }

    #[tokio::test]
    async fn filtered_view_applies_score_floor_and_keywords() {
        let mut profile = SearchProfile::default();
        profile.filtering.min_relevance_score = 1;
        profile.filtering.exclude_keywords = vec!["Praktikum".into()];
        let pipeline = empty_pipeline(profile);
        let collected = vec![
            scored_record("Rust Dev", "https://jobs.example/1", "rust and python"),
            scored_record("Rust Praktikum", "https://jobs.example/2", "rust and python"),
            scored_record("Gardener", "https://jobs.example/3", ""),
        ];
        let output = pipeline.finalize(collected, false).await;
        assert_eq!(output.count(), 3);
        let titles: Vec<_> = output.filtered.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Rust Dev"]);
    }

    #[tokio::test]
    async fn manual_finalize_ignores_score_floor() {
        let mut profile = SearchProfile::default();
        profile.filtering.min_relevance_score = 99;
        let pipeline = empty_pipeline(profile);
        // Skip the forced manual detail fetch so the test stays offline.
        pipeline.cancel_token().cancel();
        let stub = JobRecord::manual_stub("https://jobs.example/x", "linkedin", "links.csv");
        let output = pipeline.finalize(vec![stub], true).await;
        assert_eq!(output.filtered.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_run_still_finalizes() {
        let pipeline = empty_pipeline(SearchProfile::default());
        pipeline.cancel_token().cancel();
        let collected = vec![scored_record(
            "Rust Dev",
            "https://jobs.example/rust",
            "rust and python",
        )];
        let output = pipeline.finalize(collected, false).await;
        assert_eq!(output.count(), 1);
        assert!(output.jobs[0].relevance_score > 0);
    }

    #[tokio::test]
    async fn manual_stub_provider_guessed_from_url() {
        let pipeline = empty_pipeline(SearchProfile::default());
        // Cancel up front so the manual run skips detail fetching and no
        // request leaves the test.
        pipeline.cancel_token().cancel();
        let links = vec![
            "https://www.freelancermap.de/projekt/123".to_string(),
            "https://somewhere.example/job/9".to_string(),
            "   ".to_string(),
        ];
        let output = pipeline.run_manual(&links, "links.csv").await;
        assert_eq!(output.count(), 2);
        assert_eq!(output.jobs.iter().filter(|j| j.provider == "freelancermap").count(), 1);
        assert_eq!(output.jobs.iter().filter(|j| j.provider == "linkedin").count(), 1);
        for job in &output.jobs {
            assert_eq!(job.search_criteria, "Manual | links.csv");
        }
    }
}
