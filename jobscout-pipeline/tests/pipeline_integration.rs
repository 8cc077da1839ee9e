//! Integration tests for the full search pipeline.
//!
//! These tests drive search → dedup → enrich → detail → sort → filter
//! end to end over scripted in-memory boards (no network calls). Live
//! board tests live next to each adapter and are marked `#[ignore]`.

use async_trait::async_trait;
use jobscout_pipeline::{
    BoundProvider, CandidateProfile, DetailFetch, JobProvider, JobRecord, Pipeline, PipelineError,
    SearchProfile, SkillCorpus, SkillEntry,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// A board with fixed results and per-link detail payloads, recording
/// every call it receives.
struct ScriptedBoard {
    key: &'static str,
    name: &'static str,
    location_filter: bool,
    fail_searches: bool,
    results: Vec<JobRecord>,
    details: HashMap<String, DetailFetch>,
    search_calls: Arc<Mutex<Vec<(String, String)>>>,
    detail_calls: Arc<AtomicUsize>,
    /// When set, the first search cancels this token (simulates an
    /// operator interrupt mid-run).
    cancel_slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl ScriptedBoard {
    fn new(key: &'static str, name: &'static str, results: Vec<JobRecord>) -> Self {
        Self {
            key,
            name,
            location_filter: true,
            fail_searches: false,
            results,
            details: HashMap::new(),
            search_calls: Arc::new(Mutex::new(Vec::new())),
            detail_calls: Arc::new(AtomicUsize::new(0)),
            cancel_slot: Arc::new(Mutex::new(None)),
        }
    }

    fn with_detail(mut self, link: &str, detail: DetailFetch) -> Self {
        self.details.insert(link.to_string(), detail);
        self
    }
}

#[async_trait]
impl JobProvider for ScriptedBoard {
    fn key(&self) -> &'static str {
        self.key
    }

    fn display_name(&self) -> &'static str {
        self.name
    }

    fn supports_location_filter(&self) -> bool {
        self.location_filter
    }

    async fn search(
        &self,
        query: &str,
        location: &str,
        max_results: usize,
    ) -> Result<Vec<JobRecord>, PipelineError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((query.to_string(), location.to_string()));
        if let Some(token) = self.cancel_slot.lock().unwrap().as_ref() {
            token.cancel();
        }
        if self.fail_searches {
            return Err(PipelineError::Http("scripted failure".into()));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }

    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch, PipelineError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .details
            .get(link)
            .cloned()
            .unwrap_or(DetailFetch::Description(String::new())))
    }
}

fn listing(provider: &str, id: &str, title: &str, description: &str) -> JobRecord {
    JobRecord {
        job_id: Some(id.to_string()),
        link: format!("https://www.{provider}.example/jobs/view/{id}"),
        provider: provider.to_string(),
        title: title.to_string(),
        company: "Acme GmbH".to_string(),
        location: "Berlin".to_string(),
        description: description.to_string(),
        employment_type: "Full-time".to_string(),
        posted_at_relative: "Recent".to_string(),
        ..JobRecord::default()
    }
}

fn candidate() -> CandidateProfile {
    let mut skills = BTreeMap::new();
    skills.insert(
        "programming".to_string(),
        vec![
            SkillEntry::Plain("rust".into()),
            SkillEntry::Plain("python".into()),
        ],
    );
    skills.insert(
        "testing".to_string(),
        vec![SkillEntry::Plain("selenium".into())],
    );
    skills.insert(
        "roles".to_string(),
        vec![SkillEntry::Plain("software developer".into())],
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
        vec![
            SkillEntry::Plain("rust".into()),
            SkillEntry::Plain("python".into()),
            SkillEntry::Plain("go".into()),
        ],
    );
    categories.insert(
        "testing_skills".to_string(),
        vec![
            SkillEntry::Plain("selenium".into()),
            SkillEntry::Plain("cypress".into()),
        ],
    );
    SkillCorpus { categories }
}

/// Fast profile: no pacing delays, one query over one location.
fn profile() -> SearchProfile {
    let mut profile = SearchProfile::default();
    profile.search_queries = vec!["rust developer".to_string()];
    profile.search_parameters.locations = vec!["Remote".to_string()];
    profile.api_settings.delay_between_requests = 0.0;
    profile
}

fn pipeline_over(profile: SearchProfile, boards: Vec<ScriptedBoard>) -> Pipeline {
    let providers = boards
        .into_iter()
        .map(|board| BoundProvider::new(Arc::new(board), 20))
        .collect();
    Pipeline::with_providers(profile, candidate(), corpus(), providers).expect("valid profile")
}

#[tokio::test]
async fn full_run_dedups_across_boards_and_sorts_by_score() {
    let strong = listing("linkedin", "1", "Rust Engineer", "We use Rust and Python daily.");
    let weak = listing("linkedin", "2", "Office Manager", "Scheduling and travel booking.");
    // Same posting surfaces on a second board under another id but the
    // same URL; the first occurrence must win.
    let mut mirrored = strong.clone();
    mirrored.job_id = Some("9901".to_string());
    mirrored.provider = "hays".to_string();

    let board_a = ScriptedBoard::new("linkedin", "LinkedIn", vec![strong, weak]);
    let board_b = ScriptedBoard::new("hays", "Hays", vec![mirrored]);
    let pipeline = pipeline_over(profile(), vec![board_a, board_b]);

    let output = pipeline.run().await;

    assert_eq!(output.count(), 2, "mirrored posting should collapse");
    assert_eq!(output.jobs[0].title, "Rust Engineer");
    assert_eq!(output.jobs[0].provider, "linkedin", "first occurrence wins");
    assert!(
        output.jobs[0].relevance_score > output.jobs[1].relevance_score,
        "skill-matching posting should outrank the unrelated one"
    );
    assert_eq!(output.jobs[0].search_criteria, "rust developer | Remote");
    assert_eq!(output.jobs[0].matching_skills, "Python, Rust");
    assert_eq!(output.jobs[0].detected_language, "English");
}

#[tokio::test]
async fn keyword_only_board_searched_once_without_location() {
    let mut board = ScriptedBoard::new(
        "xing",
        "XING",
        vec![listing("xing", "7", "QA Engineer", "Selenium test automation.")],
    );
    board.location_filter = false;
    let calls = board.search_calls.clone();

    let mut profile = profile();
    profile.search_parameters.locations = vec!["Remote".to_string(), "Berlin".to_string()];
    let pipeline = pipeline_over(profile, vec![board]);

    let output = pipeline.run().await;

    let calls = calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        &[("rust developer".to_string(), String::new())],
        "keyword-only board gets one empty-location pass, not the location fan-out"
    );
    assert_eq!(output.jobs[0].search_criteria, "rust developer | All Locations");
}

#[tokio::test]
async fn keyword_only_board_retries_empty_results_then_gives_up() {
    let mut board = ScriptedBoard::new("xing", "XING", Vec::new());
    board.location_filter = false;
    let calls = board.search_calls.clone();

    let pipeline = pipeline_over(profile(), vec![board]);
    let output = pipeline.run().await;

    assert_eq!(output.count(), 0);
    assert_eq!(
        calls.lock().unwrap().len(),
        2,
        "an empty page from a keyword-only board is retried exactly once"
    );
}

#[tokio::test]
async fn located_board_accepts_empty_result_as_final() {
    let board = ScriptedBoard::new("hays", "Hays", Vec::new());
    let calls = board.search_calls.clone();

    let pipeline = pipeline_over(profile(), vec![board]);
    pipeline.run().await;

    assert_eq!(
        calls.lock().unwrap().len(),
        1,
        "a located board's empty result is final, no retry"
    );
}

#[tokio::test]
async fn failing_board_costs_only_its_own_results() {
    let mut broken = ScriptedBoard::new("hays", "Hays", Vec::new());
    broken.fail_searches = true;
    let healthy = ScriptedBoard::new(
        "linkedin",
        "LinkedIn",
        vec![listing("linkedin", "1", "Rust Engineer", "Rust services.")],
    );

    let pipeline = pipeline_over(profile(), vec![broken, healthy]);
    let output = pipeline.run().await;

    assert_eq!(output.count(), 1);
    assert_eq!(output.jobs[0].provider, "linkedin");
}

#[tokio::test]
async fn erroring_keyword_only_board_stops_at_the_retry_ceiling() {
    let mut broken = ScriptedBoard::new("xing", "XING", Vec::new());
    broken.location_filter = false;
    broken.fail_searches = true;
    let calls = broken.search_calls.clone();
    let healthy = ScriptedBoard::new(
        "linkedin",
        "LinkedIn",
        vec![listing("linkedin", "1", "Rust Engineer", "Rust services.")],
    );

    let pipeline = pipeline_over(profile(), vec![broken, healthy]);
    let output = pipeline.run().await;

    assert_eq!(
        calls.lock().unwrap().len(),
        2,
        "errors count as attempts, so the board stops at the ceiling"
    );
    assert_eq!(output.count(), 1, "the rest of the run is unaffected");
    assert_eq!(output.jobs[0].provider, "linkedin");
}

#[tokio::test]
async fn detail_pass_merges_descriptions_and_rescores() {
    let thin = listing("linkedin", "1", "Rust Engineer", "Rust role.");
    let link = thin.link.clone();
    let board = ScriptedBoard::new("linkedin", "LinkedIn", vec![thin]).with_detail(
        &link,
        DetailFetch::Description(
            "Rust, Python and Go in production. Selenium test suite. Salary: €95k".into(),
        ),
    );

    let mut with_fetch = profile();
    with_fetch.search_parameters.fetch_full_description = true;
    let pipeline = pipeline_over(with_fetch, vec![board]);
    let fetched = pipeline.run().await;

    let baseline_board = ScriptedBoard::new(
        "linkedin",
        "LinkedIn",
        vec![listing("linkedin", "1", "Rust Engineer", "Rust role.")],
    );
    let baseline = pipeline_over(profile(), vec![baseline_board]).run().await;

    let job = &fetched.jobs[0];
    assert!(job.description.contains("Selenium test suite"));
    assert_eq!(job.matching_skills, "Python, Rust, Selenium");
    assert!(
        job.missing_skills.contains("Go"),
        "a market skill the text names but the candidate lacks shows as missing"
    );
    assert_eq!(job.salary_hint, "€95k");
    assert!(
        job.relevance_score > baseline.jobs[0].relevance_score,
        "richer text must raise the score ({} vs {})",
        job.relevance_score,
        baseline.jobs[0].relevance_score
    );
}

#[tokio::test]
async fn manual_run_converges_with_automated_run() {
    let listing_record = listing("linkedin", "1", "Rust Engineer", "");
    let link = listing_record.link.clone();
    let detail = DetailFetch::Description("Rust and Python microservices.".to_string());

    let mut auto_profile = profile();
    auto_profile.search_parameters.fetch_full_description = true;
    let auto_board = ScriptedBoard::new("linkedin", "LinkedIn", vec![listing_record])
        .with_detail(&link, detail.clone());
    let automated = pipeline_over(auto_profile, vec![auto_board]).run().await;

    let manual_board =
        ScriptedBoard::new("linkedin", "LinkedIn", Vec::new()).with_detail(&link, detail);
    let manual_pipeline = pipeline_over(profile(), vec![manual_board]);
    let manual = manual_pipeline
        .run_manual(&[link.clone()], "saved_links.csv")
        .await;

    assert_eq!(manual.count(), 1);
    let auto_job = &automated.jobs[0];
    let manual_job = &manual.jobs[0];
    assert_eq!(manual_job.provider, "linkedin", "provider guessed from URL");
    assert_eq!(manual_job.search_criteria, "Manual | saved_links.csv");
    assert_eq!(manual_job.matching_skills, auto_job.matching_skills);
    assert_eq!(
        manual_job.relevance_score, auto_job.relevance_score,
        "same page text must score the same regardless of how the link arrived"
    );
    assert!(
        !manual.filtered.is_empty(),
        "manual runs ignore the score floor"
    );
}

#[tokio::test]
async fn cancellation_finalizes_with_what_was_collected() {
    let first = listing("linkedin", "1", "Rust Engineer", "Rust only.");
    let board = ScriptedBoard::new("linkedin", "LinkedIn", vec![first]);
    let calls = board.search_calls.clone();
    let detail_calls = board.detail_calls.clone();
    let cancel_slot = board.cancel_slot.clone();

    let mut profile = profile();
    profile.search_queries = vec!["rust".to_string(), "python".to_string()];
    profile.search_parameters.fetch_full_description = true;
    let pipeline = pipeline_over(profile, vec![board]);
    *cancel_slot.lock().unwrap() = Some(pipeline.cancel_token());

    let output = pipeline.run().await;

    assert_eq!(
        calls.lock().unwrap().len(),
        1,
        "no further query unit starts after cancellation"
    );
    assert_eq!(
        detail_calls.load(Ordering::SeqCst),
        0,
        "cancellation skips the detail pass"
    );
    assert_eq!(output.count(), 1, "collected records still come through");
    assert!(
        output.jobs[0].relevance_score > 0,
        "records gathered before cancellation are still scored"
    );
}

#[tokio::test]
async fn filtered_view_applies_score_floor_and_keyword_exclusions() {
    let records = vec![
        listing("linkedin", "1", "Rust Engineer", "Rust and Python."),
        listing("linkedin", "2", "Rust Praktikum", "Rust and Python."),
        listing("linkedin", "3", "Barista", "Coffee and cakes."),
    ];
    let board = ScriptedBoard::new("linkedin", "LinkedIn", records);

    let mut profile = profile();
    profile.filtering.min_relevance_score = 1;
    profile.filtering.exclude_keywords = vec!["praktikum".to_string()];
    let pipeline = pipeline_over(profile, vec![board]);

    let output = pipeline.run().await;

    assert_eq!(output.count(), 3, "the full list keeps everything");
    assert_eq!(output.filtered.len(), 1);
    assert_eq!(output.filtered[0].title, "Rust Engineer");
}
