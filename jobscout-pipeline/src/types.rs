//! Core types for job postings and detail-fetch results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the work happens, as advertised by the posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkLocation {
    /// Presence in an office is expected.
    #[default]
    #[serde(rename = "On-site")]
    OnSite,
    /// Fully remote.
    #[serde(rename = "Remote")]
    Remote,
    /// Mix of office and remote days.
    #[serde(rename = "Hybrid")]
    Hybrid,
}

impl WorkLocation {
    /// Returns the display label used in persisted output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnSite => "On-site",
            Self::Remote => "Remote",
            Self::Hybrid => "Hybrid",
        }
    }

    /// Keyword-based detection from listing card text. Bilingual (EN/DE).
    ///
    /// Remote keywords win over hybrid ones; unknown text maps to on-site.
    pub fn detect(text: &str) -> Self {
        let lower = text.to_lowercase();
        const REMOTE: &[&str] = &[
            "remote",
            "home office",
            "home-office",
            "wfh",
            "telecommute",
            "mobil",
            "ortsunabhängig",
        ];
        const HYBRID: &[&str] = &["hybrid", "mischform", "flexibel"];

        if REMOTE.iter().any(|kw| lower.contains(kw)) {
            Self::Remote
        } else if HYBRID.iter().any(|kw| lower.contains(kw)) {
            Self::Hybrid
        } else {
            Self::OnSite
        }
    }
}

impl fmt::Display for WorkLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword-based employment-type detection from listing card text.
///
/// Contract keywords win over internship ones; the default is full-time.
pub fn detect_employment_type(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    const CONTRACT: &[&str] = &[
        "contract",
        "freelance",
        "freiberuflich",
        "project",
        "befristet",
        "projektbasiert",
    ];
    const INTERN: &[&str] = &["intern", "praktikant", "student", "thesis", "werkstudent"];

    if CONTRACT.iter().any(|kw| lower.contains(kw)) {
        "Contract"
    } else if INTERN.iter().any(|kw| lower.contains(kw)) {
        "Internship"
    } else {
        "Full-time"
    }
}

/// A single normalized job posting.
///
/// Produced by provider adapters during search (or synthesized from bare
/// links in manual mode), enriched by detail fetches, and scored by the
/// scoring engine. The serialized field names are a stable contract for
/// downstream writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Provider-assigned identifier, when one could be derived. Falls back
    /// to `link` as the record's identity for deduplication.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Canonical posting URL.
    pub link: String,
    /// Registry key of the source provider (e.g. `"linkedin"`).
    pub provider: String,
    /// Posting title.
    pub title: String,
    /// Hiring company, or a provider-specific placeholder for anonymous clients.
    pub company: String,
    /// Advertised location text.
    pub location: String,
    /// Description text; empty until (and unless) detail enrichment runs.
    #[serde(default)]
    pub description: String,
    /// On-site / remote / hybrid classification.
    #[serde(default)]
    pub work_location_type: WorkLocation,
    /// Free-form employment label ("Contract", "Full-time", ...).
    #[serde(default)]
    pub employment_type: String,
    /// Relative posting age as displayed by the source; never parsed to a date.
    #[serde(default)]
    pub posted_at_relative: String,
    /// When this record was scraped.
    pub scraped_at: DateTime<Utc>,
    /// The `query | location` pair that produced the record.
    #[serde(default)]
    pub search_criteria: String,
    /// Relevance percentage in `0..=100`, recomputed in full on every
    /// text change — never patched incrementally.
    #[serde(default)]
    pub relevance_score: u8,
    /// Comma-joined, sorted, title-cased profile skills found in the text.
    #[serde(default)]
    pub matching_skills: String,
    /// Comma-joined corpus skills found in the text but absent from the profile.
    #[serde(default)]
    pub missing_skills: String,
    /// Comma-joined role labels from the profile found in the text.
    #[serde(default)]
    pub matched_roles: String,
    /// "English" or "German", by function-word frequency.
    #[serde(default)]
    pub detected_language: String,
    /// First salary expression found in the description, if any. Sticky:
    /// once set it survives later rescoring passes.
    #[serde(default)]
    pub salary_hint: String,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            job_id: None,
            link: String::new(),
            provider: String::new(),
            title: String::new(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            work_location_type: WorkLocation::OnSite,
            employment_type: String::new(),
            posted_at_relative: String::new(),
            scraped_at: Utc::now(),
            search_criteria: String::new(),
            relevance_score: 0,
            matching_skills: String::new(),
            missing_skills: String::new(),
            matched_roles: String::new(),
            detected_language: String::new(),
            salary_hint: String::new(),
        }
    }
}

impl JobRecord {
    /// Builds the placeholder record for a bare link injected in manual mode.
    ///
    /// Carries no `job_id`, so repeated links in one input file collapse
    /// during deduplication. All display fields hold pending markers until
    /// the detail fetch fills them in.
    pub fn manual_stub(link: &str, provider: &str, source_label: &str) -> Self {
        Self {
            link: link.to_string(),
            provider: provider.to_string(),
            title: "Pending Extraction...".into(),
            company: "Pending Extraction...".into(),
            location: "Remote".into(),
            work_location_type: WorkLocation::Remote,
            employment_type: "Freelance".into(),
            posted_at_relative: "N/A".into(),
            search_criteria: format!("Manual | {source_label}"),
            ..Self::default()
        }
    }

    /// Merges a detail-fetch result into this record.
    ///
    /// Empty payloads leave every field untouched, so a failed or
    /// fruitless detail fetch never degrades data gathered earlier.
    pub fn apply_detail(&mut self, detail: DetailFetch) {
        match detail {
            DetailFetch::Description(text) => {
                if !text.is_empty() {
                    self.description = text;
                }
            }
            DetailFetch::Fields(patch) => self.apply_patch(patch),
        }
    }

    fn apply_patch(&mut self, patch: RecordPatch) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(v) = value {
                if !v.is_empty() {
                    *target = v;
                }
            }
        }
        set(&mut self.title, patch.title);
        set(&mut self.company, patch.company);
        set(&mut self.location, patch.location);
        set(&mut self.description, patch.description);
        set(&mut self.employment_type, patch.employment_type);
        if let Some(wlt) = patch.work_location_type {
            self.work_location_type = wlt;
        }
    }
}

/// What a detail-page fetch produced.
///
/// Providers differ in how much structure their detail pages expose:
/// some yield only a text description, others a set of corrected fields.
/// The orchestrator pattern-matches on this instead of inspecting shapes.
#[derive(Debug, Clone)]
pub enum DetailFetch {
    /// Plain description text. An empty string means "nothing found".
    Description(String),
    /// A subset of record fields to overwrite.
    Fields(RecordPatch),
}

/// Partial record update from a structured detail page.
///
/// `None` fields (and empty strings) are skipped on merge; present,
/// non-empty values overwrite the listing-card data.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub work_location_type: Option<WorkLocation>,
    pub employment_type: Option<String>,
}
