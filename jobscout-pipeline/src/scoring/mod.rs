//! Record enrichment and relevance scoring.
//!
//! The scorer is pure: given a profile, a corpus and a record's current
//! text fields it always derives the same score, so it can be re-run
//! whenever enrichment changes a record and never leaves a stale value
//! behind.

mod language;
mod relevance;
mod skills;

use crate::config::ScoringWeights;
use crate::profile::{CandidateProfile, SkillCorpus};
use crate::types::{JobRecord, WorkLocation};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Profile categories whose matches surface in `matching_skills`.
const DISPLAY_CATEGORIES: &[&str] = &["programming", "testing", "embedded", "ai_ml", "ai_tools"];

/// Display caps keep the skill columns readable in wide exports.
const MAX_MATCHING_SKILLS: usize = 15;
const MAX_MISSING_SKILLS: usize = 10;

/// Keywords that flip a record to remote during enrichment when the
/// combined text mentions them.
const REMOTE_FALLBACK: &[&str] = &[
    "remote",
    "home office",
    "homeoffice",
    "ortsunabhängig",
    "telearbeit",
    "mobil",
    "100%",
];

/// Currency amounts preceded by a salary-ish label: `€80k`, `$ 95K`,
/// `80.000 €`, `95,000$` or a bare `EUR`.
const SALARY_PATTERN: &str =
    r"(?i)(?:Salary|Gehalt|Stundensatz|Vergütung):?\s*([€$]\s?\d{2,3}[kK]|\d{2,3}[.,]\d{3}\s?[€$]|EUR)";

fn salary_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SALARY_PATTERN).ok()).as_ref()
}

/// Derives language, skill, role, salary and score fields for records.
pub struct Scorer {
    profile: CandidateProfile,
    corpus: SkillCorpus,
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(profile: CandidateProfile, corpus: SkillCorpus, weights: ScoringWeights) -> Self {
        Self {
            profile,
            corpus,
            weights,
        }
    }

    /// Recomputes every derived field on `record` from its current text.
    ///
    /// The scoring text is title, company, description and location,
    /// case-folded. The search criteria string is deliberately excluded
    /// so the same posting scores identically no matter which query found
    /// it. Only `salary_hint` is sticky: once set, by an adapter or an
    /// earlier pass, it is kept rather than re-derived.
    pub fn enrich(&self, record: &mut JobRecord) {
        let text = [
            record.title.as_str(),
            record.company.as_str(),
            record.description.as_str(),
            record.location.as_str(),
        ]
        .join(" ")
        .to_lowercase();

        record.detected_language = language::detect(&text).to_string();

        let mut matched = BTreeSet::new();
        for category in DISPLAY_CATEGORIES {
            for entry in self.profile.category(category) {
                if skills::entry_in_text(&text, entry) {
                    matched.insert(skills::title_case(entry.label()));
                }
            }
        }

        let mut roles = BTreeSet::new();
        for entry in self.profile.roles() {
            if skills::entry_in_text(&text, entry) {
                roles.insert(entry.label().to_string());
            }
        }
        let matched_role_count = roles.len();
        record.matched_roles = roles.into_iter().collect::<Vec<_>>().join(", ");

        // Corpus skills present in the posting that the candidate does not
        // match; the uncapped matched set is the comparison base.
        let mut missing = BTreeSet::new();
        for entry in self.corpus.all_entries() {
            if skills::entry_in_text(&text, entry) {
                let label = skills::title_case(entry.label());
                if !matched.contains(&label) {
                    missing.insert(label);
                }
            }
        }
        record.missing_skills = missing
            .into_iter()
            .take(MAX_MISSING_SKILLS)
            .collect::<Vec<_>>()
            .join(", ");
        record.matching_skills = matched
            .into_iter()
            .take(MAX_MATCHING_SKILLS)
            .collect::<Vec<_>>()
            .join(", ");

        if record.salary_hint.is_empty() {
            record.salary_hint = extract_salary(&record.description);
        }

        if REMOTE_FALLBACK.iter().any(|kw| text.contains(kw)) {
            record.work_location_type = WorkLocation::Remote;
        } else if text.contains("hybrid") {
            record.work_location_type = WorkLocation::Hybrid;
        }

        record.relevance_score = relevance::compute(
            &text,
            &record.company,
            matched_role_count,
            &self.profile,
            &self.corpus,
            &self.weights,
        );
    }
}

fn extract_salary(description: &str) -> String {
    salary_regex()
        .and_then(|re| re.captures(description))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::SkillEntry;
    use std::collections::BTreeMap;

    fn entries(labels: &[&str]) -> Vec<SkillEntry> {
        labels.iter().map(|l| SkillEntry::Plain(l.to_string())).collect()
    }

    fn scorer() -> Scorer {
        let mut skills = BTreeMap::new();
        skills.insert("programming".to_string(), entries(&["rust", "python", "c++"]));
        skills.insert("testing".to_string(), entries(&["pytest"]));
        skills.insert(
            "roles".to_string(),
            entries(&["Test Engineer", "Software Developer"]),
        );
        let profile = CandidateProfile {
            skills,
            known_companies: vec!["Siemens".to_string()],
        };
        let mut categories = BTreeMap::new();
        categories.insert(
            "programming_skills".to_string(),
            entries(&["rust", "python", "go", "java"]),
        );
        categories.insert("testing_skills".to_string(), entries(&["pytest", "selenium"]));
        let corpus = SkillCorpus { categories };
        Scorer::new(profile, corpus, ScoringWeights::default())
    }

    fn record(title: &str, description: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            company: "Acme GmbH".to_string(),
            location: "Berlin".to_string(),
            description: description.to_string(),
            ..JobRecord::default()
        }
    }

    #[test]
    fn enrich_populates_derived_fields() {
        let scorer = scorer();
        let mut job = record(
            "Senior Rust Software Developer",
            "We need rust and python, plus pytest. Experience with go and selenium is a plus.",
        );
        scorer.enrich(&mut job);
        assert_eq!(job.detected_language, "English");
        assert_eq!(job.matching_skills, "Pytest, Python, Rust");
        assert_eq!(job.missing_skills, "Go, Selenium");
        assert_eq!(job.matched_roles, "Software Developer");
        assert!(job.relevance_score > 0);
    }

    #[test]
    fn matching_labels_are_title_cased_and_sorted() {
        let scorer = scorer();
        let mut job = record("rust and PYTHON and pytest", "");
        scorer.enrich(&mut job);
        assert_eq!(job.matching_skills, "Pytest, Python, Rust");
    }

    #[test]
    fn salary_extracted_from_description_only() {
        let scorer = scorer();
        let mut job = record("Rust Developer", "Gehalt: 80.000 € plus benefits");
        scorer.enrich(&mut job);
        assert_eq!(job.salary_hint, "80.000 €");

        // A label in the title never produces a hint.
        let mut job = record("Rust Developer Gehalt: 90.000 €", "");
        scorer.enrich(&mut job);
        assert_eq!(job.salary_hint, "");
    }

    #[test]
    fn salary_hint_is_sticky() {
        let scorer = scorer();
        let mut job = record("Rust Developer", "Salary: €95k");
        job.salary_hint = "€120k".to_string();
        scorer.enrich(&mut job);
        assert_eq!(job.salary_hint, "€120k");
    }

    #[test]
    fn salary_shorthand_variants_match() {
        let scorer = scorer();
        let mut job = record("Rust Developer", "Salary: €95k for this role");
        scorer.enrich(&mut job);
        assert_eq!(job.salary_hint, "€95k");

        let mut job = record("Rust Developer", "Stundensatz 95,000 $ per year");
        scorer.enrich(&mut job);
        assert_eq!(job.salary_hint, "95,000 $");
    }

    #[test]
    fn remote_keywords_override_location_type() {
        let scorer = scorer();
        let mut job = record("Rust Developer", "Work from your home office anywhere");
        scorer.enrich(&mut job);
        assert_eq!(job.work_location_type, WorkLocation::Remote);

        let mut job = record("Rust Developer", "Hybrid setup, two days on site");
        scorer.enrich(&mut job);
        assert_eq!(job.work_location_type, WorkLocation::Hybrid);

        let mut job = record("Rust Developer", "On site in Munich");
        scorer.enrich(&mut job);
        assert_eq!(job.work_location_type, WorkLocation::OnSite);
    }

    #[test]
    fn single_matched_skill_counts_its_category_as_topical() {
        let mut skills = BTreeMap::new();
        skills.insert("programming".to_string(), entries(&["python"]));
        let profile = CandidateProfile {
            skills,
            known_companies: Vec::new(),
        };
        let mut categories = BTreeMap::new();
        categories.insert("programming_skills".to_string(), entries(&["python", "java"]));
        let scorer = Scorer::new(profile, SkillCorpus { categories }, ScoringWeights::default());

        let mut job = JobRecord {
            title: "Senior Python Engineer".to_string(),
            ..JobRecord::default()
        };
        scorer.enrich(&mut job);
        assert_eq!(job.matching_skills, "Python");
        // Java never appears in the text, so nothing is missing.
        assert_eq!(job.missing_skills, "");
        // Programming counts at full weight: earned = min(20, 1*4),
        // achievable = 20 + (20+15+20)*0.25 + 10 + 15.
        assert_eq!(job.relevance_score, (100.0f64 * 4.0 / 58.75).round() as u8);
    }

    #[test]
    fn empty_profile_and_corpus_score_zero() {
        let scorer = Scorer::new(
            CandidateProfile::default(),
            SkillCorpus::default(),
            ScoringWeights::default(),
        );
        let mut job = record(
            "Senior Rust Developer",
            "rust, python and pytest all day long",
        );
        scorer.enrich(&mut job);
        assert_eq!(job.matching_skills, "");
        assert_eq!(job.missing_skills, "");
        assert_eq!(job.relevance_score, 0);
    }

    #[test]
    fn rescoring_is_deterministic() {
        let scorer = scorer();
        let mut job = record("Rust Developer", "rust and pytest");
        scorer.enrich(&mut job);
        let first = job.relevance_score;
        scorer.enrich(&mut job);
        assert_eq!(job.relevance_score, first);
    }

    #[test]
    fn richer_description_changes_the_score() {
        let scorer = scorer();
        let mut stub = record("Rust Developer", "");
        scorer.enrich(&mut stub);
        let stub_score = stub.relevance_score;

        stub.description = "rust, python and pytest in a test engineer role".to_string();
        scorer.enrich(&mut stub);
        assert_ne!(stub.relevance_score, stub_score);

        // A record born with the full text converges to the same score.
        let mut full = record(
            "Rust Developer",
            "rust, python and pytest in a test engineer role",
        );
        scorer.enrich(&mut full);
        assert_eq!(full.relevance_score, stub.relevance_score);
    }

    #[test]
    fn search_criteria_never_influences_the_score() {
        let scorer = scorer();
        let mut a = record("Rust Developer", "rust only");
        a.search_criteria = "python | Remote".to_string();
        let mut b = record("Rust Developer", "rust only");
        b.search_criteria = "embedded | Berlin".to_string();
        scorer.enrich(&mut a);
        scorer.enrich(&mut b);
        assert_eq!(a.relevance_score, b.relevance_score);
    }
}
