//! Candidate profile and skill corpus models.
//!
//! Both are read-only inputs to the scoring engine, loaded from JSON by the
//! host application. Skill entries come in two shapes: a bare string, or a
//! bilingual `{en, de}` pair that matches on either form but is always
//! labeled by its English form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A skill (or role) entry in a profile or corpus category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SkillEntry {
    /// Single-language entry, e.g. `"rust"`.
    Plain(String),
    /// Bilingual entry, e.g. `{"en": "software testing", "de": "softwaretest"}`.
    Bilingual { en: String, de: String },
}

impl SkillEntry {
    /// The canonical (English) label for this entry.
    pub fn label(&self) -> &str {
        match self {
            Self::Plain(s) => s,
            Self::Bilingual { en, .. } => en,
        }
    }

    /// All text forms this entry matches under.
    pub fn forms(&self) -> impl Iterator<Item = &str> {
        let (first, second) = match self {
            Self::Plain(s) => (s.as_str(), None),
            Self::Bilingual { en, de } => (en.as_str(), Some(de.as_str())),
        };
        std::iter::once(first).chain(second)
    }
}

/// The operator's skills, roles and preferred employers.
///
/// `skills` maps category names (`programming`, `testing`, `embedded`,
/// `ai_ml`, `ai_tools`, plus `roles`) to entry lists. Unknown categories
/// are preserved but ignored by scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub skills: BTreeMap<String, Vec<SkillEntry>>,
    pub known_companies: Vec<String>,
}

impl CandidateProfile {
    /// Entries of one skill category; empty when the category is absent.
    pub fn category(&self, name: &str) -> &[SkillEntry] {
        self.skills.get(name).map_or(&[], Vec::as_slice)
    }

    /// Role labels the operator can fill (the `roles` pseudo-category).
    pub fn roles(&self) -> &[SkillEntry] {
        self.category("roles")
    }
}

/// The broad market skill corpus, wider than any one profile.
///
/// Categories use either the bare profile key (`programming`) or the
/// suffixed form (`programming_skills`); lookups consult both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillCorpus {
    pub categories: BTreeMap<String, Vec<SkillEntry>>,
}

impl SkillCorpus {
    /// All entries across every category.
    pub fn all_entries(&self) -> impl Iterator<Item = &SkillEntry> {
        self.categories.values().flatten()
    }

    /// Entries for a profile category, merging the `<key>_skills` and
    /// bare `<key>` spellings.
    pub fn for_profile_key<'a>(&'a self, profile_key: &str) -> Vec<&'a SkillEntry> {
        let suffixed = format!("{profile_key}_skills");
        let mut out = Vec::new();
        if let Some(entries) = self.categories.get(&suffixed) {
            out.extend(entries.iter());
        }
        if let Some(entries) = self.categories.get(profile_key) {
            out.extend(entries.iter());
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }
}
