//! Search profile configuration with sensible defaults.
//!
//! A [`SearchProfile`] selects providers, queries and locations, and tunes
//! request pacing, scoring weights, result filtering and output naming.
//! Every section defaults independently, so profile files only spell out
//! what they change.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output formats the host application knows how to write.
pub const KNOWN_OUTPUT_FORMATS: &[&str] = &["csv", "json", "markdown"];

/// Configuration for one search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchProfile {
    /// Label shown in run banners and used for output directory naming.
    pub profile_name: String,
    /// Per-provider activation and overrides, keyed by registry key.
    /// Keys absent from the registry catalog are accepted but never run.
    pub active_providers: BTreeMap<String, ProviderSettings>,
    /// Search query strings, fanned out per provider and location.
    pub search_queries: Vec<String>,
    pub search_parameters: SearchParameters,
    pub api_settings: ApiSettings,
    pub scoring_weights: ScoringWeights,
    pub filtering: FilterSettings,
    pub output: OutputSettings,
}

impl Default for SearchProfile {
    fn default() -> Self {
        Self {
            profile_name: "default".into(),
            active_providers: BTreeMap::new(),
            search_queries: Vec::new(),
            search_parameters: SearchParameters::default(),
            api_settings: ApiSettings::default(),
            scoring_weights: ScoringWeights::default(),
            filtering: FilterSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl SearchProfile {
    /// Validates this profile, returning an error if any field is unusable.
    ///
    /// Checks:
    /// - `request_timeout_secs` must be greater than 0
    /// - `delay_between_requests` must be non-negative and below one minute
    /// - `min_relevance_score` must be at most 100
    /// - every output format must be one of [`KNOWN_OUTPUT_FORMATS`]
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.api_settings.request_timeout_secs == 0 {
            return Err(PipelineError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        let delay = self.api_settings.delay_between_requests;
        if !(0.0..60.0).contains(&delay) {
            return Err(PipelineError::Config(
                "delay_between_requests must be in 0..60 seconds".into(),
            ));
        }
        if self.filtering.min_relevance_score > 100 {
            return Err(PipelineError::Config(
                "min_relevance_score must be at most 100".into(),
            ));
        }
        for format in &self.output.formats {
            if !KNOWN_OUTPUT_FORMATS.contains(&format.as_str()) {
                return Err(PipelineError::Config(format!(
                    "unknown output format: {format}"
                )));
            }
        }
        Ok(())
    }

    /// Applies a CLI provider override: disable everything, then enable
    /// exactly the named keys.
    ///
    /// Names unknown to the registry catalog are still written into the
    /// map (enabled, limit 20) rather than rejected; activation simply
    /// skips them later.
    pub fn force_providers(&mut self, names: &[String]) {
        for settings in self.active_providers.values_mut() {
            settings.enabled = false;
        }
        for name in names {
            let key = name.to_lowercase();
            self.active_providers
                .entry(key)
                .and_modify(|s| s.enabled = true)
                .or_insert(ProviderSettings {
                    enabled: true,
                    max_results: Some(20),
                    locations: None,
                });
        }
    }
}

/// Activation entry for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub enabled: bool,
    /// Result cap per query; falls back to the catalog default.
    pub max_results: Option<usize>,
    /// Provider-specific location list; falls back to the global one.
    pub locations: Option<Vec<String>>,
}

/// What to search for and how deep to go.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    /// Locations queried per provider (unless overridden per provider).
    pub locations: Vec<String>,
    /// Whether to fetch full descriptions after deduplication. Manual-mode
    /// runs always fetch, regardless of this flag.
    pub fetch_full_description: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            locations: vec!["Remote".into()],
            fetch_full_description: false,
        }
    }
}

/// Request pacing and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Politeness delay between query units, in seconds. Retries after an
    /// empty response wait twice this long.
    pub delay_between_requests: f64,
    /// HTTP timeout for search requests, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            delay_between_requests: 2.0,
            request_timeout_secs: 30,
        }
    }
}

/// Category weights for the relevance score.
///
/// Four skill categories are gated on topical relevance; the company and
/// seniority bonuses always count toward the achievable maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub programming_languages: u32,
    pub testing_skills: u32,
    pub embedded_firmware: u32,
    pub ai_ml_skills: u32,
    pub known_companies: u32,
    pub seniority_level: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            programming_languages: 20,
            testing_skills: 20,
            embedded_firmware: 15,
            ai_ml_skills: 20,
            known_companies: 10,
            seniority_level: 15,
        }
    }
}

impl ScoringWeights {
    /// The gated skill categories as `(weight, profile category key)` pairs.
    pub fn skill_categories(&self) -> [(u32, &'static str); 4] {
        [
            (self.programming_languages, "programming"),
            (self.testing_skills, "testing"),
            (self.embedded_firmware, "embedded"),
            (self.ai_ml_skills, "ai_ml"),
        ]
    }
}

/// Post-scoring result filtering for the curated output view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Minimum relevance score for the filtered view. Ignored (treated as
    /// zero) in manual mode, where every injected link should surface.
    pub min_relevance_score: u8,
    /// Case-insensitive title substrings that exclude a record.
    pub exclude_keywords: Vec<String>,
}

/// Output naming and format selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub formats: Vec<String>,
    pub base_filename: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            formats: vec!["csv".into(), "json".into()],
            base_filename: "jobs".into(),
        }
    }
}
