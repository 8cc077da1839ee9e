//! Config loading: search profiles, the candidate CV, and the skill corpus.
//!
//! All three inputs are JSON. Search-profile names resolve through a
//! candidate ladder so short names like `remote_de` work from the repo
//! root, while explicit paths are honored as given. A missing or
//! malformed file is a fatal configuration error.

use std::path::{Path, PathBuf};

use jobscout_pipeline::{CandidateProfile, SearchProfile, SkillCorpus};

use crate::error::{AppError, Result};

/// Fallback search profile used when name resolution finds nothing.
pub const DEFAULT_PROFILE_PATH: &str = "configs/core/user_default.json";
/// Default CV path, scored against every posting.
pub const DEFAULT_CV_PATH: &str = "configs/my_profile/my_profile.json";
/// Default market skill corpus for missing-skill detection.
pub const DEFAULT_SKILLS_PATH: &str = "configs/data/default_it_skills.json";

/// Resolves a search-profile name to a config file path.
///
/// Tries `configs/search_profiles/<name>.json`, `configs/core/<name>.json`,
/// the literal name, then `<name>.json`, falling back to
/// [`DEFAULT_PROFILE_PATH`]. A trailing `.json` on the name is ignored
/// during resolution.
pub fn resolve_search_profile(name: &str) -> PathBuf {
    resolve_under(Path::new(""), name)
}

fn resolve_under(root: &Path, name: &str) -> PathBuf {
    let base = name.strip_suffix(".json").unwrap_or(name);
    let candidates = [
        root.join(format!("configs/search_profiles/{base}.json")),
        root.join(format!("configs/core/{base}.json")),
        root.join(base),
        root.join(format!("{base}.json")),
    ];
    for candidate in candidates {
        if candidate.exists() {
            return candidate;
        }
    }
    root.join(DEFAULT_PROFILE_PATH)
}

/// Loads a search profile by name, returning it with the resolved path.
///
/// The path stem later feeds the run directory name.
pub fn load_search_profile(name: &str) -> Result<(SearchProfile, PathBuf)> {
    let path = resolve_search_profile(name);
    let profile = read_json(&path)?;
    Ok((profile, path))
}

/// Loads the candidate CV used for skill matching and scoring.
pub fn load_candidate_profile(path: &Path) -> Result<CandidateProfile> {
    read_json(path)
}

/// Loads the market skill corpus.
pub fn load_skill_corpus(path: &Path) -> Result<SkillCorpus> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("cannot parse {}: {e}", path.display())))
}

/// Reads manual-mode links from `path`.
///
/// Accepts a headered CSV with a `link` column or a plain file with one
/// URL per line; blank and non-URL lines are skipped.
pub fn read_manual_links(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    if let Ok(headers) = reader.headers() {
        if let Some(idx) = headers.iter().position(|h| h.trim() == "link") {
            let links = reader
                .records()
                .flatten()
                .filter_map(|row| row.get(idx).map(|link| link.trim().to_string()))
                .filter(|link| !link.is_empty())
                .collect();
            return Ok(links);
        }
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http"))
        .map(str::to_string)
        .collect())
}
