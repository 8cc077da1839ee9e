//! The normalized relevance score.

use crate::config::ScoringWeights;
use crate::profile::{CandidateProfile, SkillCorpus};
use crate::scoring::skills::entry_in_text;

/// Points earned per matched skill inside a category, before the category
/// weight caps them.
const POINTS_PER_SKILL: f64 = 4.0;

/// Points earned per matched role, capped by the seniority weight.
const POINTS_PER_ROLE: f64 = 5.0;

/// How much of its weight an off-topic category still contributes to the
/// achievable maximum. Without this floor, a posting outside the
/// candidate's domains could never score high on the skills it does hit.
const OFF_TOPIC_WEIGHT_SHARE: f64 = 0.25;

/// Computes the 0–100 relevance score for one record.
///
/// Each of the four skill categories counts fully toward the achievable
/// maximum only when the corpus shows the posting is topically about that
/// category at all; otherwise it contributes a quarter weight and earns
/// nothing. The company and role bonuses always count toward the maximum.
/// Deterministic in its inputs, so re-running after a text change always
/// yields the score that text deserves.
pub(crate) fn compute(
    text: &str,
    company: &str,
    matched_role_count: usize,
    profile: &CandidateProfile,
    corpus: &SkillCorpus,
    weights: &ScoringWeights,
) -> u8 {
    let mut earned = 0.0f64;
    let mut achievable = 0.0f64;

    for (weight, profile_key) in weights.skill_categories() {
        let weight = f64::from(weight);
        let topical = corpus
            .for_profile_key(profile_key)
            .into_iter()
            .any(|entry| entry_in_text(text, entry));
        if topical {
            let matches = profile
                .category(profile_key)
                .iter()
                .filter(|entry| entry_in_text(text, entry))
                .count();
            achievable += weight;
            earned += weight.min(matches as f64 * POINTS_PER_SKILL);
        } else {
            achievable += weight * OFF_TOPIC_WEIGHT_SHARE;
        }
    }

    let company_weight = f64::from(weights.known_companies);
    let role_weight = f64::from(weights.seniority_level);
    achievable += company_weight + role_weight;

    let company_lower = company.to_lowercase();
    let known = profile
        .known_companies
        .iter()
        .filter(|c| !c.is_empty())
        .any(|c| company_lower.contains(&c.to_lowercase()));
    if known {
        earned += company_weight;
    }

    earned += role_weight.min(matched_role_count as f64 * POINTS_PER_ROLE);

    if achievable > 0.0 {
        (100.0 * earned / achievable).round() as u8
    } else {
        0
    }
}
