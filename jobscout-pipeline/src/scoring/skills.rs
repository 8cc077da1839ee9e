//! Lexical skill matching against posting text.

use crate::profile::SkillEntry;

/// Skill forms that token-boundary matching can never hit because they
/// contain or end in symbol characters. These match by plain substring.
const SYMBOL_FORMS: &[&str] = &["c++", "c#", ".net"];

/// Whether any form of `entry` occurs in the case-folded `text`.
pub(crate) fn entry_in_text(text: &str, entry: &SkillEntry) -> bool {
    entry.forms().any(|form| form_in_text(text, form))
}

/// Token-boundary containment check for a single skill form.
///
/// A form is present when it occurs bounded by non-ASCII-alphanumeric
/// characters or string edges. `text` must already be lowercased; the
/// form is folded here.
fn form_in_text(text: &str, form: &str) -> bool {
    let form = form.to_lowercase();
    if form.is_empty() {
        return false;
    }
    if SYMBOL_FORMS.contains(&form.as_str()) {
        return text.contains(&form);
    }
    let bytes = text.as_bytes();
    for (start, matched) in text.match_indices(&form) {
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let end = start + matched.len();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return true;
        }
    }
    false
}

/// Title-cases a label for display: the first letter of every run of
/// alphabetic characters is uppercased, the rest lowercased. Non-letters
/// pass through and start a new run.
pub(crate) fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_word = false;
    for ch in label.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> SkillEntry {
        SkillEntry::Plain(s.to_string())
    }

    #[test]
    fn token_boundaries_respected() {
        assert!(entry_in_text("senior rust developer", &plain("rust")));
        assert!(entry_in_text("rust, go and python", &plain("go")));
        // "rust" inside "trusted" must not fire.
        assert!(!entry_in_text("trusted platform module", &plain("rust")));
        // "java" inside "javascript" must not fire.
        assert!(!entry_in_text("javascript frameworks", &plain("java")));
    }

    #[test]
    fn go_never_fires_inside_golang() {
        assert!(!entry_in_text("golang microservices", &plain("go")));
        // "golang" as its own entry still matches the same text.
        assert!(entry_in_text("golang microservices", &plain("golang")));
    }

    #[test]
    fn string_edges_count_as_boundaries() {
        assert!(entry_in_text("rust", &plain("rust")));
        assert!(entry_in_text("rust engineer", &plain("rust")));
        assert!(entry_in_text("we use rust", &plain("rust")));
    }

    #[test]
    fn symbol_skills_match_by_substring() {
        assert!(entry_in_text("modern c++ experience", &plain("C++")));
        assert!(entry_in_text("c++/c# stack", &plain("c++")));
        assert!(entry_in_text("(c++)", &plain("c++")));
        assert!(entry_in_text("c#/.net backend", &plain("c#")));
        assert!(entry_in_text("c#/.net backend", &plain(".NET")));
        assert!(!entry_in_text("plain c experience", &plain("c++")));
    }

    #[test]
    fn multi_word_forms_match() {
        assert!(entry_in_text("experience with unit testing required", &plain("unit testing")));
        assert!(!entry_in_text("experience with unittesting required", &plain("unit testing")));
    }

    #[test]
    fn bilingual_entry_matches_either_form() {
        let entry = SkillEntry::Bilingual {
            en: "requirements engineering".into(),
            de: "anforderungsmanagement".into(),
        };
        assert!(entry_in_text("erfahrung im anforderungsmanagement", &entry));
        assert!(entry_in_text("requirements engineering background", &entry));
        assert!(!entry_in_text("project management background", &entry));
    }

    #[test]
    fn non_ascii_neighbors_are_boundaries() {
        // Umlauts are not ASCII alphanumerics, so they terminate a token.
        assert!(entry_in_text("qualität: c und rust", &plain("c")));
    }

    #[test]
    fn title_case_matches_display_convention() {
        assert_eq!(title_case("unit testing"), "Unit Testing");
        assert_eq!(title_case("c++"), "C++");
        assert_eq!(title_case("pyTEST"), "Pytest");
        assert_eq!(title_case("ci/cd"), "Ci/Cd");
        assert_eq!(title_case("3d printing"), "3D Printing");
    }
}
