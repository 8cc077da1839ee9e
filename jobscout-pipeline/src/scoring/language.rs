//! Posting-language detection via function-word counting.

/// High-frequency German function words.
const GERMAN: &[&str] = &["der", "die", "das", "und", "mit", "von", "den", "auf", "ist"];

/// High-frequency English function words.
const ENGLISH: &[&str] = &["the", "and", "with", "from", "for", "that", "this", "is", "are"];

/// Classifies already case-folded text as `"German"` or `"English"`.
///
/// Counts hits from two small closed sets of function words; the higher
/// count wins and ties fall back to English. Tokens shorter than two
/// characters are skipped so stray single letters never vote.
pub(crate) fn detect(text: &str) -> &'static str {
    let mut de = 0usize;
    let mut en = 0usize;
    for word in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if word.len() < 2 {
            continue;
        }
        if GERMAN.contains(&word) {
            de += 1;
        } else if ENGLISH.contains(&word) {
            en += 1;
        }
    }
    if de > en {
        "German"
    } else {
        "English"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_german_posting() {
        let text = "entwicklung und wartung von embedded software mit c++ auf linux, \
                    zusammenarbeit mit der hardware-abteilung";
        assert_eq!(detect(text), "German");
    }

    #[test]
    fn detects_english_posting() {
        let text = "we are looking for an engineer with experience in rust and \
                    distributed systems for this role";
        assert_eq!(detect(text), "English");
    }

    #[test]
    fn tie_falls_back_to_english() {
        assert_eq!(detect(""), "English");
        // One hit each.
        assert_eq!(detect("der the"), "English");
    }

    #[test]
    fn short_tokens_do_not_vote() {
        // "is" would vote English if it survived, but a single letter must not.
        assert_eq!(detect("a b c der und mit"), "German");
    }
}
