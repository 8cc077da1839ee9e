//! Job board adapters.
//!
//! Every adapter follows the same shape: an owned HTTP client, an async
//! fetch layer, and synchronous `scraper`-based parse functions kept free
//! of await points. Boards that are sensitive to burst traffic get a
//! short randomized pause before the request goes out.

mod freelancermap;
mod hays;
mod linkedin;
mod solcom;
mod xing;

pub use freelancermap::Freelancermap;
pub use hays::Hays;
pub use linkedin::LinkedIn;
pub use solcom::Solcom;
pub use xing::Xing;

use rand::Rng;
use scraper::ElementRef;
use std::time::Duration;

/// Tag subtrees that never contain human-readable posting text.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "iframe", "noscript"];

/// Extracts readable text under `root`, one line per text node, skipping
/// script-like subtrees.
pub(crate) fn block_text(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    parts.join("\n")
}

/// Same extraction joined with single spaces, for teaser snippets and
/// keyword scans.
pub(crate) fn inline_text(root: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    parts.join(" ")
}

fn collect_text(el: ElementRef<'_>, out: &mut Vec<String>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if NON_CONTENT_TAGS.contains(&child_el.value().name()) {
                continue;
            }
            collect_text(child_el, out);
        }
    }
}

/// Converts an empty extraction result to `None` for patch fields.
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Sleeps a random human-like interval. The sample is drawn before the
/// await so the thread-local RNG never crosses a suspension point.
pub(crate) async fn polite_jitter(min_secs: f64, max_secs: f64) {
    let secs = rand::thread_rng().gen_range(min_secs..max_secs);
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}
