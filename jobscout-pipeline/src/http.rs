//! HTTP client construction.
//!
//! One client is built per pipeline and cloned into every adapter, so a
//! run shares a single connection pool and cookie store. Job boards are
//! hostile to obvious bots, so the client carries a browser-like user
//! agent picked at random from a small pool, keeps cookies across
//! redirects, and follows a bounded redirect chain.

use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use reqwest::Client;
use std::time::Duration;

/// Realistic desktop browser user-agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

/// Builds a client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(random_user_agent())
        .cookie_store(true)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| PipelineError::Http(format!("failed to build HTTP client: {e}")))
}

fn random_user_agent() -> &'static str {
    // The pool is a non-empty const slice, so `choose` cannot return None.
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Converts a configured pacing delay into a [`Duration`].
///
/// Negative or non-finite values collapse to zero so a bad profile value
/// can never panic the pacing code.
pub(crate) fn pacing_delay(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_comes_from_pool() {
        let agent = random_user_agent();
        assert!(USER_AGENTS.contains(&agent));
    }

    #[test]
    fn build_client_succeeds() {
        let client = build_client(Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[test]
    fn pacing_delay_clamps_bad_values() {
        assert_eq!(pacing_delay(-3.0), Duration::ZERO);
        assert_eq!(pacing_delay(f64::NAN), Duration::ZERO);
        assert_eq!(pacing_delay(1.5), Duration::from_millis(1500));
    }
}
