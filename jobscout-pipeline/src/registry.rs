//! The provider catalog: every board the pipeline knows how to query.
//!
//! Profiles reference providers by lowercase key. Resolution walks the
//! catalog in a fixed order so run banners and fan-out order stay stable
//! no matter how the profile map is written.

use crate::config::SearchProfile;
use crate::provider::{BoundProvider, JobProvider};
use crate::providers::{Freelancermap, Hays, LinkedIn, Solcom, Xing};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Identifier for a supported job board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKey {
    LinkedIn,
    Hays,
    Solcom,
    Freelancermap,
    Xing,
}

impl ProviderKey {
    /// Lowercase registry key, as written in profile files and stamped
    /// into each record's `provider` field.
    pub fn key(&self) -> &'static str {
        match self {
            ProviderKey::LinkedIn => "linkedin",
            ProviderKey::Hays => "hays",
            ProviderKey::Solcom => "solcom",
            ProviderKey::Freelancermap => "freelancermap",
            ProviderKey::Xing => "xing",
        }
    }

    /// Human-readable name for banners and reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKey::LinkedIn => "LinkedIn",
            ProviderKey::Hays => "Hays",
            ProviderKey::Solcom => "SOLCOM",
            ProviderKey::Freelancermap => "Freelancermap",
            ProviderKey::Xing => "XING",
        }
    }

    /// Result cap per query when the profile does not override it.
    pub fn default_max_results(&self) -> usize {
        match self {
            ProviderKey::LinkedIn => 25,
            ProviderKey::Hays => 20,
            ProviderKey::Solcom => 20,
            ProviderKey::Freelancermap => 20,
            ProviderKey::Xing => 15,
        }
    }

    /// Every supported provider, in fan-out order.
    pub const fn all() -> &'static [ProviderKey] {
        &[
            ProviderKey::LinkedIn,
            ProviderKey::Hays,
            ProviderKey::Solcom,
            ProviderKey::Freelancermap,
            ProviderKey::Xing,
        ]
    }

    /// Parses a lowercase registry key.
    pub fn from_key(key: &str) -> Option<Self> {
        ProviderKey::all()
            .iter()
            .find(|p| p.key() == key)
            .copied()
    }

    /// Guesses the owning provider from a posting URL, for manual-mode
    /// links pasted without context. Matches on the host only, so a
    /// board name in a path or query never misattributes a link.
    pub fn from_url(raw: &str) -> Option<Self> {
        let parsed = Url::parse(raw).ok()?;
        let host = parsed.host_str()?.to_lowercase();
        ProviderKey::all()
            .iter()
            .find(|p| host.contains(p.domain_fragment()))
            .copied()
    }

    fn domain_fragment(&self) -> &'static str {
        match self {
            ProviderKey::LinkedIn => "linkedin.",
            ProviderKey::Hays => "hays.",
            ProviderKey::Solcom => "solcom.",
            ProviderKey::Freelancermap => "freelancermap.",
            ProviderKey::Xing => "xing.",
        }
    }

    /// Builds the adapter for this provider on the shared HTTP client.
    /// Cloning the client is cheap; all adapters from one run reuse the
    /// same connection pool and cookie store.
    pub fn instantiate(&self, client: &Client) -> Arc<dyn JobProvider> {
        match self {
            ProviderKey::LinkedIn => Arc::new(LinkedIn::new(client.clone())),
            ProviderKey::Hays => Arc::new(Hays::new(client.clone())),
            ProviderKey::Solcom => Arc::new(Solcom::new(client.clone())),
            ProviderKey::Freelancermap => Arc::new(Freelancermap::new(client.clone())),
            ProviderKey::Xing => Arc::new(Xing::new(client.clone())),
        }
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Resolves the profile's enabled providers against the catalog.
///
/// Catalog order decides fan-out order. Enabled keys the catalog does not
/// know are logged and skipped, so a profile written for a newer build
/// still loads.
pub fn resolve_active(profile: &SearchProfile, client: &Client) -> Vec<BoundProvider> {
    let mut bound = Vec::new();
    for key in ProviderKey::all() {
        let Some(settings) = profile.active_providers.get(key.key()) else {
            continue;
        };
        if !settings.enabled {
            continue;
        }
        let adapter = key.instantiate(client);
        let max_results = settings.max_results.unwrap_or_else(|| key.default_max_results());
        let mut provider = BoundProvider::new(adapter, max_results);
        if let Some(locations) = &settings.locations {
            provider = provider.with_locations(locations.clone());
        }
        bound.push(provider);
    }
    for (name, settings) in &profile.active_providers {
        if settings.enabled && ProviderKey::from_key(name).is_none() {
            debug!(provider = %name, "enabled provider not in catalog, skipping");
        }
    }
    bound
}
