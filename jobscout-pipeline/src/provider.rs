//! The provider abstraction every job board adapter implements.

use crate::error::Result;
use crate::types::{DetailFetch, JobRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// A searchable job board.
///
/// Implementations are stateless beyond their HTTP client and are shared
/// across concurrent search tasks behind an [`Arc`].
#[async_trait]
pub trait JobProvider: Send + Sync {
    /// Registry key, lowercase. Stamped into every record's `provider` field.
    fn key(&self) -> &'static str;

    /// Human-readable name for banners and log lines.
    fn display_name(&self) -> &'static str;

    /// Whether [`search`](Self::search) honors its location argument.
    ///
    /// Providers that only support keyword search are queried once with an
    /// empty location, and an empty result set from them is accepted as
    /// final rather than retried.
    fn supports_location_filter(&self) -> bool {
        true
    }

    /// Diagnostics label describing how the adapter reaches its board.
    fn scraping_method(&self) -> &'static str {
        "HTTP"
    }

    /// Runs one search and returns up to `max_results` records.
    ///
    /// Records come back with whatever fields the listing page exposes;
    /// enrichment and scoring happen later in the pipeline.
    async fn search(&self, query: &str, location: &str, max_results: usize) -> Result<Vec<JobRecord>>;

    /// Fetches the posting page behind `link` and returns whatever detail
    /// it could extract.
    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch>;
}

/// A provider adapter paired with its resolved per-run settings.
#[derive(Clone)]
pub struct BoundProvider {
    pub adapter: Arc<dyn JobProvider>,
    /// Result cap per query, already resolved against the catalog default.
    pub max_results: usize,
    /// Provider-specific location list, when the profile overrides the
    /// global one.
    pub locations: Option<Vec<String>>,
}

impl BoundProvider {
    pub fn new(adapter: Arc<dyn JobProvider>, max_results: usize) -> Self {
        Self {
            adapter,
            max_results,
            locations: None,
        }
    }

    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// The locations this provider should be queried with, falling back to
    /// the profile-wide list. Providers without location support get one
    /// empty-location pass regardless.
    pub fn locations_for_run<'a>(&'a self, global: &'a [String]) -> Vec<&'a str> {
        if !self.adapter.supports_location_filter() {
            return vec![""];
        }
        let list = self.locations.as_deref().unwrap_or(global);
        if list.is_empty() {
            vec![""]
        } else {
            list.iter().map(String::as_str).collect()
        }
    }
}
