//! Hays adapter — contract-heavy German staffing board.
//!
//! Listing cards carry a teaser paragraph, which gives the first scoring
//! pass real text to work with before any detail page is fetched. The
//! client behind a posting is anonymous, so the company field is always
//! the staffing label.

use crate::error::{PipelineError, Result};
use crate::provider::JobProvider;
use crate::providers::{block_text, inline_text, non_empty, polite_jitter};
use crate::types::{DetailFetch, JobRecord, RecordPatch, WorkLocation};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const SEARCH_URL: &str = "https://www.hays.de/jobsuche/stellenangebote-jobs";
const DOMAIN: &str = "https://www.hays.de";
const CLIENT_LABEL: &str = "Hays Client";
const DETAIL_TIMEOUT: Duration = Duration::from_secs(15);

/// Card-level remote markers; the teaser is scanned separately during
/// enrichment.
const CARD_REMOTE_KEYWORDS: &[&str] = &["remote", "home office", "mobil"];

pub struct Hays {
    client: Client,
}

impl Hays {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobProvider for Hays {
    fn key(&self) -> &'static str {
        "hays"
    }

    fn display_name(&self) -> &'static str {
        "Hays"
    }

    async fn search(&self, query: &str, location: &str, max_results: usize) -> Result<Vec<JobRecord>> {
        tracing::trace!(query, location, "Hays search");
        polite_jitter(1.0, 2.0).await;

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", query), ("r", location), ("page", "1")])
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("Hays request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Hays search returned non-success");
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("Hays response read failed: {e}")))?;

        parse_search(&html, max_results)
    }

    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch> {
        polite_jitter(0.5, 2.0).await;

        let response = self
            .client
            .get(link)
            .timeout(DETAIL_TIMEOUT)
            .header("Referer", SEARCH_URL)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("Hays detail request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(DetailFetch::Description(String::new()));
        }
        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("Hays detail read failed: {e}")))?;

        parse_detail(&html)
    }
}

/// Parse the search result list into records.
pub(crate) fn parse_search(html: &str, max_results: usize) -> Result<Vec<JobRecord>> {
    let document = Html::parse_document(html);

    let card_sel = Selector::parse("div.search__result")
        .map_err(|e| PipelineError::Parse(format!("invalid card selector: {e:?}")))?;
    let title_sel = Selector::parse("h4.search__result__header__title")
        .map_err(|e| PipelineError::Parse(format!("invalid title selector: {e:?}")))?;
    let link_sel = Selector::parse("a.search__result__link")
        .map_err(|e| PipelineError::Parse(format!("invalid link selector: {e:?}")))?;
    let location_sel =
        Selector::parse("div.search__result__job__attribute__location div.info-text")
            .map_err(|e| PipelineError::Parse(format!("invalid location selector: {e:?}")))?;
    let row_sel = Selector::parse("div.row")
        .map_err(|e| PipelineError::Parse(format!("invalid row selector: {e:?}")))?;
    let teaser_sel = Selector::parse("div.search__result__teaser")
        .map_err(|e| PipelineError::Parse(format!("invalid teaser selector: {e:?}")))?;

    let mut records = Vec::new();

    for card in document.select(&card_sel).take(max_results) {
        let title = match card.select(&title_sel).next() {
            Some(el) => el.text().collect::<String>().trim().to_string(),
            None => continue,
        };
        let href = match card
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
        {
            Some(h) => h,
            None => continue,
        };
        let link = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{DOMAIN}{href}")
        };

        let location = card
            .select(&location_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Germany".to_string());

        let posted_at = card
            .select(&row_sel)
            .map(inline_text)
            .find(|text| text.contains("Online seit"))
            .map(|text| text.replace("Online seit:", "").trim().to_string())
            .unwrap_or_else(|| "Recent".to_string());

        let description = card
            .select(&teaser_sel)
            .next()
            .map(inline_text)
            .unwrap_or_default();

        let card_scope = format!("{title} {location}").to_lowercase();
        let work = if CARD_REMOTE_KEYWORDS.iter().any(|kw| card_scope.contains(kw)) {
            WorkLocation::Remote
        } else {
            WorkLocation::OnSite
        };

        records.push(JobRecord {
            job_id: Some(extract_job_id(&link)),
            link,
            provider: "hays".to_string(),
            title,
            company: CLIENT_LABEL.to_string(),
            location,
            description,
            posted_at_relative: posted_at,
            work_location_type: work,
            employment_type: "Contract".to_string(),
            ..JobRecord::default()
        });
    }

    tracing::debug!(count = records.len(), "Hays cards parsed");
    Ok(records)
}

/// Posting id from the canonical URL: the path segment before the job
/// slug, or the trailing reference number for legacy URL shapes.
fn extract_job_id(link: &str) -> String {
    if link.contains("/job/") {
        let segments: Vec<&str> = link.split('/').collect();
        if segments.len() >= 2 {
            return segments[segments.len() - 2].to_string();
        }
    }
    link.rsplit('-')
        .next()
        .unwrap_or(link)
        .replace('/', "")
}

/// Parse a detail page into a field patch.
fn parse_detail(html: &str) -> Result<DetailFetch> {
    let document = Html::parse_document(html);

    let mut description = String::new();
    for selector in [
        "div.job-description__content",
        "div.h-text",
        "section.job-description",
        "div.job-details-content",
        "article",
    ] {
        let sel = Selector::parse(selector)
            .map_err(|e| PipelineError::Parse(format!("invalid description selector: {e:?}")))?;
        if let Some(container) = document.select(&sel).next() {
            description = block_text(container);
            if !description.is_empty() {
                break;
            }
        }
    }

    if description.is_empty() {
        return Ok(DetailFetch::Description(String::new()));
    }

    let title_sel = Selector::parse("h1")
        .map_err(|e| PipelineError::Parse(format!("invalid title selector: {e:?}")))?;
    let title = document
        .select(&title_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .and_then(non_empty);

    let location_sel = Selector::parse("div.job-details__header-location")
        .map_err(|e| PipelineError::Parse(format!("invalid location selector: {e:?}")))?;
    let span_sel = Selector::parse("span")
        .map_err(|e| PipelineError::Parse(format!("invalid span selector: {e:?}")))?;
    let location = document
        .select(&location_sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .and_then(non_empty)
        .or_else(|| {
            // Fallback: the deployment-site label somewhere in the page.
            document
                .select(&span_sel)
                .find(|el| el.text().collect::<String>().contains("Einsatzort"))
                .and_then(|el| el.parent())
                .and_then(scraper::ElementRef::wrap)
                .map(|parent| {
                    inline_text(parent)
                        .replace("Einsatzort", "")
                        .trim()
                        .to_string()
                })
                .and_then(non_empty)
        });

    Ok(DetailFetch::Fields(RecordPatch {
        title,
        company: Some(CLIENT_LABEL.to_string()),
        location,
        description: Some(description),
        ..RecordPatch::default()
    }))
}
