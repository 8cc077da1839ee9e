//! SOLCOM adapter — freelance project portal with localized filters.
//!
//! The portal only understands German location labels, so English
//! catalog locations are mapped before the request; anything outside
//! the map is not searchable and short-circuits to an empty result.
//! List cards expose no teaser text, only an employment tag.

use crate::error::{PipelineError, Result};
use crate::provider::JobProvider;
use crate::providers::block_text;
use crate::types::{DetailFetch, JobRecord, WorkLocation};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const SEARCH_URL: &str = "https://www.solcom.de/de/projektportal/projektangebote";
const DOMAIN: &str = "https://www.solcom.de";
/// TYPO3 plugin namespace all query parameters live under.
const PARAM_NS: &str = "--contenance_solcom-portal_project_index";
const CLIENT_LABEL: &str = "SOLCOM Client";
const DETAIL_TIMEOUT: Duration = Duration::from_secs(15);

const LOCATION_MAP: &[(&str, &str)] = &[
    ("Germany", "Deutschland"),
    ("Austria", "Österreich"),
    ("Switzerland", "Schweiz"),
    ("Remote", "Remote"),
    ("Slovakia", "Andere Länder"),
    ("Czech Republic", "Andere Länder"),
    ("Poland", "Andere Länder"),
    ("Europe", "Andere Länder"),
];

pub struct Solcom {
    client: Client,
}

impl Solcom {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

fn localize(location: &str) -> Option<&'static str> {
    LOCATION_MAP
        .iter()
        .find(|(en, _)| *en == location)
        .map(|(_, de)| *de)
}

#[async_trait]
impl JobProvider for Solcom {
    fn key(&self) -> &'static str {
        "solcom"
    }

    fn display_name(&self) -> &'static str {
        "SOLCOM"
    }

    async fn search(&self, query: &str, location: &str, max_results: usize) -> Result<Vec<JobRecord>> {
        let localized = match localize(location) {
            Some(l) => l,
            None => {
                tracing::debug!(location, "SOLCOM has no filter for this location, skipping");
                return Ok(Vec::new());
            }
        };
        tracing::trace!(query, localized, "SOLCOM search");

        let per_page = max_results.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                (format!("{PARAM_NS}[searchArguments][searchParameter]"), query),
                (format!("{PARAM_NS}[searchArguments][location]"), localized),
                (format!("{PARAM_NS}[itemsPerPage]"), per_page.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("SOLCOM request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "SOLCOM search returned non-success");
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("SOLCOM response read failed: {e}")))?;

        parse_search(&html, max_results)
    }

    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch> {
        let response = self
            .client
            .get(link)
            .timeout(DETAIL_TIMEOUT)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("SOLCOM detail request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(DetailFetch::Description(String::new()));
        }
        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("SOLCOM detail read failed: {e}")))?;

        parse_detail(&html)
    }
}

/// Parse the project list into records.
pub(crate) fn parse_search(html: &str, max_results: usize) -> Result<Vec<JobRecord>> {
    let document = Html::parse_document(html);

    let card_sel = Selector::parse("div.contenance-solcom-portal-project-item")
        .map_err(|e| PipelineError::Parse(format!("invalid card selector: {e:?}")))?;
    let header_link_sel = Selector::parse("div.project-header a")
        .map_err(|e| PipelineError::Parse(format!("invalid header selector: {e:?}")))?;
    let title_sel = Selector::parse("h2")
        .map_err(|e| PipelineError::Parse(format!("invalid title selector: {e:?}")))?;
    let location_sel = Selector::parse("div.project-infos li.pin-icon")
        .map_err(|e| PipelineError::Parse(format!("invalid location selector: {e:?}")))?;
    let start_sel = Selector::parse("div.project-infos li.calendar-icon")
        .map_err(|e| PipelineError::Parse(format!("invalid start selector: {e:?}")))?;
    let employment_sel = Selector::parse("div.project-infos li.bag-icon")
        .map_err(|e| PipelineError::Parse(format!("invalid employment selector: {e:?}")))?;

    let mut records = Vec::new();

    for card in document.select(&card_sel).take(max_results) {
        let link_el = match card.select(&header_link_sel).next() {
            Some(el) => el,
            None => continue,
        };
        let href = match link_el.value().attr("href") {
            Some(h) => h,
            None => continue,
        };

        let title = link_el
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let link = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{DOMAIN}{href}")
        };
        let job_id = link_el
            .value()
            .attr("data-projectid")
            .map(str::to_string)
            .unwrap_or_else(|| href.rsplit('/').next().unwrap_or(href).to_string());

        let info_text = |sel: &Selector| {
            card.select(sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let location = info_text(&location_sel).unwrap_or_else(|| "Germany".to_string());
        let posted_at = info_text(&start_sel)
            .map(|start| format!("Start: {start}"))
            .unwrap_or_else(|| "Recent".to_string());
        let employment = info_text(&employment_sel).unwrap_or_else(|| "Freelance".to_string());

        let card_scope = format!("{title} {location}").to_lowercase();
        let work = if card_scope.contains("remote") {
            WorkLocation::Remote
        } else {
            WorkLocation::OnSite
        };

        records.push(JobRecord {
            job_id: Some(job_id),
            link,
            provider: "solcom".to_string(),
            title,
            company: CLIENT_LABEL.to_string(),
            location,
            // Cards carry no teaser, so the tag at least gives the
            // scorer something until a detail fetch replaces it.
            description: format!("Employment: {employment}"),
            posted_at_relative: posted_at,
            work_location_type: work,
            employment_type: employment,
            ..JobRecord::default()
        });
    }

    tracing::debug!(count = records.len(), "SOLCOM cards parsed");
    Ok(records)
}

fn parse_detail(html: &str) -> Result<DetailFetch> {
    let document = Html::parse_document(html);

    for selector in ["div.project-details", "div.description-content"] {
        let sel = Selector::parse(selector)
            .map_err(|e| PipelineError::Parse(format!("invalid description selector: {e:?}")))?;
        if let Some(container) = document.select(&sel).next() {
            let text = block_text(container);
            if !text.is_empty() {
                return Ok(DetailFetch::Description(text));
            }
        }
    }

    Ok(DetailFetch::Description(String::new()))
}
