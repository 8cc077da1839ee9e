//! XING adapter — keyword search over the German-market job board.
//!
//! The search page ranks by keyword only, so this adapter opts out of
//! location fan-out and runs once per query. Detail pages are data-rich:
//! JSON-LD metadata plus a salary estimate that only exists as loose
//! page text, fished out with a pair of regexes.

use crate::error::{PipelineError, Result};
use crate::provider::JobProvider;
use crate::providers::{block_text, non_empty};
use crate::types::{DetailFetch, JobRecord, WorkLocation};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;

const SEARCH_URL: &str = "https://www.xing.com/jobs/search";
const DOMAIN: &str = "https://www.xing.com";
const EMPLOYER_LABEL: &str = "XING Employer";
const DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Grouped number with thousands separators, e.g. `65.000` or `65,000`.
const NUM_PATTERN: &str = r"\d{1,3}(?:[.,]\d{3})*";

fn salary_range_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)(?:€|EUR)\s?({NUM_PATTERN}).*?(?:to|bis|-)\s?(?:€|EUR)\s?({NUM_PATTERN})"
        ))
        .ok()
    })
    .as_ref()
}

fn salary_forecast_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"Salary forecast:.*?({NUM_PATTERN}).*?({NUM_PATTERN})"
        ))
        .ok()
    })
    .as_ref()
}

pub struct Xing {
    client: Client,
}

impl Xing {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobProvider for Xing {
    fn key(&self) -> &'static str {
        "xing"
    }

    fn display_name(&self) -> &'static str {
        "XING"
    }

    fn supports_location_filter(&self) -> bool {
        false
    }

    async fn search(&self, query: &str, location: &str, max_results: usize) -> Result<Vec<JobRecord>> {
        tracing::trace!(query, "XING search");

        let mut params = vec![("keywords", query)];
        if !location.is_empty() {
            params.push(("location", location));
        }

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("XING request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "XING search returned non-success");
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("XING response read failed: {e}")))?;

        parse_search(&html, max_results)
    }

    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch> {
        let response = self
            .client
            .get(link)
            .timeout(DETAIL_TIMEOUT)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("XING detail request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(DetailFetch::Description(String::new()));
        }
        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("XING detail read failed: {e}")))?;

        parse_detail(&html)
    }
}

/// Parse the search page's article cards into records.
pub(crate) fn parse_search(html: &str, max_results: usize) -> Result<Vec<JobRecord>> {
    let document = Html::parse_document(html);

    let card_sel = Selector::parse("article")
        .map_err(|e| PipelineError::Parse(format!("invalid card selector: {e:?}")))?;
    let link_sel = Selector::parse(r#"a[href*="/jobs/"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid link selector: {e:?}")))?;
    let heading_sel = Selector::parse("h2, h3")
        .map_err(|e| PipelineError::Parse(format!("invalid heading selector: {e:?}")))?;

    let mut records = Vec::new();

    for card in document.select(&card_sel).take(max_results) {
        let link_el = match card.select(&link_sel).next() {
            Some(el) => el,
            None => continue,
        };
        let href = link_el.value().attr("href").unwrap_or_default();

        let title = card
            .select(&heading_sel)
            .next()
            .unwrap_or(link_el)
            .text()
            .collect::<String>()
            .trim()
            .to_string();

        let link = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{DOMAIN}{href}")
        };
        let job_id = href
            .rsplit('/')
            .next()
            .and_then(|last| last.split('?').next())
            .unwrap_or(href)
            .to_string();

        records.push(JobRecord {
            job_id: Some(job_id),
            link,
            provider: "xing".to_string(),
            title,
            company: EMPLOYER_LABEL.to_string(),
            location: "Germany/Remote".to_string(),
            posted_at_relative: "Recent".to_string(),
            work_location_type: WorkLocation::OnSite,
            employment_type: "Full-time".to_string(),
            ..JobRecord::default()
        });
    }

    tracing::debug!(count = records.len(), "XING cards parsed");
    Ok(records)
}

/// Parse a detail page into a composite description: metadata lines from
/// JSON-LD and the salary regexes, a blank line, then the posting text.
fn parse_detail(html: &str) -> Result<DetailFetch> {
    let document = Html::parse_document(html);
    let page_text: String = document.root_element().text().collect();

    let mut lines = Vec::new();

    let json_ld_sel = Selector::parse(r#"script[type="application/ld+json"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid json-ld selector: {e:?}")))?;
    if let Some(script) = document.select(&json_ld_sel).next() {
        let raw = script.text().collect::<String>();
        if let Ok(data) = serde_json::from_str::<Value>(&raw) {
            if let Some(company) = data
                .get("hiringOrganization")
                .and_then(|org| org.get("name"))
                .and_then(Value::as_str)
            {
                lines.push(format!("Company: {company}"));
            }
            if let Some(city) = data
                .get("jobLocation")
                .and_then(Value::as_array)
                .and_then(|list| list.first())
                .and_then(|loc| loc.get("address"))
                .and_then(|addr| addr.get("addressLocality"))
                .and_then(Value::as_str)
            {
                lines.push(format!("Location: {city}"));
            }
        }
    }

    if let Some(salary) = extract_salary_line(&page_text) {
        lines.push(salary);
    }

    let mut main_text = String::new();
    for selector in [
        r#"section[data-testid="job-details-content"]"#,
        "div#job-description",
        "div.job-description",
    ] {
        let sel = Selector::parse(selector)
            .map_err(|e| PipelineError::Parse(format!("invalid description selector: {e:?}")))?;
        if let Some(container) = document.select(&sel).next() {
            main_text = block_text(container);
            break;
        }
    }

    let mut composed = lines.join("\n");
    if !main_text.is_empty() {
        if !composed.is_empty() {
            composed.push_str("\n\n");
        }
        composed.push_str(&main_text);
    }
    match non_empty(composed) {
        Some(text) => Ok(DetailFetch::Description(text)),
        None => Ok(DetailFetch::Description(String::new())),
    }
}

/// Finds an advertised or forecast salary range anywhere in the page text.
fn extract_salary_line(page_text: &str) -> Option<String> {
    let range = salary_range_regex()?
        .captures(page_text)
        .or_else(|| salary_forecast_regex().and_then(|re| re.captures(page_text)))?;
    let low = range.get(1)?.as_str();
    let high = range.get(2)?.as_str();
    Some(format!("Salary range: {low} - {high} EUR"))
}
