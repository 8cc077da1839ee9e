//! LinkedIn adapter — guest jobs API, no login required.
//!
//! The guest endpoint returns plain HTML card fragments and tolerates
//! automated requests as long as the client looks like a browser. Remote
//! searches are translated into the work-type filter the endpoint
//! expects, pinned to the German market.

use crate::error::{PipelineError, Result};
use crate::provider::JobProvider;
use crate::providers::{block_text, inline_text, polite_jitter};
use crate::types::{detect_employment_type, DetailFetch, JobRecord, RecordPatch, WorkLocation};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

const SEARCH_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";
/// Posting-age filter: last 30 days, in seconds.
const POSTED_WITHIN: &str = "r2592000";
const DETAIL_TIMEOUT: Duration = Duration::from_secs(15);

pub struct LinkedIn {
    client: Client,
}

impl LinkedIn {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobProvider for LinkedIn {
    fn key(&self) -> &'static str {
        "linkedin"
    }

    fn display_name(&self) -> &'static str {
        "LinkedIn"
    }

    fn scraping_method(&self) -> &'static str {
        "HTTP (guest API)"
    }

    async fn search(&self, query: &str, location: &str, max_results: usize) -> Result<Vec<JobRecord>> {
        tracing::trace!(query, location, "LinkedIn search");

        // "Remote" is not a place the endpoint knows; it becomes the
        // remote work-type filter over the German market.
        let is_remote = location.eq_ignore_ascii_case("remote");
        let target_location = if is_remote { "Germany" } else { location };

        let mut params = vec![
            ("keywords", query),
            ("location", target_location),
            ("f_TPR", POSTED_WITHIN),
            ("start", "0"),
        ];
        if is_remote {
            params.push(("f_WT", "2"));
        }

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&params)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("LinkedIn request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "LinkedIn search returned non-success");
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("LinkedIn response read failed: {e}")))?;
        tracing::trace!(bytes = html.len(), "LinkedIn response received");

        parse_search(&html, max_results, is_remote)
    }

    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch> {
        polite_jitter(1.0, 2.0).await;

        let response = self
            .client
            .get(link)
            .timeout(DETAIL_TIMEOUT)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("LinkedIn detail request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(DetailFetch::Description(String::new()));
        }
        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("LinkedIn detail read failed: {e}")))?;

        parse_detail(&html)
    }
}

/// Parse the guest API card list into records.
pub(crate) fn parse_search(html: &str, max_results: usize, force_remote: bool) -> Result<Vec<JobRecord>> {
    let document = Html::parse_document(html);

    let card_sel = Selector::parse("li")
        .map_err(|e| PipelineError::Parse(format!("invalid card selector: {e:?}")))?;
    let title_sel = Selector::parse("h3.base-search-card__title")
        .map_err(|e| PipelineError::Parse(format!("invalid title selector: {e:?}")))?;
    let company_sel = Selector::parse("h4.base-search-card__subtitle")
        .map_err(|e| PipelineError::Parse(format!("invalid company selector: {e:?}")))?;
    let location_sel = Selector::parse("span.job-search-card__location")
        .map_err(|e| PipelineError::Parse(format!("invalid location selector: {e:?}")))?;
    let link_sel = Selector::parse("a.base-card__full-link")
        .map_err(|e| PipelineError::Parse(format!("invalid link selector: {e:?}")))?;
    let badge_sel = Selector::parse(r#"span[class*="badge"], span[class*="metadata"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid badge selector: {e:?}")))?;

    let mut records = Vec::new();

    for card in document.select(&card_sel).take(max_results) {
        let title_el = match card.select(&title_sel).next() {
            Some(el) => el,
            None => continue,
        };
        let company_el = match card.select(&company_sel).next() {
            Some(el) => el,
            None => continue,
        };
        let location_el = match card.select(&location_sel).next() {
            Some(el) => el,
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

        let title = title_el.text().collect::<String>().trim().to_string();
        let badge_text = card
            .select(&badge_sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let card_text = inline_text(card);
        let type_text = format!("{title} {badge_text} {card_text}");

        let mut record = JobRecord {
            job_id: Some(extract_job_id(href)),
            link: href.split('?').next().unwrap_or(href).to_string(),
            provider: "linkedin".to_string(),
            title,
            company: company_el.text().collect::<String>().trim().to_string(),
            location: location_el.text().collect::<String>().trim().to_string(),
            posted_at_relative: "Recent".to_string(),
            work_location_type: WorkLocation::detect(&type_text),
            employment_type: detect_employment_type(&type_text).to_string(),
            ..JobRecord::default()
        };
        if force_remote {
            record.work_location_type = WorkLocation::Remote;
        }
        records.push(record);
    }

    tracing::debug!(count = records.len(), "LinkedIn cards parsed");
    Ok(records)
}

/// The posting id embedded in a detail URL, or the raw href when the URL
/// shape is unfamiliar.
fn extract_job_id(href: &str) -> String {
    if href.contains("jobs/view/") {
        href.rsplit('/')
            .next()
            .and_then(|last| last.split('?').next())
            .unwrap_or(href)
            .to_string()
    } else {
        href.to_string()
    }
}

/// Parse a detail page: JSON-LD first, then known description containers.
fn parse_detail(html: &str) -> Result<DetailFetch> {
    let document = Html::parse_document(html);

    let mut description = String::new();

    let json_ld_sel = Selector::parse(r#"script[type="application/ld+json"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid json-ld selector: {e:?}")))?;
    if let Some(script) = document.select(&json_ld_sel).next() {
        let raw = script.text().collect::<String>();
        if let Ok(data) = serde_json::from_str::<serde_json::Value>(&raw) {
            let items: Vec<&serde_json::Value> = match data.as_array() {
                Some(arr) => arr.iter().collect(),
                None => vec![&data],
            };
            for item in items {
                if let Some(desc_html) = item.get("description").and_then(|d| d.as_str()) {
                    if !desc_html.is_empty() {
                        let fragment = Html::parse_fragment(desc_html);
                        description = block_text(fragment.root_element());
                        break;
                    }
                }
            }
        }
    }

    if description.is_empty() {
        for selector in [
            "div.show-more-less-html__markup",
            "section.description",
            "article.jobs-description",
        ] {
            let sel = Selector::parse(selector)
                .map_err(|e| PipelineError::Parse(format!("invalid description selector: {e:?}")))?;
            if let Some(container) = document.select(&sel).next() {
                description = block_text(container);
                break;
            }
        }
    }

    if description.is_empty() {
        return Ok(DetailFetch::Description(String::new()));
    }

    let work = WorkLocation::detect(&description);
    let employment = detect_employment_type(&description).to_string();
    Ok(DetailFetch::Fields(RecordPatch {
        description: Some(description),
        work_location_type: Some(work),
        employment_type: Some(employment),
        ..RecordPatch::default()
    }))
}
