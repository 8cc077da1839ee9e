//! Freelancermap adapter — project board with a React detail page.
//!
//! The search page renders server-side, but detail pages hydrate from a
//! React state blob, which is also the richest data source: it carries
//! the clean description plus the project's skill tags. JSON-LD and raw
//! HTML act as fallbacks for anything the blob misses.

use crate::error::{PipelineError, Result};
use crate::provider::JobProvider;
use crate::providers::{block_text, inline_text, non_empty};
use crate::types::{DetailFetch, JobRecord, RecordPatch, WorkLocation};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde_json::Value;

const SEARCH_URL: &str = "https://www.freelancermap.de/projektboerse.html";
const DOMAIN: &str = "https://www.freelancermap.de";
const CLIENT_LABEL: &str = "Freelancermap Client";

/// German labels raise the hit rate; unmapped locations search unfiltered.
const LOCATION_MAP: &[(&str, &str)] = &[
    ("Germany", "Deutschland"),
    ("Austria", "Österreich"),
    ("Switzerland", "Schweiz"),
    ("Remote", "Remote"),
];

pub struct Freelancermap {
    client: Client,
}

impl Freelancermap {
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
impl JobProvider for Freelancermap {
    fn key(&self) -> &'static str {
        "freelancermap"
    }

    fn display_name(&self) -> &'static str {
        "Freelancermap"
    }

    fn scraping_method(&self) -> &'static str {
        "HTTP (embedded JSON)"
    }

    async fn search(&self, query: &str, location: &str, max_results: usize) -> Result<Vec<JobRecord>> {
        tracing::trace!(query, location, "Freelancermap search");

        let mut params = vec![("query", query), ("sort", "2")];
        let localized = localize(location);
        if let Some(l) = localized {
            params.push(("location", l));
        }

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("Freelancermap request failed: {e}")))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Freelancermap search returned non-success");
            return Ok(Vec::new());
        }

        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("Freelancermap response read failed: {e}")))?;

        parse_search(&html, max_results)
    }

    async fn fetch_detail(&self, link: &str) -> Result<DetailFetch> {
        let response = self
            .client
            .get(link)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("Freelancermap detail request failed: {e}")))?;
        if !response.status().is_success() {
            return Ok(DetailFetch::Description(String::new()));
        }
        let html = response
            .text()
            .await
            .map_err(|e| PipelineError::Http(format!("Freelancermap detail read failed: {e}")))?;

        parse_detail(&html)
    }
}

/// Parse the project card list into records.
pub(crate) fn parse_search(html: &str, max_results: usize) -> Result<Vec<JobRecord>> {
    let document = Html::parse_document(html);

    let card_sel = Selector::parse("div.project-card")
        .map_err(|e| PipelineError::Parse(format!("invalid card selector: {e:?}")))?;
    let title_sel = Selector::parse(r#"a[data-testid="title"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid title selector: {e:?}")))?;
    let city_sel = Selector::parse(r#"div[data-testid="city"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid city selector: {e:?}")))?;
    let created_sel = Selector::parse(r#"span[data-testid="created"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid created selector: {e:?}")))?;

    let mut records = Vec::new();

    for card in document.select(&card_sel).take(max_results) {
        let link_el = match card.select(&title_sel).next() {
            Some(el) => el,
            None => continue,
        };
        let title = link_el.text().collect::<String>().trim().to_string();
        let href = link_el.value().attr("href").unwrap_or_default();
        let link = if href.starts_with('/') {
            format!("{DOMAIN}{href}")
        } else {
            href.to_string()
        };
        let job_id = href.rsplit('/').next().unwrap_or(href).to_string();

        let location = card
            .select(&city_sel)
            .next()
            .map(|el| inline_text(el).replace(',', "").trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Germany".to_string());

        let posted_at = card
            .select(&created_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Recent".to_string());

        records.push(JobRecord {
            job_id: Some(job_id),
            link,
            provider: "freelancermap".to_string(),
            title,
            company: CLIENT_LABEL.to_string(),
            location,
            posted_at_relative: posted_at,
            work_location_type: WorkLocation::OnSite,
            employment_type: "Freelance".to_string(),
            ..JobRecord::default()
        });
    }

    tracing::debug!(count = records.len(), "Freelancermap cards parsed");
    Ok(records)
}

/// Parse a detail page: React state, then JSON-LD, then HTML fallbacks.
fn parse_detail(html: &str) -> Result<DetailFetch> {
    let document = Html::parse_document(html);

    let mut title = String::new();
    let mut company = String::new();
    let mut location = String::new();
    let mut description = String::new();

    extract_from_react_state(
        &document,
        &mut title,
        &mut company,
        &mut location,
        &mut description,
    )?;

    if company.is_empty() || location.is_empty() {
        extract_from_json_ld(&document, &mut company, &mut location)?;
    }

    apply_html_fallbacks(&document, &mut company, &mut description)?;

    let patch = RecordPatch {
        title: non_empty(title),
        company: non_empty(company),
        location: non_empty(location),
        description: non_empty(description),
        ..RecordPatch::default()
    };
    if patch.title.is_none()
        && patch.company.is_none()
        && patch.location.is_none()
        && patch.description.is_none()
    {
        return Ok(DetailFetch::Description(String::new()));
    }
    Ok(DetailFetch::Fields(patch))
}

/// Reads the `ProjectShow` hydration blob.
fn extract_from_react_state(
    document: &Html,
    title: &mut String,
    company: &mut String,
    location: &mut String,
    description: &mut String,
) -> Result<()> {
    let state_sel = Selector::parse(
        r#"script.js-react-on-rails-component[data-component-name="ProjectShow"]"#,
    )
    .map_err(|e| PipelineError::Parse(format!("invalid state selector: {e:?}")))?;

    let raw = match document.select(&state_sel).next() {
        Some(tag) => tag.text().collect::<String>(),
        None => return Ok(()),
    };
    let data: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(_) => return Ok(()),
    };
    let project = match data.get("project") {
        Some(p) => p,
        None => return Ok(()),
    };

    if let Some(t) = project.get("title").and_then(Value::as_str) {
        *title = t.trim().to_string();
    }

    // The company field is polymorphic: an object with a name, or a
    // bare string for unregistered clients.
    match project.get("company") {
        Some(Value::Object(obj)) => {
            if let Some(name) = obj.get("name").and_then(Value::as_str) {
                *company = name.trim().to_string();
            }
        }
        Some(Value::String(name)) => *company = name.trim().to_string(),
        _ => {}
    }

    let city = project.get("city").and_then(Value::as_str).unwrap_or("");
    let country = project
        .get("country")
        .and_then(|c| c.get("localizedName"))
        .and_then(Value::as_str)
        .unwrap_or("");
    *location = format!("{city} {country}").trim().to_string();

    if let Some(desc_html) = project.get("description").and_then(Value::as_str) {
        if !desc_html.is_empty() {
            let fragment = Html::parse_fragment(desc_html);
            *description = block_text(fragment.root_element());
        }
    }

    let skills: Vec<&str> = project
        .get("skills")
        .and_then(|s| s.get("enabled"))
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|s| s.get("localizedName").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if !skills.is_empty() {
        description.push_str("\n\nSkills: ");
        description.push_str(&skills.join(", "));
    }

    Ok(())
}

/// Recovers company and location from JobPosting JSON-LD blocks.
fn extract_from_json_ld(document: &Html, company: &mut String, location: &mut String) -> Result<()> {
    let json_ld_sel = Selector::parse(r#"script[type="application/ld+json"]"#)
        .map_err(|e| PipelineError::Parse(format!("invalid json-ld selector: {e:?}")))?;

    for tag in document.select(&json_ld_sel) {
        let raw = tag.text().collect::<String>();
        let data: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(_) => continue,
        };
        let items: Vec<&Value> = match data.as_array() {
            Some(arr) => arr.iter().collect(),
            None => vec![&data],
        };
        for item in items {
            if item.get("@type").and_then(Value::as_str) != Some("JobPosting") {
                continue;
            }
            if company.is_empty() {
                if let Some(name) = item
                    .get("hiringOrganization")
                    .and_then(|org| org.get("name"))
                    .and_then(Value::as_str)
                {
                    *company = name.trim().to_string();
                }
            }
            if location.is_empty() {
                if let Some(locality) = item
                    .get("jobLocation")
                    .and_then(|loc| loc.get("address"))
                    .and_then(|addr| addr.get("addressLocality"))
                    .and_then(Value::as_str)
                {
                    *location = locality.trim().to_string();
                }
            }
        }
    }
    Ok(())
}

fn apply_html_fallbacks(document: &Html, company: &mut String, description: &mut String) -> Result<()> {
    if company.is_empty() {
        for selector in ["div.company-name", r#"a[href*="/profil/firma/"]"#] {
            let sel = Selector::parse(selector)
                .map_err(|e| PipelineError::Parse(format!("invalid company selector: {e:?}")))?;
            if let Some(node) = document.select(&sel).next() {
                *company = node.text().collect::<String>().trim().to_string();
                break;
            }
        }
    }

    if description.is_empty() {
        for selector in [
            "div.ql-editor",
            "div.project-body-description",
            "div#project-description",
        ] {
            let sel = Selector::parse(selector)
                .map_err(|e| PipelineError::Parse(format!("invalid description selector: {e:?}")))?;
            if let Some(node) = document.select(&sel).next() {
                *description = block_text(node);
                break;
            }
        }
    }
    Ok(())
}
