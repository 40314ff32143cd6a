//! Web search helper
//!
//! Fetches a search-engine results page and reduces it to a short plain-text
//! summary. Every outcome, including failure, is reported as a string.

use crate::Result;
use regex::{Regex, RegexBuilder};
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://lite.duckduckgo.com/lite/";
pub const SUMMARY_MAX_CHARS: usize = 500;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; media-inference-utils/0.1)";

pub struct WebSearch {
    client: Client,
    search_url: String,
}

impl WebSearch {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::new_with_client(client))
    }

    pub fn new_with_client(client: Client) -> Self {
        Self {
            client,
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }

    pub fn with_search_url(mut self, search_url: String) -> Self {
        self.search_url = search_url;
        self
    }

    /// Search for `query` and return a formatted summary or a failure message.
    pub async fn search(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return "No search query provided".to_string();
        }

        let html = match self.fetch(query).await {
            Ok(Some(html)) => html,
            Ok(None) => return "Unable to fetch search results".to_string(),
            Err(e) => return format!("Search failed: {}", e),
        };

        match extract_text(&html) {
            Some(text) => format!("Search results for '{}': {}", query, summarize(&text)),
            None => "No search results found".to_string(),
        }
    }

    /// `Ok(None)` when the page could not be retrieved at all.
    async fn fetch(&self, query: &str) -> Result<Option<String>> {
        tracing::debug!("Fetching search results for '{}'", query);

        let response = match self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch search results: {}", e);
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            tracing::warn!("Search page returned status {}", response.status());
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

fn non_content_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        RegexBuilder::new(
            r"<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<head\b.*?</head\s*>",
        )
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .expect("non-content regex is valid")
    })
}

fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag regex is valid"))
}

fn entity_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity regex is valid")
    })
}

fn whitespace_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

/// Readable text of an HTML page, or `None` if nothing readable remains.
pub fn extract_text(html: &str) -> Option<String> {
    let without_blocks = non_content_regex().replace_all(html, " ");
    let without_tags = tag_regex().replace_all(&without_blocks, " ");
    let decoded = entity_regex().replace_all(&without_tags, |caps: &regex::Captures<'_>| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    let text = whitespace_regex().replace_all(&decoded, " ").trim().to_string();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn decode_entity(name: &str) -> Option<String> {
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        numeric => {
            let code = if let Some(hex) = numeric
                .strip_prefix("#x")
                .or_else(|| numeric.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                numeric.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}

/// Collapse whitespace and cap the text at [`SUMMARY_MAX_CHARS`] characters.
pub fn summarize(text: &str) -> String {
    let clean = whitespace_regex().replace_all(text, " ");
    let clean = clean.trim();

    match clean.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &clean[..cut]),
        None => clean.to_string(),
    }
}
