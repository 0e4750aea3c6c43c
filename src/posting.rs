// src/posting.rs
//! Core records shared by the sweep and the rank stages.

use serde::{Deserialize, Serialize};

/// Placeholder location used when a source adapter gives no location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// A company (or any site) whose careers page should be found and scanned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompanyReference {
    pub name: String,
    pub url: String,
}

impl CompanyReference {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One job posting in its canonical shape. Every source adapter output is
/// mapped into this once, at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub url: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_location() -> String {
    UNKNOWN_LOCATION.to_string()
}

/// A posting with its relevance score and the positive keywords that hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredPosting {
    #[serde(flatten)]
    pub posting: Posting,
    pub score: i32,
    pub matching_keywords: Vec<String>,
}

/// Canonical identity key for a posting URL.
///
/// Absolute URLs are re-serialized through `url::Url`, which lowercases the
/// scheme and host and drops default ports. Anything that does not parse as
/// an absolute URL is only trimmed. Returns `None` for blank input.
pub fn canonical_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match url::Url::parse(trimmed) {
        Ok(u) if u.has_host() => Some(u.to_string()),
        _ => Some(trimmed.to_string()),
    }
}
