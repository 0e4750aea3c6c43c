// src/sweep/extractor.rs
//! Heuristic posting extraction from an arbitrary careers page.
//!
//! No per-site schema: a candidate is any visible anchor, heading or list
//! item whose text is short, mentions an interest keyword, and is not
//! navigation boilerplate. Site-specific adapters can replace this by
//! implementing [`PostingExtractor`].

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;

use super::dom;
use crate::browse::Page;
use crate::posting::{CompanyReference, Posting};

/// Candidate elements scanned per page, visible or not.
pub const SCAN_CAP: usize = 100;
/// Postings accepted per page before scanning stops.
pub const MAX_POSTINGS_PER_PAGE: usize = 5;
pub const DIRECT_SOURCE_TAG: &str = "Direct Site";
pub const PRESUMED_LOCATION: &str = "Presumed local";

const STOPLIST: &[&str] = &[
    "careers", "jobs", "home", "contact", "about us", "join us", "read more",
];

static CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a, h2, h3, h4, h5, li").expect("candidate selector"));

/// Turns a loaded careers page into postings.
///
/// `target` is the careers URL the page was requested as. Postings without
/// a link of their own point there rather than at `page.url`, which may be
/// a redirect landing carrying session parameters.
pub trait PostingExtractor: Send + Sync {
    fn extract(&self, page: &Page, target: &str, company: &CompanyReference) -> Vec<Posting>;
}

#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    keywords: Vec<String>,
    scan_cap: usize,
    max_postings: usize,
    location: String,
    source: String,
}

impl KeywordExtractor {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            scan_cap: SCAN_CAP,
            max_postings: MAX_POSTINGS_PER_PAGE,
            location: PRESUMED_LOCATION.to_string(),
            source: DIRECT_SOURCE_TAG.to_string(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    fn accepts(&self, text: &str) -> bool {
        let len = text.chars().count();
        if len <= 4 || len >= 100 {
            return false;
        }
        let lower = text.to_lowercase();
        if STOPLIST.contains(&lower.as_str()) {
            return false;
        }
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

impl PostingExtractor for KeywordExtractor {
    fn extract(&self, page: &Page, target: &str, company: &CompanyReference) -> Vec<Posting> {
        let doc = Html::parse_document(&page.html);
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for el in doc.select(&CANDIDATES).take(self.scan_cap) {
            if out.len() >= self.max_postings {
                break;
            }
            if !dom::is_visible(el) {
                continue;
            }
            let text = dom::inner_text(el);
            if !self.accepts(&text) || seen.contains(&text) {
                continue;
            }

            let url = dom::closest_href(el)
                .and_then(|h| dom::absolute_href(&page.url, h))
                .unwrap_or_else(|| target.to_string());

            debug!(target: "sweep", company = %company.name, title = %text, "posting found");
            seen.insert(text.clone());
            out.push(Posting {
                title: text,
                company: company.name.clone(),
                url,
                location: self.location.clone(),
                source: self.source.clone(),
                date: None,
                description: None,
            });
        }

        out
    }
}
