//! history.rs: postings already applied to / seen, keyed by canonical URL.
//!
//! Read-only here; whoever records a manual application owns the file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::posting::canonical_url;

#[derive(Debug, Clone, Default)]
pub struct AppliedHistory {
    urls: HashSet<String>,
}

impl AppliedHistory {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            urls: urls
                .into_iter()
                .filter_map(|u| canonical_url(u.as_ref()))
                .collect(),
        }
    }

    /// Load a JSON array of URLs. Missing or malformed files mean "no history".
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(urls) => {
                let h = Self::from_urls(urls);
                info!(target: "rank", entries = h.len(), "loaded applied history");
                h
            }
            Err(e) => {
                warn!(target: "rank", path = %path.display(), error = %e, "applied history is malformed; ignoring it");
                Self::default()
            }
        }
    }

    /// `url` is expected in canonical form.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
