// src/cache.rs
//! Persistent `company url -> careers page url` cache.
//!
//! Absence of a key means "unresolved"; nothing is ever evicted here.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CareerPageCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl CareerPageCache {
    /// Empty cache bound to `path` (nothing is read).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load from disk. A missing or unreadable file yields an empty cache.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(target: "sweep", path = %path.display(), error = %e, "career cache is malformed; starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!(target: "sweep", path = %path.display(), entries = entries.len(), "career cache loaded");
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, company_url: &str) -> Option<&str> {
        self.entries.get(company_url).map(String::as_str)
    }

    /// Record a resolution. Blank targets are ignored so that absence stays
    /// the only way to say "unresolved".
    pub fn insert(&mut self, company_url: impl Into<String>, target: impl Into<String>) {
        let target = target.into();
        if target.trim().is_empty() {
            return;
        }
        self.entries.insert(company_url.into(), target);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole mapping, creating the parent directory first.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating cache dir {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(&self.entries).context("serializing career cache")?;
        fs::write(&self.path, body)
            .with_context(|| format!("writing career cache {}", self.path.display()))
    }
}
