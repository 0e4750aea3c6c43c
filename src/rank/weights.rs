//! # Keyword Weights
//!
//! Positive and negative keyword weights used to score postings.
//!
//! - Loads from a scoring config file (JSON, or TOML by `.toml` extension)
//!   with optional `positive_keywords` / `negative_keywords` tables.
//! - A side missing from the file falls back to the built-in table for that
//!   side; an unreadable or malformed file falls back to both.
//! - Entries keep file order, which is the order of the matched-keyword trace.

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordWeights {
    /// Matched anywhere in `title + " " + description`.
    pub positive: IndexMap<String, i32>,
    /// Matched in the title only.
    pub negative: IndexMap<String, i32>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringFile {
    positive_keywords: Option<IndexMap<String, i32>>,
    negative_keywords: Option<IndexMap<String, i32>>,
}

impl Default for KeywordWeights {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl KeywordWeights {
    /// Load from an optional path. `None` or a missing file means defaults.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p.exists() => Self::load_from_file(p),
            _ => Self::default_seed(),
        }
    }

    /// Load from a file, falling back to `default_seed()` with a warning.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_file(path) {
            Ok(w) => w,
            Err(e) => {
                warn!(target: "rank", path = %path.display(), error = %format!("{e:#}"), "scoring config unusable; using defaults");
                Self::default_seed()
            }
        }
    }

    pub fn try_load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self::parse(&content, &ext)
    }

    fn parse(s: &str, hint_ext: &str) -> Result<Self> {
        let file: ScoringFile = if hint_ext == "toml" {
            toml::from_str(s).map_err(|e| anyhow!("invalid TOML scoring config: {e}"))?
        } else {
            serde_json::from_str(s).context("invalid JSON scoring config")?
        };
        let seed = Self::default_seed();
        Ok(Self {
            positive: file.positive_keywords.map(clean).unwrap_or(seed.positive),
            negative: file.negative_keywords.map(clean).unwrap_or(seed.negative),
        })
    }

    /// Names of the positive keywords, in order. Doubles as the sweep's
    /// interest list when none is given explicitly.
    pub fn positive_names(&self) -> Vec<String> {
        self.positive.keys().cloned().collect()
    }

    /// Built-in tables used when no config is available.
    pub fn default_seed() -> Self {
        let positive = [
            ("Python", 3),
            ("TypeScript", 3),
            ("Next.js", 3),
            ("AI", 4),
            ("Agent", 4),
            ("LLM", 4),
            ("Machine Learning", 3),
            ("React", 2),
            ("Godot", 2),
            ("Automation", 2),
            ("Junior", 2),
            ("Remote", 2),
            ("Cannabis", 5),
            ("Retail", 3),
        ];
        let negative = [
            ("Senior", -5),
            ("Lead", -3),
            ("Manager", -3),
            ("Staff", -5),
            ("Principal", -5),
        ];
        Self {
            positive: positive.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            negative: negative.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

/// Drop blank keywords (they would match every posting).
fn clean(table: IndexMap<String, i32>) -> IndexMap<String, i32> {
    table
        .into_iter()
        .map(|(k, v)| (k.trim().to_string(), v))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
