// src/companies.rs
//! Company reference lists: markdown link lists or JSON record arrays.

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::posting::CompanyReference;

static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]\((https?://.*?)\)").expect("markdown link regex"));

/// Load one company list. The format is picked by extension (`.md` or `.json`).
pub fn load_companies_from(path: &Path) -> Result<Vec<CompanyReference>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading company list from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "md" | "markdown" => Ok(parse_markdown(&content)),
        "json" => parse_json(&content)
            .with_context(|| format!("parsing company list {}", path.display())),
        other => Err(anyhow!("unsupported company list format: .{other}")),
    }
}

/// Load every input, skipping unreadable ones, and dedup by URL.
///
/// Fails only when none of the inputs could be read at all.
pub fn load_companies(paths: &[impl AsRef<Path>]) -> Result<Vec<CompanyReference>> {
    let mut all = Vec::new();
    let mut readable = 0usize;
    for p in paths {
        let p = p.as_ref();
        match load_companies_from(p) {
            Ok(mut v) => {
                readable += 1;
                info!(target: "sweep", path = %p.display(), count = v.len(), "loaded company list");
                all.append(&mut v);
            }
            Err(e) => warn!(target: "sweep", path = %p.display(), error = %format!("{e:#}"), "skipping company list"),
        }
    }
    if readable == 0 {
        return Err(anyhow!("no readable company list among {} input(s)", paths.len()));
    }
    Ok(dedup_by_url(all))
}

/// Dedup by URL: the first occurrence keeps its position, the last one
/// supplies the name.
pub fn dedup_by_url(companies: Vec<CompanyReference>) -> Vec<CompanyReference> {
    let mut by_url: IndexMap<String, CompanyReference> = IndexMap::new();
    for c in companies {
        by_url.insert(c.url.clone(), c);
    }
    by_url.into_values().collect()
}

fn parse_markdown(s: &str) -> Vec<CompanyReference> {
    MD_LINK
        .captures_iter(s)
        .map(|caps| CompanyReference::new(caps[1].trim(), caps[2].trim()))
        .collect()
}

#[derive(Deserialize)]
struct CompanyRecord {
    name: Option<String>,
    title: Option<String>,
    url: Option<String>,
}

fn parse_json(s: &str) -> Result<Vec<CompanyReference>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(s)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Ok(rec) = serde_json::from_value::<CompanyRecord>(item) else {
            continue;
        };
        let Some(url) = rec.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
            continue;
        };
        let name = rec
            .name
            .or(rec.title)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| url.clone());
        out.push(CompanyReference { name, url });
    }
    Ok(out)
}
