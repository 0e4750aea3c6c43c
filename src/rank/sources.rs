// src/rank/sources.rs
//! Source adapter result files (`*_results.json`) and their normalization
//! into [`Posting`].
//!
//! Adapters disagree on field names and types, so each record is mapped
//! once here; everything downstream sees only canonical postings.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::posting::{canonical_url, Posting, UNKNOWN_LOCATION};

pub const RESULTS_SUFFIX: &str = "_results.json";

const TITLE_KEYS: &[&str] = &["title", "job_title", "position"];
const COMPANY_KEYS: &[&str] = &["company", "company_name", "by"];
const URL_KEYS: &[&str] = &["url", "link", "job_url", "absolute_url"];
const LOCATION_KEYS: &[&str] = &["location"];
const SOURCE_KEYS: &[&str] = &["source"];
const DATE_KEYS: &[&str] = &["date", "time", "posted", "date_posted"];
const DESCRIPTION_KEYS: &[&str] = &["description", "snippet", "text", "summary"];

/// Postings read from one file plus how many records were dropped.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub postings: Vec<Posting>,
    pub skipped_records: usize,
}

/// Every `*_results.json` file directly inside `dir`, sorted by file name.
pub fn discover_source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("listing data dir {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(RESULTS_SUFFIX))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read one result file. The file must hold a JSON array; records that do
/// not normalize (not an object, no URL) are counted and dropped.
pub fn load_source_file(path: &Path) -> Result<SourceBatch> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading source file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing source file {}", path.display()))?;
    let Value::Array(items) = value else {
        return Err(anyhow!("{} does not hold a JSON array", path.display()));
    };

    let origin = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut batch = SourceBatch::default();
    for item in items {
        match item.as_object().and_then(|rec| normalize_record(rec, &origin)) {
            Some(p) => batch.postings.push(p),
            None => batch.skipped_records += 1,
        }
    }
    Ok(batch)
}

/// Map one adapter record to a [`Posting`]. `origin` becomes the source tag
/// when the record carries none.
pub fn normalize_record(rec: &Map<String, Value>, origin: &str) -> Option<Posting> {
    let url = pick(rec, URL_KEYS).and_then(|u| canonical_url(&u))?;
    let source = pick(rec, SOURCE_KEYS).unwrap_or_else(|| origin.to_string());

    Some(Posting {
        title: pick(rec, TITLE_KEYS).unwrap_or_default(),
        company: pick(rec, COMPANY_KEYS).unwrap_or_default(),
        url,
        location: pick(rec, LOCATION_KEYS).unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        source,
        date: pick(rec, DATE_KEYS),
        description: pick(rec, DESCRIPTION_KEYS),
    })
}

/// First key present with a non-blank scalar value, normalized.
fn pick(rec: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        let raw = match rec.get(*k)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        let text = normalize_text(&raw);
        (!text.is_empty()).then_some(text)
    })
}

/// Decode entities, strip tags, straighten typographic quotes, collapse
/// whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)</?[a-z][^>]*>").expect("tag regex"));

    let decoded = html_escape::decode_html_entities(s);
    let stripped = RE_TAGS.replace_all(&decoded, " ");
    let quoted = stripped
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    quoted.split_whitespace().collect::<Vec<_>>().join(" ")
}
