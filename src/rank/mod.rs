// src/rank/mod.rs
//! Rank engine: merge every source's postings, dedup by URL, drop what is in
//! the applied history, score against keyword weights and sort.

pub mod history;
pub mod sources;
pub mod weights;

use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use metrics::{counter, gauge};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::posting::{canonical_url, Posting, ScoredPosting};
use crate::telemetry::ensure_metrics_described;
use history::AppliedHistory;
use weights::KeywordWeights;

/// Result of ranking an in-memory posting list.
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    /// Sorted by score descending; ties keep merge order.
    pub postings: Vec<ScoredPosting>,
    /// Postings that collapsed into an earlier one with the same URL.
    pub duplicates: usize,
    /// Postings dropped because their URL is in the history.
    pub excluded: usize,
}

/// Result of a full aggregation run over a data directory.
#[derive(Debug, Clone, Default)]
pub struct RankOutcome {
    pub ranked: RankedList,
    pub files_loaded: Vec<PathBuf>,
    pub files_skipped: Vec<(PathBuf, String)>,
    pub records_skipped: usize,
}

/// Score one posting.
///
/// Positive keywords count when they appear anywhere in
/// `title + " " + description`; negative keywords only when they appear in
/// the title. Matching is case-insensitive substring search. Only positive
/// hits are reported, in weight-table order.
pub fn score_posting(posting: &Posting, weights: &KeywordWeights) -> (i32, Vec<String>) {
    let title = posting.title.to_lowercase();
    let text = format!(
        "{} {}",
        title,
        posting.description.as_deref().unwrap_or_default().to_lowercase()
    );

    let mut score = 0i32;
    let mut matched = Vec::new();
    for (word, points) in &weights.positive {
        if text.contains(&word.to_lowercase()) {
            score = score.saturating_add(*points);
            matched.push(word.clone());
        }
    }
    for (word, points) in &weights.negative {
        if title.contains(&word.to_lowercase()) {
            score = score.saturating_add(*points);
        }
    }
    (score, matched)
}

/// Dedup, filter and score postings given in merge order.
///
/// A URL keeps the position of its first occurrence and the content of its
/// last one. Postings without a usable URL are dropped.
pub fn rank_postings(
    postings: impl IntoIterator<Item = Posting>,
    history: &AppliedHistory,
    weights: &KeywordWeights,
) -> RankedList {
    let mut total = 0usize;
    let mut by_url: IndexMap<String, Posting> = IndexMap::new();
    for mut p in postings {
        let Some(url) = canonical_url(&p.url) else {
            continue;
        };
        total += 1;
        p.url = url.clone();
        by_url.insert(url, p);
    }
    let duplicates = total - by_url.len();

    let mut excluded = 0usize;
    let mut scored: Vec<ScoredPosting> = Vec::with_capacity(by_url.len());
    for (url, posting) in by_url {
        if history.contains(&url) {
            excluded += 1;
            continue;
        }
        let (score, matching_keywords) = score_posting(&posting, weights);
        scored.push(ScoredPosting {
            posting,
            score,
            matching_keywords,
        });
    }

    // stable: equal scores keep merge order
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    RankedList {
        postings: scored,
        duplicates,
        excluded,
    }
}

/// Load every `*_results.json` in `data_dir` and rank the union.
///
/// Unreadable or malformed files are skipped with a warning. Finding no
/// source file at all is an error.
pub fn aggregate(
    data_dir: &Path,
    history: &AppliedHistory,
    weights: &KeywordWeights,
) -> Result<RankOutcome> {
    ensure_metrics_described();

    let files = sources::discover_source_files(data_dir)?;
    if files.is_empty() {
        return Err(anyhow!(
            "no *{} files found in {}",
            sources::RESULTS_SUFFIX,
            data_dir.display()
        ));
    }
    info!(target: "rank", files = files.len(), dir = %data_dir.display(), "merging source files");

    let mut outcome = RankOutcome::default();
    let mut merged: Vec<Posting> = Vec::new();
    for path in files {
        match sources::load_source_file(&path) {
            Ok(batch) => {
                counter!("rank_files_total").increment(1);
                if batch.skipped_records > 0 {
                    warn!(target: "rank", file = %path.display(), skipped = batch.skipped_records, "dropped unusable records");
                }
                outcome.records_skipped += batch.skipped_records;
                merged.extend(batch.postings);
                outcome.files_loaded.push(path);
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(target: "rank", file = %path.display(), error = %reason, "skipping source file");
                counter!("rank_files_skipped_total").increment(1);
                outcome.files_skipped.push((path, reason));
            }
        }
    }

    outcome.ranked = rank_postings(merged, history, weights);

    counter!("rank_records_skipped_total").increment(outcome.records_skipped as u64);
    counter!("rank_dedup_total").increment(outcome.ranked.duplicates as u64);
    counter!("rank_history_excluded_total").increment(outcome.ranked.excluded as u64);
    counter!("rank_postings_total").increment(outcome.ranked.postings.len() as u64);
    gauge!("rank_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    info!(
        target: "rank",
        loaded = outcome.files_loaded.len(),
        skipped = outcome.files_skipped.len(),
        duplicates = outcome.ranked.duplicates,
        excluded = outcome.ranked.excluded,
        kept = outcome.ranked.postings.len(),
        "ranking complete"
    );
    Ok(outcome)
}
