// src/report.rs
//! Report stage: master list persistence and the tiered markdown summary.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::posting::ScoredPosting;

pub const MASTER_LIST_FILE: &str = "master_listings.json";
pub const HIGH_PRIORITY_MIN: i32 = 5;
pub const MEDIUM_PRIORITY_MIN: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    High,
    Medium,
    /// Kept in the master list, left out of the markdown report.
    Low,
}

impl Tier {
    pub fn for_score(score: i32) -> Self {
        if score >= HIGH_PRIORITY_MIN {
            Tier::High
        } else if score >= MEDIUM_PRIORITY_MIN {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// Write the full ranked list as a JSON array.
pub fn save_master_list(path: &Path, ranked: &[ScoredPosting]) -> Result<()> {
    ensure_parent(path)?;
    let body = serde_json::to_vec_pretty(ranked).context("serializing master list")?;
    fs::write(path, body).with_context(|| format!("writing master list {}", path.display()))
}

/// Render the human-readable report. `ranked` must already be sorted.
pub fn render_markdown(ranked: &[ScoredPosting], date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Daily Job Search Report - {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out);
    let _ = writeln!(out, "**Total Jobs Found:** {}", ranked.len());
    let _ = writeln!(out);

    let high: Vec<&ScoredPosting> = ranked
        .iter()
        .filter(|p| Tier::for_score(p.score) == Tier::High)
        .collect();
    let medium: Vec<&ScoredPosting> = ranked
        .iter()
        .filter(|p| Tier::for_score(p.score) == Tier::Medium)
        .collect();

    render_group(&mut out, "High Priority Matches", &high);
    render_group(&mut out, "Medium Potential", &medium);
    out
}

fn render_group(out: &mut String, heading: &str, group: &[&ScoredPosting]) {
    if group.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {heading} ({})", group.len());
    for sp in group {
        let p = &sp.posting;
        let _ = writeln!(out, "### [{}] {} @ {}", sp.score, p.title, p.company);
        let _ = writeln!(out, "- **Location:** {}", p.location);
        let _ = writeln!(out, "- **Source:** {}", p.source);
        let _ = writeln!(out, "- **Match:** {}", sp.matching_keywords.join(", "));
        let _ = writeln!(out, "- [Apply Here]({})", p.url);
        let _ = writeln!(out);
    }
}

/// Write the markdown report, creating its directory first.
pub fn write_report(path: &Path, markdown: &str) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, markdown).with_context(|| format!("writing report {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}
