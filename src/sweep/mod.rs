// src/sweep/mod.rs
//! Sweep: resolve careers pages for many companies and extract postings,
//! a bounded batch at a time.
//!
//! Batches run strictly one after another. Inside a batch every company is
//! visited concurrently on the current task, results are collected by input
//! index, and only after the join are new resolutions merged into the cache
//! and flushed to disk.

pub mod dom;
pub mod extractor;
pub mod resolver;

use anyhow::{Context, Result};
use futures::future::join_all;
use futures::FutureExt;
use metrics::counter;
use std::fs;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tracing::{info, warn};

use crate::browse::PageLoader;
use crate::cache::CareerPageCache;
use crate::posting::{CompanyReference, Posting};
use crate::telemetry::ensure_metrics_described;
use extractor::PostingExtractor;
use resolver::Resolution;

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
/// File name of the sweep output inside a run's jobs directory.
pub const SWEEP_RESULTS_FILE: &str = "direct_sweep_results.json";

#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Batch size, i.e. the most site visits in flight at once.
    pub max_concurrency: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// What happened to one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOutcome {
    pub company: CompanyReference,
    /// Careers URL found on this run (not from cache), to be cached. Set even
    /// when the careers page itself then failed to load.
    pub discovered: Option<String>,
    pub status: SiteStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteStatus {
    Scanned {
        target: String,
        cache_hit: bool,
        postings: Vec<Posting>,
    },
    Unresolved,
    Failed {
        reason: String,
    },
}

impl SiteOutcome {
    pub fn postings(&self) -> &[Posting] {
        match &self.status {
            SiteStatus::Scanned { postings, .. } => postings,
            _ => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, SiteStatus::Failed { .. })
    }
}

/// All outcomes of a sweep, in company input order.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub outcomes: Vec<SiteOutcome>,
}

impl SweepReport {
    /// Every posting, in batch then intra-batch input order.
    pub fn postings(&self) -> Vec<Posting> {
        self.outcomes
            .iter()
            .flat_map(|o| o.postings().iter().cloned())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SiteOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn cache_hits(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, SiteStatus::Scanned { cache_hit: true, .. }))
            .count()
    }

    pub fn unresolved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == SiteStatus::Unresolved)
            .count()
    }
}

/// Runs the resolver and an extractor over company batches.
pub struct Sweeper<'a, L: ?Sized, E: ?Sized> {
    loader: &'a L,
    extractor: &'a E,
    cfg: SweepConfig,
}

impl<'a, L, E> Sweeper<'a, L, E>
where
    L: PageLoader + ?Sized,
    E: PostingExtractor + ?Sized,
{
    pub fn new(loader: &'a L, extractor: &'a E, cfg: SweepConfig) -> Self {
        Self {
            loader,
            extractor,
            cfg,
        }
    }

    /// Sweep `companies` (already deduplicated). The cache is flushed after
    /// every batch and once more at the end; flush errors are logged.
    pub async fn run(
        &self,
        companies: &[CompanyReference],
        cache: &mut CareerPageCache,
    ) -> SweepReport {
        ensure_metrics_described();

        let batch_size = self.cfg.max_concurrency.max(1);
        let batches = companies.len().div_ceil(batch_size);
        let mut report = SweepReport {
            outcomes: Vec::with_capacity(companies.len()),
        };

        for (i, batch) in companies.chunks(batch_size).enumerate() {
            let outcomes = {
                let snapshot: &CareerPageCache = cache;
                join_all(batch.iter().map(|c| self.visit_guarded(c, snapshot))).await
            };

            for o in &outcomes {
                if let Some(target) = &o.discovered {
                    cache.insert(o.company.url.clone(), target.clone());
                }
            }
            flush(cache);

            let found: usize = outcomes.iter().map(|o| o.postings().len()).sum();
            info!(target: "sweep", batch = i + 1, batches, postings = found, "batch complete");
            report.outcomes.extend(outcomes);
        }

        flush(cache);

        let failed: Vec<&str> = report.failures().map(|o| o.company.name.as_str()).collect();
        info!(
            target: "sweep",
            companies = companies.len(),
            postings = report.outcomes.iter().map(|o| o.postings().len()).sum::<usize>(),
            cache_hits = report.cache_hits(),
            unresolved = report.unresolved(),
            failed = ?failed,
            "sweep complete"
        );
        report
    }

    /// A panic while handling one company degrades to a failure for that
    /// company only.
    async fn visit_guarded(
        &self,
        company: &CompanyReference,
        cache: &CareerPageCache,
    ) -> SiteOutcome {
        counter!("sweep_sites_total").increment(1);
        let outcome = match AssertUnwindSafe(self.visit(company, cache))
            .catch_unwind()
            .await
        {
            Ok(o) => o,
            Err(_) => SiteOutcome {
                company: company.clone(),
                discovered: None,
                status: SiteStatus::Failed {
                    reason: "panicked while processing site".to_string(),
                },
            },
        };

        match &outcome.status {
            SiteStatus::Scanned {
                cache_hit,
                postings,
                ..
            } => {
                if *cache_hit {
                    counter!("sweep_cache_hits_total").increment(1);
                }
                counter!("sweep_postings_total").increment(postings.len() as u64);
            }
            SiteStatus::Failed { reason } => {
                warn!(target: "sweep", company = %company.name, %reason, "site failed");
                counter!("sweep_site_failures_total").increment(1);
            }
            SiteStatus::Unresolved => {}
        }
        if outcome.discovered.is_some() {
            counter!("sweep_resolved_total").increment(1);
        }
        outcome
    }

    async fn visit(&self, company: &CompanyReference, cache: &CareerPageCache) -> SiteOutcome {
        let failed = |discovered: Option<String>, reason: String| SiteOutcome {
            company: company.clone(),
            discovered,
            status: SiteStatus::Failed { reason },
        };

        let resolution = match resolver::resolve(self.loader, company, cache).await {
            Ok(r) => r,
            Err(e) => return failed(None, e.to_string()),
        };

        let (target, homepage, cache_hit) = match resolution {
            Resolution::Cached(target) => (target, None, true),
            Resolution::Discovered { target, page } => (target, Some(page), false),
            Resolution::Unresolved => {
                return SiteOutcome {
                    company: company.clone(),
                    discovered: None,
                    status: SiteStatus::Unresolved,
                }
            }
        };
        let discovered = (!cache_hit).then(|| target.clone());

        let page = match homepage.filter(|p| p.url == target) {
            Some(p) => p,
            None => match self.loader.load(&target).await {
                Ok(p) => p,
                Err(e) => return failed(discovered, e.to_string()),
            },
        };

        let postings = self.extractor.extract(&page, &target, company);
        SiteOutcome {
            company: company.clone(),
            discovered,
            status: SiteStatus::Scanned {
                target,
                cache_hit,
                postings,
            },
        }
    }
}

fn flush(cache: &CareerPageCache) {
    match cache.save() {
        Ok(()) => counter!("sweep_cache_flushes_total").increment(1),
        Err(e) => warn!(target: "sweep", error = %format!("{e:#}"), "career cache flush failed"),
    }
}

/// Write raw sweep postings as a JSON array, creating the directory first.
pub fn save_results(path: &Path, postings: &[Posting]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let body = serde_json::to_vec_pretty(postings).context("serializing sweep results")?;
    fs::write(path, body).with_context(|| format!("writing sweep results {}", path.display()))
}
