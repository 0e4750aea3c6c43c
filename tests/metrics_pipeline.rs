// tests/metrics_pipeline.rs
#![cfg(feature = "strict-metrics")]
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

use job_sweep::browse::fixture::FixtureLoader;
use job_sweep::cache::CareerPageCache;
use job_sweep::posting::CompanyReference;
use job_sweep::rank::history::AppliedHistory;
use job_sweep::rank::weights::KeywordWeights;
use job_sweep::sweep::extractor::KeywordExtractor;
use job_sweep::sweep::{SweepConfig, Sweeper};

// One test per binary: the recorder is process-global.
#[tokio::test]
async fn sweep_and_rank_series_are_exposed() {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("recorder");

    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new()
        .with_page("https://c0.test/", r#"<a href="/careers">Careers</a>"#)
        .with_page("https://c0.test/careers", "<li>Python Developer</li>")
        .with_failure("https://c1.test/");
    let extractor = KeywordExtractor::new(["python"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));
    let companies = vec![
        CompanyReference::new("C0", "https://c0.test/"),
        CompanyReference::new("C1", "https://c1.test/"),
    ];
    Sweeper::new(&loader, &extractor, SweepConfig::default())
        .run(&companies, &mut cache)
        .await;

    fs::write(
        dir.path().join("a_results.json"),
        json!([
            {"title": "Python Developer", "company": "C0", "url": "https://c0.test/careers"},
            {"title": "Python Developer", "company": "C0", "url": "https://c0.test/careers"}
        ])
        .to_string(),
    )
    .unwrap();
    job_sweep::rank::aggregate(
        dir.path(),
        &AppliedHistory::default(),
        &KeywordWeights::default_seed(),
    )
    .unwrap();

    let out = handle.render();
    for series in [
        "sweep_sites_total",
        "sweep_resolved_total",
        "sweep_site_failures_total",
        "sweep_postings_total",
        "sweep_cache_flushes_total",
        "rank_files_total",
        "rank_dedup_total",
        "rank_postings_total",
        "rank_last_run_ts",
    ] {
        assert!(out.contains(series), "missing {series} in:\n{out}");
    }
    assert!(out.contains("sweep_sites_total 2"));
}
