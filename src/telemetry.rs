// src/telemetry.rs
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// One-time metrics registration (so series carry descriptions once a
/// recorder is installed).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("sweep_sites_total", "Companies visited by the sweep.");
        describe_counter!(
            "sweep_cache_hits_total",
            "Companies whose careers page came from the cache."
        );
        describe_counter!(
            "sweep_resolved_total",
            "Careers pages discovered on this run."
        );
        describe_counter!(
            "sweep_site_failures_total",
            "Companies that failed to load or process."
        );
        describe_counter!("sweep_postings_total", "Postings extracted by the sweep.");
        describe_counter!("sweep_cache_flushes_total", "Career cache writes.");
        describe_counter!("rank_files_total", "Source result files loaded.");
        describe_counter!(
            "rank_files_skipped_total",
            "Source result files skipped as unreadable or malformed."
        );
        describe_counter!(
            "rank_records_skipped_total",
            "Source records dropped during normalization."
        );
        describe_counter!("rank_dedup_total", "Postings collapsed by URL dedup.");
        describe_counter!(
            "rank_history_excluded_total",
            "Postings dropped because they were already applied to."
        );
        describe_counter!("rank_postings_total", "Postings in the master list.");
        describe_gauge!("rank_last_run_ts", "Unix ts when ranking last ran.");
    });
}

/// Install the global subscriber: compact by default, JSON when
/// `JOB_SWEEP_LOG_JSON=1`. Filter comes from `RUST_LOG`.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_sweep=info,warn"));
    let json = std::env::var("JOB_SWEEP_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}
