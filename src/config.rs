// src/config.rs
//! Runtime settings from environment variables (a `.env` file is honoured
//! by the binary), with per-run overrides applied by the CLI.

use std::path::PathBuf;
use std::time::Duration;

use crate::browse::http::DEFAULT_USER_AGENT;
use crate::sweep::DEFAULT_MAX_CONCURRENCY;

pub const ENV_DATA_ROOT: &str = "JOB_SWEEP_DATA_ROOT";
pub const ENV_CACHE_PATH: &str = "JOB_SWEEP_CACHE_PATH";
pub const ENV_HISTORY_PATH: &str = "JOB_SWEEP_HISTORY_PATH";
pub const ENV_REPORT_DIR: &str = "JOB_SWEEP_REPORT_DIR";
pub const ENV_SCORING_CONFIG: &str = "JOB_SWEEP_CONFIG";
pub const ENV_MAX_CONCURRENCY: &str = "SWEEP_MAX_CONCURRENCY";
pub const ENV_NAV_TIMEOUT_SECS: &str = "SWEEP_NAV_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "SWEEP_USER_AGENT";

pub const DEFAULT_DATA_ROOT: &str = "data";
pub const DEFAULT_REPORT_DIR: &str = "readable_summaries";
pub const DEFAULT_NAV_TIMEOUT_SECS: u64 = 15;

/// Fallback interest list for the sweep when neither the CLI nor a scoring
/// config supplies one.
pub const DEFAULT_SWEEP_KEYWORDS: &[&str] = &[
    "Developer",
    "Engineer",
    "Software",
    "Programmer",
    "Full Stack",
    "Backend",
    "Frontend",
    "Data",
    "AI",
    "Technician",
    "Support",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_root: PathBuf,
    /// Shared across runs, unlike the per-run jobs directory.
    pub cache_path: PathBuf,
    pub history_path: PathBuf,
    pub report_dir: PathBuf,
    pub scoring_config: Option<PathBuf>,
    pub max_concurrency: usize,
    pub nav_timeout: Duration,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_root = PathBuf::from(DEFAULT_DATA_ROOT);
        Self {
            cache_path: data_root.join("companies").join("known_career_pages.json"),
            history_path: data_root.join("applied_history.json"),
            data_root,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            scoring_config: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            nav_timeout: Duration::from_secs(DEFAULT_NAV_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Read every `JOB_SWEEP_*` / `SWEEP_*` variable; unset or unparseable
    /// values keep their defaults. Paths not set explicitly follow the data
    /// root.
    pub fn from_env() -> Self {
        let mut s = Self::default();

        if let Some(root) = env_path(ENV_DATA_ROOT) {
            s.cache_path = root.join("companies").join("known_career_pages.json");
            s.history_path = root.join("applied_history.json");
            s.data_root = root;
        }
        if let Some(p) = env_path(ENV_CACHE_PATH) {
            s.cache_path = p;
        }
        if let Some(p) = env_path(ENV_HISTORY_PATH) {
            s.history_path = p;
        }
        if let Some(p) = env_path(ENV_REPORT_DIR) {
            s.report_dir = p;
        }
        s.scoring_config = env_path(ENV_SCORING_CONFIG);

        if let Some(n) = env_parse::<usize>(ENV_MAX_CONCURRENCY) {
            s.max_concurrency = n.max(1);
        }
        if let Some(secs) = env_parse::<u64>(ENV_NAV_TIMEOUT_SECS).filter(|v| *v > 0) {
            s.nav_timeout = Duration::from_secs(secs);
        }
        if let Ok(ua) = std::env::var(ENV_USER_AGENT) {
            if !ua.trim().is_empty() {
                s.user_agent = ua.trim().to_string();
            }
        }
        s
    }

    /// Where a run's source result files and master list live.
    pub fn jobs_dir(&self, run_id: Option<&str>) -> PathBuf {
        match run_id.map(str::trim).filter(|r| !r.is_empty()) {
            Some(id) => self.data_root.join(id),
            None => self.data_root.join("jobs"),
        }
    }

    pub fn report_path(&self, run_id: Option<&str>) -> PathBuf {
        match run_id.map(str::trim).filter(|r| !r.is_empty()) {
            Some(id) => self.report_dir.join(format!("Report_{id}.md")),
            None => self.report_dir.join("Daily_Job_Report.md"),
        }
    }

    pub fn default_company_list(&self) -> PathBuf {
        self.data_root.join("companies").join("companies.md")
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
