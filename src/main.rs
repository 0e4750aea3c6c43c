//! job-sweep binary entrypoint.
//! `sweep` finds careers pages and extracts postings; `rank` merges every
//! source's results into the scored master list and report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use job_sweep::browse::http::HttpLoader;
use job_sweep::cache::CareerPageCache;
use job_sweep::companies::load_companies;
use job_sweep::config::{Settings, DEFAULT_SWEEP_KEYWORDS};
use job_sweep::rank::{self, history::AppliedHistory, weights::KeywordWeights};
use job_sweep::report;
use job_sweep::sweep::extractor::KeywordExtractor;
use job_sweep::sweep::{self, SweepConfig, Sweeper};

#[derive(Parser)]
#[command(name = "job-sweep")]
#[command(about = "Career-page sweep and job posting ranking")]
#[command(version)]
struct Cli {
    /// Run identifier; selects data/<run-id> as the jobs directory
    #[arg(long, global = true)]
    run_id: Option<String>,

    /// Scoring config (JSON or TOML) with positive/negative keyword tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve careers pages for a company list and extract postings
    Sweep {
        /// Company lists (.md with [Name](url) links, or .json records)
        #[arg(long, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Interest keywords; defaults to the scoring config's positive keywords
        #[arg(long, num_args = 1..)]
        keywords: Vec<String>,

        /// Sites visited at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Merge *_results.json files, score, and write the master list and report
    Rank,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    job_sweep::telemetry::init_tracing();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(cfg) = cli.config.clone() {
        settings.scoring_config = Some(cfg);
    }
    let run_id = cli.run_id.as_deref();

    let result = match cli.command {
        Commands::Sweep {
            inputs,
            keywords,
            concurrency,
        } => {
            if let Some(n) = concurrency {
                settings.max_concurrency = n.max(1);
            }
            run_sweep(&settings, run_id, inputs, keywords).await
        }
        Commands::Rank => run_rank(&settings, run_id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_sweep(
    settings: &Settings,
    run_id: Option<&str>,
    inputs: Vec<PathBuf>,
    keywords: Vec<String>,
) -> Result<()> {
    let inputs = if inputs.is_empty() {
        vec![settings.default_company_list()]
    } else {
        inputs
    };
    let companies = load_companies(&inputs)?;

    let keywords = if !keywords.is_empty() {
        keywords
    } else {
        match settings.scoring_config.as_deref().filter(|p| p.exists()) {
            Some(p) => KeywordWeights::load_from_file(p).positive_names(),
            None => DEFAULT_SWEEP_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    };
    info!(companies = companies.len(), keywords = ?keywords, "starting sweep");

    let loader = HttpLoader::new(&settings.user_agent, settings.nav_timeout)?;
    let extractor = KeywordExtractor::new(&keywords);
    let mut cache = CareerPageCache::load(&settings.cache_path);
    let sweeper = Sweeper::new(
        &loader,
        &extractor,
        SweepConfig {
            max_concurrency: settings.max_concurrency,
        },
    );

    let report = sweeper.run(&companies, &mut cache).await;
    let postings = report.postings();

    let out = settings.jobs_dir(run_id).join(sweep::SWEEP_RESULTS_FILE);
    sweep::save_results(&out, &postings)?;
    info!(postings = postings.len(), path = %out.display(), "sweep results saved");
    Ok(())
}

fn run_rank(settings: &Settings, run_id: Option<&str>) -> Result<()> {
    let weights = KeywordWeights::load(settings.scoring_config.as_deref());
    let history = AppliedHistory::load(&settings.history_path);
    let jobs_dir = settings.jobs_dir(run_id);

    let outcome = rank::aggregate(&jobs_dir, &history, &weights)?;
    let ranked = &outcome.ranked.postings;

    let master = jobs_dir.join(report::MASTER_LIST_FILE);
    report::save_master_list(&master, ranked)?;
    info!(postings = ranked.len(), path = %master.display(), "master list saved");

    let md = report::render_markdown(ranked, chrono::Local::now().date_naive());
    let report_path = settings.report_path(run_id);
    report::write_report(&report_path, &md)?;
    info!(path = %report_path.display(), "report generated");
    Ok(())
}
