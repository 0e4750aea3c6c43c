// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod browse;
pub mod cache;
pub mod companies;
pub mod config;
pub mod posting;
pub mod rank;
pub mod report;
pub mod sweep;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::browse::{FetchError, Page, PageLoader};
pub use crate::cache::CareerPageCache;
pub use crate::posting::{CompanyReference, Posting, ScoredPosting};
pub use crate::rank::{aggregate, rank_postings, score_posting};
pub use crate::sweep::{SweepConfig, SweepReport, Sweeper};
