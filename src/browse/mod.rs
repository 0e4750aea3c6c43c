// src/browse/mod.rs
//! Page loading capability used by the sweep.
//!
//! The sweep only needs "load this URL, give me the final URL and its
//! markup". Implementations: [`http::HttpLoader`] for real sites and
//! [`fixture::FixtureLoader`] for in-memory pages.

pub mod fixture;
pub mod http;

use async_trait::async_trait;
use thiserror::Error;

/// A loaded page: the URL after redirects plus its HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Why a page could not be loaded. All variants are soft failures for the
/// company being processed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("timed out loading {url}")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Loads pages. Shared read-only by every task of a batch.
#[async_trait]
pub trait PageLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Page, FetchError>;
}
