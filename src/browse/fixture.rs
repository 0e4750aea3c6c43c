// src/browse/fixture.rs
//! In-memory loader for tests and offline runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{FetchError, Page, PageLoader};

#[derive(Debug, Clone)]
enum Entry {
    Page {
        final_url: String,
        html: String,
        delay: Option<Duration>,
    },
    Fail,
}

/// Serves canned pages by URL and counts every navigation.
#[derive(Debug, Default)]
pub struct FixtureLoader {
    entries: HashMap<String, Entry>,
    navigations: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

impl FixtureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_redirect(url, url, html)
    }

    /// Serve `html` at `url`, reporting `final_url` as the landing URL.
    pub fn with_redirect(mut self, url: &str, final_url: &str, html: &str) -> Self {
        self.entries.insert(
            url.to_string(),
            Entry::Page {
                final_url: final_url.to_string(),
                html: html.to_string(),
                delay: None,
            },
        );
        self
    }

    /// Serve `html` at `url` after sleeping for `delay`.
    pub fn with_slow_page(mut self, url: &str, html: &str, delay: Duration) -> Self {
        self.entries.insert(
            url.to_string(),
            Entry::Page {
                final_url: url.to_string(),
                html: html.to_string(),
                delay: Some(delay),
            },
        );
        self
    }

    /// Make `url` fail like a timed-out navigation.
    pub fn with_failure(mut self, url: &str) -> Self {
        self.entries.insert(url.to_string(), Entry::Fail);
        self
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageLoader for FixtureLoader {
    async fn load(&self, url: &str) -> Result<Page, FetchError> {
        self.navigations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut v) = self.visited.lock() {
            v.push(url.to_string());
        }

        match self.entries.get(url) {
            Some(Entry::Page {
                final_url,
                html,
                delay,
            }) => {
                if let Some(d) = delay {
                    tokio::time::sleep(*d).await;
                }
                Ok(Page::new(final_url.clone(), html.clone()))
            }
            Some(Entry::Fail) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
