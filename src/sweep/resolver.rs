// src/sweep/resolver.rs
//! Career page resolution: company homepage -> careers listing URL.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

use super::dom;
use crate::browse::{FetchError, Page, PageLoader};
use crate::cache::CareerPageCache;
use crate::posting::CompanyReference;

static CAREER_INTENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)career|job|join|work").expect("career intent regex"));

/// Outcome of resolving one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Known from the cache; no page was loaded.
    Cached(String),
    /// Found on this run. `page` is the homepage that was loaded to find it,
    /// so the extractor can reuse it when the target is that same page.
    Discovered { target: String, page: Page },
    /// No career link and no careers-looking landing URL.
    Unresolved,
}

impl Resolution {
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Cached(t) | Resolution::Discovered { target: t, .. } => Some(t.as_str()),
            Resolution::Unresolved => None,
        }
    }
}

/// Resolve `company` to its careers page.
///
/// A cache hit returns without touching the network. Otherwise the homepage
/// is loaded; load failures are returned as errors for the caller to record.
/// The cache is only read here: new resolutions are merged by the caller
/// once the whole batch has joined.
pub async fn resolve<L: PageLoader + ?Sized>(
    loader: &L,
    company: &CompanyReference,
    cache: &CareerPageCache,
) -> Result<Resolution, FetchError> {
    if let Some(hit) = cache.get(&company.url) {
        info!(target: "sweep", company = %company.name, url = %hit, "cache hit");
        return Ok(Resolution::Cached(hit.to_string()));
    }

    debug!(target: "sweep", company = %company.name, url = %company.url, "scanning homepage");
    let page = loader.load(&company.url).await?;

    match find_career_target(&page) {
        Some(target) => {
            info!(target: "sweep", company = %company.name, url = %target, "found career page");
            Ok(Resolution::Discovered { target, page })
        }
        None => {
            info!(target: "sweep", company = %company.name, "no career link found");
            Ok(Resolution::Unresolved)
        }
    }
}

/// First visible career-intent text whose enclosing link has a usable href;
/// failing that, the landing URL itself when it already looks like a careers
/// page.
pub fn find_career_target(page: &Page) -> Option<String> {
    let doc = Html::parse_document(&page.html);

    let from_link = doc
        .root_element()
        .descendants()
        .filter(|n| {
            n.value()
                .as_text()
                .is_some_and(|t| CAREER_INTENT.is_match(t))
        })
        .filter_map(|n| n.parent().and_then(ElementRef::wrap))
        .filter(|el| dom::is_visible(*el))
        .find_map(|el| dom::closest_href(el).and_then(|h| dom::absolute_href(&page.url, h)));

    from_link.or_else(|| {
        let lower = page.url.to_ascii_lowercase();
        (lower.contains("career") || lower.contains("job")).then(|| page.url.clone())
    })
}
