// tests/sweep_batches.rs
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

use job_sweep::browse::fixture::FixtureLoader;
use job_sweep::browse::{FetchError, Page, PageLoader};
use job_sweep::cache::CareerPageCache;
use job_sweep::posting::{CompanyReference, Posting};
use job_sweep::sweep::extractor::{KeywordExtractor, PostingExtractor};
use job_sweep::sweep::{SiteStatus, SweepConfig, Sweeper};

const ACME_HOME: &str = include_str!("fixtures/acme_home.html");
const ACME_CAREERS: &str = include_str!("fixtures/acme_careers.html");
const BAKERY_HOME: &str = include_str!("fixtures/bakery_home.html");

fn company(i: usize) -> CompanyReference {
    CompanyReference::new(format!("Company {i}"), format!("https://c{i}.test/"))
}

fn home_html() -> &'static str {
    r#"<body><a href="/careers">Careers</a></body>"#
}

fn careers_html(i: usize) -> String {
    format!("<ul><li>Rust Developer {i}</li></ul>")
}

/// Homepage plus careers page for companies `0..n`.
fn fixture_sites(n: usize) -> FixtureLoader {
    (0..n).fold(FixtureLoader::new(), |l, i| {
        l.with_page(&format!("https://c{i}.test/"), home_html())
            .with_page(&format!("https://c{i}.test/careers"), &careers_html(i))
    })
}

fn cfg(max_concurrency: usize) -> SweepConfig {
    SweepConfig { max_concurrency }
}

#[tokio::test]
async fn acme_careers_page_yields_expected_postings() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new()
        .with_page("https://acme.test/", ACME_HOME)
        .with_page("https://acme.test/company/careers", ACME_CAREERS);
    let extractor = KeywordExtractor::new(["Developer", "Engineer", "Support"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies = vec![CompanyReference::new("Acme", "https://acme.test/")];
    let report = Sweeper::new(&loader, &extractor, cfg(5))
        .run(&companies, &mut cache)
        .await;

    let got: Vec<(String, String)> = report
        .postings()
        .into_iter()
        .map(|p| (p.title, p.url))
        .collect();
    assert_eq!(
        got,
        vec![
            (
                "Junior Python Developer".to_string(),
                "https://acme.test/company/careers/101".to_string()
            ),
            (
                "Senior Backend Engineer".to_string(),
                "https://acme.test/company/careers/102".to_string()
            ),
            (
                "Support Technician (contract)".to_string(),
                "https://acme.test/company/careers".to_string()
            ),
        ]
    );
    assert_eq!(loader.navigations(), 2);
    assert_eq!(
        cache.get("https://acme.test/"),
        Some("https://acme.test/company/careers")
    );
}

#[tokio::test]
async fn outcomes_follow_input_order_even_when_pages_are_slow() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new()
        .with_page("https://c0.test/", home_html())
        .with_slow_page(
            "https://c0.test/careers",
            &careers_html(0),
            Duration::from_millis(80),
        )
        .with_page("https://c1.test/", home_html())
        .with_page("https://c1.test/careers", &careers_html(1))
        .with_page("https://c2.test/", home_html())
        .with_slow_page(
            "https://c2.test/careers",
            &careers_html(2),
            Duration::from_millis(30),
        );
    let extractor = KeywordExtractor::new(["developer"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies: Vec<_> = (0..3).map(company).collect();
    let report = Sweeper::new(&loader, &extractor, cfg(3))
        .run(&companies, &mut cache)
        .await;

    let names: Vec<_> = report.outcomes.iter().map(|o| o.company.name.clone()).collect();
    assert_eq!(names, vec!["Company 0", "Company 1", "Company 2"]);
    let titles: Vec<_> = report.postings().into_iter().map(|p| p.title).collect();
    assert_eq!(
        titles,
        vec!["Rust Developer 0", "Rust Developer 1", "Rust Developer 2"]
    );
}

#[tokio::test]
async fn one_failing_site_does_not_affect_the_others() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new()
        .with_page("https://c0.test/", home_html())
        .with_page("https://c0.test/careers", &careers_html(0))
        .with_failure("https://c1.test/")
        .with_page("https://c2.test/", home_html())
        .with_page("https://c2.test/careers", &careers_html(2));
    let extractor = KeywordExtractor::new(["developer"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies: Vec<_> = (0..3).map(company).collect();
    let report = Sweeper::new(&loader, &extractor, cfg(3))
        .run(&companies, &mut cache)
        .await;

    assert!(!report.outcomes[0].is_failure());
    assert!(report.outcomes[1].is_failure());
    assert!(!report.outcomes[2].is_failure());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.postings().len(), 2);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("https://c1.test/"), None);
}

#[tokio::test]
async fn discovered_target_is_cached_even_if_careers_page_fails() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new()
        .with_page("https://c0.test/", home_html())
        .with_failure("https://c0.test/careers");
    let extractor = KeywordExtractor::new(["developer"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let report = Sweeper::new(&loader, &extractor, cfg(2))
        .run(&[company(0)], &mut cache)
        .await;

    assert!(report.outcomes[0].is_failure());
    assert_eq!(
        report.outcomes[0].discovered.as_deref(),
        Some("https://c0.test/careers")
    );
    assert_eq!(cache.get("https://c0.test/"), Some("https://c0.test/careers"));
}

#[tokio::test]
async fn second_run_uses_the_persisted_cache() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("companies").join("known_career_pages.json");
    let companies: Vec<_> = (0..4).map(company).collect();
    let extractor = KeywordExtractor::new(["developer"]);

    let first = fixture_sites(4);
    let mut cache = CareerPageCache::load(&cache_path);
    Sweeper::new(&first, &extractor, cfg(2))
        .run(&companies, &mut cache)
        .await;
    assert_eq!(first.navigations(), 8);

    let on_disk = CareerPageCache::load(&cache_path);
    assert_eq!(on_disk.len(), 4);
    assert_eq!(on_disk.get("https://c3.test/"), Some("https://c3.test/careers"));

    let second = fixture_sites(4);
    let mut cache = CareerPageCache::load(&cache_path);
    let report = Sweeper::new(&second, &extractor, cfg(2))
        .run(&companies, &mut cache)
        .await;

    assert_eq!(report.cache_hits(), 4);
    assert_eq!(second.navigations(), 4, "only careers pages are loaded");
    assert!(second.visited().iter().all(|u| u.ends_with("/careers")));
    assert!(report.outcomes.iter().all(|o| o.discovered.is_none()));
    assert_eq!(report.postings().len(), 4);
}

/// Reads the cache file from disk the moment a given URL is requested.
struct CacheSnapshotLoader {
    inner: FixtureLoader,
    watch_url: String,
    cache_path: PathBuf,
    seen: Mutex<Option<String>>,
}

#[async_trait]
impl PageLoader for CacheSnapshotLoader {
    async fn load(&self, url: &str) -> Result<Page, FetchError> {
        if url == self.watch_url {
            let snapshot = fs::read_to_string(&self.cache_path).unwrap_or_default();
            *self.seen.lock().unwrap() = Some(snapshot);
        }
        self.inner.load(url).await
    }
}

#[tokio::test]
async fn cache_is_flushed_after_each_batch() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let loader = CacheSnapshotLoader {
        inner: fixture_sites(3),
        watch_url: "https://c2.test/".to_string(),
        cache_path: cache_path.clone(),
        seen: Mutex::new(None),
    };
    let extractor = KeywordExtractor::new(["developer"]);
    let mut cache = CareerPageCache::new(&cache_path);

    let companies: Vec<_> = (0..3).map(company).collect();
    Sweeper::new(&loader, &extractor, cfg(2))
        .run(&companies, &mut cache)
        .await;

    let seen = loader.seen.lock().unwrap().clone().expect("batch 2 ran");
    assert!(seen.contains("https://c0.test/careers"));
    assert!(seen.contains("https://c1.test/careers"));
    assert!(!seen.contains("https://c2.test/careers"));
}

/// Tracks how many loads are in flight at once.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
}

#[async_trait]
impl PageLoader for InFlight {
    async fn load(&self, url: &str) -> Result<Page, FetchError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(Page::new(url, "<p>Nothing here</p>"))
    }
}

#[tokio::test]
async fn in_flight_visits_never_exceed_the_batch_size() {
    let dir = tempdir().unwrap();
    let loader = InFlight::default();
    let extractor = KeywordExtractor::new(["developer"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies: Vec<_> = (0..7).map(company).collect();
    let report = Sweeper::new(&loader, &extractor, cfg(3))
        .run(&companies, &mut cache)
        .await;

    assert_eq!(report.outcomes.len(), 7);
    assert_eq!(report.unresolved(), 7);
    assert_eq!(loader.max.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn site_without_careers_link_yields_nothing() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new().with_page("https://bakery.test/", BAKERY_HOME);
    let extractor = KeywordExtractor::new(["developer", "baker"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies = vec![CompanyReference::new("Corner Bakery", "https://bakery.test/")];
    let report = Sweeper::new(&loader, &extractor, cfg(5))
        .run(&companies, &mut cache)
        .await;

    assert_eq!(report.outcomes[0].status, SiteStatus::Unresolved);
    assert!(report.postings().is_empty());
    assert!(cache.is_empty());
    assert_eq!(loader.navigations(), 1);
}

#[tokio::test]
async fn homepage_already_on_careers_page_is_reused() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new().with_redirect(
        "https://bakery.test/",
        "https://bakery.test/careers/",
        "<ul><li>Bread Baker Apprentice</li></ul>",
    );
    let extractor = KeywordExtractor::new(["baker"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies = vec![CompanyReference::new("Corner Bakery", "https://bakery.test/")];
    let report = Sweeper::new(&loader, &extractor, cfg(5))
        .run(&companies, &mut cache)
        .await;

    assert_eq!(loader.navigations(), 1);
    let postings = report.postings();
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].url, "https://bakery.test/careers/");
}

#[tokio::test]
async fn unlinked_postings_keep_the_cached_target_across_redirects() {
    let dir = tempdir().unwrap();
    let loader = FixtureLoader::new().with_redirect(
        "https://acme.test/careers",
        "https://ats.example.test/acme/board?session=123",
        r#"<ul><li>Rust Developer</li></ul><p><a href="jobs/7">Platform Engineer</a></p>"#,
    );
    let extractor = KeywordExtractor::new(["developer", "engineer"]);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));
    cache.insert("https://acme.test/", "https://acme.test/careers");

    let companies = vec![CompanyReference::new("Acme", "https://acme.test/")];
    let report = Sweeper::new(&loader, &extractor, cfg(5))
        .run(&companies, &mut cache)
        .await;

    let got: Vec<(String, String)> = report
        .postings()
        .into_iter()
        .map(|p| (p.title, p.url))
        .collect();
    assert_eq!(
        got,
        vec![
            (
                "Rust Developer".to_string(),
                "https://acme.test/careers".to_string()
            ),
            (
                "Platform Engineer".to_string(),
                "https://ats.example.test/acme/jobs/7".to_string()
            ),
        ]
    );
    assert_eq!(loader.navigations(), 1);
}

/// Panics on one company, extracts nothing otherwise.
struct Fragile;

impl PostingExtractor for Fragile {
    fn extract(&self, page: &Page, _target: &str, company: &CompanyReference) -> Vec<Posting> {
        if company.name == "Company 1" {
            panic!("extractor blew up on {}", page.url);
        }
        Vec::new()
    }
}

#[tokio::test]
async fn panicking_site_is_recorded_as_failure() {
    let dir = tempdir().unwrap();
    let loader = fixture_sites(3);
    let mut cache = CareerPageCache::new(dir.path().join("cache.json"));

    let companies: Vec<_> = (0..3).map(company).collect();
    let report = Sweeper::new(&loader, &Fragile, cfg(3))
        .run(&companies, &mut cache)
        .await;

    assert!(report.outcomes[1].is_failure());
    assert!(matches!(report.outcomes[0].status, SiteStatus::Scanned { .. }));
    assert!(matches!(report.outcomes[2].status, SiteStatus::Scanned { .. }));
    assert_eq!(report.failures().count(), 1);
}
