use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::classify::ZeroShotClassifier;
use crate::error::ScrapeError;
use crate::extract::FeatureExtractor;
use crate::fetch::Fetcher;
use crate::record::{AssessmentRecord, NOT_AVAILABLE};

/// Counters for one harvesting pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub cache_hits: usize,
    pub scraped: usize,
    pub failed: usize,
}

/// Visit every link in order. Cached links are answered from the cache
/// without touching the network or the delay; everything else is fetched,
/// classified, and written through to the cache before the loop moves on.
/// A failed link is logged and skipped, never fatal.
pub fn run<F: Fetcher, C: ZeroShotClassifier>(
    links: &[String],
    fetcher: &F,
    extractor: &FeatureExtractor<C>,
    cache: &mut CacheStore,
    delay: Duration,
) -> (Vec<AssessmentRecord>, RunStats) {
    let mut records = Vec::with_capacity(links.len());
    let mut stats = RunStats {
        total: links.len(),
        ..RunStats::default()
    };

    let bar = ProgressBar::new(links.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    for url in links {
        bar.set_message(url.clone());

        if cache.contains(url) {
            info!("cache hit: {url}");
            records.extend(cache.get(url).cloned());
            stats.cache_hits += 1;
            bar.inc(1);
            continue;
        }

        match scrape_one(url, fetcher, extractor) {
            Ok(record) => {
                records.push(record.clone());
                cache.put(url, record);
                stats.scraped += 1;
            }
            Err(e) => {
                warn!("skipping {url}: {e}");
                stats.failed += 1;
            }
        }
        bar.inc(1);

        // Polite pause after every request, hit or miss.
        thread::sleep(delay);
    }
    bar.finish_and_clear();

    info!(
        "pass complete: {} scraped, {} from cache, {} failed",
        stats.scraped, stats.cache_hits, stats.failed
    );

    (records, stats)
}

/// Fetch one page and classify its text into a finished record.
fn scrape_one<F: Fetcher, C: ZeroShotClassifier>(
    url: &str,
    fetcher: &F,
    extractor: &FeatureExtractor<C>,
) -> Result<AssessmentRecord, ScrapeError> {
    let page = fetcher.fetch(url)?;
    let features = extractor.extract(&page.text)?;

    Ok(AssessmentRecord {
        name: page
            .title
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        url: url.to_string(),
        duration: features.duration,
        remote: features.remote,
        adaptive: features.adaptive,
        test_type: features.test_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Page;
    use crate::record::YesNo;
    use std::cell::{Cell, RefCell};
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::tempdir;

    const SCENARIO_TEXT: &str =
        "This assessment type: Cognitive. Duration: 30 minutes. Remote enabled.";

    struct StubFetcher {
        fail: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                fail: Vec::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing_on(url: &'static str) -> Self {
            Self {
                fail: vec![url],
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &str) -> Result<Page, ScrapeError> {
            self.calls.borrow_mut().push(url.to_string());
            if self.fail.iter().any(|f| *f == url) {
                return Err(ScrapeError::Fetch(format!("{url}: connection refused")));
            }
            Ok(Page {
                title: Some(format!("Assessment {}", url.rsplit('/').next().unwrap())),
                text: SCENARIO_TEXT.to_string(),
            })
        }
    }

    struct FlatOracle {
        value: f32,
        calls: Rc<Cell<usize>>,
    }

    impl ZeroShotClassifier for FlatOracle {
        fn score(&self, _: &str, _: &str, _: &str) -> Result<f32, ScrapeError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.value)
        }
    }

    fn extractor(calls: &Rc<Cell<usize>>) -> FeatureExtractor<FlatOracle> {
        FeatureExtractor::new(
            FlatOracle {
                value: 0.9,
                calls: Rc::clone(calls),
            },
            0.7,
        )
    }

    fn links(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn scraped_record_carries_extracted_values() {
        let dir = tempdir().unwrap();
        let mut cache = CacheStore::load(&dir.path().join("cache.json"));
        let fetcher = StubFetcher::new();
        let oracle_calls = Rc::new(Cell::new(0));

        let (records, stats) = run(
            &links(&["https://x.example/products/verify/"]),
            &fetcher,
            &extractor(&oracle_calls),
            &mut cache,
            Duration::ZERO,
        );

        assert_eq!(stats.scraped, 1);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.url, "https://x.example/products/verify/");
        assert_eq!(record.duration, "30 minutes");
        assert_eq!(record.remote, YesNo::Yes);
        assert_eq!(record.adaptive, YesNo::Yes);
        assert_eq!(record.test_type, "cognitive");
    }

    #[test]
    fn second_pass_answers_from_cache_without_network_or_oracle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let urls = links(&["https://x.example/1", "https://x.example/2"]);

        let mut cache = CacheStore::load(&path);
        let first_calls = Rc::new(Cell::new(0));
        let (first_records, _) = run(
            &urls,
            &StubFetcher::new(),
            &extractor(&first_calls),
            &mut cache,
            Duration::ZERO,
        );

        let mut resumed = CacheStore::load(&path);
        let fetcher = StubFetcher::new();
        let oracle_calls = Rc::new(Cell::new(0));
        let (records, stats) = run(
            &urls,
            &fetcher,
            &extractor(&oracle_calls),
            &mut resumed,
            Duration::ZERO,
        );

        assert_eq!(records, first_records);
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.scraped, 0);
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(oracle_calls.get(), 0);
    }

    #[test]
    fn one_failed_link_does_not_stop_the_pass() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let urls = links(&[
            "https://x.example/1",
            "https://x.example/2",
            "https://x.example/3",
        ]);

        let mut cache = CacheStore::load(&path);
        let oracle_calls = Rc::new(Cell::new(0));
        let (records, stats) = run(
            &urls,
            &StubFetcher::failing_on("https://x.example/2"),
            &extractor(&oracle_calls),
            &mut cache,
            Duration::ZERO,
        );

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.scraped, 2);
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Assessment 1", "Assessment 3"]);

        let reloaded = CacheStore::load(&path);
        assert!(reloaded.contains("https://x.example/1"));
        assert!(!reloaded.contains("https://x.example/2"));
        assert!(reloaded.contains("https://x.example/3"));
    }

    /// Fetcher that inspects the on-disk snapshot while the pass is still
    /// running, proving earlier links were flushed before later fetches.
    struct SnapshotProbe<'a> {
        cache_path: &'a Path,
        observed_first: Cell<bool>,
    }

    impl Fetcher for SnapshotProbe<'_> {
        fn fetch(&self, url: &str) -> Result<Page, ScrapeError> {
            if url == "https://x.example/2" {
                let snapshot = CacheStore::load(self.cache_path);
                self.observed_first
                    .set(snapshot.contains("https://x.example/1"));
            }
            Ok(Page {
                title: None,
                text: SCENARIO_TEXT.to_string(),
            })
        }
    }

    #[test]
    fn earlier_records_hit_disk_before_the_next_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = CacheStore::load(&path);
        let probe = SnapshotProbe {
            cache_path: &path,
            observed_first: Cell::new(false),
        };
        let oracle_calls = Rc::new(Cell::new(0));
        run(
            &links(&["https://x.example/1", "https://x.example/2"]),
            &probe,
            &extractor(&oracle_calls),
            &mut cache,
            Duration::ZERO,
        );

        assert!(probe.observed_first.get());
    }

    #[test]
    fn duplicate_links_fetch_once_but_yield_two_records() {
        let dir = tempdir().unwrap();
        let mut cache = CacheStore::load(&dir.path().join("cache.json"));
        let fetcher = StubFetcher::new();
        let oracle_calls = Rc::new(Cell::new(0));

        let (records, stats) = run(
            &links(&["https://x.example/1", "https://x.example/1"]),
            &fetcher,
            &extractor(&oracle_calls),
            &mut cache,
            Duration::ZERO,
        );

        assert_eq!(records.len(), 2);
        assert_eq!(fetcher.call_count(), 1);
        assert_eq!(stats.scraped, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn untitled_pages_fall_back_to_the_sentinel_name() {
        let dir = tempdir().unwrap();
        let mut cache = CacheStore::load(&dir.path().join("cache.json"));
        let unused = dir.path().join("unused.json");
        let probe = SnapshotProbe {
            cache_path: &unused,
            observed_first: Cell::new(false),
        };
        let oracle_calls = Rc::new(Cell::new(0));

        let (records, _) = run(
            &links(&["https://x.example/1"]),
            &probe,
            &extractor(&oracle_calls),
            &mut cache,
            Duration::ZERO,
        );

        assert_eq!(records[0].name, "N/A");
    }
}
