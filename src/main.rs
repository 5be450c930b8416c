mod cache;
mod catalog;
mod classify;
mod config;
mod error;
mod export;
mod extract;
mod fetch;
mod pipeline;
mod record;

use std::time::Instant;

use cache::CacheStore;
use classify::InferenceClient;
use config::Config;
use extract::FeatureExtractor;
use fetch::HttpFetcher;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let config = Config::default();

    println!("SHL Assessment Catalog Scraper");
    println!("==============================");

    let classifier = InferenceClient::connect()?;
    let extractor = FeatureExtractor::new(classifier, config.confidence_threshold);
    let fetcher = HttpFetcher::new()?;

    let mut cache = CacheStore::load(&config.cache_path);
    if !cache.is_empty() {
        println!("Resuming with {} cached assessments.", cache.len());
    }

    let links = catalog::discover(&config.catalog_url);
    println!("Found {} assessment links.", links.len());

    let (records, stats) = pipeline::run(
        &links,
        &fetcher,
        &extractor,
        &mut cache,
        config.request_delay,
    );

    export::write_csv(&records, &config.output_path)?;
    println!(
        "Done: {} links ({} scraped, {} from cache, {} failed).",
        stats.total, stats.scraped, stats.cache_hits, stats.failed
    );
    println!(
        "Wrote {} rows to {}",
        records.len(),
        config.output_path.display()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
