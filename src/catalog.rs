use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{error, info};
use url::Url;

use crate::error::ScrapeError;

/// Product links on the catalog page are site-relative; they resolve
/// against this base.
const BASE_URL: &str = "https://www.shl.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Discover the assessment links listed on the catalog page, in page
/// order, duplicates included. A discovery failure is logged and yields an
/// empty link set so the run still completes (with nothing to do).
pub fn discover(catalog_url: &str) -> Vec<String> {
    match fetch_links(catalog_url) {
        Ok(links) => links,
        Err(e) => {
            error!("{e}");
            Vec::new()
        }
    }
}

fn fetch_links(catalog_url: &str) -> Result<Vec<String>, ScrapeError> {
    let base = Url::parse(BASE_URL)
        .map_err(|e| ScrapeError::Discovery(format!("bad base url: {e}")))?;

    info!("Fetching assessment links from catalog: {}", catalog_url);
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ScrapeError::Discovery(e.to_string()))?;
    let html = client
        .get(catalog_url)
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .map_err(|e| ScrapeError::Discovery(format!("{catalog_url}: {e}")))?;

    let links = parse_catalog(&html, &base);
    info!("Found {} assessment links", links.len());
    Ok(links)
}

/// Pull the `a.product-card` hrefs out of the catalog page and resolve
/// them against `base`.
fn parse_catalog(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let cards = Selector::parse("a.product-card").unwrap();
    doc.select(&cards)
        .filter_map(|card| card.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .map(String::from)
        .collect()
}
