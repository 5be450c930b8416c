use std::time::Duration;

use anyhow::{Context, Result};
use scraper::{Html, Selector};

use crate::error::ScrapeError;

const USER_AGENT: &str = concat!("shl_scraper/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A fetched catalog page, reduced to what extraction needs.
#[derive(Debug, Clone)]
pub struct Page {
    /// First `<h1>` text, the assessment name. None when the page has no h1.
    pub title: Option<String>,
    /// Whitespace-normalized text content of the whole page body.
    pub text: String,
}

/// HTTP + HTML parsing collaborator. The pipeline only sees this trait so
/// tests can substitute canned pages and injected failures.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Page, ScrapeError>;
}

pub struct HttpFetcher {
    http: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build page fetch client")?;
        Ok(Self { http })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Page, ScrapeError> {
        let html = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(|e| ScrapeError::Fetch(format!("{url}: {e}")))?;
        Ok(parse_page(&html))
    }
}

/// Reduce raw HTML to a [`Page`].
pub fn parse_page(html: &str) -> Page {
    let doc = Html::parse_document(html);

    let h1 = Selector::parse("h1").unwrap();
    let title = doc
        .select(&h1)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string());

    let body = Selector::parse("body").unwrap();
    let text = doc
        .select(&body)
        .flat_map(|n| n.text())
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    Page { title, text }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_first_h1() {
        let page = parse_page("<html><body><h1> Verify G+ </h1><h1>Second</h1></body></html>");
        assert_eq!(page.title.as_deref(), Some("Verify G+"));
    }

    #[test]
    fn no_h1_means_no_title() {
        let page = parse_page("<html><body><p>Plain page</p></body></html>");
        assert!(page.title.is_none());
    }

    #[test]
    fn body_text_is_whitespace_normalized() {
        let page = parse_page(
            "<html><body><h1>Name</h1>\n  <p>Duration:   30\nminutes.</p><div>Remote   enabled</div></body></html>",
        );
        assert_eq!(page.text, "Name Duration: 30 minutes. Remote enabled");
    }

    #[test]
    fn nested_markup_inside_h1() {
        let page = parse_page("<h1>Verify <em>Interactive</em></h1>");
        assert_eq!(page.title.as_deref(), Some("Verify Interactive"));
    }

    #[test]
    fn full_product_document() {
        let html = r#"<!DOCTYPE html>
            <html><head><title>Verify Numerical Ability | SHL</title></head>
            <body>
              <main>
                <h1>Verify Numerical Ability</h1>
                <div class="product-details">
                  <p>Description: Measures the ability to analyse numerical data and draw
                    logical conclusions.</p>
                  <p>Assessment length: approximate completion time 18 minutes.</p>
                  <p>Remote testing: supported with online proctoring.</p>
                  <p>Test type: Ability &amp; Aptitude.</p>
                </div>
              </main>
            </body></html>"#;
        let page = parse_page(html);
        assert_eq!(page.title.as_deref(), Some("Verify Numerical Ability"));
        assert!(page.text.contains("draw logical conclusions"));
        assert!(page.text.contains("completion time 18 minutes"));
        assert!(page.text.contains("Test type: Ability & Aptitude."));
    }
}
