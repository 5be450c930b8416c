use thiserror::Error;

/// Failure taxonomy for the scrape run. None of these abort the run:
/// discovery errors degrade to an empty link set, per-link errors skip the
/// link, and persist errors leave the entry in memory only.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("catalog discovery failed: {0}")]
    Discovery(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("cache persist failed: {0}")]
    CachePersist(String),
}
