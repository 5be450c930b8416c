use std::path::PathBuf;
use std::time::Duration;

/// Run configuration. There are no flags or environment overrides; these
/// are build-time constants surfaced as a struct so the pipeline and its
/// tests can be handed explicit values.
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog entry point, source of the link set.
    pub catalog_url: String,
    /// CSV export destination, overwritten every run.
    pub output_path: PathBuf,
    /// JSON cache snapshot, rewritten after every successful extraction.
    pub cache_path: PathBuf,
    /// Minimum oracle score (strict >) for a feature to count as detected.
    pub confidence_threshold: f32,
    /// Pause after each request to the origin server.
    pub request_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: "https://www.shl.com/solutions/products/product-catalog/".to_string(),
            output_path: PathBuf::from("shl_assessments.csv"),
            cache_path: PathBuf::from("assessment_cache.json"),
            confidence_threshold: 0.7,
            request_delay: Duration::from_secs(2),
        }
    }
}
