use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ScrapeError;

/// Local inference server hosting the zero-shot NLI model. The first
/// request makes the server load the model weights, so the warmup call in
/// [`InferenceClient::connect`] doubles as the readiness check.
const INFERENCE_ENDPOINT: &str = "http://127.0.0.1:8090/models/facebook/bart-large-mnli";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Scores how well a hypothesis built from `label` matches `text`, in
/// `[0, 1]`. The production implementation talks to an inference server;
/// tests substitute deterministic stubs.
pub trait ZeroShotClassifier {
    fn score(&self, text: &str, hypothesis: &str, label: &str) -> Result<f32, ScrapeError>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    parameters: ClassifyParams<'a>,
}

#[derive(Serialize)]
struct ClassifyParams<'a> {
    candidate_labels: Vec<&'a str>,
    hypothesis_template: &'a str,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    scores: Vec<f32>,
}

/// Blocking client for the zero-shot classification endpoint.
pub struct InferenceClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl InferenceClient {
    /// Connect to the default local endpoint and warm the model up.
    /// Failure here is fatal for the run: nothing can be extracted without
    /// the oracle.
    pub fn connect() -> Result<Self> {
        Self::connect_to(INFERENCE_ENDPOINT)
    }

    pub fn connect_to(endpoint: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build classifier HTTP client")?;
        let client = Self {
            http,
            endpoint: endpoint.to_string(),
        };
        client
            .score("ready", "This text contains information about warmup.", "warmup")
            .with_context(|| format!("zero-shot model failed to initialize at {endpoint}"))?;
        info!("Zero-shot classifier ready at {}", endpoint);
        Ok(client)
    }
}

impl ZeroShotClassifier for InferenceClient {
    fn score(&self, text: &str, hypothesis: &str, label: &str) -> Result<f32, ScrapeError> {
        let request = ClassifyRequest {
            inputs: text,
            parameters: ClassifyParams {
                candidate_labels: vec![label],
                hypothesis_template: hypothesis,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| ScrapeError::Extraction(format!("classifier request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Extraction(format!(
                "classifier returned {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| ScrapeError::Extraction(format!("classifier response unreadable: {e}")))?;
        parse_score(&body)
    }
}

/// Pull the single candidate's score out of a zero-shot response body.
fn parse_score(body: &str) -> Result<f32, ScrapeError> {
    let parsed: ClassifyResponse = serde_json::from_str(body)
        .map_err(|e| ScrapeError::Extraction(format!("malformed classifier response: {e}")))?;
    parsed
        .scores
        .first()
        .copied()
        .ok_or_else(|| ScrapeError::Extraction("classifier response had no scores".to_string()))
}
