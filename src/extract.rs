use std::sync::LazyLock;

use regex::Regex;

use crate::classify::ZeroShotClassifier;
use crate::error::ScrapeError;
use crate::record::{YesNo, NOT_AVAILABLE};

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(minutes?|hours?|mins?|hrs?)").unwrap());
static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"type:?\s*([^.,]+)").unwrap());

/// The four semantic attributes harvested from a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    Duration,
    Remote,
    Adaptive,
    TestType,
}

/// Evaluation order is fixed; extraction walks this array top to bottom.
const FEATURES: [Feature; 4] = [
    Feature::Duration,
    Feature::Remote,
    Feature::Adaptive,
    Feature::TestType,
];

impl Feature {
    /// Candidate query templates, tried in order. Each one becomes a
    /// zero-shot hypothesis of the form
    /// "This text contains information about {template}."
    fn templates(self) -> &'static [&'static str] {
        match self {
            Feature::Duration => &["duration", "time", "length", "minutes", "hours"],
            Feature::Remote => &["remote", "online", "virtual", "web-based"],
            Feature::Adaptive => &["adaptive", "irt", "item response theory", "dynamic"],
            Feature::TestType => &["type", "category", "format", "style"],
        }
    }

    /// Value refinement once a template scored above the threshold.
    /// Duration and test type only change on a pattern match; the yes/no
    /// flags record bare presence.
    fn apply(self, values: &mut Features, lower_text: &str) {
        match self {
            Feature::Duration => {
                if let Some(caps) = DURATION_RE.captures(lower_text) {
                    values.duration = format!("{} {}", &caps[1], &caps[2]);
                }
            }
            Feature::Remote => values.remote = YesNo::Yes,
            Feature::Adaptive => values.adaptive = YesNo::Yes,
            Feature::TestType => {
                if let Some(caps) = TYPE_RE.captures(lower_text) {
                    values.test_type = caps[1].trim().to_string();
                }
            }
        }
    }
}

/// Extracted attribute set for one page. Starts at the sentinels and is
/// only ever narrowed by detections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    pub duration: String,
    pub remote: YesNo,
    pub adaptive: YesNo,
    pub test_type: String,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            duration: NOT_AVAILABLE.to_string(),
            remote: YesNo::No,
            adaptive: YesNo::No,
            test_type: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Turns raw page text into typed attributes by scoring every
/// (feature, template) pair against the injected zero-shot oracle.
pub struct FeatureExtractor<C> {
    classifier: C,
    threshold: f32,
}

impl<C: ZeroShotClassifier> FeatureExtractor<C> {
    pub fn new(classifier: C, threshold: f32) -> Self {
        Self {
            classifier,
            threshold,
        }
    }

    /// Score all 17 (feature, template) pairs. A template is detected only
    /// on a strictly greater score. Every template is evaluated even after
    /// an earlier hit for the same feature; a later hit re-runs refinement
    /// and overwrites the value.
    pub fn extract(&self, text: &str) -> Result<Features, ScrapeError> {
        let lower = text.to_lowercase();
        let mut values = Features::default();

        for feature in FEATURES {
            for template in feature.templates() {
                let hypothesis = format!("This text contains information about {template}.");
                let score = self.classifier.score(text, &hypothesis, template)?;
                if score > self.threshold {
                    feature.apply(&mut values, &lower);
                }
            }
        }

        Ok(values)
    }
}
