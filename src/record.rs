use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel for attributes the page did not yield.
pub const NOT_AVAILABLE: &str = "N/A";

/// Yes/no attribute, serialized as the literal strings "Yes"/"No" in both
/// the cache snapshot and the CSV export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl Default for YesNo {
    fn default() -> Self {
        YesNo::No
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YesNo::Yes => f.write_str("Yes"),
            YesNo::No => f.write_str("No"),
        }
    }
}

/// One harvested catalog entry. Every field is always populated: strings
/// fall back to "N/A" and the flags default to No, so a record never has
/// holes regardless of what the page contained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub name: String,
    pub url: String,
    pub duration: String,
    pub remote: YesNo,
    pub adaptive: YesNo,
    pub test_type: String,
}
