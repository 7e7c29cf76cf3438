//! Classifier policy configuration.
//!
//! The two content heuristics that depend on a tunable policy are exposed as
//! named constants and carried in [`ClassifierConfig`]:
//!
//! - [`DATETIME_PARSE_THRESHOLD`]: fraction of non-missing cells that must parse
//!   as a date/time before an `object` column is rejected as datetime-like.
//! - [`MEDIA_EXTENSIONS`]: filename suffixes that reject a column as image/video
//!   paths. A single matching cell is enough.
//!
//! # Example
//! ```
//! use tabguard::config::ClassifierConfig;
//!
//! let config = ClassifierConfig::new().with_datetime_threshold(0.95);
//! assert_eq!(config.datetime_threshold, 0.95);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Minimum parse fraction for string datetime detection.
pub const DATETIME_PARSE_THRESHOLD: f64 = 0.90;

/// Image and video filename extensions, lowercase with the leading dot.
pub const MEDIA_EXTENSIONS: [&str; 10] = [
    ".png", ".jpg", ".jpeg", ".bmp", ".gif", ".mp4", ".avi", ".mov", ".mkv", ".webm",
];

/// Policy knobs for column classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Parse fraction at or above which text columns count as datetime-like.
    pub datetime_threshold: f64,
    /// Lowercase suffixes marking media filepaths.
    #[serde(deserialize_with = "lowercase_extensions")]
    pub media_extensions: Vec<String>,
}

fn lowercase_extensions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let extensions = Vec::<String>::deserialize(deserializer)?;
    Ok(extensions.into_iter().map(|e| e.to_lowercase()).collect())
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            datetime_threshold: DATETIME_PARSE_THRESHOLD,
            media_extensions: MEDIA_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClassifierConfig {
    /// Create a configuration with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the datetime parse threshold.
    pub fn with_datetime_threshold(mut self, threshold: f64) -> Self {
        self.datetime_threshold = threshold;
        self
    }

    /// Replace the media extension list. Extensions are lowercased.
    pub fn with_media_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.media_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Load a configuration from a JSON file. Absent fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// True when `lowered` ends with one of the media extensions.
    pub(crate) fn is_media_path(&self, lowered: &str) -> bool {
        self.media_extensions
            .iter()
            .any(|ext| lowered.ends_with(ext.as_str()))
    }
}
