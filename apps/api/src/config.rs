use anyhow::{bail, Context, Result};

use crate::matching::engine::MatchEngine;
use crate::matching::highlight::{HighlightMode, Highlighter};
use crate::matching::normalizer::Normalizer;
use crate::matching::stopwords::StopWords;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_QUALIFIED_THRESHOLD: f64 = 70.0;

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    /// Score at or above which a candidate counts as qualified for an invitation.
    pub qualified_threshold: f64,
    /// Appended to the normalizer stopword list.
    pub extra_stopwords: Vec<String>,
    pub highlight_mode: HighlightMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            qualified_threshold: DEFAULT_QUALIFIED_THRESHOLD,
            extra_stopwords: Vec::new(),
            highlight_mode: HighlightMode::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let port = match lookup("PORT") {
            Some(v) => v
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => defaults.port,
        };
        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            None => defaults.max_upload_bytes,
        };
        let qualified_threshold = match lookup("QUALIFIED_THRESHOLD") {
            Some(v) => v
                .parse::<f64>()
                .context("QUALIFIED_THRESHOLD must be a number")?,
            None => defaults.qualified_threshold,
        };
        if !(0.0..=100.0).contains(&qualified_threshold) {
            bail!("QUALIFIED_THRESHOLD must be between 0 and 100, got {qualified_threshold}");
        }
        let highlight_mode = match lookup("HIGHLIGHT_MODE") {
            Some(v) => v
                .parse::<HighlightMode>()
                .map_err(anyhow::Error::msg)
                .context("HIGHLIGHT_MODE is invalid")?,
            None => defaults.highlight_mode,
        };
        let extra_stopwords = lookup("EXTRA_STOPWORDS")
            .map(|v| {
                v.split(',')
                    .map(|w| w.trim().to_lowercase())
                    .filter(|w| !w.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            port,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes,
            qualified_threshold,
            extra_stopwords,
            highlight_mode,
        })
    }

    /// Builds the engine this configuration describes.
    pub fn match_engine(&self) -> MatchEngine {
        let stopwords = StopWords::normalizer_english().with_extra(&self.extra_stopwords);
        MatchEngine::new(
            Normalizer::new(stopwords),
            Highlighter::new(self.highlight_mode, true),
        )
    }
}
