use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::present::TITLE_WIDTH;
use crate::rank::FilterCriteria;

const DEFAULT_CONFIG_FILE: &str = "hn_digest.toml";
const ENV_PREFIX: &str = "HN_DIGEST";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Sheet export to read (.csv, .tsv or .json).
    pub input: PathBuf,
    pub min_comments: u64,
    pub min_score: u64,
    pub title_width: usize,
    pub open_delay_ms: u64,
    /// Command used to open links, e.g. "xdg-open". Unset prints them instead.
    pub opener: Option<String>,
}

impl Settings {
    /// Defaults, then `hn_digest.toml` (or `path`), then `HN_DIGEST_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::build(file, Environment::with_prefix(ENV_PREFIX))
    }

    fn build<S>(file: S, env: Environment) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = FilterCriteria::default();
        Config::builder()
            .set_default("input", "ycombinator.csv")?
            .set_default("min_comments", defaults.min_comments)?
            .set_default("min_score", defaults.min_score)?
            .set_default("title_width", TITLE_WIDTH as u64)?
            .set_default("open_delay_ms", 250u64)?
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_comments: self.min_comments,
            min_score: self.min_score,
        }
    }

    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }
}
