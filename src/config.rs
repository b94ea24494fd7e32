//! Runtime configuration: command-line values merged with an optional TOML file.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::plotting::{is_valid_chart_size, MAX_CHART_SIZE, MIN_CHART_SIZE};
use crate::types::{ContentTypeFilter, DEFAULT_TOP_K};

const CONFIG_DIR_NAME: &str = "catalogstats";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Values that can come from a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<String>,
    pub top_k: Option<usize>,
    pub chart_width: Option<u32>,
    pub chart_height: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// `<config_dir>/catalogstats/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}

/// Command-line values taking part in config resolution.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub source: Option<String>,
    pub top_k: usize,
    pub content_type: ContentTypeFilter,
    pub min_year: Option<i32>,
    pub chart_width: u32,
    pub chart_height: u32,
    pub headless: bool,
    pub export_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            source: None,
            top_k: DEFAULT_TOP_K,
            content_type: ContentTypeFilter::All,
            min_year: None,
            chart_width: 640,
            chart_height: 360,
            headless: false,
            export_dir: None,
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source: Option<String>,
    pub top_k: usize,
    pub content_type: ContentTypeFilter,
    pub min_year: Option<i32>,
    pub chart_size: (u32, u32),
    pub headless: bool,
    pub export_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let config = AppConfig {
            source: file.source.or_else(|| cli.source.clone()),
            top_k: file.top_k.unwrap_or(cli.top_k),
            content_type: cli.content_type,
            min_year: cli.min_year,
            chart_size: (
                file.chart_width.unwrap_or(cli.chart_width),
                file.chart_height.unwrap_or(cli.chart_height),
            ),
            headless: cli.headless,
            export_dir: cli.export_dir.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            bail!("top_k must be at least 1");
        }
        let (width, height) = self.chart_size;
        if !is_valid_chart_size(self.chart_size) {
            bail!(
                "chart size {}x{} is invalid, both sides must be between {} and {} px",
                width,
                height,
                MIN_CHART_SIZE,
                MAX_CHART_SIZE
            );
        }
        if self.headless && self.source.is_none() {
            bail!("headless mode needs a CSV source");
        }
        if self.export_dir.is_some() && !self.headless {
            bail!("--export-dir is only used together with --headless");
        }
        Ok(())
    }
}
