use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::data::codec::CodecOptions;

/// Environment variable pointing at an optional JSON config file.
pub const CONFIG_ENV: &str = "DATA_SWEEPER_CONFIG";

/// User-tunable settings. Every key is optional in the JSON file.
///
/// ```json
/// { "preview_rows": 10, "chart_columns": 3, "csv_delimiter": ";" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    /// Rows shown in each file's preview grid.
    pub preview_rows: usize,
    /// Numeric columns drawn in the bar chart.
    pub chart_columns: usize,
    pub csv_delimiter: char,
    /// Sheet name used when exporting to Excel.
    pub sheet_name: String,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            chart_columns: 2,
            csv_delimiter: ',',
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl SweeperConfig {
    /// Load from `$DATA_SWEEPER_CONFIG` if set, defaults otherwise.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: SweeperConfig = serde_json::from_str(text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.csv_delimiter.is_ascii() {
            bail!("csv_delimiter must be an ASCII character, got {:?}", self.csv_delimiter);
        }
        if self.sheet_name.is_empty() {
            bail!("sheet_name must not be empty");
        }
        Ok(())
    }

    pub fn codec_options(&self) -> CodecOptions {
        CodecOptions {
            delimiter: self.csv_delimiter as u8,
            sheet_name: self.sheet_name.clone(),
        }
    }
}
