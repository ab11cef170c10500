use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Rows streamed per batch during a scan. Progress is published and the
    /// cancel flag checked at batch boundaries.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: u64,

    /// Fraction of a column's sampled non-null text values that must match a
    /// format pattern before the column earns that format tag.
    #[serde(default = "default_format_threshold")]
    pub format_threshold: f64,

    /// Where analysis results are persisted. Relative paths resolve against
    /// the working directory.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
}

fn default_scan_batch_size() -> u64 {
    512
}

fn default_format_threshold() -> f64 {
    0.5
}

fn default_catalog_path() -> String {
    "dbscope_catalog.db".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_batch_size: default_scan_batch_size(),
            format_threshold: default_format_threshold(),
            catalog_path: default_catalog_path(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
