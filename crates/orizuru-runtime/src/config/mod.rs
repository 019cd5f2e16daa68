//! Runtime config loader (strict parsing).

pub mod schema;

use std::fs;

use thiserror::Error;

pub use schema::{LimitsSection, LoggingSection, OrizuruConfig, QueueBinding};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_from_file(path: &str) -> Result<OrizuruConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<OrizuruConfig, ConfigError> {
    let cfg: OrizuruConfig = serde_yaml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}
