use std::collections::HashSet;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use super::ConfigError;

const MAX_ENVELOPE_BYTES_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrizuruConfig {
    pub version: u32,

    #[serde(default)]
    pub logging: LoggingSection,

    #[serde(default)]
    pub limits: LimitsSection,

    #[serde(default)]
    pub queues: Vec<QueueBinding>,
}

impl OrizuruConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.queues.is_empty() {
            return Err(ConfigError::Invalid("queues must not be empty".into()));
        }

        self.logging.validate()?;
        check_envelope_limit("limits.max_envelope_bytes", self.limits.max_envelope_bytes)?;

        let mut seen = HashSet::new();
        for q in &self.queues {
            q.validate()?;
            if !seen.insert(q.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate queue `{}`", q.name)));
            }
        }
        Ok(())
    }

    pub fn queue(&self, name: &str) -> Option<&QueueBinding> {
        self.queues.iter().find(|q| q.name == name)
    }

    /// Envelope size limit for `binding`, falling back to the global limit.
    pub fn max_envelope_bytes(&self, binding: &QueueBinding) -> usize {
        binding
            .max_envelope_bytes
            .unwrap_or(self.limits.max_envelope_bytes)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// `EnvFilter` directive, e.g. `info` or `orizuru_runtime=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl LoggingSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.filter)
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(format!("logging.filter: {e}")))
    }
}

fn default_filter() -> String {
    "info".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsSection {
    #[serde(default = "default_max_envelope_bytes")]
    pub max_envelope_bytes: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_envelope_bytes: default_max_envelope_bytes(),
        }
    }
}

fn default_max_envelope_bytes() -> usize {
    1024 * 1024
}

/// A consumed queue and where its output goes.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueBinding {
    pub name: String,

    /// Destination queue; a binding without one is a terminal consumer.
    #[serde(default)]
    pub publish_to: Option<String>,

    #[serde(default)]
    pub max_envelope_bytes: Option<usize>,
}

impl QueueBinding {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("queue name must not be empty".into()));
        }
        if let Some(target) = &self.publish_to {
            if target.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "queues[{}].publish_to must not be empty",
                    self.name
                )));
            }
            if *target == self.name {
                return Err(ConfigError::Invalid(format!(
                    "queues[{}].publish_to must differ from the consumed queue",
                    self.name
                )));
            }
        }
        if let Some(max) = self.max_envelope_bytes {
            check_envelope_limit(&format!("queues[{}].max_envelope_bytes", self.name), max)?;
        }
        Ok(())
    }
}

fn check_envelope_limit(field: &str, v: usize) -> Result<(), ConfigError> {
    if !(1..=MAX_ENVELOPE_BYTES_LIMIT).contains(&v) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between 1 and {MAX_ENVELOPE_BYTES_LIMIT}"
        )));
    }
    Ok(())
}
