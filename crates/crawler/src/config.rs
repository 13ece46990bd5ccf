//! Environment configuration shared by the grabber and invoker binaries.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use pricewatch_storage::StoreProvider;

use crate::execution_log::LogSettings;

/// Default AWS region for S3 and Lambda clients.
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Default root directory of the local storage backend.
pub const DEFAULT_LOCAL_ROOT: &str = "./data";

/// Default page fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// A configuration variable holds a value that cannot be used.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value '{value}' for {var}: {reason}")]
pub struct ConfigError {
    pub var: String,
    pub value: String,
    pub reason: String,
}

/// Which physical store backs catalogs and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    S3 { region: String },
    Local { root: PathBuf },
}

/// Storage settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: BackendKind,
}

impl StorageConfig {
    /// | Env Var                 | Default        |
    /// |-------------------------|----------------|
    /// | `PRICEWATCH_BACKEND`    | `s3`           |
    /// | `AWS_REGION`            | `eu-central-1` |
    /// | `PRICEWATCH_LOCAL_ROOT` | `./data`       |
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let kind = lookup("PRICEWATCH_BACKEND").unwrap_or_else(|| "s3".into());
        let backend = match kind.trim() {
            "s3" => BackendKind::S3 {
                region: lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            },
            "local" => BackendKind::Local {
                root: lookup("PRICEWATCH_LOCAL_ROOT")
                    .unwrap_or_else(|| DEFAULT_LOCAL_ROOT.into())
                    .into(),
            },
            _ => {
                return Err(ConfigError {
                    var: "PRICEWATCH_BACKEND".into(),
                    value: kind.clone(),
                    reason: "must be 's3' or 'local'".into(),
                })
            }
        };
        Ok(Self { backend })
    }

    /// Build the store provider this configuration selects.
    pub async fn provider(&self) -> StoreProvider {
        match &self.backend {
            BackendKind::S3 { region } => StoreProvider::s3(region).await,
            BackendKind::Local { root } => StoreProvider::local(root.clone()),
        }
    }
}

/// Configuration of the `pricewatch-grabber` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabberConfig {
    pub storage: StorageConfig,
    pub fetch_timeout: Duration,
    pub log: LogSettings,
}

impl GrabberConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `PRICEWATCH_FETCH_TIMEOUT_SECS` | `15`    |
    /// | `PRICEWATCH_LOG_ENABLED`        | `true`  |
    ///
    /// plus the [`StorageConfig`] variables.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            storage: StorageConfig::from_lookup(lookup)?,
            fetch_timeout: Duration::from_secs(parse_var(
                lookup,
                "PRICEWATCH_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            log: LogSettings {
                enabled: parse_flag(lookup, "PRICEWATCH_LOG_ENABLED", true)?,
            },
        })
    }
}

/// Parse an optional variable with `FromStr`, falling back to `default`.
pub fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError {
                var: var.to_string(),
                reason: e.to_string(),
                value,
            })
        }
    }
}

/// Parse an optional boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
pub fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            var: var.to_string(),
            value,
            reason: "expected a boolean".into(),
        }),
    }
}
