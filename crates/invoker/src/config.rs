//! Environment configuration of the `pricewatch-invoker` binary.

use std::time::Duration;

use pricewatch_core::naming::CATALOG_OBJECT;
use pricewatch_crawler::config::{
    parse_flag, parse_var, ConfigError, StorageConfig, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_REGION,
};
use pricewatch_crawler::LogSettings;

use crate::lambda::DEFAULT_FUNCTION_NAME;
use crate::orchestrator::{DispatchSettings, DEFAULT_MAX_CONCURRENCY};

/// Default store holding the catalog.
pub const DEFAULT_BUCKET: &str = "aws-lambda-price-grabber";

/// Default transport time budget in seconds.
pub const DEFAULT_TRANSPORT_TIMEOUT_SECS: u64 = 60;

/// How jobs reach the crawler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    /// Synchronous Lambda invocation of `function_name`.
    Lambda { region: String, function_name: String },
    /// In-process crawl, for local runs and tests.
    Local,
}

/// Full invoker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerConfig {
    pub storage: StorageConfig,
    /// Store the catalog is loaded from when no event names one.
    pub bucket: String,
    pub transport: TransportKind,
    pub dispatch: DispatchSettings,
    /// Only used by the local transport.
    pub fetch_timeout: Duration,
    /// Only used by the local transport.
    pub log: LogSettings,
}

impl InvokerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// | Env Var                             | Default                    |
    /// |-------------------------------------|----------------------------|
    /// | `PRICEWATCH_BUCKET`                 | `aws-lambda-price-grabber` |
    /// | `PRICEWATCH_TRANSPORT`              | `lambda`                   |
    /// | `PRICEWATCH_FUNCTION`               | `grab-price`               |
    /// | `PRICEWATCH_MAX_CONCURRENCY`        | `4`                        |
    /// | `PRICEWATCH_TRANSPORT_TIMEOUT_SECS` | `60`                       |
    /// | `PRICEWATCH_FETCH_TIMEOUT_SECS`     | `15`                       |
    /// | `PRICEWATCH_LOG_ENABLED`            | `true`                     |
    ///
    /// plus the [`StorageConfig`] variables.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let kind = lookup("PRICEWATCH_TRANSPORT").unwrap_or_else(|| "lambda".into());
        let transport = match kind.trim() {
            "lambda" => TransportKind::Lambda {
                region: lookup("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
                function_name: lookup("PRICEWATCH_FUNCTION")
                    .unwrap_or_else(|| DEFAULT_FUNCTION_NAME.into()),
            },
            "local" => TransportKind::Local,
            _ => {
                return Err(ConfigError {
                    var: "PRICEWATCH_TRANSPORT".into(),
                    value: kind.clone(),
                    reason: "must be 'lambda' or 'local'".into(),
                })
            }
        };

        let max_concurrency: usize =
            parse_var(lookup, "PRICEWATCH_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
        if max_concurrency == 0 {
            return Err(ConfigError {
                var: "PRICEWATCH_MAX_CONCURRENCY".into(),
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            storage: StorageConfig::from_lookup(lookup)?,
            bucket: lookup("PRICEWATCH_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.into()),
            transport,
            dispatch: DispatchSettings {
                max_concurrency,
                transport_timeout: Duration::from_secs(parse_var(
                    lookup,
                    "PRICEWATCH_TRANSPORT_TIMEOUT_SECS",
                    DEFAULT_TRANSPORT_TIMEOUT_SECS,
                )?),
                catalog_object: CATALOG_OBJECT.to_string(),
            },
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
