use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::api::RelaySettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub indexer_url: Url,
    pub http_bind_addr: String,
    pub upstream_timeout_ms: u64,
    pub enrichment_concurrency: usize,
    pub gas_sample_size: u64,
    pub default_gas_price_wei: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing INDEXER_GRAPHQL_URL env var")]
    MissingIndexerUrl,
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url =
            env::var("INDEXER_GRAPHQL_URL").map_err(|_| ConfigError::MissingIndexerUrl)?;
        let indexer_url = Url::parse(raw_url.trim()).map_err(|_| ConfigError::Invalid {
            name: "INDEXER_GRAPHQL_URL",
            value: raw_url.clone(),
        })?;

        let http_bind_addr = env::var("HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let upstream_timeout_ms = env_or("UPSTREAM_TIMEOUT_MS", 10_000)?;
        let enrichment_concurrency = env_or::<usize>("ENRICHMENT_CONCURRENCY", 8)?.max(1);
        let gas_sample_size = env_or::<u64>("GAS_SAMPLE_SIZE", 100)?.max(1);
        let default_gas_price_wei = env_or("DEFAULT_GAS_PRICE_WEI", 1_000_000_000)?;

        Ok(Self {
            indexer_url,
            http_bind_addr,
            upstream_timeout_ms,
            enrichment_concurrency,
            gas_sample_size,
            default_gas_price_wei,
        })
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            enrichment_concurrency: self.enrichment_concurrency,
            gas_sample_size: self.gas_sample_size,
            default_gas_price_wei: self.default_gas_price_wei,
        }
    }
}

fn env_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_setting(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_setting<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_settings_reject_garbage() {
        assert_eq!(parse_setting::<u64>("GAS_SAMPLE_SIZE", " 50 ").unwrap(), 50);
        let err = parse_setting::<u64>("GAS_SAMPLE_SIZE", "lots").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "GAS_SAMPLE_SIZE", .. }));
    }
}
