//! Process configuration from environment variables
//!
//! - `STORE_BACKEND`: `s3` (default) or `memory`.
//! - `BUCKET_NAME`: bucket to expose; required for `s3`.
//! - `AWS_REGION`: default `us-east-1`.
//! - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: static credentials. When
//!   either is missing the default AWS provider chain is used.
//! - `S3_ENDPOINT`: custom endpoint for S3-compatible services.
//! - `S3_FORCE_PATH_STYLE`: path-style addressing, default `false`.
//! - `BIND_ADDR`: listen address, default `0.0.0.0:8080`.
//! - `PAGINATION_PAGE_SIZE`: default page size of `/list`, default 10.
//! - `LINK_TTL_SECS`: presigned URL lifetime, default 900.
//! - `LINK_CACHE_MAX_ENTRIES`: link cache capacity, default 10000.
//! - `LINK_CACHE_SWEEP_SECS`: expired-entry sweep period, default 60.
//! - `MAX_UPLOAD_BYTES`: request body limit, default 100 MiB.

use crate::store::S3StoreConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_PAGE_SIZE: i32 = 10;
const DEFAULT_LINK_TTL_SECS: u64 = 15 * 60;
const DEFAULT_LINK_CACHE_MAX_ENTRIES: usize = 10_000;
const DEFAULT_LINK_CACHE_SWEEP_SECS: u64 = 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024; // 100 MiB

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    S3,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(StoreBackend::S3),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StoreBackend,
    pub bucket: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub bind_addr: SocketAddr,
    pub page_size: i32,
    pub link_ttl: Duration,
    pub link_cache_max_entries: usize,
    pub link_cache_sweep_interval: Duration,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = parse_or(&get, "STORE_BACKEND", StoreBackend::S3)?;
        let bucket = match (get("BUCKET_NAME"), backend) {
            (Some(bucket), _) => bucket,
            (None, StoreBackend::Memory) => "local".to_string(),
            (None, StoreBackend::S3) => return Err(ConfigError::Missing("BUCKET_NAME")),
        };

        let page_size: i32 = parse_or(&get, "PAGINATION_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size < 1 {
            return Err(invalid("PAGINATION_PAGE_SIZE", page_size));
        }
        let link_ttl_secs: u64 = parse_or(&get, "LINK_TTL_SECS", DEFAULT_LINK_TTL_SECS)?;
        if link_ttl_secs == 0 {
            return Err(invalid("LINK_TTL_SECS", link_ttl_secs));
        }
        let sweep_secs: u64 =
            parse_or(&get, "LINK_CACHE_SWEEP_SECS", DEFAULT_LINK_CACHE_SWEEP_SECS)?;
        if sweep_secs == 0 {
            return Err(invalid("LINK_CACHE_SWEEP_SECS", sweep_secs));
        }

        Ok(AppConfig {
            backend,
            bucket,
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id: get("AWS_ACCESS_KEY_ID"),
            secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            endpoint_url: get("S3_ENDPOINT"),
            force_path_style: parse_bool_or(&get, "S3_FORCE_PATH_STYLE", false)?,
            bind_addr: parse_or(&get, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            page_size,
            link_ttl: Duration::from_secs(link_ttl_secs),
            link_cache_max_entries: parse_or(
                &get,
                "LINK_CACHE_MAX_ENTRIES",
                DEFAULT_LINK_CACHE_MAX_ENTRIES,
            )?,
            link_cache_sweep_interval: Duration::from_secs(sweep_secs),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    pub fn s3_config(&self) -> S3StoreConfig {
        S3StoreConfig {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
        }
    }
}

fn invalid(var: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, var: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

/// Accepts the usual spellings: `1`, `t`, `true`, `0`, `f`, `false`
/// (case-insensitive).
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn s3_backend_requires_bucket() {
        assert_eq!(
            config_from(&[]).unwrap_err(),
            ConfigError::Missing("BUCKET_NAME")
        );
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[("BUCKET_NAME", "files")]).unwrap();

        assert_eq!(config.backend, StoreBackend::S3);
        assert_eq!(config.bucket, "files");
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.link_ttl, Duration::from_secs(900));
        assert_eq!(config.link_cache_max_entries, 10_000);
        assert!(!config.force_path_style);
        assert!(config.access_key_id.is_none());
    }

    #[test]
    fn memory_backend_needs_no_bucket() {
        let config = config_from(&[("STORE_BACKEND", "Memory")]).unwrap();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.bucket, "local");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("BUCKET_NAME", "files"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_FORCE_PATH_STYLE", "TRUE"),
            ("PAGINATION_PAGE_SIZE", "50"),
            ("LINK_TTL_SECS", "60"),
            ("BIND_ADDR", "127.0.0.1:3000"),
        ])
        .unwrap();

        assert!(config.force_path_style);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.link_ttl, Duration::from_secs(60));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(
            config.s3_config().endpoint_url.as_deref(),
            Some("http://localhost:9000")
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        assert_eq!(
            config_from(&[("BUCKET_NAME", "files"), ("PAGINATION_PAGE_SIZE", "lots")]).unwrap_err(),
            ConfigError::Invalid {
                var: "PAGINATION_PAGE_SIZE",
                value: "lots".to_string()
            }
        );
        assert!(config_from(&[("BUCKET_NAME", "files"), ("LINK_TTL_SECS", "0")]).is_err());
        assert!(config_from(&[("STORE_BACKEND", "ftp")]).is_err());
    }
}
