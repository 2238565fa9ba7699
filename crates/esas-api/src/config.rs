use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{WrapErr, eyre};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    S3 { bucket: String },
    /// In-process store. Data is lost on exit.
    Memory,
}

/// Process configuration, read once from `ESAS_*` environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub storage: StorageConfig,
    pub bind_addr: SocketAddr,
    pub storage_timeout: Duration,
    /// Guest submissions allowed per client IP per minute.
    pub rate_limit_per_minute: u32,
    pub recommendations_path: Option<PathBuf>,
    pub education_path: Option<PathBuf>,
    /// Subjects that receive the admin role when they register.
    pub admin_accounts: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source. Unset and empty
    /// variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let storage = match var("ESAS_STORAGE").as_deref().unwrap_or("s3") {
            "s3" => StorageConfig::S3 {
                bucket: var("ESAS_BUCKET").unwrap_or_else(|| "esas-screening".to_string()),
            },
            "memory" => StorageConfig::Memory,
            other => return Err(eyre!("ESAS_STORAGE must be `s3` or `memory`, got `{other}`")),
        };

        let bind_addr = var("ESAS_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .wrap_err("ESAS_BIND_ADDR is not a socket address")?;

        let storage_timeout_ms = match var("ESAS_STORAGE_TIMEOUT_MS") {
            Some(v) => v
                .parse::<u64>()
                .wrap_err("ESAS_STORAGE_TIMEOUT_MS is not a number")?,
            None => DEFAULT_STORAGE_TIMEOUT_MS,
        };
        if storage_timeout_ms == 0 {
            return Err(eyre!("ESAS_STORAGE_TIMEOUT_MS must be positive"));
        }

        let rate_limit_per_minute = match var("ESAS_RATE_LIMIT_PER_MINUTE") {
            Some(v) => v
                .parse::<u32>()
                .wrap_err("ESAS_RATE_LIMIT_PER_MINUTE is not a number")?,
            None => DEFAULT_RATE_LIMIT_PER_MINUTE,
        };

        let admin_accounts = var("ESAS_ADMIN_ACCOUNTS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            storage,
            bind_addr,
            storage_timeout: Duration::from_millis(storage_timeout_ms),
            rate_limit_per_minute,
            recommendations_path: var("ESAS_RECOMMENDATIONS_PATH").map(PathBuf::from),
            education_path: var("ESAS_EDUCATION_PATH").map(PathBuf::from),
            admin_accounts,
        })
    }
}
