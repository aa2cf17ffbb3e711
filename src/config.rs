//! Centralized configuration management for libadmin

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the master-data API
    pub api_url: String,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Path of the log file
    pub log_file: PathBuf,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Accept self-signed TLS certificates. Development backends serve
    /// https on localhost with certificates reqwest would refuse.
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "libadmin/0.1.0".to_string(),
            accept_invalid_certs: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("LIBADMIN_API_URL")
            .unwrap_or_else(|_| "https://localhost:7270".to_string());

        let log_file = std::env::var("LIBADMIN_LOG_FILE")
            .unwrap_or_else(|_| "./libadmin.log".to_string())
            .into();

        let http = HttpConfig {
            timeout_seconds: parse_env_var("LIBADMIN_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("LIBADMIN_USER_AGENT")
                .unwrap_or_else(|_| "libadmin/0.1.0".to_string()),
            accept_invalid_certs: parse_env_var("LIBADMIN_ACCEPT_INVALID_CERTS")?.unwrap_or(true),
        };

        Ok(Config {
            api_url,
            http,
            log_file,
        })
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API URL: {}", self.api_url))?;

        if let Some(parent) = self.log_file.parent() {
            // "" means the current directory
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Log file directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}
