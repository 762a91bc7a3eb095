//! Environment configuration.

use std::path::PathBuf;

use timeclock_assistant::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ENVIRONMENT: &str = "development";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Environment name (`development`, `production`, ...).
    pub environment: String,
    /// Accepted for compatibility; storage is always in-memory.
    pub database_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Built front-end to serve next to the API.
    pub static_dir: Option<PathBuf>,
}

/// Outcome of [`Config::validate`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub warnings: Vec<String>,
}

impl ConfigReport {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; empty values count as unset.
    ///
    /// # Errors
    /// Returns error if a variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment: get("APP_ENV")
                .or_else(|| get("NODE_ENV"))
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            database_url: get("DATABASE_URL"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
        })
    }

    /// Check for degraded functionality. Never fails.
    #[must_use]
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();

        if self.database_url.is_none() {
            report
                .warnings
                .push("DATABASE_URL not provided. Using in-memory storage.".to_string());
        }
        if self.openai_api_key.is_none() {
            report
                .warnings
                .push("OPENAI_API_KEY not provided. Chat functionality will be limited.".to_string());
        }
        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                report.warnings.push(format!(
                    "STATIC_DIR {} is not a directory. Static files will not be served.",
                    dir.display()
                ));
            }
        }

        report
    }

    /// Address to bind, as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The static directory, if it exists.
    #[must_use]
    pub fn served_static_dir(&self) -> Option<&PathBuf> {
        self.static_dir.as_ref().filter(|dir| dir.is_dir())
    }
}
