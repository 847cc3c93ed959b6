//! Connection configuration
//!
//! Loaded once at startup from the environment (and an optional `.env` file).
//! The password lives in a [`Credential`] so it never shows up in `Debug`
//! output or log lines.

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REQUIRED_VARS: [&str; 4] = ["ODOO_URL", "ODOO_DB", "ODOO_USER", "ODOO_PASSWORD"];

/// Secret string with a redacted `Debug`/`Display`
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw value, only for building the wire request
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Odoo endpoint configuration
#[derive(Debug, Clone)]
pub struct OdooConfig {
    /// Base URL without trailing slash, e.g. `https://erp.example.com`
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: Credential,
    /// Bound applied to every network call
    pub timeout: Duration,
}

impl OdooConfig {
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            database: database.into(),
            username: username.into(),
            password: Credential::new(password),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| value(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        let timeout_secs = match value("ODOO_TIMEOUT") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("ODOO_TIMEOUT must be a number of seconds, got '{}'", raw))?;
                if secs == 0 {
                    return Err(anyhow!("ODOO_TIMEOUT must be greater than zero"));
                }
                secs
            }
            None => DEFAULT_TIMEOUT_SECS,
        };

        let url = value("ODOO_URL").unwrap_or_default();
        url::Url::parse(url.trim()).with_context(|| format!("ODOO_URL is not a valid URL: {}", mask_url(&url)))?;

        Ok(Self::new(
            url.trim(),
            value("ODOO_DB").unwrap_or_default(),
            value("ODOO_USER").unwrap_or_default(),
            value("ODOO_PASSWORD").unwrap_or_default(),
        )
        .with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn common_endpoint(&self) -> String {
        format!("{}/xmlrpc/2/common", self.url)
    }

    pub fn object_endpoint(&self) -> String {
        format!("{}/xmlrpc/2/object", self.url)
    }

    /// Endpoint suitable for messages and logs
    pub fn display_url(&self) -> String {
        mask_url(&self.url)
    }
}

/// Mask any password embedded in a URL
pub fn mask_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut masked = parsed.clone();
        if parsed.password().is_some() {
            let _ = masked.set_password(Some("***"));
        }
        masked.as_str().trim_end_matches('/').to_string()
    } else if url.len() > 20 {
        let head: String = url.chars().take(10).collect();
        format!("{}***", head)
    } else {
        "***".to_string()
    }
}
