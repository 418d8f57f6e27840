//! Process configuration, resolved once at startup and passed explicitly.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const SQUARE_PRODUCTION_URL: &str = "https://connect.squareup.com";
pub const SQUARE_SANDBOX_URL: &str = "https://connect.squareupsandbox.com";
pub const DEFAULT_SQUARE_API_VERSION: &str = "2024-06-04";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SquareEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl SquareEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            SquareEnvironment::Sandbox => SQUARE_SANDBOX_URL,
            SquareEnvironment::Production => SQUARE_PRODUCTION_URL,
        }
    }
}

/// Square API connection settings.
#[derive(Debug, Clone)]
pub struct SquareConfig {
    /// Only required by commands that talk to Square.
    pub access_token: Option<String>,
    pub environment: SquareEnvironment,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl SquareConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            environment: SquareEnvironment::Sandbox,
            base_url: SQUARE_SANDBOX_URL.to_string(),
            api_version: DEFAULT_SQUARE_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .ok_or(ConfigError::Missing("SQUARE_ACCESS_TOKEN"))
    }
}

/// Site-wide settings shared by the web layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteConfig {
    pub name: String,
    pub url: String,
    pub sign_in_path: String,
    pub onboarding_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Rec League".to_string(),
            url: "http://localhost:3000".to_string(),
            sign_in_path: "/sign-in".to_string(),
            onboarding_path: "/onboarding".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub square: SquareConfig,
    pub site: SiteConfig,
}

impl SquareConfig {
    /// Load Square settings from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("SQUARE_ENVIRONMENT").as_deref() {
            None | Some("sandbox") => SquareEnvironment::Sandbox,
            Some("production") => SquareEnvironment::Production,
            Some(_) => return Err(ConfigError::Invalid("SQUARE_ENVIRONMENT")),
        };

        let base_url = lookup("SQUARE_BASE_URL")
            .unwrap_or_else(|| environment.base_url().to_string());

        let api_version = lookup("SQUARE_API_VERSION")
            .unwrap_or_else(|| DEFAULT_SQUARE_API_VERSION.to_string());

        let timeout_secs: u64 = lookup("SQUARE_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("SQUARE_TIMEOUT_SECS"))?;

        Ok(Self {
            access_token: lookup("SQUARE_ACCESS_TOKEN").filter(|token| !token.is_empty()),
            environment,
            base_url,
            api_version,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SiteConfig {
    /// Load site settings from environment variables. Never fails.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            name: lookup("SITE_NAME").unwrap_or(defaults.name),
            url: lookup("SITE_URL").unwrap_or(defaults.url),
            sign_in_path: lookup("SITE_SIGN_IN_PATH").unwrap_or(defaults.sign_in_path),
            onboarding_path: lookup("SITE_ONBOARDING_PATH").unwrap_or(defaults.onboarding_path),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            square: SquareConfig::from_lookup(&lookup)?,
            site: SiteConfig::from_lookup(&lookup),
        })
    }
}
