//! Startup configuration read from the process environment.
//!
//! Values come from the environment first and then from an optional
//! dotenv file, so an exported variable always wins over `.env`.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

use crate::consts::{
    DEFAULT_DEPLOYMENT_NAME, DEFAULT_PROJECT_NAME, ENV_DEPLOYMENT_NAME, ENV_ENDPOINT, ENV_KEY,
    ENV_PROJECT_NAME,
};

/// Dotenv file picked up from the working directory when none is given.
const DEFAULT_ENV_FILE: &str = ".env";

/// Fatal startup errors. Nothing talks to the network until these are clear.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Please set AI_SERVICE_ENDPOINT and AI_SERVICE_KEY environment variables (missing: {})",
        .missing.join(", ")
    )]
    Missing { missing: Vec<&'static str> },

    #[error("AI_SERVICE_ENDPOINT is not a valid http(s) URL ({value:?}): {reason}")]
    InvalidEndpoint { value: String, reason: String },

    #[error("failed to read env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
}

/// Connection settings for the question answering service.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub endpoint: String,
    pub key: String,
    pub project_name: String,
    pub deployment_name: String,
}

impl Config {
    /// Read configuration from the process environment, falling back to a
    /// dotenv file. With no explicit path, `./.env` is used when it exists.
    pub fn load(env_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok(), env_file)
    }

    /// Like [`load`](Self::load) with `lookup` standing in for the process
    /// environment. A non-empty lookup value beats the file.
    pub fn load_with<F>(lookup: F, env_file: Option<&Path>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = match env_file {
            Some(path) => read_env_file(path)?,
            None => {
                let path = Path::new(DEFAULT_ENV_FILE);
                if path.exists() {
                    read_env_file(path)?
                } else {
                    HashMap::new()
                }
            }
        };

        Self::from_lookup(|name| non_empty(lookup(name)).or_else(|| file_vars.get(name).cloned()))
    }

    /// Build a config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));

        let endpoint = get(ENV_ENDPOINT);
        let key = get(ENV_KEY);

        let (endpoint, key) = match (endpoint, key) {
            (Some(endpoint), Some(key)) => (endpoint, key),
            (endpoint, key) => {
                let mut missing = Vec::new();
                if endpoint.is_none() {
                    missing.push(ENV_ENDPOINT);
                }
                if key.is_none() {
                    missing.push(ENV_KEY);
                }
                return Err(ConfigError::Missing { missing });
            }
        };

        validate_endpoint(&endpoint)?;

        Ok(Self {
            endpoint,
            key,
            project_name: get(ENV_PROJECT_NAME).unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string()),
            deployment_name: get(ENV_DEPLOYMENT_NAME)
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT_NAME.to_string()),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("deployment_name", &self.deployment_name)
            .finish()
    }
}

/// Parse a `--threshold` value: a float in `[0, 1]`.
pub fn parse_confidence_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("confidence threshold must be between 0 and 1, got {value}"));
    }
    Ok(value)
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let to_err = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_err)? {
        let (name, value) = item.map_err(to_err)?;
        vars.insert(name, value);
    }
    tracing::debug!(path = %path.display(), count = vars.len(), "loaded env file");
    Ok(vars)
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        value: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme `{other}`"))),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
