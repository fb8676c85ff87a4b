use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// Public origin used when rendering interview and meeting links
    /// (e.g. `https://interviews.example.com`).
    pub public_base_url: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid public base URL: {0}")]
    InvalidBaseUrl(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8083".to_string());

        let public_base_url = vars
            .get("PUBLIC_BASE_URL")
            .cloned()
            .unwrap_or_else(|| format!("http://{}", bind_address));

        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(public_base_url));
        }

        // Trailing slash would double up when joining link paths
        let public_base_url = public_base_url.trim_end_matches('/').to_string();

        Ok(Config {
            bind_address,
            public_base_url,
        })
    }
}
