use std::env;
use thiserror::Error;

/// ConfigError
///
/// Startup configuration problems. `main` treats any of these as fatal.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

/// AppConfig
///
/// Immutable runtime configuration, shared with handlers through `AppState`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and required variables.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Whether the in-memory store starts with the demonstration data set.
    pub seed_fixtures: bool,
}

/// Env
///
/// Local development versus production deployment.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Test configuration that needs no environment variables.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:0".to_string(),
            seed_fixtures: true,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `BIND_ADDR` and `SEED_FIXTURES`. Production must name its
    /// bind address explicitly; local falls back to `0.0.0.0:3000`.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = match (env, env::var("BIND_ADDR")) {
            (_, Ok(addr)) if !addr.is_empty() => addr,
            (Env::Production, _) => return Err(ConfigError::Missing("BIND_ADDR")),
            (Env::Local, _) => DEFAULT_BIND_ADDR.to_string(),
        };

        let seed_fixtures = match env::var("SEED_FIXTURES") {
            Err(_) => true,
            Ok(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                var: "SEED_FIXTURES",
                value,
            })?,
        };

        Ok(Self {
            env,
            bind_addr,
            seed_fixtures,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
