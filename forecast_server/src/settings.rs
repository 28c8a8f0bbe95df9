//! Server settings read from the environment

use crate::error::{Result, ServerError};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Where to listen and which forecast configuration to serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// JSON configuration file; the built-in defaults are served without one
    pub config_path: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            config_path: None,
        }
    }
}

impl ServerSettings {
    /// Read `HOST`, `PORT` and `FORECAST_CONFIG` from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(text) => text.trim().parse::<u16>().map_err(|e| {
                ServerError::Config(format!(
                    "PORT must be a valid port number, got '{}': {}",
                    text, e
                ))
            })?,
            None => DEFAULT_PORT,
        };

        let config_path = lookup("FORECAST_CONFIG")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            config_path,
        })
    }

    /// The socket address to bind
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                ServerError::Config(format!(
                    "Invalid HOST:PORT '{}:{}': {}",
                    self.host, self.port, e
                ))
            })
    }
}
