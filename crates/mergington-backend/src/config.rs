//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const ADDR_VAR: &str = "MERGINGTON_ADDR";
pub const STATIC_DIR_VAR: &str = "MERGINGTON_STATIC_DIR";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load .env file")]
    EnvFile(#[from] dotenvy::Error),
    #[error("Invalid MERGINGTON_ADDR value {value:?}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub static_dir: PathBuf,
}

impl Config {
    /// Load the configuration from the process environment, reading a `.env`
    /// file first if one exists.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) | Err(dotenvy::Error::Io(_)) => {}
            Err(err) => return Err(err.into()),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let static_dir = lookup(STATIC_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_static_dir);

        Ok(Self { addr, static_dir })
    }
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
