//! Process settings.
//!
//! Every setting has a fixed default, so the server runs with no configuration at
//! all; environment variables only override those defaults.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/farm_stand";

/// Which product store backs the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    InMemory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::InMemory => "memory",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("FARMSTAND_ADDR `{0}` is not a socket address")]
    InvalidAddr(String),

    #[error("FARMSTAND_STORE `{0}` is not one of: postgres, memory")]
    InvalidStore(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub addr: SocketAddr,
    pub database_url: String,
    pub store: StoreBackend,
}

impl Settings {
    /// Read `FARMSTAND_ADDR`, `DATABASE_URL` and `FARMSTAND_STORE`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let addr_raw = lookup("FARMSTAND_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw
            .parse()
            .map_err(|_| SettingsError::InvalidAddr(addr_raw.clone()))?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let store = match lookup("FARMSTAND_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::InMemory,
            Some(other) => return Err(SettingsError::InvalidStore(other.to_string())),
        };

        Ok(Self {
            addr,
            database_url,
            store,
        })
    }
}
