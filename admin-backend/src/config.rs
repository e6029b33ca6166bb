use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const MONGO_URI: &str = "MONGO_URI";
    pub const MONGO_DB_NAME: &str = "MONGO_DB_NAME";
    pub const PORT: &str = "PORT";
    pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
    pub const NODE_ENV: &str = "NODE_ENV";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 3001;
    pub const BIND_ADDRESS: &str = "0.0.0.0";
    pub const ENVIRONMENT: &str = "development";
    /// Used when neither MONGO_DB_NAME nor the URI path names a database.
    pub const DATABASE_NAME: &str = "heyway";
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("MONGO_URI environment variable is not set")]
    MissingMongoUri,
    #[error("PORT must be a valid port number, got '{0}'")]
    InvalidPort(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    pub mongo_db_name: Option<String>,
    pub port: u16,
    pub bind_address: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mongo_uri = var(env_vars::MONGO_URI).ok_or(ConfigError::MissingMongoUri)?;
        let port = match var(env_vars::PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults::PORT,
        };

        Ok(Self {
            mongo_uri,
            mongo_db_name: var(env_vars::MONGO_DB_NAME),
            port,
            bind_address: var(env_vars::BIND_ADDRESS)
                .unwrap_or_else(|| defaults::BIND_ADDRESS.to_string()),
            environment: var(env_vars::NODE_ENV)
                .unwrap_or_else(|| defaults::ENVIRONMENT.to_string()),
        })
    }
}
