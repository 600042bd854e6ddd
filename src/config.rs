use std::env;

use crate::error::{Error, Result};

/// Server settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Config("DATABASE_URL must be set".to_string()))?;

        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", port)))?,
            None => 3000,
        };

        let static_dir = lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string());

        Ok(Self {
            database_url,
            port,
            static_dir,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
