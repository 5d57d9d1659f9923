//! Environment-driven settings shared by the host and the client.

use std::env;
use std::path::PathBuf;

use crate::protocol::DEFAULT_PORT;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_LOG_FILE: &str = "waiting-room.log";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_file: PathBuf,
}

impl Config {
    /// Read `LOBBY_*` variables, loading `.env` first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: env::var("LOBBY_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("LOBBY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            log_file: env::var("LOBBY_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn server_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses() {
        let config = Config {
            port: 9000,
            ..Config::default()
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.server_url(), "ws://127.0.0.1:9000");
    }
}
