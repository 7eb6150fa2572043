//! fmdata - command line client for the FileMaker Data API
//!
//! Each invocation opens a session, runs one command and logs out again.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use fmdata_rs::{Client, ClientConfig, DatabaseCredentials, RecordField};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = DatabaseCredentials::user("iot", "admin", "secret")?;
//!     let mut client = Client::from_config(&ClientConfig::new("fm.example.com"), credentials, None)?;
//!     client.log_in().await?;
//!     client
//!         .create_record("iot", "readings", &[RecordField::number("value", 21.5)], None)
//!         .await?;
//!     client.log_out().await?;
//!     Ok(())
//! }
//! ```
//!
//! # CLI Usage
//! ```bash
//! fmdata --config fmdata.json find -q "sensor=Timer" --sort created:desc
//! ```

pub use fmdata_rs;

pub mod commands;

use fmdata_rs::{ClientConfig, DatabaseCredentials};
use serde::Deserialize;

/// Contents of the CLI config file
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Layout used when a command does not name one
    #[serde(default)]
    pub layout: String,
}

impl CliConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: CliConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn credentials(&self) -> fmdata_core::Result<DatabaseCredentials> {
        DatabaseCredentials::user(&self.database, &self.username, &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: CliConfig = serde_json::from_str(
            r#"{
                "client": {"host": "fm.example.com"},
                "database": "iot",
                "username": "device",
                "password": "pw",
                "layout": "readings"
            }"#,
        )
        .unwrap();
        assert_eq!(config.client.port, 443);
        assert_eq!(config.layout, "readings");
        assert_eq!(config.credentials().unwrap().database(), "iot");
    }

    #[test]
    fn test_missing_username_fails_at_construction() {
        let config: CliConfig = serde_json::from_str(
            r#"{"client": {"host": "fm.example.com"}, "database": "iot"}"#,
        )
        .unwrap();
        assert_eq!(
            config.credentials(),
            Err(fmdata_core::Error::EmptyUserName)
        );
    }
}
