use serde::{Deserialize, Serialize};

/// Connection settings for a Data API host
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Prefix of every Data API path
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// PEM root certificate; empty means the built-in trust roots
    #[serde(default)]
    pub ca_cert_path: String,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_port() -> u16 {
    443
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_base_path() -> String {
    "/fmi/data/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("fmdata-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// `scheme://host:port`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Root certificate bytes, if a path is configured
    pub fn read_ca_cert(&self) -> anyhow::Result<Option<Vec<u8>>> {
        if self.ca_cert_path.is_empty() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&self.ca_cert_path)?))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: default_port(),
            scheme: default_scheme(),
            base_path: default_base_path(),
            ca_cert_path: String::new(),
            insecure_skip_verify: false,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: ClientConfig = serde_json::from_str(r#"{"host": "fm.example.com"}"#).unwrap();
        assert_eq!(config.port, 443);
        assert_eq!(config.base_path, "/fmi/data/v1");
        assert_eq!(config.base_url(), "https://fm.example.com:443");
        assert!(!config.insecure_skip_verify);
        assert!(config.user_agent.starts_with("fmdata-rs/"));
        assert!(config.read_ca_cert().unwrap().is_none());
    }

    #[test]
    fn test_overrides() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"host": "10.0.0.5", "port": 8443, "scheme": "http", "timeout_secs": 5}"#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.5:8443");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_missing_cert_file_is_an_error() {
        let config = ClientConfig {
            ca_cert_path: "/nonexistent/root.pem".to_string(),
            ..ClientConfig::new("fm.example.com")
        };
        assert!(config.read_ca_cert().is_err());
    }
}
