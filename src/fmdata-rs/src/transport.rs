use async_trait::async_trait;
use fmdata_core::{ClientConfig, HttpMethod};
use reqwest::Client as HttpClient;
use std::time::Duration;

/// A single HTTP request as handed to a [`Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    /// Absolute path including any query string
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status code and body of a completed round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Transport performs one request/response round trip.
///
/// Connection setup, TLS and timeouts belong to the implementation. There
/// is no retry at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// HTTPS transport backed by reqwest
pub struct ReqwestTransport {
    base_url: String,
    client: HttpClient,
}

impl ReqwestTransport {
    /// Transport with default TLS settings for `scheme://host:port`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: HttpClient::new(),
        }
    }

    /// Build from configuration. `ca_cert` is a PEM trust anchor passed
    /// through to the TLS stack as-is.
    pub fn from_config(
        config: &ClientConfig,
        ca_cert: Option<&[u8]>,
    ) -> Result<Self, TransportError> {
        let mut builder = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(pem) = ca_cert {
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(pem)?);
        }
        if config.insecure_skip_verify {
            tracing::warn!("TLS certificate verification disabled for {}", config.host);
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: config.base_url(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(to_reqwest_method(request.method), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!("Response {}: {}", status, body);

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sends_method_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/fmi/data/v1/databases/db/layouts/L/records/3")
            .match_header("authorization", "Bearer T1")
            .match_body(r#"{"fieldData":{"a":"b"}}"#)
            .with_status(200)
            .with_body(r#"{"response":{},"messages":[{"code":"0","message":"OK"}]}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(server.url());
        let request = TransportRequest::new(
            HttpMethod::Patch,
            "/fmi/data/v1/databases/db/layouts/L/records/3",
        )
        .header("Authorization", "Bearer T1")
        .body(r#"{"fieldData":{"a":"b"}}"#);

        let response = transport.send(request).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(response.body.contains("\"OK\""));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned_not_raised() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fmws/oauthproviderinfo")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(server.url());
        let response = transport
            .send(TransportRequest::new(HttpMethod::Get, "/fmws/oauthproviderinfo"))
            .await
            .unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(response.body, "unauthorized");
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_transport_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let transport = ReqwestTransport::new("http://127.0.0.1:9");
        let result = transport
            .send(TransportRequest::new(HttpMethod::Get, "/"))
            .await;
        assert!(matches!(result, Err(TransportError::Request(_))));
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let mut config = ClientConfig::new("fm.example.com");
        config.port = 8443;
        let transport = ReqwestTransport::from_config(&config, None).unwrap();
        assert_eq!(transport.base_url(), "https://fm.example.com:8443");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = TransportRequest::new(HttpMethod::Get, "/").header("Content-Type", "x");
        assert_eq!(request.header_value("content-type"), Some("x"));
        assert_eq!(request.header_value("accept"), None);
    }
}
