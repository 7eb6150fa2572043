//! fmdata Client Library
//!
//! Session client for the FileMaker Data API: logs in, sends create, edit,
//! delete, find and container upload requests, and interprets the response
//! envelope. Every call is a single round trip; retries are up to the
//! caller.

mod client;
mod envelope;
mod multipart;
mod transport;

pub use client::Client;
pub use envelope::{Envelope, Message};
pub use fmdata_core::{
    ClientConfig, DatabaseCredentials, FieldType, FindCriteria, FindCriteriaField, FindRequest,
    HttpMethod, OAuthUserCredentials, PortalRange, RecordField, RecordRange, ScriptParameters,
    SortCriteria, SortCriteriaField, SortOrder, UserCredentials,
};
pub use multipart::ContainerUpload;
pub use transport::{
    ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse,
};

/// Failure of a client call, by cause
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No session token; no request was sent
    #[error("Empty Token")]
    NotAuthenticated,

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-200 HTTP status
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    /// Response body is not a valid envelope
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Well-formed response carrying a nonzero message code
    #[error("Data API error: {code} - {message}")]
    Api { code: i64, message: String },

    #[error("Not Implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid credentials: {0}")]
    Credentials(fmdata_core::Error),
}

impl From<fmdata_core::Error> for ClientError {
    fn from(err: fmdata_core::Error) -> Self {
        match err {
            fmdata_core::Error::NotImplemented(what) => ClientError::NotImplemented(what),
            other => ClientError::Credentials(other),
        }
    }
}

impl ClientError {
    /// Connection, TLS or HTTP status failure
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Server { .. })
    }

    /// Unreadable or incomplete response
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ClientError::Serialization(_) | ClientError::InvalidResponse(_)
        )
    }

    /// Rejected by the Data API itself
    pub fn is_application(&self) -> bool {
        matches!(self, ClientError::Api { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let server = ClientError::Server {
            status: 401,
            message: String::new(),
        };
        assert!(server.is_transport());
        assert!(!server.is_application());

        let api = ClientError::Api {
            code: 952,
            message: "Invalid FileMaker Data API token".to_string(),
        };
        assert!(api.is_application());
        assert_eq!(
            api.to_string(),
            "Data API error: 952 - Invalid FileMaker Data API token"
        );

        assert!(ClientError::InvalidResponse("no token".to_string()).is_protocol());
    }

    #[test]
    fn test_core_not_implemented_maps_through() {
        let err: ClientError = fmdata_core::Error::NotImplemented("OAuth").into();
        assert!(matches!(err, ClientError::NotImplemented("OAuth")));

        let err: ClientError = fmdata_core::Error::EmptyPassword.into();
        assert!(matches!(
            err,
            ClientError::Credentials(fmdata_core::Error::EmptyPassword)
        ));
    }
}
