//! fmdata Core Library
//!
//! Request building blocks for the FileMaker Data API:
//! - Database credentials and login payloads
//! - Record fields, find criteria and sort criteria
//! - Script parameters for JSON bodies and query strings
//! - Payload generation for create, edit and find requests
//! - Path templates and client configuration
//!
//! Nothing here performs network I/O; see the `fmdata-rs` crate for the
//! session client.

pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod payload;
pub mod script;

// Re-export commonly used types
pub use config::ClientConfig;
pub use credentials::{
    CredentialsType, DatabaseCredentials, Identity, OAuthUserCredentials, UserCredentials,
};
pub use endpoints::HttpMethod;
pub use error::{Error, Result};
pub use models::*;
pub use payload::{
    generate_create_payload, generate_find_payload, generate_payload, merge_json, FindRequest,
};
pub use script::ScriptParameters;
