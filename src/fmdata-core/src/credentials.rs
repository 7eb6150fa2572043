use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Map, Value};

use crate::endpoints;
use crate::error::{Error, Result};

const FM_DATA_SOURCE: &str = "fmDataSource";

/// Kind of credentials, used to pick the login flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsType {
    User,
    OAuth,
}

/// Username/password account for a single database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    database: String,
    username: String,
    password: String,
}

impl UserCredentials {
    pub fn new(
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let database = non_empty(database.into(), Error::EmptyDatabaseName)?;
        let username = non_empty(username.into(), Error::EmptyUserName)?;
        let password = non_empty(password.into(), Error::EmptyPassword)?;
        Ok(Self {
            database,
            username,
            password,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Base64 of `username:password`, without the `Basic ` scheme prefix
    pub fn authorization_header_value(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }

    fn to_json(&self) -> Value {
        json!({
            "database": self.database,
            "username": self.username,
            "password": self.password,
        })
    }
}

/// OAuth identity obtained from an external identity provider.
///
/// The Data API OAuth login flow is not implemented by this client; these
/// credentials can still be attached as external data sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthUserCredentials {
    database: String,
    oauth_request_id: String,
    oauth_identifier: String,
}

impl OAuthUserCredentials {
    pub fn new(
        database: impl Into<String>,
        oauth_request_id: impl Into<String>,
        oauth_identifier: impl Into<String>,
    ) -> Result<Self> {
        let database = non_empty(database.into(), Error::EmptyDatabaseName)?;
        let oauth_request_id = non_empty(oauth_request_id.into(), Error::EmptyOAuthRequestId)?;
        let oauth_identifier = non_empty(oauth_identifier.into(), Error::EmptyOAuthIdentifier)?;
        Ok(Self {
            database,
            oauth_request_id,
            oauth_identifier,
        })
    }

    pub fn oauth_request_id(&self) -> &str {
        &self.oauth_request_id
    }

    pub fn oauth_identifier(&self) -> &str {
        &self.oauth_identifier
    }

    fn to_json(&self) -> Value {
        json!({
            "database": self.database,
            "oAuthRequestId": self.oauth_request_id,
            "oAuthIdentifier": self.oauth_identifier,
        })
    }
}

/// Credential kinds the client can log in with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    User(UserCredentials),
    OAuth(OAuthUserCredentials),
}

impl Identity {
    fn database(&self) -> &str {
        match self {
            Identity::User(c) => &c.database,
            Identity::OAuth(c) => &c.database,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Identity::User(c) => c.to_json(),
            Identity::OAuth(c) => c.to_json(),
        }
    }
}

impl From<UserCredentials> for Identity {
    fn from(value: UserCredentials) -> Self {
        Identity::User(value)
    }
}

impl From<OAuthUserCredentials> for Identity {
    fn from(value: OAuthUserCredentials) -> Self {
        Identity::OAuth(value)
    }
}

/// How to log into database D, plus any external (federated) data sources
/// that must be authenticated in the same session.
///
/// Owned by the client for its whole lifetime and never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    identity: Identity,
    external: Vec<DatabaseCredentials>,
}

impl DatabaseCredentials {
    pub fn new(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            external: Vec::new(),
        }
    }

    /// Shorthand for username/password credentials
    pub fn user(
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(UserCredentials::new(database, username, password)?))
    }

    /// Shorthand for OAuth credentials
    pub fn oauth(
        database: impl Into<String>,
        oauth_request_id: impl Into<String>,
        oauth_identifier: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(OAuthUserCredentials::new(
            database,
            oauth_request_id,
            oauth_identifier,
        )?))
    }

    /// Attach external database credentials sent with the login request
    pub fn with_external(mut self, external: Vec<DatabaseCredentials>) -> Self {
        self.external = external;
        self
    }

    pub fn database(&self) -> &str {
        self.identity.database()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn external(&self) -> &[DatabaseCredentials] {
        &self.external
    }

    pub fn credentials_type(&self) -> CredentialsType {
        match self.identity {
            Identity::User(_) => CredentialsType::User,
            Identity::OAuth(_) => CredentialsType::OAuth,
        }
    }

    /// Value for the login `Authorization: Basic` header.
    ///
    /// OAuth logins are authenticated through dedicated headers the client
    /// does not implement, so they yield [`Error::NotImplemented`].
    pub fn authorization_header_value(&self) -> Result<String> {
        match &self.identity {
            Identity::User(c) => Ok(c.authorization_header_value()),
            Identity::OAuth(_) => Err(Error::NotImplemented("OAuth authorization header")),
        }
    }

    /// `{"fmDataSource": [...]}` for the attached external credentials, or
    /// `None` when there are none.
    pub fn external_databases_payload(&self) -> Option<Value> {
        if self.external.is_empty() {
            return None;
        }
        tracing::debug!("{} external database credentials found", self.external.len());
        let sources: Vec<Value> = self
            .external
            .iter()
            .map(|c| {
                tracing::debug!("External database: {}", c.database());
                c.identity.to_json()
            })
            .collect();
        let mut payload = Map::new();
        payload.insert(FM_DATA_SOURCE.to_string(), Value::Array(sources));
        Some(Value::Object(payload))
    }

    /// Body of the login request: the external payload, or `{}`
    pub fn login_payload(&self) -> Value {
        self.external_databases_payload()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    pub fn login_path(&self) -> String {
        endpoints::sessions(self.database())
    }

    pub fn logout_path(&self, token: &str) -> String {
        endpoints::session(self.database(), token)
    }
}

fn non_empty(value: String, error: Error) -> Result<String> {
    if value.is_empty() {
        Err(error)
    } else {
        Ok(value)
    }
}
