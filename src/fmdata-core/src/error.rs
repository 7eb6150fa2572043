use thiserror::Error;

/// Errors raised while building request objects.
///
/// These are signaled synchronously when a value is constructed, never at
/// call time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Empty Database Name")]
    EmptyDatabaseName,

    #[error("Empty User Name")]
    EmptyUserName,

    #[error("Empty Password")]
    EmptyPassword,

    #[error("Empty OAuth Request Id")]
    EmptyOAuthRequestId,

    #[error("Empty OAuth Id")]
    EmptyOAuthIdentifier,

    #[error("Not Implemented: {0}")]
    NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
