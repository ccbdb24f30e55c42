pub mod catalog;
pub mod gateway;
pub mod identity;
pub mod platform;
pub mod schedule;
pub mod search;

pub use catalog::Catalog;
pub use gateway::{Collection, Filter, Order, Query, Relation, RemoteGateway, Row};
pub use identity::{AuthProvider, AuthSession, MockAuthProvider, Registration};

/// Failures of the remote data store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Record already exists: {0}")]
    Conflict(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Data store is not configured")]
    NotConfigured,
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Failures of the account endpoints, or of local form validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("User already registered")]
    DuplicateAccount,
    #[error("{0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Account services are not configured")]
    Unavailable,
}

/// Preconditions checked on the client before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Please sign in to track flights")]
    SignInToTrack,
    #[error("Please sign in to subscribe")]
    SignInToSubscribe,
}

pub type GatewayResult<T> = Result<T, GatewayError>;
pub type AuthResult<T> = Result<T, AuthError>;
