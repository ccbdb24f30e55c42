use navigator_core::{AuthError, GatewayError, GuardError};

/// Anything a screen action can fail with. The `Display` text is what the
/// screen shows.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    /// Action that does not apply to the current screen state.
    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        AppError::Unavailable(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(
            AppError::from(GuardError::SignInToTrack).to_string(),
            "Please sign in to track flights"
        );
        assert_eq!(
            AppError::from(AuthError::Validation("Passwords do not match".into())).to_string(),
            "Passwords do not match"
        );
        assert_eq!(
            AppError::from(GatewayError::NotConfigured).to_string(),
            "Data store is not configured"
        );
    }
}
