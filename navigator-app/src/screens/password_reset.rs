use navigator_core::AuthError;
use serde::Serialize;

use super::ScreenState;
use crate::state::AppContext;

#[derive(Debug, Clone, Default)]
struct ResetState {
    loading: bool,
    error: Option<String>,
    sent_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordResetView {
    pub loading: bool,
    pub error: Option<String>,
    pub sent_to: Option<String>,
}

#[derive(Clone)]
pub struct PasswordReset {
    ctx: AppContext,
    state: ScreenState<ResetState>,
}

impl PasswordReset {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, state: ScreenState::new(ResetState::default()) }
    }

    pub async fn submit(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            let err = AuthError::Validation("Please enter your email address".to_string());
            self.state.update(|s| s.error = Some(err.to_string())).await;
            return Err(err);
        }

        self.state
            .update(|s| {
                s.loading = true;
                s.error = None;
            })
            .await;
        let result = self.ctx.session.reset_password(email).await;
        self.state
            .update(|s| {
                s.loading = false;
                match &result {
                    Ok(()) => s.sent_to = Some(email.to_string()),
                    Err(e) => s.error = Some(e.to_string()),
                }
            })
            .await;
        result
    }

    pub async fn render(&self) -> PasswordResetView {
        let state = self.state.snapshot().await;
        PasswordResetView { loading: state.loading, error: state.error, sent_to: state.sent_to }
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }
}
