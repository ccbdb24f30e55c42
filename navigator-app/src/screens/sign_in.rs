use navigator_core::AuthError;
use navigator_shared::{AnalyticsEvent, Identity};
use serde::Serialize;

use super::ScreenState;
use crate::state::AppContext;

#[derive(Debug, Clone, Default)]
struct SignInState {
    email: String,
    loading: bool,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignInView {
    pub email: String,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct SignIn {
    ctx: AppContext,
    state: ScreenState<SignInState>,
}

impl SignIn {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, state: ScreenState::new(SignInState::default()) }
    }

    pub async fn submit(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.state
            .update(|s| {
                s.email = email.to_string();
                s.error = None;
            })
            .await;

        if email.trim().is_empty() || password.is_empty() {
            return self.fail(AuthError::Validation("Please fill in all fields".to_string())).await;
        }

        self.state.update(|s| s.loading = true).await;
        let result = self.ctx.session.sign_in(email, password).await;
        self.state.update(|s| s.loading = false).await;

        match result {
            Ok(identity) => {
                self.ctx.analytics.emit(AnalyticsEvent::sign_in("email"));
                Ok(identity)
            }
            Err(e) => self.fail(e).await,
        }
    }

    async fn fail(&self, err: AuthError) -> Result<Identity, AuthError> {
        self.state.update(|s| s.error = Some(err.to_string())).await;
        Err(err)
    }

    pub async fn render(&self) -> SignInView {
        let state = self.state.snapshot().await;
        SignInView { email: state.email, loading: state.loading, error: state.error }
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }
}
