use navigator_core::AuthError;
use navigator_shared::{AnalyticsEvent, Identity};
use serde::Serialize;

use super::ScreenState;
use crate::state::AppContext;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    /// Checked in order: everything filled in, confirmation matches, length.
    pub fn validate(&self) -> Result<(), AuthError> {
        let fields = [&self.display_name, &self.email, &self.password, &self.confirm_password];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::Validation("Please fill in all fields".to_string()));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct SignUpState {
    loading: bool,
    error: Option<String>,
    created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUpView {
    pub loading: bool,
    pub error: Option<String>,
    /// E-mail of the account just created.
    pub created: Option<String>,
}

#[derive(Clone)]
pub struct SignUp {
    ctx: AppContext,
    state: ScreenState<SignUpState>,
}

impl SignUp {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, state: ScreenState::new(SignUpState::default()) }
    }

    pub async fn submit(&self, form: &SignUpForm) -> Result<Identity, AuthError> {
        self.state.update(|s| s.error = None).await;
        if let Err(e) = form.validate() {
            self.state.update(|s| s.error = Some(e.to_string())).await;
            return Err(e);
        }

        self.state.update(|s| s.loading = true).await;
        let result = self
            .ctx
            .session
            .sign_up(&form.email, &form.password, &form.display_name)
            .await;

        self.state
            .update(|s| {
                s.loading = false;
                match &result {
                    Ok(identity) => s.created = Some(identity.email.clone()),
                    Err(e) => s.error = Some(e.to_string()),
                }
            })
            .await;
        if result.is_ok() {
            self.ctx.analytics.emit(AnalyticsEvent::sign_up("email"));
        }
        result
    }

    pub async fn render(&self) -> SignUpView {
        let state = self.state.snapshot().await;
        SignUpView { loading: state.loading, error: state.error, created: state.created }
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }
}
