use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use navigator_core::identity::{AuthProvider, AuthSession, Registration};
use navigator_core::{AuthError, AuthResult};
use navigator_shared::{Identity, Masked};
use reqwest::{header, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

/// Client for the hosted GoTrue account endpoints.
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    access_key: Masked<String>,
}

#[derive(Debug, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: Uuid,
    email: Option<String>,
    user_metadata: Option<UserMetadata>,
}

impl From<UserBody> for Identity {
    fn from(user: UserBody) -> Self {
        Identity {
            id: user.id,
            email: user.email.unwrap_or_default(),
            display_name: user.user_metadata.and_then(|meta| meta.full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: UserBody,
}

impl AuthClient {
    pub fn new(base_url: &str, access_key: Masked<String>, timeout: Duration) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
        })
    }

    fn request(&self, method: Method, path: &str, bearer: Option<&Masked<String>>) -> reqwest::RequestBuilder {
        let bearer = bearer.unwrap_or(&self.access_key);
        self.client
            .request(method, format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", self.access_key.expose())
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer.expose()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> AuthResult<Value> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            let err = map_auth_failure(status.as_u16(), &body);
            warn!("Auth request failed ({}): {}", status, err);
            return Err(err);
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    async fn sign_in(&self, email: &str, password: &Masked<String>) -> AuthResult<AuthSession> {
        let request = self
            .request(Method::POST, "token", None)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password.expose() }));
        let body = self.send(request).await?;
        info!("Signed in {}", email);
        parse_session(body, Utc::now())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &Masked<String>,
        display_name: &str,
    ) -> AuthResult<Registration> {
        let request = self.request(Method::POST, "signup", None).json(&json!({
            "email": email,
            "password": password.expose(),
            "data": { "full_name": display_name },
        }));
        let body = self.send(request).await?;
        parse_registration(body, Utc::now())
    }

    async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        let request = self.request(Method::POST, "logout", Some(&session.access_token));
        self.send(request).await.map(|_| ())
    }

    async fn recover(&self, email: &str) -> AuthResult<()> {
        let request = self
            .request(Method::POST, "recover", None)
            .json(&json!({ "email": email }));
        self.send(request).await.map(|_| ())
    }

    async fn resolve(&self, access_token: &Masked<String>) -> AuthResult<AuthSession> {
        let body = self
            .send(self.request(Method::GET, "user", Some(access_token)))
            .await?;
        let user: UserBody = serde_json::from_value(body).map_err(|e| AuthError::Rejected(e.to_string()))?;
        Ok(AuthSession {
            identity: user.into(),
            access_token: access_token.clone(),
            expires_at: None,
        })
    }
}

fn transport(err: reqwest::Error) -> AuthError {
    AuthError::Transport(err.to_string())
}

fn parse_session(body: Value, now: DateTime<Utc>) -> AuthResult<AuthSession> {
    let session: SessionBody =
        serde_json::from_value(body).map_err(|e| AuthError::Rejected(e.to_string()))?;
    let expires_at = match (session.expires_at, session.expires_in) {
        (Some(at), _) => DateTime::from_timestamp(at, 0),
        (None, Some(secs)) => Some(now + chrono::Duration::seconds(secs)),
        (None, None) => None,
    };
    Ok(AuthSession {
        identity: session.user.into(),
        access_token: Masked::new(session.access_token),
        expires_at,
    })
}

/// Sign-up answers with a full session, or with the bare user when the
/// account still needs e-mail confirmation.
fn parse_registration(body: Value, now: DateTime<Utc>) -> AuthResult<Registration> {
    if body.get("access_token").is_some() {
        let session = parse_session(body, now)?;
        return Ok(Registration { identity: session.identity.clone(), session: Some(session) });
    }
    let user: UserBody = serde_json::from_value(body).map_err(|e| AuthError::Rejected(e.to_string()))?;
    Ok(Registration { identity: user.into(), session: None })
}

/// Turn an error response into the message shown on the form.
pub fn map_auth_failure(status: u16, body: &str) -> AuthError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| parsed.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed with status {}", status));

    let lowered = message.to_lowercase();
    if lowered.contains("invalid login credentials") {
        AuthError::InvalidCredentials
    } else if lowered.contains("already registered") || lowered.contains("already exists") {
        AuthError::DuplicateAccount
    } else {
        AuthError::Rejected(message)
    }
}
