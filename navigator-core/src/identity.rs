use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use navigator_shared::{Identity, Masked};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AuthError, AuthResult};

/// A signed-in session: who the user is and the bearer token the data store
/// expects from them.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: Identity,
    pub access_token: Masked<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of a sign-up. Providers that require e-mail confirmation create the
/// account without opening a session.
#[derive(Debug, Clone)]
pub struct Registration {
    pub identity: Identity,
    pub session: Option<AuthSession>,
}

/// Account endpoints of the hosted backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &Masked<String>) -> AuthResult<AuthSession>;

    async fn sign_up(
        &self,
        email: &str,
        password: &Masked<String>,
        display_name: &str,
    ) -> AuthResult<Registration>;

    async fn sign_out(&self, session: &AuthSession) -> AuthResult<()>;

    /// Send a password recovery e-mail.
    async fn recover(&self, email: &str) -> AuthResult<()>;

    /// Resolve a persisted access token back into a session.
    async fn resolve(&self, access_token: &Masked<String>) -> AuthResult<AuthSession>;
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

struct Account {
    identity: Identity,
    password: Masked<String>,
}

/// Local provider that keeps accounts in memory and issues HS256 tokens.
/// Used for tests and offline demos.
pub struct MockAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    secret: Masked<String>,
    token_ttl: Duration,
    calls: AtomicUsize,
}

impl MockAuthProvider {
    pub fn new(secret: &str) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            secret: Masked::from(secret),
            token_ttl: Duration::hours(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Seed an existing account.
    pub async fn with_account(self, email: &str, password: &str, display_name: &str) -> Self {
        self.insert_account(email, password, display_name).await;
        self
    }

    /// Number of requests that reached the provider.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn insert_account(&self, email: &str, password: &str, display_name: &str) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: Some(display_name.to_string()).filter(|name| !name.is_empty()),
        };
        self.accounts.write().await.insert(
            email.to_lowercase(),
            Account { identity: identity.clone(), password: Masked::from(password) },
        );
        identity
    }

    fn issue(&self, identity: &Identity) -> AuthResult<AuthSession> {
        let expires_at = Utc::now() + self.token_ttl;
        let claims = AccessClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            exp: expires_at.timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose().as_bytes()),
        )
        .map_err(|e| AuthError::Rejected(format!("Token encoding failed: {}", e)))?;

        Ok(AuthSession {
            identity: identity.clone(),
            access_token: Masked::new(token),
            expires_at: Some(expires_at),
        })
    }

    fn verify(&self, access_token: &Masked<String>) -> AuthResult<AccessClaims> {
        decode::<AccessClaims>(
            access_token.expose(),
            &DecodingKey::from_secret(self.secret.expose().as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::Rejected("Session expired. Please sign in again.".to_string()))
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in(&self, email: &str, password: &Masked<String>) -> AuthResult<AuthSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&email.to_lowercase())
            .filter(|account| account.password == *password)
            .ok_or(AuthError::InvalidCredentials)?;
        tracing::info!("Mock sign-in for {}", account.identity.email);
        self.issue(&account.identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &Masked<String>,
        display_name: &str,
    ) -> AuthResult<Registration> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.accounts.read().await.contains_key(&email.to_lowercase()) {
            return Err(AuthError::DuplicateAccount);
        }
        let identity = self.insert_account(email, password.expose(), display_name).await;
        let session = self.issue(&identity)?;
        Ok(Registration { identity, session: Some(session) })
    }

    async fn sign_out(&self, session: &AuthSession) -> AuthResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verify(&session.access_token).map(|_| ())
    }

    async fn recover(&self, email: &str) -> AuthResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Same answer for unknown addresses so accounts cannot be enumerated.
        tracing::info!("Mock recovery requested for {}", email);
        Ok(())
    }

    async fn resolve(&self, access_token: &Masked<String>) -> AuthResult<AuthSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let claims = self.verify(access_token)?;
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&claims.email.to_lowercase())
            .filter(|account| account.identity.id.to_string() == claims.sub)
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(AuthSession {
            identity: account.identity.clone(),
            access_token: access_token.clone(),
            expires_at: DateTime::from_timestamp(claims.exp as i64, 0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = MockAuthProvider::new("test-secret");
        let registration = provider
            .sign_up("ada@example.com", &Masked::from("secret1"), "Ada")
            .await
            .unwrap();
        assert_eq!(registration.identity.display_name.as_deref(), Some("Ada"));

        let session = provider.sign_in("ADA@example.com", &Masked::from("secret1")).await.unwrap();
        assert_eq!(session.identity.id, registration.identity.id);

        let resolved = provider.resolve(&session.access_token).await.unwrap();
        assert_eq!(resolved.identity.email, "ada@example.com");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_rejects_bad_password_and_duplicates() {
        let provider = MockAuthProvider::new("test-secret")
            .with_account("bob@example.com", "hunter22", "Bob")
            .await;

        let err = provider.sign_in("bob@example.com", &Masked::from("nope")).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);

        let err = provider
            .sign_up("bob@example.com", &Masked::from("another1"), "Bob")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::DuplicateAccount);
    }

    #[tokio::test]
    async fn test_resolve_rejects_foreign_tokens() {
        let provider = MockAuthProvider::new("test-secret");
        let err = provider.resolve(&Masked::from("not-a-token")).await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
    }
}
