use std::sync::Arc;

use futures_util::Stream;
use navigator_core::identity::{AuthProvider, AuthSession};
use navigator_core::{AuthResult, RemoteGateway};
use navigator_shared::{Identity, Masked};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// What every screen sees of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

struct Inner {
    provider: Arc<dyn AuthProvider>,
    gateway: Arc<dyn RemoteGateway>,
    state: watch::Sender<SessionState>,
    session: Mutex<Option<AuthSession>>,
}

/// Owner of the current identity. Cloning hands out another handle to the
/// same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn AuthProvider>, gateway: Arc<dyn RemoteGateway>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                provider,
                gateway,
                state,
                session: Mutex::new(None),
            }),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.state.borrow().identity.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Identity after every change, starting with the current one.
    pub fn changes(&self) -> impl Stream<Item = Option<Identity>> {
        WatchStream::new(self.subscribe()).map(|state| state.identity)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let session = self
            .inner
            .provider
            .sign_in(email.trim(), &Masked::from(password))
            .await?;
        let identity = session.identity.clone();
        self.establish(session).await;
        info!("Signed in as {}", identity.email);
        Ok(identity)
    }

    /// Create an account. The identity becomes current only when the
    /// provider opened a session right away.
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> AuthResult<Identity> {
        let registration = self
            .inner
            .provider
            .sign_up(email.trim(), &Masked::from(password), display_name.trim())
            .await?;
        match registration.session {
            Some(session) => self.establish(session).await,
            None => info!("Account {} awaits e-mail confirmation", registration.identity.email),
        }
        Ok(registration.identity)
    }

    /// Clears the local session first; a failing remote logout is still
    /// reported.
    pub async fn sign_out(&self) -> AuthResult<()> {
        let previous = self.inner.session.lock().await.take();
        self.inner.gateway.authorize(None);
        self.inner.state.send_modify(|state| state.identity = None);

        let Some(session) = previous else {
            return Ok(());
        };
        info!("Signed out {}", session.identity.email);
        self.inner.provider.sign_out(&session).await.inspect_err(|e| {
            warn!("Remote sign-out failed: {}", e);
        })
    }

    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        self.inner.provider.recover(email.trim()).await
    }

    /// Resolve a persisted access token. `is_loading` is true while this runs.
    pub async fn restore(&self, access_token: Masked<String>) -> AuthResult<Identity> {
        self.inner.state.send_modify(|state| state.loading = true);
        let result = self.inner.provider.resolve(&access_token).await;
        self.inner.state.send_modify(|state| state.loading = false);

        match result {
            Ok(session) => {
                let identity = session.identity.clone();
                self.establish(session).await;
                Ok(identity)
            }
            Err(e) => {
                warn!("Stored session could not be restored: {}", e);
                Err(e)
            }
        }
    }

    /// Bearer token of the current session, if any.
    pub async fn access_token(&self) -> Option<Masked<String>> {
        self.inner
            .session
            .lock()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    async fn establish(&self, session: AuthSession) {
        let identity = session.identity.clone();
        self.inner.gateway.authorize(Some(session.access_token.clone()));
        *self.inner.session.lock().await = Some(session);
        self.inner.state.send_modify(|state| state.identity = Some(identity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::MockAuthProvider;
    use navigator_store::InMemoryGateway;

    async fn store() -> (SessionStore, Arc<MockAuthProvider>, Arc<InMemoryGateway>) {
        let provider = Arc::new(
            MockAuthProvider::new("session-secret")
                .with_account("ada@example.com", "secret1", "Ada")
                .await,
        );
        let gateway = Arc::new(InMemoryGateway::new());
        (SessionStore::new(provider.clone(), gateway.clone()), provider, gateway)
    }

    #[tokio::test]
    async fn test_sign_in_sets_identity_and_bearer() {
        let (session, _, gateway) = store().await;
        let mut rx = session.subscribe();

        let identity = session.sign_in("ada@example.com", "secret1").await.unwrap();
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().identity, Some(identity));
        assert!(gateway.bearer().is_some());
        assert_eq!(gateway.bearer(), session.access_token().await);
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_signed_out() {
        let (session, _, gateway) = store().await;
        let err = session.sign_in("ada@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(session.identity().is_none());
        assert!(gateway.bearer().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_when_remote_fails() {
        let (session, _, gateway) = store().await;
        session.sign_in("ada@example.com", "secret1").await.unwrap();

        // Corrupt the stored token so the provider rejects the logout.
        session.inner.session.lock().await.as_mut().unwrap().access_token = Masked::from("garbage");

        assert!(session.sign_out().await.is_err());
        assert!(session.identity().is_none());
        assert!(gateway.bearer().is_none());
    }

    #[tokio::test]
    async fn test_restore_toggles_loading() {
        let (session, provider, _) = store().await;
        let token = provider
            .sign_in("ada@example.com", &Masked::from("secret1"))
            .await
            .unwrap()
            .access_token;

        let mut rx = session.subscribe();
        let restored = session.restore(token).await.unwrap();
        assert_eq!(restored.email, "ada@example.com");
        assert!(!session.is_loading());
        assert!(rx.has_changed().unwrap());
        assert_eq!(session.identity(), Some(restored));
    }

    #[tokio::test]
    async fn test_changes_stream_yields_latest_identity() {
        let (session, _, _) = store().await;
        let mut changes = Box::pin(session.changes());
        assert_eq!(changes.next().await, Some(None));

        session.sign_in("ada@example.com", "secret1").await.unwrap();
        let next = changes.next().await.unwrap();
        assert_eq!(next.map(|identity| identity.email), Some("ada@example.com".to_string()));
    }
}
