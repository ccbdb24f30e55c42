//! Headless screen controllers. Each one owns its local state behind a
//! [`ScreenState`] and renders into a plain, serializable view model.

pub mod airport_lounges;
pub mod airport_maps;
pub mod airport_search;
pub mod dashboard;
pub mod flight_tracker;
pub mod install_prompt;
pub mod password_reset;
pub mod pricing;
pub mod sign_in;
pub mod sign_up;

use std::future::Future;
use std::sync::Arc;

use navigator_core::catalog::FlightWithAirport;
use navigator_shared::StatusColor;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::session::SessionStore;

pub use airport_lounges::AirportLounges;
pub use airport_maps::AirportMaps;
pub use airport_search::AirportSearch;
pub use dashboard::Dashboard;
pub use flight_tracker::FlightTracker;
pub use install_prompt::InstallPrompt;
pub use password_reset::PasswordReset;
pub use pricing::Pricing;
pub use sign_in::SignIn;
pub use sign_up::SignUp;

/// A remote value as a screen sees it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Remote<T> {
    #[default]
    NotAsked,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Remote<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Remote::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Remote::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Remote::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Remote::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// State of a mounted screen. Once `unmount` has been called every further
/// write is dropped, so late results never land on a screen that is gone.
pub struct ScreenState<S> {
    inner: Arc<RwLock<S>>,
    alive: CancellationToken,
}

impl<S> Clone for ScreenState<S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), alive: self.alive.clone() }
    }
}

impl<S: Clone> ScreenState<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
            alive: CancellationToken::new(),
        }
    }

    /// State of a nested screen: unmounting `parent` unmounts it too.
    pub fn child_of(initial: S, parent: &CancellationToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
            alive: parent.child_token(),
        }
    }

    pub async fn snapshot(&self) -> S {
        self.inner.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&*self.inner.read().await)
    }

    /// Apply `f` unless the screen is gone. Returns whether it was applied.
    pub async fn update(&self, f: impl FnOnce(&mut S)) -> bool {
        if self.alive.is_cancelled() {
            return false;
        }
        let mut state = self.inner.write().await;
        if self.alive.is_cancelled() {
            return false;
        }
        f(&mut state);
        true
    }

    pub fn is_alive(&self) -> bool {
        !self.alive.is_cancelled()
    }

    /// Token cancelled on unmount; background work of the screen hangs off it.
    pub fn liveness(&self) -> &CancellationToken {
        &self.alive
    }

    pub fn unmount(&self) {
        self.alive.cancel();
    }
}

/// Run `on_change` each time the signed-in identity changes, until
/// `liveness` is cancelled. Loading flips alone do not count.
pub(crate) fn follow_identity<F, Fut>(session: &SessionStore, liveness: CancellationToken, on_change: F)
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let mut rx = session.subscribe();
    // Baseline taken now, so a change during the caller's first load is seen.
    let mut current = rx.borrow_and_update().identity.as_ref().map(|identity| identity.id);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = liveness.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = rx.borrow_and_update().identity.as_ref().map(|identity| identity.id);
                    if next != current {
                        current = next;
                        on_change().await;
                    }
                }
            }
        }
    });
}

/// One row of a flight list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightCard {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub route: String,
    pub airport_code: Option<String>,
    pub departure_time: Option<chrono::DateTime<chrono::Utc>>,
    pub status: String,
    pub status_color: StatusColor,
    pub tracked: bool,
}

impl FlightCard {
    pub fn new(flight: &FlightWithAirport, tracked: bool) -> Self {
        Self {
            id: flight.id,
            flight_number: flight.flight_number.clone(),
            airline: flight.airline.clone(),
            route: format!("{} → {}", flight.origin, flight.destination),
            airport_code: flight.related.as_ref().map(|airport| airport.code.clone()),
            departure_time: flight.departure_time,
            status: flight.status.to_string(),
            status_color: flight.status.color(),
            tracked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_updates_dropped_after_unmount() {
        let state = ScreenState::new(0u32);
        assert!(state.update(|n| *n += 1).await);
        state.unmount();
        assert!(!state.update(|n| *n += 1).await);
        assert_eq!(state.snapshot().await, 1);
        assert!(state.liveness().is_cancelled());
    }

    #[tokio::test]
    async fn test_child_state_follows_parent_unmount() {
        let parent = ScreenState::new(0u32);
        let child = ScreenState::child_of(0u32, parent.liveness());
        assert!(child.update(|n| *n = 1).await);

        parent.unmount();
        assert!(!child.is_alive());
        assert!(!child.update(|n| *n = 2).await);
        assert_eq!(child.snapshot().await, 1);
    }

    #[test]
    fn test_remote_accessors() {
        let loaded: Remote<Vec<u8>> = Remote::Loaded(vec![1]);
        assert_eq!(loaded.value(), Some(&vec![1]));
        assert!(Remote::<()>::Loading.is_loading());
        assert_eq!(Remote::<()>::Failed("boom".into()).error(), Some("boom"));
    }
}
