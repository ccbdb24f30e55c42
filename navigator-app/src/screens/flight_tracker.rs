use std::collections::HashSet;

use navigator_core::catalog::FlightWithAirport;
use navigator_core::search::flight_search_pattern;
use navigator_core::GuardError;
use navigator_shared::AnalyticsEvent;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{follow_identity, FlightCard, Remote, ScreenState};
use crate::error::{AppError, AppResult};
use crate::refresh::RefreshSlot;
use crate::state::AppContext;

const SEARCH_FAILED: &str = "Failed to search flights. Please try again.";
const TRACKING_FAILED: &str = "Failed to update flight tracking";

#[derive(Debug, Clone, Default)]
struct TrackerState {
    query: String,
    /// Pattern of the last search that went out, replayed by the refresh.
    last_search: Option<String>,
    results: Remote<Vec<FlightWithAirport>>,
    tracked: HashSet<Uuid>,
    /// Identity `tracked` belongs to.
    tracked_for: Option<Uuid>,
    notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerView {
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub results: Vec<FlightCard>,
    pub signed_in: bool,
    pub notice: Option<String>,
}

/// Flight search with per-user tracking.
#[derive(Clone)]
pub struct FlightTracker {
    ctx: AppContext,
    state: ScreenState<TrackerState>,
    timer: RefreshSlot,
}

impl FlightTracker {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: ScreenState::new(TrackerState::default()),
            timer: RefreshSlot::new(),
        }
    }

    pub async fn activate(&self) {
        let this = self.clone();
        follow_identity(&self.ctx.session, self.state.liveness().clone(), move || {
            let this = this.clone();
            async move {
                this.load_tracked().await;
                this.restart_timer();
            }
        });

        self.load_tracked().await;
        self.restart_timer();
    }

    pub async fn set_query(&self, query: &str) {
        self.state.update(|s| s.query = query.to_string()).await;
    }

    /// Search for the current query. A blank query clears the results
    /// without a request.
    pub async fn search(&self) {
        let query = self.state.read(|s| s.query.clone()).await;
        let Some(pattern) = flight_search_pattern(&query) else {
            self.state
                .update(|s| {
                    s.results = Remote::NotAsked;
                    s.last_search = None;
                })
                .await;
            return;
        };

        self.ctx.analytics.emit(AnalyticsEvent::flight_search(query.trim()));
        self.state
            .update(|s| {
                s.results = Remote::Loading;
                s.last_search = Some(pattern.clone());
            })
            .await;

        let result = self.ctx.catalog.search_flights(&pattern).await;
        self.state
            .update(|s| {
                s.results = match result {
                    Ok(flights) => Remote::Loaded(flights),
                    Err(e) => {
                        warn!("Flight search for {} failed: {}", pattern, e);
                        Remote::Failed(SEARCH_FAILED.to_string())
                    }
                }
            })
            .await;
    }

    /// Replays the last search; on failure the previous results stay.
    async fn refresh(&self) {
        let Some(pattern) = self.state.read(|s| s.last_search.clone()).await else {
            return;
        };
        match self.ctx.catalog.search_flights(&pattern).await {
            Ok(flights) => {
                self.state.update(|s| s.results = Remote::Loaded(flights)).await;
            }
            Err(e) => warn!("Refreshing search {} failed: {}", pattern, e),
        }
    }

    fn restart_timer(&self) {
        let poll_idle = self.ctx.refresh.poll_idle_tracker;
        let state = self.state.clone();
        let this = self.clone();
        self.timer.restart(
            self.state.liveness(),
            self.ctx.refresh.interval(),
            move || {
                let state = state.clone();
                async move { poll_idle || state.read(|s| s.last_search.is_some()).await }
            },
            move || {
                let this = this.clone();
                async move { this.refresh().await }
            },
        );
    }

    /// The tracked set is emptied as soon as the identity differs from the
    /// one it was loaded for, whether or not the reload succeeds.
    async fn load_tracked(&self) {
        let user = self.ctx.session.identity().map(|identity| identity.id);
        self.state
            .update(|s| {
                if s.tracked_for != user {
                    s.tracked.clear();
                    s.tracked_for = user;
                }
            })
            .await;
        let Some(user_id) = user else {
            return;
        };
        match self.ctx.catalog.tracked_flight_ids(user_id).await {
            Ok(ids) => {
                self.state
                    .update(|s| {
                        if s.tracked_for == Some(user_id) {
                            s.tracked = ids.into_iter().collect();
                        }
                    })
                    .await;
            }
            Err(e) => warn!("Failed to load tracked flights: {}", e),
        }
    }

    pub async fn track(&self, flight_id: Uuid) -> AppResult<()> {
        let user_id = self.require_identity().await?;
        if let Err(e) = self.ctx.catalog.track(user_id, flight_id).await {
            warn!("Tracking {} failed: {}", flight_id, e);
            self.state.update(|s| s.notice = Some(TRACKING_FAILED.to_string())).await;
            return Err(e.into());
        }

        let number = self
            .state
            .read(|s| {
                s.results
                    .value()
                    .and_then(|flights| flights.iter().find(|f| f.id == flight_id))
                    .map(|f| f.flight_number.clone())
            })
            .await;
        if let Some(number) = number {
            info!("Tracking flight {}", number);
            self.ctx.analytics.emit(AnalyticsEvent::flight_tracking(&number));
        }
        self.state
            .update(|s| {
                if s.tracked_for != Some(user_id) {
                    s.tracked.clear();
                    s.tracked_for = Some(user_id);
                }
                s.tracked.insert(flight_id);
                s.notice = None;
            })
            .await;
        Ok(())
    }

    pub async fn untrack(&self, flight_id: Uuid) -> AppResult<()> {
        let user_id = self.require_identity().await?;
        if let Err(e) = self.ctx.catalog.untrack(user_id, flight_id).await {
            warn!("Untracking {} failed: {}", flight_id, e);
            self.state.update(|s| s.notice = Some(TRACKING_FAILED.to_string())).await;
            return Err(e.into());
        }
        self.state
            .update(|s| {
                s.tracked.remove(&flight_id);
                s.notice = None;
            })
            .await;
        Ok(())
    }

    pub async fn toggle_tracking(&self, flight_id: Uuid) -> AppResult<()> {
        if self.is_tracked(flight_id).await {
            self.untrack(flight_id).await
        } else {
            self.track(flight_id).await
        }
    }

    pub async fn is_tracked(&self, flight_id: Uuid) -> bool {
        let user = self.ctx.session.identity().map(|identity| identity.id);
        self.state
            .read(|s| user.is_some() && s.tracked_for == user && s.tracked.contains(&flight_id))
            .await
    }

    pub async fn result_at(&self, index: usize) -> Option<Uuid> {
        self.state
            .read(|s| s.results.value().and_then(|flights| flights.get(index)).map(|f| f.id))
            .await
    }

    async fn require_identity(&self) -> AppResult<Uuid> {
        match self.ctx.session.identity() {
            Some(identity) => Ok(identity.id),
            None => {
                let guard = GuardError::SignInToTrack;
                self.state.update(|s| s.notice = Some(guard.to_string())).await;
                Err(AppError::Guard(guard))
            }
        }
    }

    pub async fn render(&self) -> TrackerView {
        let state = self.state.snapshot().await;
        let user = self.ctx.session.identity().map(|identity| identity.id);
        let owned = user.is_some() && state.tracked_for == user;
        let results = state
            .results
            .value()
            .map(|flights| {
                flights
                    .iter()
                    .map(|flight| FlightCard::new(flight, owned && state.tracked.contains(&flight.id)))
                    .collect()
            })
            .unwrap_or_default();

        TrackerView {
            query: state.query,
            loading: state.results.is_loading(),
            error: state.results.error().map(str::to_string),
            results,
            signed_in: user.is_some(),
            notice: state.notice,
        }
    }

    pub fn unmount(&self) {
        self.state.unmount();
        self.timer.stop();
    }
}
