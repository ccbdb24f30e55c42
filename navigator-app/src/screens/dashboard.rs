use chrono::{DateTime, Utc};
use navigator_core::catalog::FlightWithAirport;
use navigator_core::schedule::{partition_by_departure, time_until_departure};
use navigator_core::{GatewayError, GuardError};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{follow_identity, FlightCard, Remote, ScreenState};
use crate::error::{AppError, AppResult};
use crate::refresh::RefreshSlot;
use crate::state::AppContext;

const IDS_FAILED: &str = "Failed to load your tracked flights";
const DETAILS_FAILED: &str = "Failed to load flight details";

#[derive(Debug, Clone, Default)]
struct DashboardState {
    /// Identity the flights were loaded for.
    owner: Option<Uuid>,
    flights: Remote<Vec<FlightWithAirport>>,
    notice: Option<String>,
    notifications: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub tracked: usize,
    pub upcoming: usize,
    pub delayed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFlight {
    #[serde(flatten)]
    pub card: FlightCard,
    pub countdown: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// `false` renders the "please sign in" placeholder.
    pub signed_in: bool,
    pub greeting: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub counts: Counts,
    pub upcoming: Vec<DashboardFlight>,
    pub past: Vec<DashboardFlight>,
    pub notice: Option<String>,
    pub notifications_enabled: bool,
}

/// The signed-in user's tracked flights.
#[derive(Clone)]
pub struct Dashboard {
    ctx: AppContext,
    state: ScreenState<DashboardState>,
    timer: RefreshSlot,
}

impl Dashboard {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: ScreenState::new(DashboardState::default()),
            timer: RefreshSlot::new(),
        }
    }

    pub async fn activate(&self) {
        let this = self.clone();
        follow_identity(&self.ctx.session, self.state.liveness().clone(), move || {
            let this = this.clone();
            async move {
                this.load().await;
                this.restart_timer();
            }
        });

        self.load().await;
        self.restart_timer();
    }

    /// Full load with a loading state and error messages.
    pub async fn load(&self) {
        let Some(identity) = self.ctx.session.identity() else {
            self.state
                .update(|s| {
                    s.owner = None;
                    s.flights = Remote::NotAsked;
                })
                .await;
            return;
        };
        let user_id = identity.id;
        self.state
            .update(|s| {
                s.owner = Some(user_id);
                s.flights = Remote::Loading;
            })
            .await;
        let result = self.fetch(user_id).await;
        if !self.is_current(user_id) {
            debug!("Dropping dashboard load of a previous identity");
            return;
        }
        self.state
            .update(|s| {
                if s.owner != Some(user_id) {
                    return;
                }
                s.flights = match result {
                    Ok(flights) => Remote::Loaded(flights),
                    Err(message) => Remote::Failed(message.to_string()),
                }
            })
            .await;
    }

    /// Background reload; on failure the previous list stays.
    async fn refresh(&self) {
        let Some(identity) = self.ctx.session.identity() else {
            return;
        };
        let user_id = identity.id;
        match self.fetch(user_id).await {
            Ok(flights) if self.is_current(user_id) => {
                self.state
                    .update(|s| {
                        if s.owner == Some(user_id) {
                            s.flights = Remote::Loaded(flights);
                        }
                    })
                    .await;
            }
            Ok(_) => debug!("Dropping dashboard refresh of a previous identity"),
            Err(message) => warn!("Dashboard refresh: {}", message),
        }
    }

    fn is_current(&self, user_id: Uuid) -> bool {
        self.ctx.session.identity().map(|identity| identity.id) == Some(user_id)
    }

    async fn fetch(&self, user_id: Uuid) -> Result<Vec<FlightWithAirport>, &'static str> {
        let ids = self
            .ctx
            .catalog
            .tracked_flight_ids(user_id)
            .await
            .map_err(|e| log_failure(IDS_FAILED, e))?;
        self.ctx
            .catalog
            .flights_by_ids(&ids)
            .await
            .map_err(|e| log_failure(DETAILS_FAILED, e))
    }

    fn restart_timer(&self) {
        let poll_signed_out = self.ctx.refresh.poll_signed_out_dashboard;
        let session = self.ctx.session.clone();
        let this = self.clone();
        self.timer.restart(
            self.state.liveness(),
            self.ctx.refresh.interval(),
            move || futures_util::future::ready(poll_signed_out || session.is_signed_in()),
            move || {
                let this = this.clone();
                async move { this.refresh().await }
            },
        );
    }

    pub async fn untrack(&self, flight_id: Uuid) -> AppResult<()> {
        let Some(identity) = self.ctx.session.identity() else {
            let guard = GuardError::SignInToTrack;
            self.state.update(|s| s.notice = Some(guard.to_string())).await;
            return Err(guard.into());
        };
        if let Err(e) = self.ctx.catalog.untrack(identity.id, flight_id).await {
            warn!("Untracking {} failed: {}", flight_id, e);
            self.state
                .update(|s| s.notice = Some("Failed to update flight tracking".to_string()))
                .await;
            return Err(e.into());
        }
        self.state
            .update(|s| {
                if let Some(flights) = s.flights.value_mut() {
                    flights.retain(|flight| flight.id != flight_id);
                }
                s.notice = None;
            })
            .await;
        Ok(())
    }

    /// Ask for push permission and subscribe with the configured key.
    pub async fn enable_notifications(&self) -> AppResult<bool> {
        let Some(key) = self.ctx.push_key.clone() else {
            return Err(AppError::unavailable("Notifications are not configured"));
        };
        if !self.ctx.push.request_permission().await {
            info!("Notification permission denied");
            return Ok(false);
        }
        let subscribed = self.ctx.push.subscribe(&key).await.is_some();
        self.state.update(|s| s.notifications = subscribed).await;
        Ok(subscribed)
    }

    pub async fn flight_at(&self, index: usize) -> Option<Uuid> {
        self.state
            .read(|s| s.flights.value().and_then(|flights| flights.get(index)).map(|f| f.id))
            .await
    }

    pub async fn render(&self) -> DashboardView {
        self.render_at(Utc::now()).await
    }

    pub async fn render_at(&self, now: DateTime<Utc>) -> DashboardView {
        let state = self.state.snapshot().await;
        let identity = self.ctx.session.identity();
        // Nothing loaded for a previous identity is shown.
        let current = identity.as_ref().map(|identity| identity.id).is_some_and(|id| state.owner == Some(id));
        let flights = if current {
            state.flights.value().cloned().unwrap_or_default()
        } else {
            Vec::new()
        };
        let partition = partition_by_departure(&flights, now);

        let row = |flight: &FlightWithAirport| DashboardFlight {
            card: FlightCard::new(flight, true),
            countdown: time_until_departure(flight.departure_time, now),
        };

        DashboardView {
            signed_in: identity.is_some(),
            greeting: identity.map(|identity| identity.display_name.unwrap_or(identity.email)),
            loading: current && state.flights.is_loading(),
            error: state.flights.error().filter(|_| current).map(str::to_string),
            counts: Counts {
                tracked: flights.len(),
                upcoming: partition.upcoming.len(),
                delayed: partition.delayed_upcoming().count(),
            },
            upcoming: partition.upcoming.iter().map(row).collect(),
            past: partition.past.iter().map(row).collect(),
            notice: state.notice,
            notifications_enabled: state.notifications,
        }
    }

    pub fn unmount(&self) {
        self.state.unmount();
        self.timer.stop();
    }
}

fn log_failure(message: &'static str, err: GatewayError) -> &'static str {
    warn!("{}: {}", message, err);
    message
}
