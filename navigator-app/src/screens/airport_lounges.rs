use navigator_shared::{AnalyticsEvent, Lounge, OperatingHours};
use serde::Serialize;
use tracing::warn;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Remote, ScreenState};
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

#[derive(Debug, Clone, Default)]
struct LoungesState {
    lounges: Remote<Vec<Lounge>>,
    open: Option<Uuid>,
    premium_prompt: bool,
}

/// A lounge as listed. Premium lounges seen while signed out only show what
/// is needed to find them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoungeCard {
    Open {
        id: Uuid,
        name: String,
        airline: Option<String>,
        location: String,
        amenities: Vec<String>,
        hours: OperatingHours,
        access_requirements: String,
        premium: bool,
        rating: Option<f64>,
        image_url: Option<String>,
    },
    Locked {
        id: Uuid,
        name: String,
        location: String,
    },
}

impl LoungeCard {
    pub fn new(lounge: &Lounge, signed_in: bool) -> Self {
        if lounge.is_premium && !signed_in {
            return LoungeCard::Locked {
                id: lounge.id,
                name: lounge.name.clone(),
                location: lounge.location.clone(),
            };
        }
        LoungeCard::Open {
            id: lounge.id,
            name: lounge.name.clone(),
            airline: lounge.airline.clone(),
            location: lounge.location.clone(),
            amenities: lounge.amenities.clone(),
            hours: lounge.operating_hours.clone(),
            access_requirements: lounge.access_requirements.clone(),
            premium: lounge.is_premium,
            rating: lounge.rating,
            image_url: lounge.image_url.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LoungeCard::Open { id, .. } | LoungeCard::Locked { id, .. } => *id,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, LoungeCard::Locked { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoungesView {
    pub loading: bool,
    pub error: Option<String>,
    pub lounges: Vec<LoungeCard>,
    pub open: Option<LoungeCard>,
    /// "Sign in to unlock premium lounges"
    pub premium_prompt: bool,
}

/// Lounges tab of an airport.
#[derive(Clone)]
pub struct AirportLounges {
    ctx: AppContext,
    airport_id: Uuid,
    state: ScreenState<LoungesState>,
}

impl AirportLounges {
    pub fn new(ctx: AppContext, airport_id: Uuid) -> Self {
        Self { ctx, airport_id, state: ScreenState::new(LoungesState::default()) }
    }

    /// Tab of a mounted airport page; goes away with `parent`.
    pub fn within(ctx: AppContext, airport_id: Uuid, parent: &CancellationToken) -> Self {
        Self { ctx, airport_id, state: ScreenState::child_of(LoungesState::default(), parent) }
    }

    pub async fn activate(&self) {
        self.state.update(|s| s.lounges = Remote::Loading).await;
        let result = self.ctx.catalog.lounges(self.airport_id).await;
        self.state
            .update(|s| {
                s.lounges = match result {
                    Ok(lounges) => Remote::Loaded(lounges),
                    Err(e) => {
                        warn!("Failed to load lounges of {}: {}", self.airport_id, e);
                        Remote::Failed("Failed to load airport lounges".to_string())
                    }
                }
            })
            .await;
    }

    /// Opening a premium lounge while signed out raises the premium prompt
    /// instead.
    pub async fn open_lounge(&self, lounge_id: Uuid) -> AppResult<()> {
        let lounge = self
            .state
            .read(|s| s.lounges.value().and_then(|all| all.iter().find(|l| l.id == lounge_id).cloned()))
            .await
            .ok_or_else(|| AppError::unavailable("Lounge not found"))?;

        if lounge.is_premium && !self.ctx.session.is_signed_in() {
            self.state.update(|s| s.premium_prompt = true).await;
            return Ok(());
        }

        self.state.update(|s| s.open = Some(lounge_id)).await;
        self.ctx.analytics.emit(AnalyticsEvent::lounge_view(&lounge.name));
        Ok(())
    }

    pub async fn lounge_at(&self, index: usize) -> Option<Uuid> {
        self.state
            .read(|s| s.lounges.value().and_then(|all| all.get(index)).map(|l| l.id))
            .await
    }

    pub async fn close(&self) {
        self.state
            .update(|s| {
                s.open = None;
                s.premium_prompt = false;
            })
            .await;
    }

    pub async fn render(&self) -> LoungesView {
        let state = self.state.snapshot().await;
        let signed_in = self.ctx.session.is_signed_in();
        let lounges: Vec<LoungeCard> = state
            .lounges
            .value()
            .map(|all| all.iter().map(|lounge| LoungeCard::new(lounge, signed_in)).collect())
            .unwrap_or_default();
        // The identity may have gone away since the lounge was opened.
        let open = state
            .open
            .and_then(|id| lounges.iter().find(|card| card.id() == id))
            .filter(|card| !card.is_locked())
            .cloned();

        LoungesView {
            loading: state.lounges.is_loading(),
            error: state.lounges.error().map(str::to_string),
            lounges,
            open,
            premium_prompt: state.premium_prompt,
        }
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }
}
