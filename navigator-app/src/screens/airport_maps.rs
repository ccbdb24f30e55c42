use navigator_core::catalog::MapWithTerminal;
use navigator_shared::AnalyticsEvent;
use serde::Serialize;
use tracing::warn;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Remote, ScreenState};
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

#[derive(Debug, Clone, Default)]
struct MapsState {
    maps: Remote<Vec<MapWithTerminal>>,
    open: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCard {
    pub id: Uuid,
    pub label: &'static str,
    pub terminal: Option<String>,
    pub floor_level: String,
    pub map_url: String,
}

impl From<&MapWithTerminal> for MapCard {
    fn from(map: &MapWithTerminal) -> Self {
        Self {
            id: map.id,
            label: map.map_type.label(),
            terminal: map.related.as_ref().map(|terminal| terminal.name.clone()),
            floor_level: map.floor_level.clone(),
            map_url: map.map_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapsView {
    pub loading: bool,
    pub error: Option<String>,
    pub maps: Vec<MapCard>,
    pub open: Option<MapCard>,
}

/// Maps tab of an airport.
#[derive(Clone)]
pub struct AirportMaps {
    ctx: AppContext,
    airport_id: Uuid,
    state: ScreenState<MapsState>,
}

impl AirportMaps {
    pub fn new(ctx: AppContext, airport_id: Uuid) -> Self {
        Self { ctx, airport_id, state: ScreenState::new(MapsState::default()) }
    }

    /// Tab of a mounted airport page; goes away with `parent`.
    pub fn within(ctx: AppContext, airport_id: Uuid, parent: &CancellationToken) -> Self {
        Self { ctx, airport_id, state: ScreenState::child_of(MapsState::default(), parent) }
    }

    pub async fn activate(&self) {
        self.state.update(|s| s.maps = Remote::Loading).await;
        let result = self.ctx.catalog.maps(self.airport_id).await;
        self.state
            .update(|s| {
                s.maps = match result {
                    Ok(maps) => Remote::Loaded(maps),
                    Err(e) => {
                        warn!("Failed to load maps of {}: {}", self.airport_id, e);
                        Remote::Failed("Failed to load airport maps".to_string())
                    }
                }
            })
            .await;
    }

    pub async fn open_map(&self, map_id: Uuid) -> AppResult<()> {
        let label = self
            .state
            .read(|s| {
                s.maps
                    .value()
                    .and_then(|maps| maps.iter().find(|map| map.id == map_id))
                    .map(|map| map.map_type.label())
            })
            .await
            .ok_or_else(|| AppError::unavailable("Map not found"))?;

        self.state.update(|s| s.open = Some(map_id)).await;
        self.ctx.analytics.emit(AnalyticsEvent::map_view(label));
        Ok(())
    }

    /// Id of the `index`-th map as listed.
    pub async fn map_at(&self, index: usize) -> Option<Uuid> {
        self.state
            .read(|s| s.maps.value().and_then(|maps| maps.get(index)).map(|map| map.id))
            .await
    }

    pub async fn close_map(&self) {
        self.state.update(|s| s.open = None).await;
    }

    pub async fn render(&self) -> MapsView {
        let state = self.state.snapshot().await;
        let maps: Vec<MapCard> = state
            .maps
            .value()
            .map(|maps| maps.iter().map(MapCard::from).collect())
            .unwrap_or_default();
        let open = state.open.and_then(|id| maps.iter().find(|card| card.id == id).cloned());
        MapsView {
            loading: state.maps.is_loading(),
            error: state.maps.error().map(str::to_string),
            maps,
            open,
        }
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }
}
