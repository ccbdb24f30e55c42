use std::sync::Arc;

use navigator_core::search::filter_airports;
use navigator_shared::{Airport, AnalyticsEvent, Flight, Terminal, WithRelated};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::{AirportLounges, AirportMaps, FlightCard, Remote, ScreenState};
use super::airport_lounges::LoungesView;
use super::airport_maps::MapsView;
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Maps,
    Lounges,
}

#[derive(Debug, Clone)]
struct Selection {
    airport: Airport,
    terminals: Remote<Vec<Terminal>>,
    flights: Remote<Vec<Flight>>,
    tab: Tab,
}

#[derive(Debug, Clone, Default)]
struct SearchState {
    airports: Remote<Vec<Airport>>,
    query: String,
    selected: Option<Selection>,
}

enum TabScreen {
    Maps(AirportMaps),
    Lounges(AirportLounges),
}

impl TabScreen {
    fn unmount(&self) {
        match self {
            TabScreen::Maps(maps) => maps.unmount(),
            TabScreen::Lounges(lounges) => lounges.unmount(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "lowercase")]
pub enum TabView {
    Overview {
        terminals: Vec<Terminal>,
        flights: Vec<FlightCard>,
        loading: bool,
        error: Option<String>,
    },
    Maps(MapsView),
    Lounges(LoungesView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportDetailView {
    pub airport: Airport,
    pub tab: TabView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportSearchView {
    pub query: String,
    pub loading: bool,
    pub error: Option<String>,
    pub airports: Vec<Airport>,
    pub selected: Option<AirportDetailView>,
}

/// Airport list with local search, and the detail page of one airport.
#[derive(Clone)]
pub struct AirportSearch {
    ctx: AppContext,
    state: ScreenState<SearchState>,
    tab: Arc<Mutex<Option<TabScreen>>>,
}

impl AirportSearch {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: ScreenState::new(SearchState::default()),
            tab: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn activate(&self) {
        self.state.update(|s| s.airports = Remote::Loading).await;
        let result = self.ctx.catalog.airports().await;
        self.state
            .update(|s| {
                s.airports = match result {
                    Ok(airports) => Remote::Loaded(airports),
                    Err(e) => {
                        warn!("Failed to load airports: {}", e);
                        Remote::Failed("Failed to load airports".to_string())
                    }
                }
            })
            .await;
    }

    /// Filters the loaded list; no request is made.
    pub async fn set_query(&self, query: &str) {
        self.state.update(|s| s.query = query.to_string()).await;
    }

    /// Airports matching the current query.
    pub async fn visible_airports(&self) -> Vec<Airport> {
        self.state
            .read(|s| {
                s.airports
                    .value()
                    .map(|all| filter_airports(all, &s.query))
                    .unwrap_or_default()
            })
            .await
    }

    /// Open an airport; its terminals and flights load concurrently and land
    /// together.
    pub async fn select_airport(&self, airport_id: Uuid) -> AppResult<()> {
        let airport = self
            .state
            .read(|s| s.airports.value().and_then(|all| all.iter().find(|a| a.id == airport_id).cloned()))
            .await
            .ok_or_else(|| AppError::unavailable("Airport not found"))?;

        self.close_tab().await;
        info!("Opening airport {}", airport.code);
        self.ctx.analytics.emit(AnalyticsEvent::airport_view(&airport.name));

        let selection = Selection {
            airport,
            terminals: Remote::Loading,
            flights: Remote::Loading,
            tab: Tab::Overview,
        };
        self.state.update(|s| s.selected = Some(selection)).await;

        let (terminals, flights) = tokio::join!(
            self.ctx.catalog.terminals(airport_id),
            self.ctx.catalog.airport_flights(airport_id),
        );

        self.state
            .update(|s| {
                let Some(selected) = s.selected.as_mut().filter(|sel| sel.airport.id == airport_id) else {
                    return;
                };
                selected.terminals = match terminals {
                    Ok(terminals) => Remote::Loaded(terminals),
                    Err(e) => {
                        warn!("Failed to load terminals: {}", e);
                        Remote::Failed("Failed to load terminals".to_string())
                    }
                };
                selected.flights = match flights {
                    Ok(flights) => Remote::Loaded(flights),
                    Err(e) => {
                        warn!("Failed to load flights: {}", e);
                        Remote::Failed("Failed to load flights".to_string())
                    }
                };
            })
            .await;
        Ok(())
    }

    pub async fn back(&self) {
        self.close_tab().await;
        self.state.update(|s| s.selected = None).await;
    }

    pub async fn open_tab(&self, tab: Tab) -> AppResult<()> {
        let airport_id = self
            .state
            .read(|s| s.selected.as_ref().map(|sel| sel.airport.id))
            .await
            .ok_or_else(|| AppError::unavailable("Select an airport first"))?;

        self.close_tab().await;
        self.state
            .update(|s| {
                if let Some(selected) = s.selected.as_mut() {
                    selected.tab = tab;
                }
            })
            .await;

        match tab {
            Tab::Overview => {}
            Tab::Maps => {
                let maps = AirportMaps::within(self.ctx.clone(), airport_id, self.state.liveness());
                *self.tab.lock().await = Some(TabScreen::Maps(maps.clone()));
                maps.activate().await;
            }
            Tab::Lounges => {
                let lounges = AirportLounges::within(self.ctx.clone(), airport_id, self.state.liveness());
                *self.tab.lock().await = Some(TabScreen::Lounges(lounges.clone()));
                lounges.activate().await;
            }
        }
        Ok(())
    }

    pub async fn maps(&self) -> Option<AirportMaps> {
        match &*self.tab.lock().await {
            Some(TabScreen::Maps(maps)) => Some(maps.clone()),
            _ => None,
        }
    }

    pub async fn lounges(&self) -> Option<AirportLounges> {
        match &*self.tab.lock().await {
            Some(TabScreen::Lounges(lounges)) => Some(lounges.clone()),
            _ => None,
        }
    }

    async fn close_tab(&self) {
        if let Some(previous) = self.tab.lock().await.take() {
            previous.unmount();
        }
    }

    pub async fn render(&self) -> AirportSearchView {
        let state = self.state.snapshot().await;
        let airports = state
            .airports
            .value()
            .map(|all| filter_airports(all, &state.query))
            .unwrap_or_default();

        let selected = match state.selected {
            Some(selected) => {
                let tab = match selected.tab {
                    Tab::Overview => overview(&selected),
                    Tab::Maps => match self.maps().await {
                        Some(maps) => TabView::Maps(maps.render().await),
                        None => overview(&selected),
                    },
                    Tab::Lounges => match self.lounges().await {
                        Some(lounges) => TabView::Lounges(lounges.render().await),
                        None => overview(&selected),
                    },
                };
                Some(AirportDetailView { airport: selected.airport, tab })
            }
            None => None,
        };

        AirportSearchView {
            query: state.query,
            loading: state.airports.is_loading(),
            error: state.airports.error().map(str::to_string),
            airports,
            selected,
        }
    }

    /// Also unmounts the open tab, whose state hangs off this screen's.
    pub fn unmount(&self) {
        self.state.unmount();
    }
}

fn overview(selected: &Selection) -> TabView {
    let airport = Some(selected.airport.clone());
    let flights = selected
        .flights
        .value()
        .map(|flights| {
            flights
                .iter()
                .map(|flight| FlightCard::new(&WithRelated::new(flight.clone(), airport.clone()), false))
                .collect()
        })
        .unwrap_or_default();

    TabView::Overview {
        terminals: selected.terminals.value().cloned().unwrap_or_default(),
        flights,
        loading: selected.terminals.is_loading() || selected.flights.is_loading(),
        error: selected
            .terminals
            .error()
            .or(selected.flights.error())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::gateway::Collection;
    use navigator_core::MockAuthProvider;
    use navigator_store::InMemoryGateway;
    use serde_json::json;
    use std::time::Duration;

    const JFK: &str = "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11";

    async fn screen() -> (Arc<InMemoryGateway>, AirportSearch) {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway
            .seed(
                Collection::Airports,
                [
                    json!({ "id": JFK, "code": "JFK", "name": "John F. Kennedy International", "city": "New York", "country": "United States", "timezone": "America/New_York" }),
                    json!({ "id": Uuid::new_v4(), "code": "LAX", "name": "Los Angeles International", "city": "Los Angeles", "country": "United States", "timezone": "America/Los_Angeles" }),
                ],
            )
            .await;
        gateway
            .seed(
                Collection::Terminals,
                [json!({ "id": Uuid::new_v4(), "airport_id": JFK, "name": "Terminal 4", "description": "International" })],
            )
            .await;
        let ctx = AppContext::new(gateway.clone(), Arc::new(MockAuthProvider::new("secret")));
        (gateway, AirportSearch::new(ctx))
    }

    #[tokio::test]
    async fn test_query_filters_locally() {
        let (gateway, screen) = screen().await;
        screen.activate().await;
        let calls = gateway.calls();

        screen.set_query("jfk").await;
        let view = screen.render().await;
        assert_eq!(view.airports.len(), 1);
        assert_eq!(view.airports[0].code, "JFK");

        screen.set_query("   ").await;
        assert_eq!(screen.render().await.airports.len(), 2);
        assert_eq!(gateway.calls(), calls);
    }

    #[tokio::test]
    async fn test_select_loads_terminals_and_flights() {
        let (_, screen) = screen().await;
        screen.activate().await;
        screen.select_airport(JFK.parse().unwrap()).await.unwrap();

        let view = screen.render().await;
        let detail = view.selected.unwrap();
        assert_eq!(detail.airport.code, "JFK");
        match detail.tab {
            TabView::Overview { terminals, flights, loading, error } => {
                assert_eq!(terminals[0].name, "Terminal 4");
                assert!(flights.is_empty());
                assert!(!loading);
                assert!(error.is_none());
            }
            other => panic!("unexpected tab {:?}", other),
        }

        screen.back().await;
        assert!(screen.render().await.selected.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmounted_screen_ignores_late_results() {
        let (gateway, screen) = screen().await;
        screen.activate().await;
        gateway.set_latency(Some(Duration::from_secs(5)));

        let pending = {
            let screen = screen.clone();
            tokio::spawn(async move { screen.select_airport(JFK.parse().unwrap()).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        screen.unmount();
        pending.await.unwrap().unwrap();

        let view = screen.render().await;
        let detail = view.selected.unwrap();
        assert!(matches!(detail.tab, TabView::Overview { loading: true, .. }));
    }

    #[tokio::test]
    async fn test_unmount_reaches_open_tab() {
        let (gateway, screen) = screen().await;
        let lounge_id = Uuid::new_v4();
        gateway
            .seed(
                Collection::Lounges,
                [json!({
                    "id": lounge_id, "airport_id": JFK, "terminal_id": null, "name": "Open Lounge",
                    "airline": null, "location": "Terminal 4", "amenities": [],
                    "operating_hours": { "open": "06:00", "close": "23:00" },
                    "access_requirements": "", "is_premium": false, "rating": 4.0, "image_url": null
                })],
            )
            .await;
        screen.activate().await;
        screen.select_airport(JFK.parse().unwrap()).await.unwrap();
        screen.open_tab(Tab::Lounges).await.unwrap();
        let lounges = screen.lounges().await.unwrap();

        // A render in progress holds the tab slot.
        let slot = screen.tab.lock().await;
        screen.unmount();
        drop(slot);

        lounges.open_lounge(lounge_id).await.unwrap();
        assert!(lounges.render().await.open.is_none());
    }
}
