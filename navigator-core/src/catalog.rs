use std::sync::Arc;

use navigator_shared::{
    Airport, AirportMap, Flight, Lounge, SubscriptionTier, Terminal, TrackedFlight, WithRelated,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::gateway::{decode_rows, Collection, Filter, Query, Relation, RemoteGateway};
use crate::{GatewayError, GatewayResult};

pub type FlightWithAirport = WithRelated<Flight, Airport>;
pub type MapWithTerminal = WithRelated<AirportMap, Terminal>;

const FLIGHT_AIRPORT: Relation = Relation { foreign_key: "airport_id", collection: Collection::Airports };
const MAP_TERMINAL: Relation = Relation { foreign_key: "terminal_id", collection: Collection::Terminals };

/// Fields matched by the flight search.
pub const FLIGHT_SEARCH_FIELDS: [&str; 3] = ["flight_number", "origin", "destination"];
pub const AIRPORT_FLIGHT_LIMIT: usize = 10;
pub const FLIGHT_SEARCH_LIMIT: usize = 20;

/// Typed access to the collections the screens read and write.
#[derive(Clone)]
pub struct Catalog {
    gateway: Arc<dyn RemoteGateway>,
}

impl Catalog {
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn RemoteGateway> {
        &self.gateway
    }

    /// All airports, ordered by name.
    pub async fn airports(&self) -> GatewayResult<Vec<Airport>> {
        let query = Query::new().order_by("name", true);
        decode_rows(self.gateway.fetch_many(Collection::Airports, &query).await?)
    }

    pub async fn terminals(&self, airport_id: Uuid) -> GatewayResult<Vec<Terminal>> {
        let query = Query::new()
            .filter(Filter::eq("airport_id", airport_id.to_string()))
            .order_by("name", true);
        decode_rows(self.gateway.fetch_many(Collection::Terminals, &query).await?)
    }

    /// Next flights of an airport by departure time.
    pub async fn airport_flights(&self, airport_id: Uuid) -> GatewayResult<Vec<Flight>> {
        let query = Query::new()
            .filter(Filter::eq("airport_id", airport_id.to_string()))
            .order_by("departure_time", true)
            .limit(AIRPORT_FLIGHT_LIMIT);
        decode_rows(self.gateway.fetch_many(Collection::Flights, &query).await?)
    }

    /// Flights whose number, origin or destination contains `pattern`.
    pub async fn search_flights(&self, pattern: &str) -> GatewayResult<Vec<FlightWithAirport>> {
        let query = Query::new()
            .filter(Filter::any_ilike(&FLIGHT_SEARCH_FIELDS, pattern))
            .order_by("departure_time", true)
            .limit(FLIGHT_SEARCH_LIMIT);
        let rows = self
            .gateway
            .fetch_related(Collection::Flights, &FLIGHT_AIRPORT, &query)
            .await?;
        decode_rows(rows)
    }

    /// Standard lounges first, best rated first within each group.
    pub async fn lounges(&self, airport_id: Uuid) -> GatewayResult<Vec<Lounge>> {
        let query = Query::new()
            .filter(Filter::eq("airport_id", airport_id.to_string()))
            .order_by("is_premium", true)
            .order_by("rating", false);
        decode_rows(self.gateway.fetch_many(Collection::Lounges, &query).await?)
    }

    pub async fn maps(&self, airport_id: Uuid) -> GatewayResult<Vec<MapWithTerminal>> {
        let query = Query::new()
            .filter(Filter::eq("airport_id", airport_id.to_string()))
            .order_by("map_type", true);
        let rows = self
            .gateway
            .fetch_related(Collection::Maps, &MAP_TERMINAL, &query)
            .await?;
        decode_rows(rows)
    }

    pub async fn tracked_flight_ids(&self, user_id: Uuid) -> GatewayResult<Vec<Uuid>> {
        #[derive(Deserialize)]
        struct Link {
            flight_id: Uuid,
        }

        let query = Query::new().filter(Filter::eq("user_id", user_id.to_string()));
        let links: Vec<Link> =
            decode_rows(self.gateway.fetch_many(Collection::TrackedFlights, &query).await?)?;
        Ok(links.into_iter().map(|link| link.flight_id).collect())
    }

    pub async fn flights_by_ids(&self, ids: &[Uuid]) -> GatewayResult<Vec<FlightWithAirport>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .filter(Filter::is_in("id", ids.iter().map(Uuid::to_string)))
            .order_by("departure_time", true);
        let rows = self
            .gateway
            .fetch_related(Collection::Flights, &FLIGHT_AIRPORT, &query)
            .await?;
        decode_rows(rows)
    }

    /// Link a flight to a user. An existing link counts as success.
    pub async fn track(&self, user_id: Uuid, flight_id: Uuid) -> GatewayResult<()> {
        let record = serde_json::to_value(TrackedFlight::new(user_id, flight_id))?;
        match self.gateway.insert(Collection::TrackedFlights, record).await {
            Ok(()) => Ok(()),
            Err(GatewayError::Conflict(_)) => {
                tracing::debug!("Flight {} already tracked by {}", flight_id, user_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the link; removing a missing link is a no-op.
    pub async fn untrack(&self, user_id: Uuid, flight_id: Uuid) -> GatewayResult<()> {
        let filters = [
            Filter::eq("user_id", user_id.to_string()),
            Filter::eq("flight_id", flight_id.to_string()),
        ];
        self.gateway.delete_where(Collection::TrackedFlights, &filters).await
    }

    /// Active tiers, cheapest first.
    pub async fn subscription_tiers(&self) -> GatewayResult<Vec<SubscriptionTier>> {
        let query = Query::new()
            .filter(Filter::eq("is_active", true))
            .order_by("price_monthly", true);
        decode_rows(self.gateway.fetch_many(Collection::SubscriptionTiers, &query).await?)
    }
}
