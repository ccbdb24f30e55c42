use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::RwLock as StdRwLock;
use std::time::Duration;

use async_trait::async_trait;
use navigator_core::gateway::{Collection, Filter, Query, Relation, RemoteGateway, Row, RELATED_KEY};
use navigator_core::{GatewayError, GatewayResult};
use navigator_shared::Masked;
use serde_json::Value;
use tokio::sync::RwLock;

/// Process-local data store with the same query semantics as the hosted one.
/// Backs the offline demo and the tests.
#[derive(Default)]
pub struct InMemoryGateway {
    tables: RwLock<HashMap<Collection, Vec<Row>>>,
    failures: StdRwLock<HashMap<Collection, GatewayError>>,
    latency: StdRwLock<Option<Duration>>,
    bearer: StdRwLock<Option<Masked<String>>>,
    calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, collection: Collection, rows: impl IntoIterator<Item = Row>) {
        self.tables
            .write()
            .await
            .entry(collection)
            .or_default()
            .extend(rows);
    }

    pub async fn rows(&self, collection: Collection) -> Vec<Row> {
        self.tables.read().await.get(&collection).cloned().unwrap_or_default()
    }

    /// Every following request against `collection` fails with `error`.
    pub fn fail(&self, collection: Collection, error: GatewayError) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(collection, error);
        }
    }

    pub fn recover(&self, collection: Collection) {
        if let Ok(mut failures) = self.failures.write() {
            failures.remove(&collection);
        }
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.latency.write() {
            *slot = latency;
        }
    }

    /// Number of requests served so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Bearer of the last `authorize` call.
    pub fn bearer(&self) -> Option<Masked<String>> {
        self.bearer.read().ok().and_then(|guard| guard.clone())
    }

    async fn enter(&self, collection: Collection) -> GatewayResult<()> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        let latency = self.latency.read().ok().and_then(|guard| *guard);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self
            .failures
            .read()
            .ok()
            .and_then(|failures| failures.get(&collection).cloned());
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn select(&self, collection: Collection, query: &Query) -> Vec<Row> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|o| compare_field(a.get(&o.field), b.get(&o.field), o.ascending))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows
    }
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn fetch_many(&self, collection: Collection, query: &Query) -> GatewayResult<Vec<Row>> {
        self.enter(collection).await?;
        Ok(self.select(collection, query).await)
    }

    async fn fetch_related(
        &self,
        collection: Collection,
        relation: &Relation,
        query: &Query,
    ) -> GatewayResult<Vec<Row>> {
        self.enter(collection).await?;
        let mut rows = self.select(collection, query).await;

        let tables = self.tables.read().await;
        let targets = tables.get(&relation.collection);
        for row in rows.iter_mut() {
            let related = row
                .get(relation.foreign_key)
                .filter(|key| !key.is_null())
                .and_then(|key| targets?.iter().find(|target| target.get("id") == Some(key)))
                .cloned()
                .unwrap_or(Value::Null);
            if let Some(object) = row.as_object_mut() {
                object.insert(RELATED_KEY.to_string(), related);
            }
        }
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, record: Row) -> GatewayResult<()> {
        self.enter(collection).await?;
        let key = unique_key(collection, &record);
        let mut tables = self.tables.write().await;
        let rows = tables.entry(collection).or_default();

        if rows.iter().any(|row| unique_key(collection, row) == key) {
            return Err(GatewayError::Conflict(format!(
                "duplicate key value violates unique constraint on {}",
                collection.table()
            )));
        }
        rows.push(record);
        Ok(())
    }

    async fn delete_where(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<()> {
        self.enter(collection).await?;
        if let Some(rows) = self.tables.write().await.get_mut(&collection) {
            rows.retain(|row| !filters.iter().all(|f| matches(row, f)));
        }
        Ok(())
    }

    fn authorize(&self, bearer: Option<Masked<String>>) {
        if let Ok(mut slot) = self.bearer.write() {
            *slot = bearer;
        }
    }
}

fn unique_key(collection: Collection, row: &Row) -> Vec<Value> {
    let fields: &[&str] = match collection {
        Collection::TrackedFlights => &["user_id", "flight_id"],
        _ => &["id"],
    };
    fields
        .iter()
        .map(|field| row.get(*field).cloned().unwrap_or(Value::Null))
        .collect()
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => row.get(field) == Some(value),
        Filter::In { field, values } => {
            let wanted: HashSet<String> = values.iter().map(Value::to_string).collect();
            row.get(field).is_some_and(|v| wanted.contains(&v.to_string()))
        }
        Filter::AnyILike { fields, needle } => {
            let needle = needle.to_lowercase();
            fields.iter().any(|field| {
                row.get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        }
    }
}

/// Ascending puts nulls last and descending puts them first, like Postgres.
fn compare_field(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ord = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_values(a, b),
    };
    if ascending {
        ord
    } else {
        ord.reverse()
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::Catalog;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    const JFK: &str = "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11";
    const LHR: &str = "5c1d8a7e-2b3f-4e6a-9c0d-1e2f3a4b5c6d";

    fn airport(id: &str, code: &str, name: &str, city: &str) -> Row {
        json!({
            "id": id, "code": code, "name": name, "city": city,
            "country": "Somewhere", "timezone": "UTC", "latitude": null, "longitude": null
        })
    }

    fn flight(id: Uuid, number: &str, airport_id: &str, departure: Option<&str>, origin: &str) -> Row {
        json!({
            "id": id, "flight_number": number, "airline": "Test Air", "airport_id": airport_id,
            "gate_id": null, "departure_time": departure, "arrival_time": null,
            "status": "on-time", "origin": origin, "destination": "SFO"
        })
    }

    fn lounge(name: &str, premium: bool, rating: Option<f64>) -> Row {
        json!({
            "id": Uuid::new_v4(), "airport_id": JFK, "terminal_id": null, "name": name,
            "airline": null, "location": "Airside", "amenities": ["Wi-Fi"],
            "operating_hours": { "open": "05:00", "close": "23:00" },
            "access_requirements": "", "is_premium": premium, "rating": rating, "image_url": null
        })
    }

    async fn catalog() -> (Arc<InMemoryGateway>, Catalog) {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway
            .seed(
                Collection::Airports,
                [
                    airport(LHR, "LHR", "Heathrow", "London"),
                    airport(JFK, "JFK", "John F. Kennedy International", "New York"),
                ],
            )
            .await;
        (gateway.clone(), Catalog::new(gateway))
    }

    #[tokio::test]
    async fn test_airports_sorted_by_name() {
        let (_, catalog) = catalog().await;
        let airports = catalog.airports().await.unwrap();
        let codes: Vec<_> = airports.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["LHR", "JFK"]);
    }

    #[tokio::test]
    async fn test_airport_flights_limit_and_null_departures_last() {
        let (gateway, catalog) = catalog().await;
        let mut rows = vec![flight(Uuid::new_v4(), "XX0", JFK, None, "JFK")];
        for hour in 0..12 {
            let departure = format!("2025-06-01T{:02}:00:00Z", 23 - hour);
            rows.push(flight(Uuid::new_v4(), &format!("AA{}", hour), JFK, Some(&departure), "JFK"));
        }
        rows.push(flight(Uuid::new_v4(), "BA1", LHR, Some("2025-06-01T00:00:00Z"), "LHR"));
        gateway.seed(Collection::Flights, rows).await;

        let flights = catalog.airport_flights(JFK.parse().unwrap()).await.unwrap();
        assert_eq!(flights.len(), 10);
        assert_eq!(flights[0].flight_number, "AA11");
        assert!(flights.iter().all(|f| f.departure_time.is_some()));
    }

    #[tokio::test]
    async fn test_search_flights_embeds_airport() {
        let (gateway, catalog) = catalog().await;
        gateway
            .seed(
                Collection::Flights,
                [
                    flight(Uuid::new_v4(), "AA100", JFK, Some("2025-06-01T08:00:00Z"), "JFK"),
                    flight(Uuid::new_v4(), "BA117", LHR, Some("2025-06-01T09:00:00Z"), "LHR"),
                ],
            )
            .await;

        let found = catalog.search_flights("aa1").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].related.as_ref().unwrap().code, "JFK");

        let by_origin = catalog.search_flights("LHR").await.unwrap();
        assert_eq!(by_origin[0].flight_number, "BA117");
    }

    #[tokio::test]
    async fn test_lounges_standard_first_then_rating() {
        let (gateway, catalog) = catalog().await;
        gateway
            .seed(
                Collection::Lounges,
                [
                    lounge("First Class", true, Some(4.9)),
                    lounge("Unrated", false, None),
                    lounge("Club", false, Some(4.1)),
                    lounge("Priority", false, Some(4.6)),
                ],
            )
            .await;

        let lounges = catalog.lounges(JFK.parse().unwrap()).await.unwrap();
        let names: Vec<_> = lounges.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Unrated", "Priority", "Club", "First Class"]);
    }

    #[tokio::test]
    async fn test_track_is_idempotent_and_untrack_removes() {
        let (gateway, catalog) = catalog().await;
        let user = Uuid::new_v4();
        let flight_id = Uuid::new_v4();
        gateway
            .seed(Collection::Flights, [flight(flight_id, "AA100", JFK, None, "JFK")])
            .await;

        catalog.track(user, flight_id).await.unwrap();
        catalog.track(user, flight_id).await.unwrap();
        assert_eq!(gateway.rows(Collection::TrackedFlights).await.len(), 1);
        assert_eq!(catalog.tracked_flight_ids(user).await.unwrap(), vec![flight_id]);

        let tracked = catalog.flights_by_ids(&[flight_id]).await.unwrap();
        assert_eq!(tracked[0].related.as_ref().unwrap().code, "JFK");

        catalog.untrack(user, flight_id).await.unwrap();
        catalog.untrack(user, flight_id).await.unwrap();
        assert!(catalog.tracked_flight_ids(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flights_by_ids_skips_request_when_empty() {
        let (gateway, catalog) = catalog().await;
        assert!(catalog.flights_by_ids(&[]).await.unwrap().is_empty());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure_surfaces_and_recovers() {
        let (gateway, catalog) = catalog().await;
        gateway.fail(Collection::Airports, GatewayError::Transport("offline".to_string()));
        assert_eq!(
            catalog.airports().await.unwrap_err(),
            GatewayError::Transport("offline".to_string())
        );

        gateway.recover(Collection::Airports);
        assert_eq!(catalog.airports().await.unwrap().len(), 2);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_subscription_tiers_active_and_cheapest_first() {
        let (gateway, catalog) = catalog().await;
        gateway
            .seed(
                Collection::SubscriptionTiers,
                [
                    json!({ "id": Uuid::new_v4(), "name": "Pro", "price_monthly": 9.99, "price_yearly": 99.0, "features": [], "is_active": true }),
                    json!({ "id": Uuid::new_v4(), "name": "Legacy", "price_monthly": 1.0, "price_yearly": 10.0, "features": [], "is_active": false }),
                    json!({ "id": Uuid::new_v4(), "name": "Free", "price_monthly": 0, "price_yearly": 0, "features": ["Search"], "is_active": true }),
                ],
            )
            .await;

        let tiers = catalog.subscription_tiers().await.unwrap();
        let names: Vec<_> = tiers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Free", "Pro"]);
    }

    #[test]
    fn test_authorize_records_bearer() {
        let gateway = InMemoryGateway::new();
        gateway.authorize(Some(Masked::from("abc")));
        assert_eq!(gateway.bearer().map(|b| b.into_inner()), Some("abc".to_string()));
        gateway.authorize(None);
        assert!(gateway.bearer().is_none());
    }
}
