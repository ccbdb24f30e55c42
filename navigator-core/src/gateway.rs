use async_trait::async_trait;
use navigator_shared::Masked;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::GatewayResult;

/// A raw record as the data store returns it.
pub type Row = Value;

/// Remote collections the client reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Airports,
    Terminals,
    Flights,
    Lounges,
    Maps,
    TrackedFlights,
    SubscriptionTiers,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Airports => "airports",
            Collection::Terminals => "terminals",
            Collection::Flights => "flights",
            Collection::Lounges => "airport_lounges",
            Collection::Maps => "airport_maps",
            Collection::TrackedFlights => "user_flights",
            Collection::SubscriptionTiers => "subscription_tiers",
        }
    }
}

/// Row predicate executed by the data store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field == value`
    Eq { field: String, value: Value },
    /// `field` is one of `values`
    In { field: String, values: Vec<Value> },
    /// Case-insensitive substring match of `needle` on any of `fields`.
    AnyILike { fields: Vec<String>, needle: String },
}

impl Filter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Filter::Eq { field: field.to_string(), value: value.into() }
    }

    pub fn is_in<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Filter::In {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn any_ilike(fields: &[&str], needle: &str) -> Self {
        Filter::AnyILike {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// Filters, ordering and row cap of a fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order.push(Order { field: field.to_string(), ascending });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One-hop join: `foreign_key` on the fetched row points at the `id` of a row
/// in `collection`. The joined record is embedded under the `related` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub foreign_key: &'static str,
    pub collection: Collection,
}

pub const RELATED_KEY: &str = "related";

/// Data access contract of the hosted data store.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn fetch_many(&self, collection: Collection, query: &Query) -> GatewayResult<Vec<Row>>;

    async fn fetch_related(
        &self,
        collection: Collection,
        relation: &Relation,
        query: &Query,
    ) -> GatewayResult<Vec<Row>>;

    async fn insert(&self, collection: Collection, record: Row) -> GatewayResult<()>;

    async fn delete_where(&self, collection: Collection, filters: &[Filter]) -> GatewayResult<()>;

    /// Bearer token of the signed-in user, or `None` to fall back to the
    /// anonymous key.
    fn authorize(&self, _bearer: Option<Masked<String>>) {}
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> GatewayResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_shared::{Airport, Flight, WithRelated};

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .filter(Filter::eq("airport_id", "abc"))
            .order_by("departure_time", true)
            .limit(10);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.order[0].field, "departure_time");
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_decode_rows_with_related() {
        let rows = vec![serde_json::json!({
            "id": "6a1e1f39-3d1c-4f6e-8a7b-2a86f43f6c01",
            "flight_number": "BA117",
            "airline": "British Airways",
            "airport_id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
            "gate_id": null,
            "departure_time": "2025-06-01T08:00:00Z",
            "arrival_time": null,
            "status": "boarding",
            "origin": "LHR",
            "destination": "JFK",
            "related": {
                "id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
                "code": "LHR",
                "name": "Heathrow",
                "city": "London",
                "country": "United Kingdom",
                "timezone": "Europe/London",
                "latitude": null,
                "longitude": null
            }
        })];
        let flights: Vec<WithRelated<Flight, Airport>> = decode_rows(rows).unwrap();
        assert_eq!(flights[0].flight_number, "BA117");
        assert_eq!(flights[0].related.as_ref().unwrap().code, "LHR");
    }

    #[test]
    fn test_decode_rows_reports_malformed_records() {
        let rows = vec![serde_json::json!({ "code": 42 })];
        let result: GatewayResult<Vec<Airport>> = decode_rows(rows);
        assert!(matches!(result, Err(crate::GatewayError::Decode(_))));
    }
}
