use serde::{Deserialize, Serialize};

pub mod airport;
pub mod events;
pub mod flight;
pub mod identity;
pub mod lounge;
pub mod subscription;

/// A row with one embedded related record, as returned by a one-hop join
/// (flight -> airport, map -> terminal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithRelated<T, R> {
    #[serde(flatten)]
    pub record: T,
    pub related: Option<R>,
}

impl<T, R> WithRelated<T, R> {
    pub fn new(record: T, related: Option<R>) -> Self {
        Self { record, related }
    }
}

impl<T, R> std::ops::Deref for WithRelated<T, R> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Airport, Flight};

    #[test]
    fn test_related_record_is_optional() {
        let json = r#"
            {
                "id": "6a1e1f39-3d1c-4f6e-8a7b-2a86f43f6c01",
                "flight_number": "AA100",
                "airline": "American Airlines",
                "airport_id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
                "gate_id": null,
                "departure_time": null,
                "arrival_time": null,
                "status": "on-time",
                "origin": "JFK",
                "destination": "LAX"
            }
        "#;
        let row: WithRelated<Flight, Airport> = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(row.flight_number, "AA100");
        assert!(row.related.is_none());
    }

    #[test]
    fn test_related_record_is_embedded() {
        let json = r#"
            {
                "id": "6a1e1f39-3d1c-4f6e-8a7b-2a86f43f6c01",
                "flight_number": "AA100",
                "airline": "American Airlines",
                "airport_id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
                "gate_id": null,
                "departure_time": "2025-06-01T15:00:00+00:00",
                "arrival_time": null,
                "status": "delayed",
                "origin": "JFK",
                "destination": "LAX",
                "related": {
                    "id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
                    "code": "JFK",
                    "name": "John F. Kennedy International Airport",
                    "city": "New York",
                    "country": "United States",
                    "timezone": "America/New_York",
                    "latitude": null,
                    "longitude": null
                }
            }
        "#;
        let row: WithRelated<Flight, Airport> = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(row.related.map(|airport| airport.code).as_deref(), Some("JFK"));
    }
}
