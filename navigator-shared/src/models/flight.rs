use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flight status as published by the data store. Values outside the known
/// set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlightStatus {
    OnTime,
    Delayed,
    Boarding,
    Departed,
    Cancelled,
    Other(String),
}

/// Display colour of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Orange,
    Blue,
    Slate,
    Red,
}

impl FlightStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FlightStatus::OnTime => "on-time",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Boarding => "boarding",
            FlightStatus::Departed => "departed",
            FlightStatus::Cancelled => "cancelled",
            FlightStatus::Other(raw) => raw,
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            FlightStatus::OnTime => StatusColor::Green,
            FlightStatus::Delayed => StatusColor::Orange,
            FlightStatus::Boarding => StatusColor::Blue,
            FlightStatus::Cancelled => StatusColor::Red,
            FlightStatus::Departed | FlightStatus::Other(_) => StatusColor::Slate,
        }
    }
}

impl From<String> for FlightStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "on-time" => FlightStatus::OnTime,
            "delayed" => FlightStatus::Delayed,
            "boarding" => FlightStatus::Boarding,
            "departed" => FlightStatus::Departed,
            "cancelled" => FlightStatus::Cancelled,
            _ => FlightStatus::Other(raw),
        }
    }
}

impl From<FlightStatus> for String {
    fn from(status: FlightStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: Uuid,
    pub flight_number: String,
    pub airline: String,
    pub airport_id: Uuid,
    pub gate_id: Option<Uuid>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub status: FlightStatus,
    pub origin: String,
    pub destination: String,
}

/// Link row between an identity and a flight it follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedFlight {
    pub user_id: Uuid,
    pub flight_id: Uuid,
    pub notifications_enabled: bool,
}

impl TrackedFlight {
    pub fn new(user_id: Uuid, flight_id: Uuid) -> Self {
        Self {
            user_id,
            flight_id,
            notifications_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_status_round_trips_unknown_values() {
        let status: FlightStatus = serde_json::from_str("\"diverted\"").unwrap();
        assert_eq!(status, FlightStatus::Other("diverted".to_string()));
        assert_eq!(status.color(), StatusColor::Slate);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"diverted\"");
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(FlightStatus::OnTime.color(), StatusColor::Green);
        assert_eq!(FlightStatus::Delayed.color(), StatusColor::Orange);
        assert_eq!(FlightStatus::Boarding.color(), StatusColor::Blue);
        assert_eq!(FlightStatus::Departed.color(), StatusColor::Slate);
        assert_eq!(FlightStatus::Cancelled.color(), StatusColor::Red);
    }

    #[test]
    fn test_flight_with_null_times() {
        let json = r#"
            {
                "id": "6a1e1f39-3d1c-4f6e-8a7b-2a86f43f6c01",
                "flight_number": "AA100",
                "airline": "American Airlines",
                "airport_id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
                "gate_id": null,
                "departure_time": null,
                "arrival_time": "2025-06-01T18:30:00+00:00",
                "status": "on-time",
                "origin": "JFK",
                "destination": "LAX"
            }
        "#;
        let flight: Flight = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(flight.departure_time.is_none());
        assert!(flight.arrival_time.is_some());
        assert_eq!(flight.status, FlightStatus::OnTime);
    }
}
