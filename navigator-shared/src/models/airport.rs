use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub timezone: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Airport {
    /// Case-insensitive substring match on name, code, city or country.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.code, &self.city, &self.country]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub id: Uuid,
    pub airport_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    FullAirport,
    Terminal,
    Parking,
    #[serde(other)]
    Other,
}

impl MapType {
    pub fn label(&self) -> &'static str {
        match self {
            MapType::FullAirport => "Airport Overview",
            MapType::Terminal => "Terminal Map",
            MapType::Parking => "Parking Map",
            MapType::Other => "Map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportMap {
    pub id: Uuid,
    pub airport_id: Uuid,
    pub terminal_id: Option<Uuid>,
    pub floor_level: String,
    pub map_url: String,
    pub map_type: MapType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_deserialization() {
        let json = r#"
            {
                "id": "0b6f3b84-5a4f-4c4e-9d0c-0a4a3f9f1d11",
                "code": "JFK",
                "name": "John F. Kennedy International Airport",
                "city": "New York",
                "country": "United States",
                "timezone": "America/New_York",
                "latitude": 40.6413,
                "longitude": -73.7781,
                "created_at": "2025-01-01T00:00:00+00:00"
            }
        "#;
        let airport: Airport = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(airport.code, "JFK");
        assert!(airport.matches("new york"));
        assert!(airport.matches("jf"));
        assert!(!airport.matches("lax"));
    }

    #[test]
    fn test_unknown_map_type_falls_back() {
        let map_type: MapType = serde_json::from_str("\"rooftop\"").unwrap();
        assert_eq!(map_type, MapType::Other);
        assert_eq!(map_type.label(), "Map");
        assert_eq!(MapType::FullAirport.label(), "Airport Overview");
    }
}
