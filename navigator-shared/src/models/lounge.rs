use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub open: String,
    pub close: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lounge {
    pub id: Uuid,
    pub airport_id: Uuid,
    pub terminal_id: Option<Uuid>,
    pub name: String,
    pub airline: Option<String>,
    pub location: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub operating_hours: OperatingHours,
    #[serde(default)]
    pub access_requirements: String,
    pub is_premium: bool,
    pub rating: Option<f64>,
    pub image_url: Option<String>,
}
