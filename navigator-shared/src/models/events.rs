/// A fire-and-forget analytics event.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    pub action: String,
    pub category: String,
    pub label: Option<String>,
    pub value: Option<i64>,
}

impl AnalyticsEvent {
    pub fn new(action: &str, category: &str, label: Option<&str>) -> Self {
        Self {
            action: action.to_string(),
            category: category.to_string(),
            label: label.map(str::to_string),
            value: None,
        }
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn flight_search(query: &str) -> Self {
        Self::new("search", "Flight", Some(query))
    }

    pub fn flight_tracking(flight_number: &str) -> Self {
        Self::new("track_flight", "Flight", Some(flight_number))
    }

    pub fn airport_view(airport_name: &str) -> Self {
        Self::new("view_airport", "Airport", Some(airport_name))
    }

    pub fn lounge_view(lounge_name: &str) -> Self {
        Self::new("view_lounge", "Lounge", Some(lounge_name))
    }

    pub fn map_view(map_type: &str) -> Self {
        Self::new("view_map", "Map", Some(map_type))
    }

    pub fn sign_up(method: &str) -> Self {
        Self::new("sign_up", "Auth", Some(method))
    }

    pub fn sign_in(method: &str) -> Self {
        Self::new("sign_in", "Auth", Some(method))
    }

    pub fn subscription_view(tier: &str) -> Self {
        Self::new("view_pricing", "Subscription", Some(tier))
    }

    pub fn subscription_start(tier: &str) -> Self {
        Self::new("start_checkout", "Subscription", Some(tier))
    }
}
