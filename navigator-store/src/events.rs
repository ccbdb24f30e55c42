use std::sync::Arc;

use navigator_core::platform::{AnalyticsEmitter, NoopAnalytics};
use navigator_shared::AnalyticsEvent;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app_config::AnalyticsConfig;

/// Sends events to the measurement endpoint in the background. Delivery
/// failures are logged and dropped.
#[derive(Clone)]
pub struct HttpAnalytics {
    client: reqwest::Client,
    endpoint: String,
    tracking_id: String,
    client_id: Uuid,
}

impl HttpAnalytics {
    pub fn new(endpoint: &str, tracking_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            tracking_id: tracking_id.to_string(),
            client_id: Uuid::new_v4(),
        }
    }

    async fn publish(&self, event: AnalyticsEvent) {
        let payload = measurement_payload(self.client_id, &event);
        let result = self
            .client
            .post(&self.endpoint)
            .query(&[("measurement_id", self.tracking_id.as_str())])
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Sent analytics event {}", event.action);
            }
            Ok(response) => warn!("Analytics endpoint answered {}", response.status()),
            Err(e) => warn!("Failed to send analytics event {}: {}", event.action, e),
        }
    }
}

impl AnalyticsEmitter for HttpAnalytics {
    fn emit(&self, event: AnalyticsEvent) {
        // Outside a runtime there is nowhere to send from.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime; dropping analytics event {}", event.action);
            return;
        };
        let this = self.clone();
        handle.spawn(async move { this.publish(event).await });
    }
}

pub fn measurement_payload(client_id: Uuid, event: &AnalyticsEvent) -> Value {
    let mut params = json!({ "event_category": event.category });
    if let Some(label) = &event.label {
        params["event_label"] = json!(label);
    }
    if let Some(value) = event.value {
        params["value"] = json!(value);
    }
    json!({
        "client_id": client_id.to_string(),
        "events": [{ "name": event.action, "params": params }],
    })
}

/// Analytics are only live when a tracking id is configured.
pub fn analytics_from_config(config: &AnalyticsConfig) -> Arc<dyn AnalyticsEmitter> {
    match config.tracking_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            info!("Analytics enabled ({})", id);
            Arc::new(HttpAnalytics::new(&config.endpoint, id))
        }
        None => Arc::new(NoopAnalytics),
    }
}
