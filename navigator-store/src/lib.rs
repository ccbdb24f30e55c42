pub mod app_config;
pub mod auth_client;
pub mod database;
pub mod disabled;
pub mod events;
pub mod memory_repo;

use std::sync::Arc;

use navigator_core::identity::AuthProvider;
use navigator_core::RemoteGateway;
use tracing::{error, warn};

pub use app_config::Config;
pub use auth_client::AuthClient;
pub use database::RestGateway;
pub use disabled::{DisabledAuth, DisabledGateway};
pub use events::{analytics_from_config, HttpAnalytics};
pub use memory_repo::InMemoryGateway;

/// Data store client for the configured endpoint, or the disabled stand-in.
pub fn gateway_from_config(config: &app_config::StoreConfig) -> Arc<dyn RemoteGateway> {
    let Some((url, key)) = config.endpoint() else {
        warn!("Data store URL or access key missing; running without remote data");
        return Arc::new(DisabledGateway);
    };
    match RestGateway::new(url, key.clone(), config.timeout()) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!("Failed to build data store client: {}", e);
            Arc::new(DisabledGateway)
        }
    }
}

pub fn auth_from_config(config: &app_config::StoreConfig) -> Arc<dyn AuthProvider> {
    let Some((url, key)) = config.endpoint() else {
        return Arc::new(DisabledAuth);
    };
    match AuthClient::new(url, key.clone(), config.timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build account client: {}", e);
            Arc::new(DisabledAuth)
        }
    }
}
