use std::sync::Arc;

use navigator_core::identity::AuthProvider;
use navigator_core::platform::{AnalyticsEmitter, Headless, InstallCapability, NoopAnalytics, PushCapability};
use navigator_core::{Catalog, RemoteGateway};
use navigator_store::app_config::{Config, RefreshConfig};
use navigator_store::{analytics_from_config, auth_from_config, gateway_from_config};

use crate::session::SessionStore;

/// Everything a screen needs, cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub catalog: Catalog,
    pub session: SessionStore,
    pub analytics: Arc<dyn AnalyticsEmitter>,
    pub install: Arc<dyn InstallCapability>,
    pub push: Arc<dyn PushCapability>,
    pub refresh: RefreshConfig,
    pub push_key: Option<String>,
}

impl AppContext {
    pub fn new(gateway: Arc<dyn RemoteGateway>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            catalog: Catalog::new(gateway.clone()),
            session: SessionStore::new(auth, gateway),
            analytics: Arc::new(NoopAnalytics),
            install: Arc::new(Headless),
            push: Arc::new(Headless),
            refresh: RefreshConfig::default(),
            push_key: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut ctx = Self::new(gateway_from_config(&config.store), auth_from_config(&config.store))
            .with_analytics(analytics_from_config(&config.analytics))
            .with_refresh(config.refresh.clone());
        ctx.push_key = config.push.public_key.clone().filter(|key| !key.trim().is_empty());
        ctx
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsEmitter>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_refresh(mut self, refresh: RefreshConfig) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_platform(mut self, install: Arc<dyn InstallCapability>, push: Arc<dyn PushCapability>) -> Self {
        self.install = install;
        self.push = push;
        self
    }
}
