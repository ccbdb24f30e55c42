//! Best-effort side channels the client consumes: analytics, app
//! installation and push notifications. Their failures never reach the
//! screens; every call either succeeds silently or degrades to a no-op.

use std::sync::Mutex;

use async_trait::async_trait;
use navigator_shared::AnalyticsEvent;

/// Fire-and-forget analytics sink.
pub trait AnalyticsEmitter: Send + Sync {
    fn emit(&self, event: AnalyticsEvent);
}

pub struct NoopAnalytics;

impl AnalyticsEmitter for NoopAnalytics {
    fn emit(&self, _event: AnalyticsEvent) {}
}

/// Keeps every emitted event; handy to assert on in tests.
#[derive(Default)]
pub struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.action).collect()
    }
}

impl AnalyticsEmitter for RecordingAnalytics {
    fn emit(&self, event: AnalyticsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Installable-application registration.
#[async_trait]
pub trait InstallCapability: Send + Sync {
    /// Register the offline worker. Returns whether registration happened.
    async fn register(&self) -> bool;
    /// Running as an installed, standalone app.
    fn is_standalone(&self) -> bool;
    /// The host currently offers installation.
    fn can_install(&self) -> bool;
    /// Show the install dialog; `true` when the user accepted.
    async fn prompt_install(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSubscription {
    pub endpoint: String,
}

/// Permission-gated push notifications.
#[async_trait]
pub trait PushCapability: Send + Sync {
    async fn request_permission(&self) -> bool;
    async fn subscribe(&self, public_key: &str) -> Option<PushSubscription>;
}

/// Host without any of the platform capabilities.
pub struct Headless;

#[async_trait]
impl InstallCapability for Headless {
    async fn register(&self) -> bool {
        false
    }

    fn is_standalone(&self) -> bool {
        false
    }

    fn can_install(&self) -> bool {
        false
    }

    async fn prompt_install(&self) -> bool {
        false
    }
}

#[async_trait]
impl PushCapability for Headless {
    async fn request_permission(&self) -> bool {
        false
    }

    async fn subscribe(&self, _public_key: &str) -> Option<PushSubscription> {
        None
    }
}
