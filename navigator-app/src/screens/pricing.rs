use navigator_core::GuardError;
use navigator_shared::{AnalyticsEvent, BillingCycle, SubscriptionTier};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use super::{Remote, ScreenState};
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

pub const CHECKOUT_UNAVAILABLE: &str = "Checkout is not available yet. We'll let you know when subscriptions open.";

#[derive(Debug, Clone, Default)]
struct PricingState {
    tiers: Remote<Vec<SubscriptionTier>>,
    cycle: BillingCycle,
    notice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCard {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub period: &'static str,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingView {
    pub yearly: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub tiers: Vec<TierCard>,
    pub notice: Option<String>,
}

/// Subscription tiers. There is no payment provider behind it.
#[derive(Clone)]
pub struct Pricing {
    ctx: AppContext,
    state: ScreenState<PricingState>,
}

impl Pricing {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, state: ScreenState::new(PricingState::default()) }
    }

    pub async fn activate(&self) {
        self.ctx.analytics.emit(AnalyticsEvent::subscription_view("pricing"));
        self.state.update(|s| s.tiers = Remote::Loading).await;
        let result = self.ctx.catalog.subscription_tiers().await;
        self.state
            .update(|s| {
                s.tiers = match result {
                    Ok(tiers) => Remote::Loaded(tiers),
                    Err(e) => {
                        warn!("Failed to load subscription tiers: {}", e);
                        Remote::Failed("Failed to load subscription plans".to_string())
                    }
                }
            })
            .await;
    }

    pub async fn set_cycle(&self, cycle: BillingCycle) {
        self.state.update(|s| s.cycle = cycle).await;
    }

    /// Always ends at the "checkout unavailable" placeholder.
    pub async fn subscribe(&self, tier_id: Uuid) -> AppResult<&'static str> {
        if !self.ctx.session.is_signed_in() {
            let guard = GuardError::SignInToSubscribe;
            self.state.update(|s| s.notice = Some(guard.to_string())).await;
            return Err(guard.into());
        }
        let tier = self
            .state
            .read(|s| s.tiers.value().and_then(|tiers| tiers.iter().find(|t| t.id == tier_id).cloned()))
            .await
            .ok_or_else(|| AppError::unavailable("Plan not found"))?;

        self.ctx.analytics.emit(AnalyticsEvent::subscription_start(&tier.name));
        self.state.update(|s| s.notice = Some(CHECKOUT_UNAVAILABLE.to_string())).await;
        Ok(CHECKOUT_UNAVAILABLE)
    }

    pub async fn tier_at(&self, index: usize) -> Option<Uuid> {
        self.state
            .read(|s| s.tiers.value().and_then(|tiers| tiers.get(index)).map(|t| t.id))
            .await
    }

    pub async fn render(&self) -> PricingView {
        let state = self.state.snapshot().await;
        let period = match state.cycle {
            BillingCycle::Monthly => "month",
            BillingCycle::Yearly => "year",
        };
        let tiers = state
            .tiers
            .value()
            .map(|tiers| {
                tiers
                    .iter()
                    .map(|tier| TierCard {
                        id: tier.id,
                        name: tier.name.clone(),
                        price: tier.price(state.cycle),
                        period,
                        features: tier.features.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        PricingView {
            yearly: state.cycle == BillingCycle::Yearly,
            loading: state.tiers.is_loading(),
            error: state.tiers.error().map(str::to_string),
            tiers,
            notice: state.notice,
        }
    }

    pub fn unmount(&self) {
        self.state.unmount();
    }
}
