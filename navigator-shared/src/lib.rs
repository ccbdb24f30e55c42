pub mod models;
pub mod pii;

pub use models::airport::{Airport, AirportMap, MapType, Terminal};
pub use models::events::AnalyticsEvent;
pub use models::flight::{Flight, FlightStatus, StatusColor, TrackedFlight};
pub use models::identity::Identity;
pub use models::lounge::{Lounge, OperatingHours};
pub use models::subscription::{BillingCycle, SubscriptionTier};
pub use models::WithRelated;
pub use pii::Masked;
