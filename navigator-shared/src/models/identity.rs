use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in user as far as the client knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
}
