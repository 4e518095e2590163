use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    /// Last reported position as sent by the driver app. Last write wins.
    pub location: String,
    pub updated_at: DateTime<Utc>,
}
