use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Highest unit price a restaurant may list, in minor units.
pub const MAX_PRICE_MINOR: u64 = 10_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub short_description: String,
    /// Unit price in minor currency units.
    pub price: u64,
    pub is_available: bool,
}
