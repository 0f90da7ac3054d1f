use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ProductAddedEvent {
    pub estimate_id: String,
    pub room_id: Uuid,
    pub product_id: Uuid,
    pub auto_add_products: usize,
    pub auto_add_notes: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ProductReplacedEvent {
    pub estimate_id: String,
    pub room_id: Uuid,
    pub old_product_id: Uuid,
    pub new_product_id: Uuid,
    pub replace_kind: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct EstimateSavedEvent {
    pub estimate_id: String,
    pub room_count: usize,
    pub min_total: f64,
    pub max_total: f64,
    pub occurred_at: DateTime<Utc>,
}
