use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A candidate product proposed for a room. Totals aggregate the product
/// and its own auto-add chain at the room's area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub product_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub min_total: f64,
    pub max_total: f64,
    /// True when companion products contributed to the totals.
    pub has_auto_add: bool,
}
