use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only facts about a catalog product or variation, as served by the
/// catalog backend. Prices are a span because variable products quote the
/// cheapest and dearest variation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductFacts {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub category_ids: Vec<Uuid>,
    #[serde(default)]
    pub is_variation: bool,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<VariationFacts>,
}

impl ProductFacts {
    pub fn is_variable(&self) -> bool {
        !self.variations.is_empty()
    }
}

/// One purchasable variation of a variable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationFacts {
    pub id: Uuid,
    pub name: String,
    pub min_price: f64,
    pub max_price: f64,
}
