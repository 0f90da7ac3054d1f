use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pricing::PricingMethod;

/// The rule tables configured against catalog categories. Each table keeps
/// its configured order; pricing resolution is first-match-wins over that
/// order, never most-specific-match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRules {
    pub pricing: Vec<PricingRule>,
    pub auto_add: Vec<AutoAddRule>,
    pub suggestions: Vec<SuggestionRule>,
    /// Categories whose products may not coexist in the same room.
    #[serde(default)]
    pub primary_categories: Vec<Uuid>,
}

impl CategoryRules {
    pub fn is_empty(&self) -> bool {
        self.pricing.is_empty()
            && self.auto_add.is_empty()
            && self.suggestions.is_empty()
            && self.primary_categories.is_empty()
    }

    /// Whether any of the given categories is configured as primary.
    pub fn is_primary(&self, category_ids: &[Uuid]) -> bool {
        category_ids
            .iter()
            .any(|c| self.primary_categories.contains(c))
    }
}

/// Maps a set of categories to how their products are priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRule {
    pub categories: Vec<Uuid>,
    pub pricing_method: PricingMethod,
    pub pricing_source: String,
}

/// Companion products and notes attached automatically to any product in
/// the given category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoAddRule {
    pub category_id: Uuid,
    #[serde(default)]
    pub products: Vec<AutoAddProduct>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// One companion product entry, with optional presentation metadata shown
/// alongside the attached item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoAddProduct {
    pub product_id: Uuid,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub section_description: Option<String>,
    #[serde(default)]
    pub option_colours: Vec<String>,
}

/// Suggests further products for rooms whose contents touch the source
/// categories. The similarity attributes and threshold parameterise the
/// catalog-side candidate search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionRule {
    pub source_categories: Vec<Uuid>,
    #[serde(default)]
    pub similarity_attributes: Vec<String>,
    #[serde(default)]
    pub threshold: f64,
}

impl SuggestionRule {
    pub fn matches(&self, category_ids: &[Uuid]) -> bool {
        self.source_categories
            .iter()
            .any(|c| category_ids.contains(c))
    }
}
