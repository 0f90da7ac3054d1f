use async_trait::async_trait;
use uuid::Uuid;

use crate::product::ProductFacts;
use crate::rules::{CategoryRules, SuggestionRule};

/// Errors surfaced by the catalog backend. A missing product is distinct
/// from a transient outage so callers can degrade differently.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Product not found in catalog: {0}")]
    NotFound(Uuid),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the product catalog and its rule configuration.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn get_product(&self, id: Uuid) -> Result<ProductFacts, GatewayError>;

    /// The configured rule tables, in configured order. Order is significant
    /// for pricing rules (first match wins).
    async fn get_category_rules(&self) -> Result<CategoryRules, GatewayError>;

    /// Candidate product ids for a suggestion rule. Similarity scoring over
    /// the rule's attributes and threshold is the catalog's concern.
    async fn get_suggestion_candidates(
        &self,
        rule: &SuggestionRule,
    ) -> Result<Vec<Uuid>, GatewayError>;
}

/// Category set used for rule matching. Variations always match on the
/// parent product's categories.
pub async fn rule_categories(
    gateway: &dyn CatalogGateway,
    facts: &ProductFacts,
) -> Result<Vec<Uuid>, GatewayError> {
    if facts.is_variation {
        if let Some(parent_id) = facts.parent_id {
            return Ok(gateway.get_product(parent_id).await?.category_ids);
        }
    }
    Ok(facts.category_ids.clone())
}
