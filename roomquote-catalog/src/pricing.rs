use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::gateway::{rule_categories, CatalogGateway, GatewayError};
use crate::rules::PricingRule;

/// How a line item's unit price scales.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PricingMethod {
    /// Unit price multiplied by room area (width × length).
    Sqm,
    /// Unit price taken as-is.
    Fixed,
}

/// Global fallback used when no category rule matches a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingDefaults {
    pub pricing_method: PricingMethod,
    pub pricing_source: String,
}

impl Default for PricingDefaults {
    fn default() -> Self {
        Self {
            pricing_method: PricingMethod::Fixed,
            pricing_source: "website".to_string(),
        }
    }
}

/// Outcome of pricing resolution for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPricing {
    pub method: PricingMethod,
    pub source: String,
}

/// Resolves a product's pricing method and source from the configured
/// category rules, falling back to the global defaults.
pub struct PricingRuleResolver {
    rules: Vec<PricingRule>,
    defaults: PricingDefaults,
}

impl PricingRuleResolver {
    pub fn new(rules: Vec<PricingRule>, defaults: PricingDefaults) -> Self {
        Self { rules, defaults }
    }

    /// Resolve pricing for a product id. Variations match on the parent
    /// product's categories. A catalog miss falls back to the defaults
    /// instead of failing the caller.
    pub async fn resolve(&self, gateway: &dyn CatalogGateway, product_id: Uuid) -> ResolvedPricing {
        match self.categories_of(gateway, product_id).await {
            Ok(categories) => self.resolve_for_categories(&categories),
            Err(err) => {
                warn!(product_id = %product_id, error = %err, "pricing fell back to defaults");
                self.defaults_resolved()
            }
        }
    }

    /// Match an already-known category set against the rules. The first
    /// rule whose categories intersect the product's wins; rule order is
    /// the configured order.
    pub fn resolve_for_categories(&self, categories: &[Uuid]) -> ResolvedPricing {
        for rule in &self.rules {
            if rule.categories.iter().any(|c| categories.contains(c)) {
                return ResolvedPricing {
                    method: rule.pricing_method,
                    source: rule.pricing_source.clone(),
                };
            }
        }
        self.defaults_resolved()
    }

    pub fn defaults(&self) -> &PricingDefaults {
        &self.defaults
    }

    async fn categories_of(
        &self,
        gateway: &dyn CatalogGateway,
        product_id: Uuid,
    ) -> Result<Vec<Uuid>, GatewayError> {
        let facts = gateway.get_product(product_id).await?;
        rule_categories(gateway, &facts).await
    }

    fn defaults_resolved(&self) -> ResolvedPricing {
        ResolvedPricing {
            method: self.defaults.pricing_method,
            source: self.defaults.pricing_source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductFacts;
    use crate::rules::SuggestionRule;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StubCatalog {
        products: HashMap<Uuid, ProductFacts>,
    }

    #[async_trait]
    impl CatalogGateway for StubCatalog {
        async fn get_product(&self, id: Uuid) -> Result<ProductFacts, GatewayError> {
            self.products
                .get(&id)
                .cloned()
                .ok_or(GatewayError::NotFound(id))
        }

        async fn get_category_rules(&self) -> Result<crate::rules::CategoryRules, GatewayError> {
            Ok(crate::rules::CategoryRules::default())
        }

        async fn get_suggestion_candidates(
            &self,
            _rule: &SuggestionRule,
        ) -> Result<Vec<Uuid>, GatewayError> {
            Ok(Vec::new())
        }
    }

    fn facts(id: Uuid, categories: Vec<Uuid>) -> ProductFacts {
        ProductFacts {
            id,
            name: "Test product".to_string(),
            image_url: None,
            min_price: 10.0,
            max_price: 20.0,
            category_ids: categories,
            is_variation: false,
            parent_id: None,
            variations: Vec::new(),
        }
    }

    fn rule(categories: Vec<Uuid>, method: PricingMethod, source: &str) -> PricingRule {
        PricingRule {
            categories,
            pricing_method: method,
            pricing_source: source.to_string(),
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let flooring = Uuid::new_v4();
        let accessories = Uuid::new_v4();
        let resolver = PricingRuleResolver::new(
            vec![
                rule(vec![flooring], PricingMethod::Sqm, "website"),
                rule(vec![flooring, accessories], PricingMethod::Fixed, "external"),
            ],
            PricingDefaults::default(),
        );

        // Product is in both rule sets; the earlier rule must win.
        let resolved = resolver.resolve_for_categories(&[flooring]);
        assert_eq!(resolved.method, PricingMethod::Sqm);
        assert_eq!(resolved.source, "website");
    }

    #[test]
    fn falls_back_to_defaults_when_no_rule_matches() {
        let resolver = PricingRuleResolver::new(
            vec![rule(vec![Uuid::new_v4()], PricingMethod::Sqm, "website")],
            PricingDefaults {
                pricing_method: PricingMethod::Fixed,
                pricing_source: "external".to_string(),
            },
        );

        let resolved = resolver.resolve_for_categories(&[Uuid::new_v4()]);
        assert_eq!(resolved.method, PricingMethod::Fixed);
        assert_eq!(resolved.source, "external");
    }

    #[test]
    fn pricing_method_wire_values() {
        assert_eq!(serde_json::to_string(&PricingMethod::Sqm).unwrap(), "\"sqm\"");
        assert_eq!(
            serde_json::to_string(&PricingMethod::Fixed).unwrap(),
            "\"fixed\""
        );
    }

    #[tokio::test]
    async fn unknown_product_resolves_to_defaults() {
        let catalog = StubCatalog {
            products: HashMap::new(),
        };
        let resolver = PricingRuleResolver::new(Vec::new(), PricingDefaults::default());

        let resolved = resolver.resolve(&catalog, Uuid::new_v4()).await;
        assert_eq!(resolved.method, PricingMethod::Fixed);
    }

    #[tokio::test]
    async fn variation_matches_on_parent_categories() {
        let flooring = Uuid::new_v4();
        let parent_id = Uuid::new_v4();
        let variation_id = Uuid::new_v4();

        let mut products = HashMap::new();
        products.insert(parent_id, facts(parent_id, vec![flooring]));
        let mut variation = facts(variation_id, Vec::new());
        variation.is_variation = true;
        variation.parent_id = Some(parent_id);
        products.insert(variation_id, variation);

        let catalog = StubCatalog { products };
        let resolver = PricingRuleResolver::new(
            vec![rule(vec![flooring], PricingMethod::Sqm, "website")],
            PricingDefaults::default(),
        );

        let resolved = resolver.resolve(&catalog, variation_id).await;
        assert_eq!(resolved.method, PricingMethod::Sqm);
    }
}
