use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use roomquote_catalog::{
    AutoAddProduct, AutoAddRule, CatalogGateway, GatewayError, PricingRuleResolver,
};
use roomquote_estimate::{AdditionalProduct, NoteEntry};

/// Companion products and notes collected for one anchor product.
#[derive(Debug, Default)]
pub struct Companions {
    pub products: Vec<AdditionalProduct>,
    pub notes: Vec<NoteEntry>,
}

/// Attaches companion products and notes configured against a product's
/// categories.
pub struct AutoAddRuleEngine {
    gateway: Arc<dyn CatalogGateway>,
    resolver: Arc<PricingRuleResolver>,
    rules: Vec<AutoAddRule>,
}

impl AutoAddRuleEngine {
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        resolver: Arc<PricingRuleResolver>,
        rules: Vec<AutoAddRule>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            rules,
        }
    }

    /// Collect companions for a product across every category it belongs
    /// to, in category order. Duplicates collapse to the first occurrence
    /// (which keeps its section metadata), and the anchor product never
    /// auto-adds itself. A failed companion lookup is skipped with a warn;
    /// it must not fail the caller's mutation.
    pub async fn companions_for(&self, anchor_id: Uuid, category_ids: &[Uuid]) -> Companions {
        let mut companions = Companions::default();
        let mut seen_products: HashSet<Uuid> = HashSet::new();
        let mut seen_notes: HashSet<String> = HashSet::new();

        for category_id in category_ids {
            for rule in self.rules.iter().filter(|r| r.category_id == *category_id) {
                for auto in &rule.products {
                    if auto.product_id == anchor_id {
                        continue;
                    }
                    if !seen_products.insert(auto.product_id) {
                        continue;
                    }
                    match self.build_companion(auto).await {
                        Ok(entry) => companions.products.push(entry),
                        Err(err) => {
                            warn!(
                                product_id = %auto.product_id,
                                error = %err,
                                "skipping companion product, catalog lookup failed"
                            );
                        }
                    }
                }
                for text in &rule.notes {
                    if seen_notes.insert(text.clone()) {
                        companions.notes.push(NoteEntry::new(text.clone()));
                    }
                }
            }
        }

        companions
    }

    async fn build_companion(
        &self,
        auto: &AutoAddProduct,
    ) -> Result<AdditionalProduct, GatewayError> {
        let facts = self.gateway.get_product(auto.product_id).await?;
        let pricing = self
            .resolver
            .resolve(self.gateway.as_ref(), auto.product_id)
            .await;
        let min_price = facts.min_price.max(0.0);
        let max_price = facts.max_price.max(0.0);
        Ok(AdditionalProduct {
            id: facts.id,
            name: facts.name,
            image_url: facts.image_url,
            pricing_method: Some(pricing.method),
            pricing_source: Some(pricing.source),
            min_price,
            max_price,
            // Refreshed to area-aware values by the next totals pass.
            min_price_total: min_price,
            max_price_total: max_price,
            replacement_chain: Vec::new(),
            section_title: auto.section_title.clone(),
            section_description: auto.section_description.clone(),
            option_colours: auto.option_colours.clone(),
        })
    }
}
