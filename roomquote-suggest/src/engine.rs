use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use roomquote_catalog::{
    rule_categories, CatalogGateway, PricingMethod, PricingRuleResolver, SuggestionRule,
};
use roomquote_estimate::{Room, TotalsCalculator};

use crate::auto_add::AutoAddRuleEngine;
use crate::models::Suggestion;

/// Proposes further products for a room from the configured suggestion
/// rules, excluding anything already present.
pub struct SuggestionEngine {
    gateway: Arc<dyn CatalogGateway>,
    resolver: Arc<PricingRuleResolver>,
    auto_add: AutoAddRuleEngine,
    rules: Vec<SuggestionRule>,
}

impl SuggestionEngine {
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        resolver: Arc<PricingRuleResolver>,
        auto_add: AutoAddRuleEngine,
        rules: Vec<SuggestionRule>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            auto_add,
            rules,
        }
    }

    /// Generate suggestions for the room's current contents. Read-only:
    /// failed catalog lookups degrade to skipping the affected rule or
    /// candidate. An empty room short-circuits to an empty list without
    /// touching the rule table.
    pub async fn suggestions_for_room(&self, room: &Room) -> Vec<Suggestion> {
        let present = room.present_product_ids();
        if present.is_empty() {
            return Vec::new();
        }

        let room_categories = self.category_union(&present).await;
        let area = room.area();
        // Seeding with the present ids filters them out and deduplicates
        // candidates across rules in one pass, first occurrence winning.
        let mut seen: HashSet<Uuid> = present.into_iter().collect();
        let mut suggestions = Vec::new();

        for rule in self.rules.iter().filter(|r| r.matches(&room_categories)) {
            let candidates = match self.gateway.get_suggestion_candidates(rule).await {
                Ok(candidates) => candidates,
                Err(err) => {
                    warn!(error = %err, "skipping suggestion rule, candidate lookup failed");
                    continue;
                }
            };

            for candidate_id in candidates {
                if seen.contains(&candidate_id) {
                    continue;
                }
                // A candidate dropped by this rule stays eligible for later
                // rules; only accepted ones count as seen.
                if let Some(suggestion) = self.build_suggestion(rule, candidate_id, area).await {
                    seen.insert(candidate_id);
                    suggestions.push(suggestion);
                }
            }
        }

        suggestions
    }

    /// Union of rule-matching categories across everything in the room.
    async fn category_union(&self, present: &[Uuid]) -> Vec<Uuid> {
        let mut categories = Vec::new();
        for product_id in present {
            let facts = match self.gateway.get_product(*product_id).await {
                Ok(facts) => facts,
                Err(err) => {
                    warn!(product_id = %product_id, error = %err, "skipping product in category union");
                    continue;
                }
            };
            match rule_categories(self.gateway.as_ref(), &facts).await {
                Ok(ids) => {
                    for id in ids {
                        if !categories.contains(&id) {
                            categories.push(id);
                        }
                    }
                }
                Err(err) => {
                    warn!(product_id = %product_id, error = %err, "skipping product in category union");
                }
            }
        }
        categories
    }

    /// Build one annotated suggestion, or None when the candidate should be
    /// dropped (unresolvable, or itself a product of the rule's own source
    /// categories).
    async fn build_suggestion(
        &self,
        rule: &SuggestionRule,
        candidate_id: Uuid,
        area: f64,
    ) -> Option<Suggestion> {
        let facts = match self.gateway.get_product(candidate_id).await {
            Ok(facts) => facts,
            Err(err) => {
                warn!(product_id = %candidate_id, error = %err, "skipping suggestion candidate");
                return None;
            }
        };
        let categories = match rule_categories(self.gateway.as_ref(), &facts).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(product_id = %candidate_id, error = %err, "skipping suggestion candidate");
                return None;
            }
        };
        // A rule never re-suggests the kind of product that triggered it.
        if rule.matches(&categories) {
            return None;
        }

        let pricing = self.resolver.resolve_for_categories(&categories);
        let (mut min_total, mut max_total) = TotalsCalculator::item_totals(
            pricing.method,
            facts.min_price.max(0.0),
            facts.max_price.max(0.0),
            area,
        );

        let companions = self.auto_add.companions_for(candidate_id, &categories).await;
        let has_auto_add = !companions.products.is_empty();
        for extra in &companions.products {
            let method = extra.pricing_method.unwrap_or(PricingMethod::Fixed);
            let (min, max) =
                TotalsCalculator::item_totals(method, extra.min_price, extra.max_price, area);
            min_total += min;
            max_total += max;
        }

        Some(Suggestion {
            product_id: candidate_id,
            name: facts.name,
            image_url: facts.image_url,
            min_total,
            max_total,
            has_auto_add,
        })
    }
}
