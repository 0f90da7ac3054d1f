use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use roomquote_catalog::{
    rule_categories, CatalogGateway, CategoryRules, PricingRuleResolver, ProductFacts,
};
use roomquote_estimate::{
    CustomerDetails, Estimate, EstimateManager, LineItem, ReplacementLedger, TotalsCalculator,
};
use roomquote_shared::models::events::{
    EstimateSavedEvent, ProductAddedEvent, ProductReplacedEvent,
};
use roomquote_store::{Config, SessionStore};
use roomquote_suggest::{AutoAddRuleEngine, Suggestion, SuggestionEngine};

use crate::error::ApiError;
use crate::responses::{MutationOutcome, ReplaceTarget};

/// The mutation API over estimates. Every mutation follows the same
/// discipline: fetch the whole estimate, apply exactly one logical change,
/// hydrate any unpriced entries, recompute every derived total, and write
/// the whole document back as one unit.
pub struct EstimateService {
    store: Arc<dyn SessionStore>,
    catalog: Arc<dyn CatalogGateway>,
    config: Config,
}

/// Per-request rule tables and resolver. `rules` is None when the
/// configuration is missing or unreachable; enrichment steps then degrade
/// to no-ops while pricing falls back to the global defaults.
struct RuleContext {
    rules: Option<CategoryRules>,
    resolver: Arc<PricingRuleResolver>,
}

impl EstimateService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        catalog: Arc<dyn CatalogGateway>,
        config: Config,
    ) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Idempotent create: an existing estimate with the same id is
    /// returned untouched, so the first user action can always call this.
    pub async fn create_estimate(
        &self,
        estimate_id: String,
        name: String,
        customer_details: Option<CustomerDetails>,
    ) -> Result<Estimate, ApiError> {
        if let Some(existing) = self.store.get_estimate(&estimate_id).await? {
            return Ok(existing);
        }

        let mut estimate = Estimate::new(estimate_id, name);
        estimate.default_markup = self.config.estimate.default_markup;
        if let Some(details) = customer_details {
            estimate.customer_details = details;
        }
        self.store.put_estimate(estimate.clone()).await?;
        info!(estimate_id = %estimate.id, "estimate created");
        Ok(estimate)
    }

    pub async fn get_estimate(&self, estimate_id: &str) -> Result<Estimate, ApiError> {
        self.load(estimate_id).await
    }

    pub async fn list_estimates(&self) -> Result<HashMap<String, Estimate>, ApiError> {
        Ok(self.store.list_estimates().await?)
    }

    pub async fn remove_estimate(&self, estimate_id: &str) -> Result<(), ApiError> {
        self.store
            .remove_estimate(estimate_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| ApiError::EstimateNotFound(estimate_id.to_string()))
    }

    pub async fn rename_estimate(
        &self,
        estimate_id: &str,
        name: String,
    ) -> Result<Estimate, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        estimate.name = name;
        estimate.touch();
        self.store.put_estimate(estimate.clone()).await?;
        Ok(estimate)
    }

    pub async fn update_customer_details(
        &self,
        estimate_id: &str,
        details: CustomerDetails,
    ) -> Result<Estimate, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        estimate.customer_details = details;
        estimate.touch();
        self.store.put_estimate(estimate.clone()).await?;
        Ok(estimate)
    }

    pub async fn set_default_markup(
        &self,
        estimate_id: &str,
        markup: f64,
    ) -> Result<Estimate, ApiError> {
        // NaN fails the comparison too.
        if !(markup >= 0.0) {
            return Err(ApiError::InvalidMarkup);
        }
        let mut estimate = self.load(estimate_id).await?;
        estimate.default_markup = markup;
        estimate.touch();
        self.store.put_estimate(estimate.clone()).await?;
        Ok(estimate)
    }

    pub async fn add_room(
        &self,
        estimate_id: &str,
        name: String,
        width: f64,
        length: f64,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;
        let room_id = EstimateManager::add_room(&mut estimate, name, width, length)?;
        let estimate = self.finalize(estimate, &ctx).await?;
        info!(estimate_id = %estimate.id, room_id = %room_id, "room added");
        Ok(self.outcome(&estimate, Some(&room_id)))
    }

    pub async fn remove_room(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;
        EstimateManager::remove_room(&mut estimate, room_id)?;
        let estimate = self.finalize(estimate, &ctx).await?;
        info!(estimate_id = %estimate.id, room_id = %room_id, "room removed");
        Ok(self.outcome(&estimate, None))
    }

    /// Area changes reprice every sqm item in the room, so this runs the
    /// same full-recompute path as any other mutation.
    pub async fn update_room_dimensions(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
        width: f64,
        length: f64,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;
        EstimateManager::update_room_dimensions(&mut estimate, room_id, width, length)?;
        let estimate = self.finalize(estimate, &ctx).await?;
        Ok(self.outcome(&estimate, Some(room_id)))
    }

    pub async fn add_product_to_room(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
        product_id: Uuid,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;
        let item = self.build_line_item(&ctx, product_id).await?;
        let event = ProductAddedEvent {
            estimate_id: estimate.id.clone(),
            room_id: *room_id,
            product_id,
            auto_add_products: item.additional_products.len(),
            auto_add_notes: item.additional_notes.len(),
            occurred_at: Utc::now(),
        };

        let room = EstimateManager::room_mut(&mut estimate, room_id)?;
        EstimateManager::add_product(room, item, self.config.features.primary_category_checks)?;

        let estimate = self.finalize(estimate, &ctx).await?;
        info!(event = ?event, "product added to room");
        Ok(self.outcome(&estimate, Some(room_id)))
    }

    pub async fn add_note_to_room(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
        note_text: String,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;
        let room = EstimateManager::room_mut(&mut estimate, room_id)?;
        EstimateManager::add_note(room, note_text);
        let estimate = self.finalize(estimate, &ctx).await?;
        Ok(self.outcome(&estimate, Some(room_id)))
    }

    pub async fn remove_product_from_room(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
        product_id: &Uuid,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;
        let room = EstimateManager::room_mut(&mut estimate, room_id)?;
        EstimateManager::remove_product(room, product_id)?;
        let estimate = self.finalize(estimate, &ctx).await?;
        info!(estimate_id = %estimate.id, product_id = %product_id, "product removed from room");
        Ok(self.outcome(&estimate, Some(room_id)))
    }

    pub async fn replace_product_in_room(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
        old_product_id: Uuid,
        new_product_id: Uuid,
        target: ReplaceTarget,
    ) -> Result<MutationOutcome, ApiError> {
        let mut estimate = self.load(estimate_id).await?;
        let ctx = self.rule_context().await;

        match target {
            ReplaceTarget::Main => {
                // Validate the incoming product before touching the tree.
                let item = self.build_line_item(&ctx, new_product_id).await?;
                let room = EstimateManager::room_mut(&mut estimate, room_id)?;
                EstimateManager::remove_product(room, &old_product_id)?;
                EstimateManager::add_product(
                    room,
                    item,
                    self.config.features.primary_category_checks,
                )?;
            }
            ReplaceTarget::AdditionalProduct { parent_product_id } => {
                let facts = self.catalog.get_product(new_product_id).await?;
                let categories = self.categories_for(&facts).await;
                let pricing = ctx.resolver.resolve_for_categories(&categories);
                let room = EstimateManager::room_mut(&mut estimate, room_id)?;
                let slot =
                    EstimateManager::companion_slot_mut(room, &parent_product_id, &old_product_id)?;
                ReplacementLedger::swap_slot(slot, &facts, pricing);
            }
        }

        let estimate = self.finalize(estimate, &ctx).await?;
        let event = ProductReplacedEvent {
            estimate_id: estimate.id.clone(),
            room_id: *room_id,
            old_product_id,
            new_product_id,
            replace_kind: match target {
                ReplaceTarget::Main => "main".to_string(),
                ReplaceTarget::AdditionalProduct { .. } => "additional_product".to_string(),
            },
            occurred_at: Utc::now(),
        };
        info!(event = ?event, "product replaced");
        Ok(self.outcome(&estimate, Some(room_id)))
    }

    /// Read-only. Suggestion generation degrades internally; the only
    /// structural errors are missing estimate or room.
    pub async fn get_suggestions_for_room(
        &self,
        estimate_id: &str,
        room_id: &Uuid,
    ) -> Result<Vec<Suggestion>, ApiError> {
        let estimate = self.load(estimate_id).await?;
        let room = estimate
            .room(room_id)
            .ok_or(ApiError::RoomNotFound(*room_id))?;

        if !self.config.features.suggestions {
            return Ok(Vec::new());
        }
        let ctx = self.rule_context().await;
        let Some(rules) = ctx.rules else {
            return Ok(Vec::new());
        };

        let auto_add = AutoAddRuleEngine::new(
            self.catalog.clone(),
            ctx.resolver.clone(),
            rules.auto_add.clone(),
        );
        let engine = SuggestionEngine::new(
            self.catalog.clone(),
            ctx.resolver.clone(),
            auto_add,
            rules.suggestions.clone(),
        );
        Ok(engine.suggestions_for_room(room).await)
    }

    async fn load(&self, estimate_id: &str) -> Result<Estimate, ApiError> {
        self.store
            .get_estimate(estimate_id)
            .await?
            .ok_or_else(|| ApiError::EstimateNotFound(estimate_id.to_string()))
    }

    /// Hydrate unpriced entries, recompute the whole tree, write it back.
    async fn finalize(
        &self,
        mut estimate: Estimate,
        ctx: &RuleContext,
    ) -> Result<Estimate, ApiError> {
        self.hydrate_pricing(&ctx.resolver, &mut estimate).await;
        let mut estimate = TotalsCalculator::recompute(estimate);
        estimate.touch();
        self.store.put_estimate(estimate.clone()).await?;

        let event = EstimateSavedEvent {
            estimate_id: estimate.id.clone(),
            room_count: estimate.rooms.len(),
            min_total: estimate.min_total,
            max_total: estimate.max_total,
            occurred_at: Utc::now(),
        };
        info!(event = ?event, "estimate saved");
        Ok(estimate)
    }

    /// Stamp pricing on companion entries that have none yet. Entries that
    /// cannot be resolved right now stay unstamped (they price as fixed
    /// for this pass) and are retried on the next mutation.
    async fn hydrate_pricing(&self, resolver: &PricingRuleResolver, estimate: &mut Estimate) {
        for room in &mut estimate.rooms {
            for item in room.line_items_mut() {
                for extra in &mut item.additional_products {
                    if extra.pricing_method.is_some() {
                        continue;
                    }
                    let facts = match self.catalog.get_product(extra.id).await {
                        Ok(facts) => facts,
                        Err(err) => {
                            warn!(product_id = %extra.id, error = %err, "companion pricing left unstamped");
                            continue;
                        }
                    };
                    match rule_categories(self.catalog.as_ref(), &facts).await {
                        Ok(categories) => {
                            let pricing = resolver.resolve_for_categories(&categories);
                            extra.pricing_method = Some(pricing.method);
                            extra.pricing_source = Some(pricing.source);
                        }
                        Err(err) => {
                            warn!(product_id = %extra.id, error = %err, "companion pricing left unstamped");
                        }
                    }
                }
            }
        }
    }

    /// Build a fully enriched line item for a catalog product: resolved
    /// pricing, primary-category classification, and its auto-add
    /// companions.
    async fn build_line_item(
        &self,
        ctx: &RuleContext,
        product_id: Uuid,
    ) -> Result<LineItem, ApiError> {
        let facts = self.catalog.get_product(product_id).await?;
        let categories = self.categories_for(&facts).await;
        let pricing = ctx.resolver.resolve_for_categories(&categories);
        let is_primary = self.config.features.primary_category_checks
            && ctx
                .rules
                .as_ref()
                .is_some_and(|rules| rules.is_primary(&categories));
        let mut item = LineItem::from_facts(&facts, pricing, is_primary);

        if self.config.features.auto_add {
            if let Some(rules) = &ctx.rules {
                let engine = AutoAddRuleEngine::new(
                    self.catalog.clone(),
                    ctx.resolver.clone(),
                    rules.auto_add.clone(),
                );
                let companions = engine.companions_for(product_id, &categories).await;
                item.additional_products = companions.products;
                item.additional_notes = companions.notes;
            }
        }

        Ok(item)
    }

    /// Rule-matching categories for a product; a failed parent lookup for
    /// a variation degrades to the variation's own categories.
    async fn categories_for(&self, facts: &ProductFacts) -> Vec<Uuid> {
        match rule_categories(self.catalog.as_ref(), facts).await {
            Ok(categories) => categories,
            Err(err) => {
                warn!(product_id = %facts.id, error = %err, "parent categories unavailable, using own");
                facts.category_ids.clone()
            }
        }
    }

    async fn rule_context(&self) -> RuleContext {
        let rules = match self.catalog.get_category_rules().await {
            Ok(rules) if !rules.is_empty() => Some(rules),
            Ok(_) => {
                warn!("category rule tables are empty, enrichment degrades to no-op");
                None
            }
            Err(err) => {
                warn!(error = %err, "category rules unavailable, enrichment degrades to no-op");
                None
            }
        };
        let pricing_rules = rules
            .as_ref()
            .map(|r| r.pricing.clone())
            .unwrap_or_default();
        let resolver = Arc::new(PricingRuleResolver::new(
            pricing_rules,
            self.config.pricing.as_defaults(),
        ));
        RuleContext { rules, resolver }
    }

    fn outcome(&self, estimate: &Estimate, room_id: Option<&Uuid>) -> MutationOutcome {
        MutationOutcome {
            estimate_id: estimate.id.clone(),
            min_total: estimate.min_total,
            max_total: estimate.max_total,
            room: room_id.and_then(|id| estimate.room(id).cloned()),
        }
    }
}
