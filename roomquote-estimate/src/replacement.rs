use uuid::Uuid;

use roomquote_catalog::{ProductFacts, ResolvedPricing};

use crate::models::AdditionalProduct;

/// Lineage bookkeeping for companion-product slots. Each slot remembers
/// every id it has ever held, in replacement order; a cycle of
/// replacements may legitimately repeat an id.
pub struct ReplacementLedger;

impl ReplacementLedger {
    /// Append `old_id` to the chain unless it is already the most recent
    /// entry (a retried swap must not double-record).
    pub fn record(chain: &mut Vec<Uuid>, old_id: Uuid) {
        if chain.last() != Some(&old_id) {
            chain.push(old_id);
        }
    }

    /// Swap a companion slot to a new product in place: record the outgoing
    /// id, re-stamp the catalog facts and pricing, keep the slot's position
    /// and section metadata. Totals are refreshed by the next recompute.
    pub fn swap_slot(slot: &mut AdditionalProduct, facts: &ProductFacts, pricing: ResolvedPricing) {
        Self::record(&mut slot.replacement_chain, slot.id);
        slot.id = facts.id;
        slot.name = facts.name.clone();
        slot.image_url = facts.image_url.clone();
        slot.pricing_method = Some(pricing.method);
        slot.pricing_source = Some(pricing.source);
        slot.min_price = facts.min_price.max(0.0);
        slot.max_price = facts.max_price.max(0.0);
    }
}
