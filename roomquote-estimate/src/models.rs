use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roomquote_catalog::{PricingMethod, ProductFacts, ResolvedPricing, VariationFacts};
use roomquote_shared::pii::Masked;

/// Free-form customer contact block. Validation is the caller's concern;
/// email and phone are masked in log output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
    pub postcode: String,
}

/// Top-level user project containing rooms. Totals are derived, recomputed
/// after every mutation, and never accepted as input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estimate {
    /// Opaque, client-generated.
    pub id: String,
    pub name: String,
    pub customer_details: CustomerDetails,
    /// Display markup percent, >= 0. Never folded into the stored totals.
    pub default_markup: f64,
    pub rooms: Vec<Room>,
    pub min_total: f64,
    pub max_total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Estimate {
    pub fn new(id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            customer_details: CustomerDetails::default(),
            default_markup: 0.0,
            rooms: Vec::new(),
            min_total: 0.0,
            max_total: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn room(&self, room_id: &Uuid) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == *room_id)
    }

    pub fn room_mut(&mut self, room_id: &Uuid) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == *room_id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Totals with the estimate's markup applied, for display.
    pub fn marked_up_totals(&self) -> (f64, f64) {
        let factor = 1.0 + self.default_markup / 100.0;
        (self.min_total * factor, self.max_total * factor)
    }
}

/// Area-bearing container of products within an estimate. Entry order is
/// insertion order and user-visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    /// Metres.
    pub width: f64,
    pub length: f64,
    pub entries: Vec<RoomEntry>,
    pub min_total: f64,
    pub max_total: f64,
}

impl Room {
    pub fn new(name: String, width: f64, length: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            width,
            length,
            entries: Vec::new(),
            min_total: 0.0,
            max_total: 0.0,
        }
    }

    /// Zero when either dimension is missing or zero; sqm items then price
    /// at their unit price.
    pub fn area(&self) -> f64 {
        if self.width > 0.0 && self.length > 0.0 {
            self.width * self.length
        } else {
            0.0
        }
    }

    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.entries.iter().filter_map(RoomEntry::as_product)
    }

    pub fn line_items_mut(&mut self) -> impl Iterator<Item = &mut LineItem> {
        self.entries.iter_mut().filter_map(RoomEntry::as_product_mut)
    }

    pub fn contains_product(&self, product_id: &Uuid) -> bool {
        self.line_items().any(|item| item.id == *product_id)
    }

    /// Every product id present in the room: main items plus their nested
    /// companions. Notes carry no product id.
    pub fn present_product_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for item in self.line_items() {
            ids.push(item.id);
            for extra in &item.additional_products {
                ids.push(extra.id);
            }
        }
        ids
    }
}

/// One entry in a room's ordered product list. Notes are degenerate
/// entries excluded from pricing and duplicate checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEntry {
    Product(LineItem),
    Note(NoteEntry),
}

impl RoomEntry {
    pub fn as_product(&self) -> Option<&LineItem> {
        match self {
            RoomEntry::Product(item) => Some(item),
            RoomEntry::Note(_) => None,
        }
    }

    pub fn as_product_mut(&mut self) -> Option<&mut LineItem> {
        match self {
            RoomEntry::Product(item) => Some(item),
            RoomEntry::Note(_) => None,
        }
    }
}

/// A free-text note attached to a room or a line item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteEntry {
    pub id: Uuid,
    pub note_text: String,
}

impl NoteEntry {
    pub fn new(note_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            note_text,
        }
    }
}

/// A priced product entry in a room. Unit prices are frozen at the time of
/// addition and not re-fetched on recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product or variation id.
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub pricing_method: PricingMethod,
    pub pricing_source: String,
    pub min_price: f64,
    pub max_price: f64,
    pub min_price_total: f64,
    pub max_price_total: f64,
    pub is_primary_category: bool,
    #[serde(default)]
    pub is_variable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<VariationOption>,
    #[serde(default)]
    pub additional_products: Vec<AdditionalProduct>,
    #[serde(default)]
    pub additional_notes: Vec<NoteEntry>,
}

impl LineItem {
    pub fn from_facts(facts: &ProductFacts, pricing: ResolvedPricing, is_primary: bool) -> Self {
        let min_price = facts.min_price.max(0.0);
        let max_price = facts.max_price.max(0.0);
        Self {
            id: facts.id,
            name: facts.name.clone(),
            image_url: facts.image_url.clone(),
            pricing_method: pricing.method,
            pricing_source: pricing.source,
            min_price,
            max_price,
            min_price_total: min_price,
            max_price_total: max_price,
            is_primary_category: is_primary,
            is_variable: facts.is_variable(),
            variations: facts.variations.iter().map(VariationOption::from_facts).collect(),
            additional_products: Vec::new(),
            additional_notes: Vec::new(),
        }
    }
}

/// A selectable variation carried on a variable product's line item so the
/// caller can render a picker without another catalog round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationOption {
    pub id: Uuid,
    pub name: String,
    pub min_price: f64,
    pub max_price: f64,
}

impl VariationOption {
    fn from_facts(facts: &VariationFacts) -> Self {
        Self {
            id: facts.id,
            name: facts.name.clone(),
            min_price: facts.min_price,
            max_price: facts.max_price,
        }
    }
}

/// Nested companion product under a main line item. The slot keeps the
/// ordered history of ids it has held across replacements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdditionalProduct {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    /// Stamped lazily on the first pricing pass when absent; once set it is
    /// not re-resolved.
    pub pricing_method: Option<PricingMethod>,
    pub pricing_source: Option<String>,
    pub min_price: f64,
    pub max_price: f64,
    pub min_price_total: f64,
    pub max_price_total: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacement_chain: Vec<Uuid>,
    #[serde(default)]
    pub section_title: Option<String>,
    #[serde(default)]
    pub section_description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_colours: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomquote_catalog::PricingDefaults;

    fn facts(min: f64, max: f64) -> ProductFacts {
        ProductFacts {
            id: Uuid::new_v4(),
            name: "Wool carpet".to_string(),
            image_url: None,
            min_price: min,
            max_price: max,
            category_ids: Vec::new(),
            is_variation: false,
            parent_id: None,
            variations: Vec::new(),
        }
    }

    fn default_pricing() -> ResolvedPricing {
        let defaults = PricingDefaults::default();
        ResolvedPricing {
            method: defaults.pricing_method,
            source: defaults.pricing_source,
        }
    }

    #[test]
    fn room_area_is_zero_for_degenerate_dimensions() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        assert_eq!(room.area(), 12.0);

        room.width = 0.0;
        assert_eq!(room.area(), 0.0);
    }

    #[test]
    fn negative_catalog_prices_are_clamped() {
        let item = LineItem::from_facts(&facts(-5.0, 10.0), default_pricing(), false);
        assert_eq!(item.min_price, 0.0);
        assert_eq!(item.max_price, 10.0);
    }

    #[test]
    fn entries_serialize_with_a_type_tag() {
        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        room.entries.push(RoomEntry::Product(LineItem::from_facts(
            &facts(10.0, 20.0),
            default_pricing(),
            false,
        )));
        room.entries
            .push(RoomEntry::Note(NoteEntry::new("Check subfloor".to_string())));

        let json = serde_json::to_value(&room.entries).unwrap();
        assert_eq!(json[0]["type"], "product");
        assert_eq!(json[1]["type"], "note");
        assert_eq!(json[1]["note_text"], "Check subfloor");
    }

    #[test]
    fn present_ids_include_nested_companions() {
        let mut item = LineItem::from_facts(&facts(10.0, 20.0), default_pricing(), false);
        let companion_id = Uuid::new_v4();
        item.additional_products.push(AdditionalProduct {
            id: companion_id,
            name: "Underlay".to_string(),
            image_url: None,
            pricing_method: None,
            pricing_source: None,
            min_price: 2.0,
            max_price: 4.0,
            min_price_total: 2.0,
            max_price_total: 4.0,
            replacement_chain: Vec::new(),
            section_title: None,
            section_description: None,
            option_colours: Vec::new(),
        });
        let main_id = item.id;

        let mut room = Room::new("Lounge".to_string(), 3.0, 4.0);
        room.entries.push(RoomEntry::Product(item));
        room.entries
            .push(RoomEntry::Note(NoteEntry::new("note".to_string())));

        assert_eq!(room.present_product_ids(), vec![main_id, companion_id]);
    }

    #[test]
    fn marked_up_totals_scale_by_percent() {
        let mut estimate = Estimate::new("est-1".to_string(), "New build".to_string());
        estimate.default_markup = 10.0;
        estimate.min_total = 100.0;
        estimate.max_total = 200.0;

        let (min, max) = estimate.marked_up_totals();
        assert!((min - 110.0).abs() < 1e-9);
        assert!((max - 220.0).abs() < 1e-9);
    }
}
