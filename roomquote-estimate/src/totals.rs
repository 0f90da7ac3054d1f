use roomquote_catalog::PricingMethod;

use crate::models::{Estimate, Room, RoomEntry};

/// Whole-tree totals recomputation. Pure and idempotent: running it twice
/// over the same tree produces the same totals.
pub struct TotalsCalculator;

impl TotalsCalculator {
    /// Recompute every derived total in the tree: per-item totals from the
    /// frozen unit prices, room totals from live items, estimate totals
    /// from rooms.
    pub fn recompute(mut estimate: Estimate) -> Estimate {
        let mut min_total = 0.0;
        let mut max_total = 0.0;
        for room in &mut estimate.rooms {
            Self::recompute_room(room);
            min_total += room.min_total;
            max_total += room.max_total;
        }
        estimate.min_total = min_total;
        estimate.max_total = max_total;
        estimate
    }

    pub fn recompute_room(room: &mut Room) {
        let area = room.area();
        let mut min_total = 0.0;
        let mut max_total = 0.0;
        for entry in &mut room.entries {
            let item = match entry {
                RoomEntry::Product(item) => item,
                RoomEntry::Note(_) => continue,
            };

            let (min, max) =
                Self::item_totals(item.pricing_method, item.min_price, item.max_price, area);
            item.min_price_total = min;
            item.max_price_total = max;
            min_total += min;
            max_total += max;

            for extra in &mut item.additional_products {
                // Unstamped entries price as fixed until a hydration pass
                // resolves them.
                let method = extra.pricing_method.unwrap_or(PricingMethod::Fixed);
                let (min, max) = Self::item_totals(method, extra.min_price, extra.max_price, area);
                extra.min_price_total = min;
                extra.max_price_total = max;
                min_total += min;
                max_total += max;
            }
        }
        room.min_total = min_total;
        room.max_total = max_total;
    }

    /// Per-item rule: sqm scales by area unless the area is zero, fixed is
    /// taken as-is.
    pub fn item_totals(
        method: PricingMethod,
        min_price: f64,
        max_price: f64,
        area: f64,
    ) -> (f64, f64) {
        match method {
            PricingMethod::Sqm if area > 0.0 => (min_price * area, max_price * area),
            _ => (min_price, max_price),
        }
    }
}
