use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roomquote_estimate::Room;

/// Fragment returned after a mutation: estimate-level totals plus the
/// touched room, when the mutation targeted one.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub estimate_id: String,
    pub min_total: f64,
    pub max_total: f64,
    pub room: Option<Room>,
}

/// What a replacement targets. Replacing a main item discards it wholesale
/// (nested companions included) and re-adds the new product through the
/// normal add path; replacing a companion swaps the slot in place and
/// keeps its lineage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "replace_type", rename_all = "snake_case")]
pub enum ReplaceTarget {
    Main,
    AdditionalProduct { parent_product_id: Uuid },
}
