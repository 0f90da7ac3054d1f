pub mod manager;
pub mod models;
pub mod replacement;
pub mod totals;

pub use manager::{EstimateError, EstimateManager};
pub use models::{
    AdditionalProduct, CustomerDetails, Estimate, LineItem, NoteEntry, Room, RoomEntry,
    VariationOption,
};
pub use replacement::ReplacementLedger;
pub use totals::TotalsCalculator;
