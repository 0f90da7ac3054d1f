pub mod auto_add;
pub mod engine;
pub mod models;

pub use auto_add::{AutoAddRuleEngine, Companions};
pub use engine::SuggestionEngine;
pub use models::Suggestion;
