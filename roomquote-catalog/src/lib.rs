pub mod gateway;
pub mod pricing;
pub mod product;
pub mod rules;

pub use gateway::{rule_categories, CatalogGateway, GatewayError};
pub use pricing::{PricingDefaults, PricingMethod, PricingRuleResolver, ResolvedPricing};
pub use product::{ProductFacts, VariationFacts};
pub use rules::{AutoAddProduct, AutoAddRule, CategoryRules, PricingRule, SuggestionRule};
