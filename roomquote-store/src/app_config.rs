use serde::Deserialize;
use std::env;

use roomquote_catalog::{PricingDefaults, PricingMethod};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub estimate: EstimateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub default_method: PricingMethod,
    pub default_source: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let defaults = PricingDefaults::default();
        Self {
            default_method: defaults.pricing_method,
            default_source: defaults.pricing_source,
        }
    }
}

impl PricingConfig {
    pub fn as_defaults(&self) -> PricingDefaults {
        PricingDefaults {
            pricing_method: self.default_method,
            pricing_source: self.default_source.clone(),
        }
    }
}

/// Feature switches for the optional enrichment steps. Everything is on by
/// default; switching one off degrades that step to a no-op.
#[derive(Debug, Deserialize, Clone)]
pub struct FeaturesConfig {
    #[serde(default = "default_true")]
    pub auto_add: bool,
    #[serde(default = "default_true")]
    pub suggestions: bool,
    #[serde(default = "default_true")]
    pub primary_category_checks: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            auto_add: true,
            suggestions: true,
            primary_category_checks: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EstimateConfig {
    /// Percent applied to display totals for new estimates.
    #[serde(default)]
    pub default_markup: f64,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            features: FeaturesConfig::default(),
            estimate: EstimateConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Base configuration file, then the environment-specific file,
            // then an uncommitted local override. All optional: the typed
            // defaults above stand in when nothing is configured.
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `ROOMQUOTE__FEATURES__AUTO_ADD=false`
            .add_source(config::Environment::with_prefix("ROOMQUOTE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
