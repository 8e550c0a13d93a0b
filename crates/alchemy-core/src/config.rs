//! Player configuration: efficiency levels and consumable selection.
//!
//! A [`Configuration`] is passed explicitly into every resolution call.
//! Each efficiency level turns into a multiplier `1 + level * factor`, where
//! the factors come from [`EfficiencyScaling`].

use crate::catalog::CatalogLookup;
use crate::id::ItemId;
use serde::{Deserialize, Serialize};

/// Highest level any efficiency dimension can reach.
pub const MAX_LEVEL: u8 = 10;

/// The ten upgradeable efficiency dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Efficiency {
    Logistics,
    Throwing,
    FactorySpeed,
    Alchemy,
    Fuel,
    Fertilizer,
    Sales,
    Negotiation,
    CustomerManagement,
    RelicKnowledge,
}

impl Efficiency {
    pub const ALL: [Efficiency; 10] = [
        Efficiency::Logistics,
        Efficiency::Throwing,
        Efficiency::FactorySpeed,
        Efficiency::Alchemy,
        Efficiency::Fuel,
        Efficiency::Fertilizer,
        Efficiency::Sales,
        Efficiency::Negotiation,
        Efficiency::CustomerManagement,
        Efficiency::RelicKnowledge,
    ];
}

/// Level (0..=10) for each efficiency dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyLevels {
    pub logistics: u8,
    pub throwing: u8,
    pub factory_speed: u8,
    pub alchemy: u8,
    pub fuel: u8,
    pub fertilizer: u8,
    pub sales: u8,
    pub negotiation: u8,
    pub customer_management: u8,
    pub relic_knowledge: u8,
}

impl EfficiencyLevels {
    pub fn get(&self, dimension: Efficiency) -> u8 {
        match dimension {
            Efficiency::Logistics => self.logistics,
            Efficiency::Throwing => self.throwing,
            Efficiency::FactorySpeed => self.factory_speed,
            Efficiency::Alchemy => self.alchemy,
            Efficiency::Fuel => self.fuel,
            Efficiency::Fertilizer => self.fertilizer,
            Efficiency::Sales => self.sales,
            Efficiency::Negotiation => self.negotiation,
            Efficiency::CustomerManagement => self.customer_management,
            Efficiency::RelicKnowledge => self.relic_knowledge,
        }
    }

    pub fn set(&mut self, dimension: Efficiency, level: u8) {
        let slot = match dimension {
            Efficiency::Logistics => &mut self.logistics,
            Efficiency::Throwing => &mut self.throwing,
            Efficiency::FactorySpeed => &mut self.factory_speed,
            Efficiency::Alchemy => &mut self.alchemy,
            Efficiency::Fuel => &mut self.fuel,
            Efficiency::Fertilizer => &mut self.fertilizer,
            Efficiency::Sales => &mut self.sales,
            Efficiency::Negotiation => &mut self.negotiation,
            Efficiency::CustomerManagement => &mut self.customer_management,
            Efficiency::RelicKnowledge => &mut self.relic_knowledge,
        };
        *slot = level;
    }
}

/// Per-level scaling factors and the base belt throughput.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyScaling {
    /// Units per minute a belt carries at logistics level 0.
    pub base_belt_throughput: f64,
    pub logistics: f64,
    pub throwing: f64,
    pub factory_speed: f64,
    pub alchemy: f64,
    pub fuel: f64,
    pub fertilizer: f64,
    pub sales: f64,
    pub negotiation: f64,
    pub customer_management: f64,
    pub relic_knowledge: f64,
}

impl Default for EfficiencyScaling {
    fn default() -> Self {
        Self {
            base_belt_throughput: 60.0,
            logistics: 0.25,
            throwing: 0.25,
            factory_speed: 0.25,
            alchemy: 0.06,
            fuel: 0.10,
            fertilizer: 0.10,
            sales: 0.03,
            negotiation: 0.25,
            customer_management: 0.06,
            relic_knowledge: 0.10,
        }
    }
}

impl EfficiencyScaling {
    pub fn factor(&self, dimension: Efficiency) -> f64 {
        match dimension {
            Efficiency::Logistics => self.logistics,
            Efficiency::Throwing => self.throwing,
            Efficiency::FactorySpeed => self.factory_speed,
            Efficiency::Alchemy => self.alchemy,
            Efficiency::Fuel => self.fuel,
            Efficiency::Fertilizer => self.fertilizer,
            Efficiency::Sales => self.sales,
            Efficiency::Negotiation => self.negotiation,
            Efficiency::CustomerManagement => self.customer_management,
            Efficiency::RelicKnowledge => self.relic_knowledge,
        }
    }
}

/// Everything the player chose that affects a resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub levels: EfficiencyLevels,
    pub scaling: EfficiencyScaling,
    pub selected_fuel: Option<ItemId>,
    pub selected_fertilizer: Option<ItemId>,
}

impl Configuration {
    pub fn with_level(mut self, dimension: Efficiency, level: u8) -> Self {
        self.levels.set(dimension, level);
        self
    }

    pub fn with_fuel(mut self, item: &str) -> Self {
        self.selected_fuel = Some(ItemId::from(item));
        self
    }

    pub fn with_fertilizer(mut self, item: &str) -> Self {
        self.selected_fertilizer = Some(ItemId::from(item));
        self
    }

    /// `1 + level * factor` for one dimension.
    pub fn multiplier(&self, dimension: Efficiency) -> f64 {
        1.0 + f64::from(self.levels.get(dimension)) * self.scaling.factor(dimension)
    }

    /// Units per minute one belt carries at the current logistics level.
    pub fn belt_limit(&self) -> f64 {
        self.scaling.base_belt_throughput * self.multiplier(Efficiency::Logistics)
    }

    /// Check level ranges and the consumable selections against a catalog.
    pub fn validate<C: CatalogLookup + ?Sized>(&self, catalog: &C) -> Result<(), ConfigError> {
        for dimension in Efficiency::ALL {
            let level = self.levels.get(dimension);
            if level > MAX_LEVEL {
                return Err(ConfigError::LevelOutOfRange { dimension, level });
            }
            let factor = self.scaling.factor(dimension);
            if !(factor.is_finite() && factor >= 0.0) {
                return Err(ConfigError::InvalidScaling { dimension, factor });
            }
        }
        let base = self.scaling.base_belt_throughput;
        if !(base.is_finite() && base > 0.0) {
            return Err(ConfigError::InvalidBeltThroughput(base));
        }

        if let Some(fuel) = &self.selected_fuel {
            if !catalog.contains_item(fuel) {
                return Err(ConfigError::UnknownItem(fuel.clone()));
            }
            if catalog.fuel_value(fuel).is_none() {
                return Err(ConfigError::NotAFuel(fuel.clone()));
            }
        }
        if let Some(fertilizer) = &self.selected_fertilizer {
            if !catalog.contains_item(fertilizer) {
                return Err(ConfigError::UnknownItem(fertilizer.clone()));
            }
            if catalog.fertilizer_potency(fertilizer).is_none() {
                return Err(ConfigError::NotAFertilizer(fertilizer.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{dimension:?} level {level} is outside 0..=10")]
    LevelOutOfRange { dimension: Efficiency, level: u8 },
    #[error("{dimension:?} scaling factor {factor} must be a non-negative number")]
    InvalidScaling { dimension: Efficiency, factor: f64 },
    #[error("base belt throughput {0} must be positive")]
    InvalidBeltThroughput(f64),
    #[error("selected item '{0}' is not in the catalog")]
    UnknownItem(ItemId),
    #[error("selected fuel '{0}' has no heat value")]
    NotAFuel(ItemId),
    #[error("selected fertilizer '{0}' has no potency")]
    NotAFertilizer(ItemId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_catalog;

    #[test]
    fn default_multipliers_are_one() {
        let config = Configuration::default();
        for dimension in Efficiency::ALL {
            assert_eq!(config.multiplier(dimension), 1.0);
        }
    }

    #[test]
    fn belt_limit_grows_fifteen_per_level() {
        let config = Configuration::default();
        assert!((config.belt_limit() - 60.0).abs() < 1e-9);
        let config = config.with_level(Efficiency::Logistics, 1);
        assert!((config.belt_limit() - 75.0).abs() < 1e-9);
        let config = config.with_level(Efficiency::Logistics, 10);
        assert!((config.belt_limit() - 210.0).abs() < 1e-9);
    }

    #[test]
    fn alchemy_scales_six_percent_per_level() {
        let config = Configuration::default().with_level(Efficiency::Alchemy, 5);
        assert!((config.multiplier(Efficiency::Alchemy) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn levels_get_set_roundtrip_every_dimension() {
        let mut levels = EfficiencyLevels::default();
        for (i, dimension) in Efficiency::ALL.into_iter().enumerate() {
            levels.set(dimension, i as u8);
        }
        for (i, dimension) in Efficiency::ALL.into_iter().enumerate() {
            assert_eq!(levels.get(dimension), i as u8);
        }
    }

    #[test]
    fn level_above_ten_is_rejected() {
        let catalog = sample_catalog();
        let config = Configuration::default().with_level(Efficiency::Sales, 11);
        assert_eq!(
            config.validate(&catalog),
            Err(ConfigError::LevelOutOfRange {
                dimension: Efficiency::Sales,
                level: 11
            })
        );
    }

    #[test]
    fn selected_fuel_must_be_a_fuel() {
        let catalog = sample_catalog();
        assert!(Configuration::default().with_fuel("Coal").validate(&catalog).is_ok());
        assert_eq!(
            Configuration::default().with_fuel("Water").validate(&catalog),
            Err(ConfigError::NotAFuel(ItemId::from("Water")))
        );
        assert_eq!(
            Configuration::default().with_fuel("Dragon Breath").validate(&catalog),
            Err(ConfigError::UnknownItem(ItemId::from("Dragon Breath")))
        );
    }

    #[test]
    fn selected_fertilizer_must_be_a_fertilizer() {
        let catalog = sample_catalog();
        assert!(
            Configuration::default()
                .with_fertilizer("Compost")
                .validate(&catalog)
                .is_ok()
        );
        assert_eq!(
            Configuration::default().with_fertilizer("Coal").validate(&catalog),
            Err(ConfigError::NotAFertilizer(ItemId::from("Coal")))
        );
    }

    #[test]
    fn partial_configuration_deserializes_with_defaults() {
        let json = r#"{"levels": {"logistics": 3}, "selected_fuel": "Coal"}"#;
        let config: Configuration = serde_json::from_str(json).unwrap();
        assert_eq!(config.levels.logistics, 3);
        assert_eq!(config.levels.alchemy, 0);
        assert_eq!(config.selected_fuel, Some(ItemId::from("Coal")));
        assert_eq!(config.scaling, EfficiencyScaling::default());
    }
}
