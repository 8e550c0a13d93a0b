//! Serde data file structs for catalog content and plans.
//!
//! These structs define the on-disk format for items, devices, recipes and
//! plans. They are deserialized from RON, JSON, or TOML data files and then
//! turned into engine types by the loader.

use alchemy_core::catalog::DeviceKind;
use alchemy_core::config::Configuration;
use alchemy_core::layout::{LayoutOptions, SavedPositions};
use alchemy_core::resolve::{ProductionTarget, ResolveLimits};
use serde::Deserialize;

// ===========================================================================
// Items
// ===========================================================================

/// An item definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    pub name: String,
    /// Present on fuels.
    #[serde(default)]
    pub heat_value: Option<f64>,
    /// Present on fertilizers.
    #[serde(default)]
    pub fertilizer_potency: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ===========================================================================
// Devices
// ===========================================================================

/// A device definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceData {
    pub name: String,
    #[serde(default)]
    pub kind: DeviceKind,
    /// Base cycles per minute.
    pub throughput: f64,
    #[serde(default)]
    pub heat: f64,
    /// Defaults to `heat > 0` when omitted.
    #[serde(default)]
    pub requires_fuel: Option<bool>,
    #[serde(default)]
    pub nutrient_demand: f64,
}

impl DeviceData {
    pub fn burns_fuel(&self) -> bool {
        self.requires_fuel.unwrap_or(self.heat > 0.0)
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

/// An item quantity, in short tuple form or with explicit fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntryData {
    /// Short form: `("Sand", 2.0)`.
    Short(String, f64),
    Full { item: String, quantity: f64 },
}

impl EntryData {
    pub fn item(&self) -> &str {
        match self {
            EntryData::Short(item, _) | EntryData::Full { item, .. } => item,
        }
    }

    pub fn quantity(&self) -> f64 {
        match self {
            EntryData::Short(_, quantity) | EntryData::Full { quantity, .. } => *quantity,
        }
    }
}

/// A recipe definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    pub output: EntryData,
    #[serde(default)]
    pub inputs: Vec<EntryData>,
    #[serde(default)]
    pub byproducts: Vec<EntryData>,
    pub device: String,
    /// Seconds per cycle, overriding the device's throughput.
    #[serde(default)]
    pub duration: Option<f64>,
}

// ===========================================================================
// Plans
// ===========================================================================

/// Targets plus everything else one planning run needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Plan {
    pub targets: Vec<ProductionTarget>,
    #[serde(default)]
    pub configuration: Configuration,
    #[serde(default)]
    pub limits: ResolveLimits,
    #[serde(default)]
    pub layout: LayoutOptions,
    #[serde(default)]
    pub saved_positions: SavedPositions,
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use alchemy_core::config::Efficiency;
    use alchemy_core::consolidate::NodeKey;
    use alchemy_core::layout::Direction;

    #[test]
    fn item_from_ron_with_optional_roles() {
        let ron = r#"[
            (name: "Water"),
            (name: "Coal", heat_value: Some(40.0)),
            (name: "Compost", fertilizer_potency: Some(8.0), tags: ["organic"]),
        ]"#;
        let items: Vec<ItemData> = ron::from_str(ron).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].heat_value, None);
        assert_eq!(items[1].heat_value, Some(40.0));
        assert_eq!(items[2].fertilizer_potency, Some(8.0));
        assert_eq!(items[2].tags, vec!["organic"]);
    }

    #[test]
    fn device_kind_defaults_to_workshop() {
        let json = r#"{"name": "Kiln", "throughput": 6}"#;
        let device: DeviceData = serde_json::from_str(json).unwrap();
        assert_eq!(device.kind, DeviceKind::Workshop);
        assert_eq!(device.heat, 0.0);
        assert!(!device.burns_fuel());
    }

    #[test]
    fn device_with_heat_burns_fuel_unless_told_otherwise() {
        let ron = r#"(name: "Furnace", kind: workshop, throughput: 12.0, heat: 30.0)"#;
        let device: DeviceData = ron::from_str(ron).unwrap();
        assert!(device.burns_fuel());

        let ron = r#"(name: "Sun Oven", throughput: 4.0, heat: 10.0, requires_fuel: Some(false))"#;
        let device: DeviceData = ron::from_str(ron).unwrap();
        assert!(!device.burns_fuel());
    }

    #[test]
    fn recipe_entries_short_and_full_forms() {
        let ron = r#"(
            name: "Extract Essence",
            output: ("Herbal Extract", 1.0),
            inputs: [("Healing Herb", 2.0), (item: "Water", quantity: 1.0)],
            byproducts: [("Plant Pulp", 1.0)],
            device: "Extractor",
        )"#;
        let recipe: RecipeData = ron::from_str(ron).unwrap();
        assert_eq!(recipe.output.item(), "Herbal Extract");
        assert_eq!(recipe.inputs.len(), 2);
        assert_eq!(recipe.inputs[1].item(), "Water");
        assert_eq!(recipe.inputs[1].quantity(), 1.0);
        assert_eq!(recipe.byproducts[0].item(), "Plant Pulp");
        assert_eq!(recipe.duration, None);
    }

    #[test]
    fn recipe_from_toml() {
        let toml_str = r#"
            name = "Melt Glass"
            output = ["Glass", 1.0]
            inputs = [["Sand", 2.0]]
            device = "Furnace"
            duration = 5.0
        "#;
        let recipe: RecipeData = toml::from_str(toml_str).unwrap();
        assert_eq!(recipe.duration, Some(5.0));
        assert_eq!(recipe.inputs[0].quantity(), 2.0);
    }

    #[test]
    fn plan_from_ron_with_partial_configuration() {
        let ron = r#"(
            targets: [(item: "Healing Potion", rate: 10.0)],
            configuration: (
                levels: (logistics: 1, alchemy: 4),
                selected_fuel: Some("Coal"),
            ),
            layout: (direction: top_to_bottom),
        )"#;
        let plan: Plan = ron::from_str(ron).unwrap();
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.configuration.levels.get(Efficiency::Logistics), 1);
        assert_eq!(plan.configuration.levels.get(Efficiency::Alchemy), 4);
        assert_eq!(plan.limits, ResolveLimits::default());
        assert_eq!(plan.layout.direction, Direction::TopToBottom);
        assert_eq!(plan.layout.rank_sep, 180.0);
        assert!(plan.saved_positions.is_empty());
    }

    #[test]
    fn plan_from_json_with_saved_positions() {
        let json = r#"{
            "targets": [{"item": "Glass", "rate": 5}],
            "saved_positions": {
                "Sand": {"x": 10.0, "y": 20.0},
                "target-Glass-0": {"x": 900.0, "y": 0.0}
            }
        }"#;
        let plan: Plan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.saved_positions.len(), 2);
        assert!(plan.saved_positions.contains_key(&NodeKey::from("Sand")));
        assert!(plan.saved_positions.keys().any(|k| k.is_target()));
    }

    #[test]
    fn plan_from_toml() {
        let toml_str = r#"
            [[targets]]
            item = "Mana Potion"
            rate = 12.5

            [configuration.levels]
            factory_speed = 2

            [limits]
            max_depth = 16
        "#;
        let plan: Plan = toml::from_str(toml_str).unwrap();
        assert_eq!(plan.targets[0].rate, 12.5);
        assert_eq!(plan.configuration.levels.factory_speed, 2);
        assert_eq!(plan.limits.max_depth, 16);
    }
}
