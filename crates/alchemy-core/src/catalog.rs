//! Immutable catalog of items, recipes and devices.
//!
//! Built once through [`CatalogBuilder`] (register, then validate on
//! [`CatalogBuilder::build`]) and read through the [`CatalogLookup`] trait,
//! which is the only view of the catalog the resolver needs.

use crate::id::{DeviceId, ItemId, RecipeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// An item definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDef {
    pub id: ItemId,
    /// Heat released per unit when burned. `Some` marks the item as a fuel.
    pub heat_value: Option<f64>,
    /// Nutrient value per unit. `Some` marks the item as a fertilizer.
    pub fertilizer_potency: Option<f64>,
    pub tags: Vec<String>,
}

impl ItemDef {
    /// A plain item with no fuel or fertilizer role.
    pub fn new(name: &str) -> Self {
        Self {
            id: ItemId::from(name),
            heat_value: None,
            fertilizer_potency: None,
            tags: Vec::new(),
        }
    }

    pub fn fuel(name: &str, heat_value: f64) -> Self {
        Self {
            heat_value: Some(heat_value),
            ..Self::new(name)
        }
    }

    pub fn fertilizer(name: &str, potency: f64) -> Self {
        Self {
            fertilizer_potency: Some(potency),
            ..Self::new(name)
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }
}

/// An item and a per-cycle quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEntry {
    pub item: ItemId,
    pub quantity: f64,
}

/// A recipe definition: one output, ordered inputs, optional byproducts.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDef {
    pub id: RecipeId,
    pub output: RecipeEntry,
    pub inputs: Vec<RecipeEntry>,
    pub byproducts: Vec<RecipeEntry>,
    pub device: DeviceId,
    /// Seconds per cycle. Overrides the device's base cycles/minute when set.
    pub duration: Option<f64>,
}

impl RecipeDef {
    pub fn new(name: &str, output: &str, yield_per_cycle: f64, device: &str) -> Self {
        Self {
            id: RecipeId::from(name),
            output: RecipeEntry {
                item: ItemId::from(output),
                quantity: yield_per_cycle,
            },
            inputs: Vec::new(),
            byproducts: Vec::new(),
            device: DeviceId::from(device),
            duration: None,
        }
    }

    pub fn input(mut self, item: &str, quantity: f64) -> Self {
        self.inputs.push(RecipeEntry {
            item: ItemId::from(item),
            quantity,
        });
        self
    }

    pub fn byproduct(mut self, item: &str, quantity: f64) -> Self {
        self.byproducts.push(RecipeEntry {
            item: ItemId::from(item),
            quantity,
        });
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

/// Device families. The family decides which efficiency level scales it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Yield per cycle scales with alchemy skill.
    Extractor,
    /// Cycle speed scales with factory efficiency.
    #[default]
    Workshop,
    /// Cycle speed scales with throwing efficiency.
    Catapult,
}

/// A device type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDef {
    pub id: DeviceId,
    pub kind: DeviceKind,
    /// Base cycles per minute.
    pub throughput: f64,
    /// Heat drawn by one running device.
    pub heat: f64,
    pub requires_fuel: bool,
    /// Nutrients drawn by one running device. Non-zero means it takes fertilizer.
    pub nutrient_demand: f64,
}

impl DeviceDef {
    pub fn new(name: &str, kind: DeviceKind, throughput: f64) -> Self {
        Self {
            id: DeviceId::from(name),
            kind,
            throughput,
            heat: 0.0,
            requires_fuel: false,
            nutrient_demand: 0.0,
        }
    }

    /// Mark the device as fuel-burning with the given heat draw.
    pub fn burning(mut self, heat: f64) -> Self {
        self.heat = heat;
        self.requires_fuel = true;
        self
    }

    pub fn fertilized(mut self, nutrient_demand: f64) -> Self {
        self.nutrient_demand = nutrient_demand;
        self
    }
}

// ---------------------------------------------------------------------------
// Lookup trait
// ---------------------------------------------------------------------------

/// Read-only catalog queries used by the resolver.
pub trait CatalogLookup {
    fn contains_item(&self, item: &ItemId) -> bool;

    /// The recipe producing `item`, or `None` for raw items.
    fn recipe_for(&self, item: &ItemId) -> Option<&RecipeDef>;

    fn device_for(&self, recipe: &RecipeId) -> Option<&DeviceDef>;

    /// Heat value if `item` is a fuel.
    fn fuel_value(&self, item: &ItemId) -> Option<f64>;

    /// Potency if `item` is a fertilizer.
    fn fertilizer_potency(&self, item: &ItemId) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    items: Vec<ItemDef>,
    item_index: HashMap<ItemId, usize>,
    recipes: Vec<RecipeDef>,
    recipe_index: HashMap<RecipeId, usize>,
    devices: Vec<DeviceDef>,
    device_index: HashMap<DeviceId, usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_item(&mut self, item: ItemDef) -> Result<ItemId, CatalogError> {
        if self.item_index.contains_key(&item.id) {
            return Err(CatalogError::DuplicateName {
                kind: "item",
                name: item.id.to_string(),
            });
        }
        let id = item.id.clone();
        self.item_index.insert(id.clone(), self.items.len());
        self.items.push(item);
        Ok(id)
    }

    pub fn register_device(&mut self, device: DeviceDef) -> Result<DeviceId, CatalogError> {
        if self.device_index.contains_key(&device.id) {
            return Err(CatalogError::DuplicateName {
                kind: "device",
                name: device.id.to_string(),
            });
        }
        let id = device.id.clone();
        self.device_index.insert(id.clone(), self.devices.len());
        self.devices.push(device);
        Ok(id)
    }

    pub fn register_recipe(&mut self, recipe: RecipeDef) -> Result<RecipeId, CatalogError> {
        if self.recipe_index.contains_key(&recipe.id) {
            return Err(CatalogError::DuplicateName {
                kind: "recipe",
                name: recipe.id.to_string(),
            });
        }
        let id = recipe.id.clone();
        self.recipe_index.insert(id.clone(), self.recipes.len());
        self.recipes.push(recipe);
        Ok(id)
    }

    pub fn contains_item(&self, item: &ItemId) -> bool {
        self.item_index.contains_key(item)
    }

    /// Validate every cross reference and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for item in &self.items {
            for (field, value) in [
                ("heat_value", item.heat_value),
                ("fertilizer_potency", item.fertilizer_potency),
            ] {
                if let Some(v) = value
                    && !(v.is_finite() && v > 0.0)
                {
                    return Err(CatalogError::InvalidQuantity {
                        owner: item.id.to_string(),
                        field,
                        value: v,
                    });
                }
            }
        }

        for device in &self.devices {
            if !(device.throughput.is_finite() && device.throughput > 0.0) {
                return Err(CatalogError::InvalidQuantity {
                    owner: device.id.to_string(),
                    field: "throughput",
                    value: device.throughput,
                });
            }
            for (field, value) in [("heat", device.heat), ("nutrient_demand", device.nutrient_demand)] {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(CatalogError::InvalidQuantity {
                        owner: device.id.to_string(),
                        field,
                        value,
                    });
                }
            }
        }

        let mut recipe_by_output: HashMap<ItemId, usize> = HashMap::new();
        for (idx, recipe) in self.recipes.iter().enumerate() {
            if !self.device_index.contains_key(&recipe.device) {
                return Err(CatalogError::UnresolvedRef {
                    owner: recipe.id.to_string(),
                    kind: "device",
                    name: recipe.device.to_string(),
                });
            }
            if let Some(seconds) = recipe.duration
                && !(seconds.is_finite() && seconds > 0.0)
            {
                return Err(CatalogError::InvalidQuantity {
                    owner: recipe.id.to_string(),
                    field: "duration",
                    value: seconds,
                });
            }

            let entries = std::iter::once(&recipe.output)
                .chain(recipe.inputs.iter())
                .chain(recipe.byproducts.iter());
            for entry in entries {
                if !self.item_index.contains_key(&entry.item) {
                    return Err(CatalogError::UnresolvedRef {
                        owner: recipe.id.to_string(),
                        kind: "item",
                        name: entry.item.to_string(),
                    });
                }
                if !(entry.quantity.is_finite() && entry.quantity > 0.0) {
                    return Err(CatalogError::InvalidQuantity {
                        owner: recipe.id.to_string(),
                        field: "quantity",
                        value: entry.quantity,
                    });
                }
            }

            if let Some(&first) = recipe_by_output.get(&recipe.output.item) {
                return Err(CatalogError::ConflictingRecipes {
                    item: recipe.output.item.to_string(),
                    first: self.recipes[first].id.to_string(),
                    second: recipe.id.to_string(),
                });
            }
            recipe_by_output.insert(recipe.output.item.clone(), idx);
        }

        Ok(Catalog {
            items: self.items,
            item_index: self.item_index,
            recipes: self.recipes,
            recipe_index: self.recipe_index,
            recipe_by_output,
            devices: self.devices,
            device_index: self.device_index,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after [`CatalogBuilder::build`].
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<ItemDef>,
    item_index: HashMap<ItemId, usize>,
    recipes: Vec<RecipeDef>,
    recipe_index: HashMap<RecipeId, usize>,
    recipe_by_output: HashMap<ItemId, usize>,
    devices: Vec<DeviceDef>,
    device_index: HashMap<DeviceId, usize>,
}

impl Catalog {
    pub fn get_item(&self, id: &ItemId) -> Option<&ItemDef> {
        self.item_index.get(id).map(|&idx| &self.items[idx])
    }

    pub fn get_recipe(&self, id: &RecipeId) -> Option<&RecipeDef> {
        self.recipe_index.get(id).map(|&idx| &self.recipes[idx])
    }

    pub fn get_device(&self, id: &DeviceId) -> Option<&DeviceDef> {
        self.device_index.get(id).map(|&idx| &self.devices[idx])
    }

    /// Items in registration order.
    pub fn items(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter()
    }

    pub fn recipes(&self) -> impl Iterator<Item = &RecipeDef> {
        self.recipes.iter()
    }

    pub fn fuels(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter().filter(|item| item.heat_value.is_some())
    }

    pub fn fertilizers(&self) -> impl Iterator<Item = &ItemDef> {
        self.items
            .iter()
            .filter(|item| item.fertilizer_potency.is_some())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

impl CatalogLookup for Catalog {
    fn contains_item(&self, item: &ItemId) -> bool {
        self.item_index.contains_key(item)
    }

    fn recipe_for(&self, item: &ItemId) -> Option<&RecipeDef> {
        self.recipe_by_output.get(item).map(|&idx| &self.recipes[idx])
    }

    fn device_for(&self, recipe: &RecipeId) -> Option<&DeviceDef> {
        self.get_recipe(recipe)
            .and_then(|recipe| self.get_device(&recipe.device))
    }

    fn fuel_value(&self, item: &ItemId) -> Option<f64> {
        self.get_item(item).and_then(|item| item.heat_value)
    }

    fn fertilizer_potency(&self, item: &ItemId) -> Option<f64> {
        self.get_item(item).and_then(|item| item.fertilizer_potency)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
    #[error("unresolved {kind} reference '{name}' in {owner}")]
    UnresolvedRef {
        owner: String,
        kind: &'static str,
        name: String,
    },
    #[error("invalid {field} {value} in {owner}")]
    InvalidQuantity {
        owner: String,
        field: &'static str,
        value: f64,
    },
    #[error("item '{item}' is produced by both '{first}' and '{second}'")]
    ConflictingRecipes {
        item: String,
        first: String,
        second: String,
    },
}
