//! Shared fixtures for unit tests, integration tests and benches.

use crate::catalog::{Catalog, CatalogBuilder, DeviceDef, DeviceKind, ItemDef, RecipeDef};
use crate::config::{Configuration, Efficiency};
use crate::resolve::ProductionTarget;

/// Tolerance used by [`approx_eq`].
pub const EPSILON: f64 = 1e-9;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

pub fn target(item: &str, rate: f64) -> ProductionTarget {
    ProductionTarget::new(item, rate)
}

/// The planner's starting configuration: logistics 1, nothing selected.
pub fn planner_config() -> Configuration {
    Configuration::default().with_level(Efficiency::Logistics, 1)
}

/// A small potion economy.
///
/// | Recipe              | Device        | Per cycle                                   |
/// |---------------------|---------------|---------------------------------------------|
/// | Grow Herb           | Herb Garden   | 1 Herb Seed + 2 Water -> 3 Healing Herb     |
/// | Extract Essence     | Extractor     | 2 Healing Herb + 1 Water -> 1 Herbal Extract, 1 Plant Pulp |
/// | Melt Glass          | Furnace       | 2 Sand -> 1 Glass                           |
/// | Blow Vial           | Glassblower   | 1 Glass -> 2 Glass Vial                     |
/// | Brew Healing Potion | Alchemy Table | 1 Herbal Extract + 1 Water + 1 Glass Vial -> 1 Healing Potion |
/// | Brew Mana Potion    | Alchemy Table | 1 Mana Crystal + 2 Water + 1 Glass Vial -> 1 Mana Potion |
/// | Burn Charcoal       | Kiln          | 2 Wood -> 1 Charcoal, 1 Ash                 |
/// | Make Compost        | Composter     | 2 Plant Pulp -> 1 Compost                   |
///
/// Herb Garden runs 6 cycles/min and draws 2 nutrients per device. Extractor
/// runs 10, Furnace 12 (heat 30), Glassblower 20, Alchemy Table 5, Kiln 6
/// and Composter 4. Coal burns for 40 heat, Charcoal for 30; Compost has
/// potency 8.
pub fn sample_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();

    for name in [
        "Water",
        "Herb Seed",
        "Sand",
        "Wood",
        "Mana Crystal",
        "Plant Pulp",
        "Ash",
        "Healing Herb",
        "Herbal Extract",
        "Glass",
        "Glass Vial",
    ] {
        b.register_item(ItemDef::new(name)).unwrap();
    }
    b.register_item(ItemDef::fuel("Coal", 40.0)).unwrap();
    b.register_item(ItemDef::fuel("Charcoal", 30.0)).unwrap();
    b.register_item(ItemDef::fertilizer("Compost", 8.0)).unwrap();
    b.register_item(ItemDef::new("Healing Potion").with_tag("potion"))
        .unwrap();
    b.register_item(ItemDef::new("Mana Potion").with_tag("potion"))
        .unwrap();

    b.register_device(DeviceDef::new("Herb Garden", DeviceKind::Workshop, 6.0).fertilized(2.0))
        .unwrap();
    b.register_device(DeviceDef::new("Extractor", DeviceKind::Extractor, 10.0))
        .unwrap();
    b.register_device(DeviceDef::new("Furnace", DeviceKind::Workshop, 12.0).burning(30.0))
        .unwrap();
    b.register_device(DeviceDef::new("Glassblower", DeviceKind::Workshop, 20.0))
        .unwrap();
    b.register_device(DeviceDef::new("Alchemy Table", DeviceKind::Workshop, 5.0))
        .unwrap();
    b.register_device(DeviceDef::new("Kiln", DeviceKind::Workshop, 6.0))
        .unwrap();
    b.register_device(DeviceDef::new("Composter", DeviceKind::Workshop, 4.0))
        .unwrap();

    b.register_recipe(
        RecipeDef::new("Grow Herb", "Healing Herb", 3.0, "Herb Garden")
            .input("Herb Seed", 1.0)
            .input("Water", 2.0),
    )
    .unwrap();
    b.register_recipe(
        RecipeDef::new("Extract Essence", "Herbal Extract", 1.0, "Extractor")
            .input("Healing Herb", 2.0)
            .input("Water", 1.0)
            .byproduct("Plant Pulp", 1.0),
    )
    .unwrap();
    b.register_recipe(RecipeDef::new("Melt Glass", "Glass", 1.0, "Furnace").input("Sand", 2.0))
        .unwrap();
    b.register_recipe(
        RecipeDef::new("Blow Vial", "Glass Vial", 2.0, "Glassblower").input("Glass", 1.0),
    )
    .unwrap();
    b.register_recipe(
        RecipeDef::new("Brew Healing Potion", "Healing Potion", 1.0, "Alchemy Table")
            .input("Herbal Extract", 1.0)
            .input("Water", 1.0)
            .input("Glass Vial", 1.0),
    )
    .unwrap();
    b.register_recipe(
        RecipeDef::new("Brew Mana Potion", "Mana Potion", 1.0, "Alchemy Table")
            .input("Mana Crystal", 1.0)
            .input("Water", 2.0)
            .input("Glass Vial", 1.0),
    )
    .unwrap();
    b.register_recipe(
        RecipeDef::new("Burn Charcoal", "Charcoal", 1.0, "Kiln")
            .input("Wood", 2.0)
            .byproduct("Ash", 1.0),
    )
    .unwrap();
    b.register_recipe(
        RecipeDef::new("Make Compost", "Compost", 1.0, "Composter").input("Plant Pulp", 2.0),
    )
    .unwrap();

    b.build().unwrap()
}

/// Philter and Tincture consume each other; Salt is raw.
pub fn cyclic_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    for name in ["Philter", "Tincture", "Salt"] {
        b.register_item(ItemDef::new(name)).unwrap();
    }
    b.register_device(DeviceDef::new("Cauldron", DeviceKind::Workshop, 10.0))
        .unwrap();
    b.register_recipe(
        RecipeDef::new("Brew Philter", "Philter", 1.0, "Cauldron")
            .input("Tincture", 1.0)
            .input("Salt", 1.0),
    )
    .unwrap();
    b.register_recipe(RecipeDef::new("Steep Tincture", "Tincture", 1.0, "Cauldron").input("Philter", 1.0))
        .unwrap();
    b.build().unwrap()
}

/// A straight chain `Link 0 <- Link 1 <- ... <- Link {len-1}`; the last link is raw.
pub fn chain_catalog(len: usize) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_device(DeviceDef::new("Press", DeviceKind::Workshop, 10.0))
        .unwrap();
    for i in 0..len {
        b.register_item(ItemDef::new(&format!("Link {i}"))).unwrap();
    }
    for i in 0..len.saturating_sub(1) {
        b.register_recipe(
            RecipeDef::new(&format!("Make Link {i}"), &format!("Link {i}"), 1.0, "Press")
                .input(&format!("Link {}", i + 1), 1.0),
        )
        .unwrap();
    }
    b.build().unwrap()
}
