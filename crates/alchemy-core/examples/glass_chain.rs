//! Glass chain example: sand -> glass -> glass vials.
//!
//! Builds a three-item catalog by hand, resolves 30 vials per minute with a
//! selected fuel, and prints the tree, the merged graph and the layout.
//!
//! Run with: `cargo run -p alchemy-core --example glass_chain`

use alchemy_core::catalog::*;
use alchemy_core::config::{Configuration, Efficiency};
use alchemy_core::consolidate::consolidate;
use alchemy_core::layout::{LayoutOptions, SavedPositions, layout};
use alchemy_core::resolve::{ProductionTarget, resolve};
use alchemy_core::summary::{format_tree, summarize};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = CatalogBuilder::new();
    builder.register_item(ItemDef::new("Sand"))?;
    builder.register_item(ItemDef::new("Glass"))?;
    builder.register_item(ItemDef::new("Glass Vial"))?;
    builder.register_item(ItemDef::fuel("Coal", 40.0))?;

    // Furnace: 12 cycles/min, 30 heat per running furnace.
    builder.register_device(DeviceDef::new("Furnace", DeviceKind::Workshop, 12.0).burning(30.0))?;
    builder.register_device(DeviceDef::new("Glassblower", DeviceKind::Workshop, 20.0))?;

    builder.register_recipe(RecipeDef::new("Melt Glass", "Glass", 1.0, "Furnace").input("Sand", 2.0))?;
    builder.register_recipe(
        RecipeDef::new("Blow Vial", "Glass Vial", 2.0, "Glassblower").input("Glass", 1.0),
    )?;
    let catalog = builder.build()?;

    let config = Configuration::default()
        .with_level(Efficiency::Logistics, 1)
        .with_level(Efficiency::Fuel, 2)
        .with_fuel("Coal");

    let plan = resolve(&catalog, &[ProductionTarget::new("Glass Vial", 30.0)], &config)?;
    for root in &plan.roots {
        print!("{}", format_tree(root));
    }

    let summary = summarize(&plan.roots);
    println!();
    println!("devices: {:.2}", summary.total_devices);
    println!("heat:    {:.1}", summary.total_heat);
    for input in &summary.inputs {
        println!("in:  {} {:.1}/min", input.item, input.rate);
    }
    for output in &summary.outputs {
        println!("out: {} {:.1}/min", output.item, output.rate);
    }

    let graph = consolidate(&plan.roots);
    let drawing = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
    println!();
    for node in &drawing.nodes {
        println!(
            "{:<24} rank {} at ({:>6.1}, {:>6.1})",
            node.key.to_string(),
            node.rank,
            node.position.x,
            node.position.y
        );
    }
    Ok(())
}
