//! Potion shop: loads the bundled catalog and a plan file, then runs the whole
//! pipeline and prints the tree, totals and laid-out graph as JSON.
//!
//! Run with: `RUST_LOG=debug cargo run -p alchemy-data --example potion_shop [plan]`
//!
//! The plan path defaults to the bundled `potion_shop.json`.

use alchemy_core::consolidate::consolidate;
use alchemy_core::layout::layout;
use alchemy_core::resolve::Resolver;
use alchemy_core::summary::{format_tree, summarize};
use alchemy_data::{bundled_data_dir, load_catalog, load_plan};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let plan_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| bundled_data_dir().join("potion_shop.json"));

    let catalog = load_catalog(&bundled_data_dir())?;
    let plan = load_plan(&plan_path)?;

    let resolved = Resolver::new(&catalog, &plan.configuration)
        .with_limits(plan.limits)
        .resolve(&plan.targets)?;

    for root in &resolved.roots {
        print!("{}", format_tree(root));
    }
    for (idx, err) in resolved.errors() {
        eprintln!("target {idx}: {err}");
    }

    let summary = summarize(&resolved.roots);
    println!();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let graph = consolidate(&resolved.roots);
    let drawing = layout(&graph, &plan.layout, &plan.saved_positions);
    println!("{}", serde_json::to_string_pretty(&drawing)?);
    Ok(())
}
