//! Totals and a text rendering of a resolved plan.

use crate::id::ItemId;
use crate::resolve::{Consumption, ProductionNode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// Trees deeper than this are cut off in [`format_tree`].
pub const MAX_DISPLAY_DEPTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRate {
    pub item: ItemId,
    pub rate: f64,
}

/// Plant-wide totals for a forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanSummary {
    pub total_devices: f64,
    pub total_heat: f64,
    /// Raw material drawn from outside the plan, by item name.
    pub inputs: Vec<ItemRate>,
    /// Requested target rates plus every byproduct, by item name.
    pub outputs: Vec<ItemRate>,
}

impl PlanSummary {
    pub fn input(&self, item: &str) -> Option<f64> {
        self.inputs.iter().find(|r| r.item.as_str() == item).map(|r| r.rate)
    }

    pub fn output(&self, item: &str) -> Option<f64> {
        self.outputs.iter().find(|r| r.item.as_str() == item).map(|r| r.rate)
    }
}

/// Sum devices and heat, and tally leaf inputs and outputs.
///
/// Unresolvable placeholder roots contribute nothing. Leaves whose demand was
/// fully covered by byproducts are not inputs.
pub fn summarize(roots: &[ProductionNode]) -> PlanSummary {
    let mut summary = PlanSummary::default();
    let mut inputs: BTreeMap<ItemId, f64> = BTreeMap::new();
    let mut outputs: BTreeMap<ItemId, f64> = BTreeMap::new();

    for root in roots.iter().filter(|r| !r.is_unresolvable()) {
        *outputs.entry(root.item.clone()).or_insert(0.0) += root.gross_rate();
        root.visit(&mut |node, _| {
            summary.total_devices += node.device_count;
            summary.total_heat += node.heat_consumption;
            for byproduct in &node.byproducts {
                *outputs.entry(byproduct.item.clone()).or_insert(0.0) += byproduct.rate;
            }
            if node.inputs.is_empty() && node.device_count == 0.0 && node.rate > 0.0 {
                *inputs.entry(node.item.clone()).or_insert(0.0) += node.rate;
            }
        });
    }

    summary.inputs = inputs
        .into_iter()
        .map(|(item, rate)| ItemRate { item, rate })
        .collect();
    summary.outputs = outputs
        .into_iter()
        .map(|(item, rate)| ItemRate { item, rate })
        .collect();
    summary
}

/// Indented list view of one tree, two spaces per level.
pub fn format_tree(root: &ProductionNode) -> String {
    TreeView(root).to_string()
}

/// [`fmt::Display`] adapter behind [`format_tree`].
pub struct TreeView<'a>(pub &'a ProductionNode);

impl fmt::Display for TreeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self.0, 0)
    }
}

fn write_node<W: Write>(out: &mut W, node: &ProductionNode, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    if depth > MAX_DISPLAY_DEPTH {
        return writeln!(out, "{indent}(max depth exceeded)");
    }

    write!(out, "{indent}{} {:.1}/min", node.item, node.rate)?;
    if node.supplied_rate > 0.01 {
        write!(out, " ({:.1} supplied)", node.supplied_rate)?;
    } else if node.is_raw {
        out.write_str(" (raw input)")?;
    }
    match node.consumed_as {
        Consumption::Fuel => out.write_str(" [fuel]")?,
        Consumption::Fertilizer => out.write_str(" [fertilizer]")?,
        Consumption::Target | Consumption::Ingredient => {}
    }
    if node.is_target {
        out.write_str(" [target]")?;
    }
    if node.is_belt_saturated {
        write!(out, " [belt limit {:.0}/min]", node.belt_limit)?;
    }
    out.write_char('\n')?;

    if let Some(error) = &node.failure {
        return writeln!(out, "{indent}  ! {error}");
    }
    if node.device_count > 0.0
        && let Some(device) = &node.device
    {
        write!(out, "{indent}  {:.2} x {device}", node.device_count)?;
        if node.heat_consumption > 0.0 {
            write!(out, ", heat {}", node.heat_consumption.ceil())?;
        }
        out.write_char('\n')?;
    }
    for byproduct in &node.byproducts {
        writeln!(out, "{indent}  +{} {:.1}/min", byproduct.item, byproduct.rate)?;
    }

    for input in &node.inputs {
        write_node(out, input, depth + 1)?;
    }
    Ok(())
}
