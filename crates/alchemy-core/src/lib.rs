//! Alchemy Core -- the planning engine behind the Alchemy Planner.
//!
//! Given a catalog of items, recipes and devices, a set of production
//! targets and the player's efficiency levels, this crate works out how many
//! devices of each kind a factory needs, how much heat, fuel and fertilizer
//! they draw, and where the belts saturate. It then merges the per-target
//! trees into one network and lays that network out for drawing.
//!
//! # Pipeline
//!
//! 1. **Resolve** -- [`resolve::resolve`] expands each target into a
//!    production tree, crediting byproducts against later demand.
//! 2. **Consolidate** -- [`consolidate::consolidate`] collapses the forest
//!    into a [`consolidate::FlowGraph`] with one node per item.
//! 3. **Lay out** -- [`layout::layout`] assigns layered positions, honouring
//!    saved positions.
//!
//! ```rust,ignore
//! let plan = resolve(&catalog, &[ProductionTarget::new("Healing Potion", 10.0)], &config)?;
//! let graph = consolidate(&plan.roots);
//! let drawing = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
//! ```
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Immutable registry of items, recipes and devices,
//!   built through [`catalog::CatalogBuilder`] and read through
//!   [`catalog::CatalogLookup`].
//! - [`config::Configuration`] -- Efficiency levels and consumable choices.
//! - [`resolve::ProductionNode`] -- One stage of a production tree.
//! - [`consolidate::FlowGraph`] -- The merged network.
//! - [`layout::PositionedGraph`] -- The network with coordinates.
//! - [`summary::PlanSummary`] -- Totals and input/output tallies.

pub mod catalog;
pub mod config;
pub mod consolidate;
pub mod id;
pub mod layout;
pub mod resolve;
pub mod summary;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
