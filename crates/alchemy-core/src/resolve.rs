//! Production resolution: targets in, production trees out.
//!
//! Each [`ProductionTarget`] becomes one root [`ProductionNode`]. A node with
//! a recipe is expanded into one child per recipe input (plus fuel and
//! fertilizer children when the device needs them and the configuration
//! selects one); a node without a recipe is a raw leaf.
//!
//! # Byproduct crediting
//!
//! One pool of byproduct availability is shared by a whole resolution call.
//! Targets are resolved in input order and every tree in pre-order (a node
//! before its children; ingredients in recipe order, then fuel, then
//! fertilizer). A node deposits its byproducts as soon as its device count is
//! known, and every node first draws on the pool for its own item. The drawn
//! amount is recorded as `supplied_rate` and only the remainder is produced.
//! A target that fails to resolve leaves the pool as it found it.

use crate::catalog::{CatalogLookup, DeviceDef, DeviceKind, RecipeDef};
use crate::config::{ConfigError, Configuration, Efficiency};
use crate::id::{DeviceId, ItemId, RecipeId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A desired sustained output rate (units/minute) for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionTarget {
    pub item: ItemId,
    pub rate: f64,
}

impl ProductionTarget {
    pub fn new(item: &str, rate: f64) -> Self {
        Self {
            item: ItemId::from(item),
            rate,
        }
    }
}

/// Guards against malformed catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveLimits {
    /// Deepest tree level (root = 0) the resolver will expand.
    pub max_depth: usize,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self { max_depth: 32 }
    }
}

// ---------------------------------------------------------------------------
// Output tree
// ---------------------------------------------------------------------------

/// How a node's parent consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumption {
    /// The node is a forest root.
    Target,
    /// A recipe input of the parent.
    Ingredient,
    /// Fuel burned by the parent's devices.
    Fuel,
    /// Fertilizer fed to the parent's devices.
    Fertilizer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Byproduct {
    pub item: ItemId,
    pub rate: f64,
}

/// One resolved stage: a cluster of devices, or a raw input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionNode {
    pub item: ItemId,
    /// Net units/minute this stage must produce (after crediting).
    pub rate: f64,
    /// Fractional device count. Never rounded.
    pub device_count: f64,
    pub device: Option<DeviceId>,
    pub recipe: Option<RecipeId>,
    pub heat_consumption: f64,
    pub byproducts: Vec<Byproduct>,
    pub inputs: Vec<ProductionNode>,
    pub is_raw: bool,
    pub is_target: bool,
    pub is_belt_saturated: bool,
    pub belt_limit: f64,
    /// Demand already covered by byproducts from elsewhere in the pass.
    pub supplied_rate: f64,
    pub consumed_as: Consumption,
    /// Set only on placeholder roots of targets that could not be resolved.
    pub failure: Option<ResolveError>,
}

impl ProductionNode {
    /// Demand before crediting.
    pub fn gross_rate(&self) -> f64 {
        self.rate + self.supplied_rate
    }

    pub fn is_unresolvable(&self) -> bool {
        self.failure.is_some()
    }

    /// Visit this node and every descendant in pre-order with its depth.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&ProductionNode, usize),
    {
        self.visit_at(0, f);
    }

    fn visit_at<F>(&self, depth: usize, f: &mut F)
    where
        F: FnMut(&ProductionNode, usize),
    {
        f(self, depth);
        for input in &self.inputs {
            input.visit_at(depth + 1, f);
        }
    }

    /// First direct input producing `item`.
    pub fn input(&self, item: &str) -> Option<&ProductionNode> {
        self.inputs.iter().find(|n| n.item.as_str() == item)
    }

    fn placeholder(target: &ProductionTarget, belt_limit: f64, error: ResolveError) -> Self {
        Self {
            item: target.item.clone(),
            rate: target.rate,
            device_count: 0.0,
            device: None,
            recipe: None,
            heat_consumption: 0.0,
            byproducts: Vec::new(),
            inputs: Vec::new(),
            is_raw: false,
            is_target: true,
            is_belt_saturated: false,
            belt_limit,
            supplied_rate: 0.0,
            consumed_as: Consumption::Target,
            failure: Some(error),
        }
    }
}

/// The forest produced by one resolution call, one root per target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlan {
    pub roots: Vec<ProductionNode>,
}

impl ResolvedPlan {
    /// `(target index, error)` for every target that could not be resolved.
    pub fn errors(&self) -> impl Iterator<Item = (usize, &ResolveError)> {
        self.roots
            .iter()
            .enumerate()
            .filter_map(|(idx, root)| root.failure.as_ref().map(|e| (idx, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.roots.iter().all(|root| root.failure.is_none())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Broad error classes, used by callers to decide how to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected before any recursion.
    InvalidInput,
    /// The catalog data itself is unusable for this target.
    Structural,
}

/// Why a single target could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown item '{0}'")]
    UnknownItem(ItemId),
    #[error("target rate {rate} for '{item}' must be a positive number")]
    InvalidRate { item: ItemId, rate: f64 },
    #[error("cyclic recipe dependency: {}", join_path(.path))]
    Cycle { path: Vec<ItemId> },
    #[error("recursion depth {max_depth} exceeded at '{item}'")]
    DepthExceeded { item: ItemId, max_depth: usize },
    #[error("recipe '{0}' references a device missing from the catalog")]
    MissingDevice(RecipeId),
}

impl ResolveError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ResolveError::UnknownItem(_) | ResolveError::InvalidRate { .. } => {
                ErrorClass::InvalidInput
            }
            ResolveError::Cycle { .. }
            | ResolveError::DepthExceeded { .. }
            | ResolveError::MissingDevice(_) => ErrorClass::Structural,
        }
    }
}

fn join_path(path: &[ItemId]) -> String {
    path.iter()
        .map(ItemId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

// ---------------------------------------------------------------------------
// Per-device rates
// ---------------------------------------------------------------------------

/// Effective per-device rates of one recipe on its device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageRates {
    pub cycles_per_minute: f64,
    pub yield_per_cycle: f64,
}

impl StageRates {
    pub fn new(device: &DeviceDef, recipe: &RecipeDef, config: &Configuration) -> Self {
        let base_cycles = match recipe.duration {
            Some(seconds) => 60.0 / seconds,
            None => device.throughput,
        };
        let (cycles_per_minute, yield_per_cycle) = match device.kind {
            DeviceKind::Extractor => (
                base_cycles,
                recipe.output.quantity * config.multiplier(Efficiency::Alchemy),
            ),
            DeviceKind::Workshop => (
                base_cycles * config.multiplier(Efficiency::FactorySpeed),
                recipe.output.quantity,
            ),
            DeviceKind::Catapult => (
                base_cycles * config.multiplier(Efficiency::Throwing),
                recipe.output.quantity,
            ),
        };
        Self {
            cycles_per_minute,
            yield_per_cycle,
        }
    }

    /// Output units per minute of one fully utilized device.
    pub fn output_per_device(&self) -> f64 {
        self.cycles_per_minute * self.yield_per_cycle
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves production targets against a catalog and a configuration.
pub struct Resolver<'a, C: CatalogLookup + ?Sized> {
    catalog: &'a C,
    config: &'a Configuration,
    limits: ResolveLimits,
}

/// Mutable state of one resolution call.
#[derive(Default)]
struct Pass {
    pool: HashMap<ItemId, f64>,
    branch: Vec<ItemId>,
}

impl Pass {
    fn draw(&mut self, item: &ItemId, demand: f64) -> f64 {
        match self.pool.get_mut(item) {
            Some(available) if *available > 0.0 => {
                let taken = available.min(demand);
                *available -= taken;
                taken
            }
            _ => 0.0,
        }
    }

    fn deposit(&mut self, item: &ItemId, rate: f64) {
        *self.pool.entry(item.clone()).or_insert(0.0) += rate;
    }
}

impl<'a, C: CatalogLookup + ?Sized> Resolver<'a, C> {
    pub fn new(catalog: &'a C, config: &'a Configuration) -> Self {
        Self {
            catalog,
            config,
            limits: ResolveLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ResolveLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolve every target. Fails only when the configuration is invalid;
    /// per-target failures become placeholder roots.
    pub fn resolve(&self, targets: &[ProductionTarget]) -> Result<ResolvedPlan, ConfigError> {
        self.config.validate(self.catalog)?;

        let belt_limit = self.config.belt_limit();
        let rejected: Vec<Option<ResolveError>> =
            targets.iter().map(|t| self.check_target(t)).collect();

        let mut pass = Pass::default();
        let mut roots = Vec::with_capacity(targets.len());

        for (idx, (target, rejection)) in targets.iter().zip(rejected).enumerate() {
            if let Some(error) = rejection {
                warn!("target #{idx} rejected: {error}");
                roots.push(ProductionNode::placeholder(target, belt_limit, error));
                continue;
            }

            let snapshot = pass.pool.clone();
            pass.branch.clear();
            match self.resolve_node(&target.item, target.rate, Consumption::Target, 0, &mut pass) {
                Ok(mut root) => {
                    root.is_target = true;
                    debug!(
                        "target #{idx} '{}' @ {:.3}/min resolved: {:.3} devices at root",
                        target.item, target.rate, root.device_count
                    );
                    roots.push(root);
                }
                Err(error) => {
                    warn!("target #{idx} '{}' unresolvable: {error}", target.item);
                    pass.pool = snapshot;
                    roots.push(ProductionNode::placeholder(target, belt_limit, error));
                }
            }
        }

        Ok(ResolvedPlan { roots })
    }

    fn check_target(&self, target: &ProductionTarget) -> Option<ResolveError> {
        if !self.catalog.contains_item(&target.item) {
            return Some(ResolveError::UnknownItem(target.item.clone()));
        }
        if !(target.rate.is_finite() && target.rate > 0.0) {
            return Some(ResolveError::InvalidRate {
                item: target.item.clone(),
                rate: target.rate,
            });
        }
        None
    }

    fn resolve_node(
        &self,
        item: &ItemId,
        demand: f64,
        consumed_as: Consumption,
        depth: usize,
        pass: &mut Pass,
    ) -> Result<ProductionNode, ResolveError> {
        if pass.branch.contains(item) {
            let mut path = pass.branch.clone();
            path.push(item.clone());
            return Err(ResolveError::Cycle { path });
        }
        if depth > self.limits.max_depth {
            return Err(ResolveError::DepthExceeded {
                item: item.clone(),
                max_depth: self.limits.max_depth,
            });
        }

        let supplied_rate = pass.draw(item, demand);
        let rate = (demand - supplied_rate).max(0.0);
        let belt_limit = self.config.belt_limit();

        let mut node = ProductionNode {
            item: item.clone(),
            rate,
            device_count: 0.0,
            device: None,
            recipe: None,
            heat_consumption: 0.0,
            byproducts: Vec::new(),
            inputs: Vec::new(),
            is_raw: false,
            is_target: false,
            is_belt_saturated: rate > belt_limit,
            belt_limit,
            supplied_rate,
            consumed_as,
            failure: None,
        };

        let Some(recipe) = self.catalog.recipe_for(item) else {
            node.is_raw = true;
            return Ok(node);
        };
        let device = self
            .catalog
            .device_for(&recipe.id)
            .ok_or_else(|| ResolveError::MissingDevice(recipe.id.clone()))?;

        let rates = StageRates::new(device, recipe, self.config);
        let device_count = rate / rates.output_per_device();
        let cycles = device_count * rates.cycles_per_minute;

        node.device = Some(device.id.clone());
        node.recipe = Some(recipe.id.clone());
        node.device_count = device_count;
        node.heat_consumption = device_count * device.heat / self.config.multiplier(Efficiency::Fuel);

        if rate <= 0.0 {
            return Ok(node);
        }

        for entry in &recipe.byproducts {
            let byproduct_rate = cycles * entry.quantity;
            pass.deposit(&entry.item, byproduct_rate);
            node.byproducts.push(Byproduct {
                item: entry.item.clone(),
                rate: byproduct_rate,
            });
        }

        pass.branch.push(item.clone());
        let children = self.resolve_inputs(recipe, device, &node, cycles, depth, pass);
        pass.branch.pop();
        node.inputs = children?;
        Ok(node)
    }

    fn resolve_inputs(
        &self,
        recipe: &RecipeDef,
        device: &DeviceDef,
        node: &ProductionNode,
        cycles: f64,
        depth: usize,
        pass: &mut Pass,
    ) -> Result<Vec<ProductionNode>, ResolveError> {
        let mut inputs = Vec::with_capacity(recipe.inputs.len() + 2);

        for entry in &recipe.inputs {
            inputs.push(self.resolve_node(
                &entry.item,
                cycles * entry.quantity,
                Consumption::Ingredient,
                depth + 1,
                pass,
            )?);
        }

        if device.requires_fuel
            && node.heat_consumption > 0.0
            && let Some(fuel) = &self.config.selected_fuel
            && let Some(heat_value) = self.catalog.fuel_value(fuel)
        {
            inputs.push(self.resolve_node(
                fuel,
                node.heat_consumption / heat_value,
                Consumption::Fuel,
                depth + 1,
                pass,
            )?);
        }

        if device.nutrient_demand > 0.0
            && let Some(fertilizer) = &self.config.selected_fertilizer
            && let Some(potency) = self.catalog.fertilizer_potency(fertilizer)
        {
            let effective = potency * self.config.multiplier(Efficiency::Fertilizer);
            inputs.push(self.resolve_node(
                fertilizer,
                node.device_count * device.nutrient_demand / effective,
                Consumption::Fertilizer,
                depth + 1,
                pass,
            )?);
        }

        Ok(inputs)
    }
}

/// Resolve `targets` with default limits.
pub fn resolve<C: CatalogLookup + ?Sized>(
    catalog: &C,
    targets: &[ProductionTarget],
    config: &Configuration,
) -> Result<ResolvedPlan, ConfigError> {
    Resolver::new(catalog, config).resolve(targets)
}
