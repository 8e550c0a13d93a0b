//! Collapse a production forest into one flow graph keyed by item.
//!
//! Every distinct item becomes one [`MergedNode`]; repeated occurrences are
//! summed into it. Every parent/child relation adds the child's rate to the
//! edge `child -> parent`. Each forest root also gets a synthetic target node
//! fed by the root item with the full requested rate.

use crate::id::{DeviceId, EdgeId, ItemId, NodeId};
use crate::resolve::{Byproduct, ProductionNode, ResolveError};
use log::debug;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Node keys
// ---------------------------------------------------------------------------

/// Stable identity of a flow-graph node across recomputations.
///
/// Serialized as its display string (`"Water"`, `"target-Healing Potion-0"`)
/// so it can key saved positions in JSON.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum NodeKey {
    Item(ItemId),
    /// The output node of forest root `index`.
    Target { item: ItemId, index: usize },
}

impl NodeKey {
    pub fn item(&self) -> &ItemId {
        match self {
            NodeKey::Item(item) | NodeKey::Target { item, .. } => item,
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(self, NodeKey::Target { .. })
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Item(item) => write!(f, "{item}"),
            NodeKey::Target { item, index } => write!(f, "target-{item}-{index}"),
        }
    }
}

impl From<NodeKey> for String {
    fn from(key: NodeKey) -> Self {
        key.to_string()
    }
}

impl From<String> for NodeKey {
    /// `target-{item}-{index}` parses as a target key, anything else is an item.
    fn from(s: String) -> Self {
        if let Some(rest) = s.strip_prefix("target-")
            && let Some((item, index)) = rest.rsplit_once('-')
            && !item.is_empty()
            && let Ok(index) = index.parse::<usize>()
        {
            return NodeKey::Target {
                item: ItemId::from(item),
                index,
            };
        }
        NodeKey::Item(ItemId::from(s))
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey::from(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Graph data
// ---------------------------------------------------------------------------

/// One item stage with every occurrence in the forest summed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedNode {
    pub key: NodeKey,
    pub item: ItemId,
    pub rate: f64,
    pub device_count: f64,
    pub device: Option<DeviceId>,
    pub heat_consumption: f64,
    pub supplied_rate: f64,
    pub byproducts: Vec<Byproduct>,
    pub is_raw: bool,
    pub is_target: bool,
    pub is_belt_saturated: bool,
    pub belt_limit: f64,
    pub failure: Option<ResolveError>,
}

impl MergedNode {
    fn seed(key: NodeKey, node: &ProductionNode) -> Self {
        Self {
            key,
            item: node.item.clone(),
            rate: node.rate,
            device_count: node.device_count,
            device: node.device.clone(),
            heat_consumption: node.heat_consumption,
            supplied_rate: node.supplied_rate,
            byproducts: node.byproducts.clone(),
            is_raw: node.is_raw,
            is_target: node.is_target,
            is_belt_saturated: node.is_belt_saturated,
            belt_limit: node.belt_limit,
            failure: None,
        }
    }

    fn absorb(&mut self, node: &ProductionNode) {
        self.rate += node.rate;
        self.device_count += node.device_count;
        self.heat_consumption += node.heat_consumption;
        self.supplied_rate += node.supplied_rate;
        self.is_target |= node.is_target;
        if self.device.is_none() {
            self.device = node.device.clone();
        }
        for byproduct in &node.byproducts {
            match self.byproducts.iter_mut().find(|b| b.item == byproduct.item) {
                Some(existing) => existing.rate += byproduct.rate,
                None => self.byproducts.push(byproduct.clone()),
            }
        }
        self.is_belt_saturated = self.rate > self.belt_limit;
    }

    /// Failed roots keep their requested rate only if it is a usable number.
    fn target(key: NodeKey, root: &ProductionNode) -> Self {
        let rate = root.gross_rate();
        Self {
            key,
            item: root.item.clone(),
            rate: if rate.is_finite() && rate > 0.0 { rate } else { 0.0 },
            device_count: 0.0,
            device: None,
            heat_consumption: 0.0,
            supplied_rate: 0.0,
            byproducts: Vec::new(),
            is_raw: false,
            is_target: true,
            is_belt_saturated: false,
            belt_limit: root.belt_limit,
            failure: root.failure.clone(),
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        self.failure.is_some()
    }
}

/// What an edge carries into its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Material consumed by a production stage.
    Material,
    /// Finished output delivered to a target node.
    Delivery,
}

/// Accumulated transfer from `from` (the supplier) into `to` (the consumer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedEdge {
    #[serde(skip)]
    pub from: NodeId,
    #[serde(skip)]
    pub to: NodeId,
    pub source: NodeKey,
    pub target: NodeKey,
    pub rate: f64,
    pub kind: FlowKind,
}

impl MergedEdge {
    /// `{source}->{target}`, unique within one graph.
    pub fn label(&self) -> String {
        format!("{}->{}", self.source, self.target)
    }
}

#[derive(Debug, Clone, Default)]
struct NodeAdjacency {
    inputs: Vec<EdgeId>,
    outputs: Vec<EdgeId>,
}

// ---------------------------------------------------------------------------
// FlowGraph
// ---------------------------------------------------------------------------

/// The consolidated network. Iteration order is first-visited order.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: SlotMap<NodeId, MergedNode>,
    edges: SlotMap<EdgeId, MergedEdge>,
    adjacency: SecondaryMap<NodeId, NodeAdjacency>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    by_key: HashMap<NodeKey, NodeId>,
    by_pair: HashMap<(NodeId, NodeId), EdgeId>,
}

impl FlowGraph {
    fn add_node(&mut self, node: MergedNode) -> NodeId {
        let key = node.key.clone();
        let id = self.nodes.insert(node);
        self.adjacency.insert(id, NodeAdjacency::default());
        self.node_order.push(id);
        self.by_key.insert(key, id);
        id
    }

    fn add_flow(&mut self, from: NodeId, to: NodeId, rate: f64, kind: FlowKind) {
        if let Some(&eid) = self.by_pair.get(&(from, to))
            && let Some(edge) = self.edges.get_mut(eid)
        {
            edge.rate += rate;
            return;
        }
        let (Some(source), Some(target)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return;
        };
        let edge = MergedEdge {
            from,
            to,
            source: source.key.clone(),
            target: target.key.clone(),
            rate,
            kind,
        };
        let eid = self.edges.insert(edge);
        if let Some(adj) = self.adjacency.get_mut(from) {
            adj.outputs.push(eid);
        }
        if let Some(adj) = self.adjacency.get_mut(to) {
            adj.inputs.push(eid);
        }
        self.edge_order.push(eid);
        self.by_pair.insert((from, to), eid);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&MergedNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&MergedEdge> {
        self.edges.get(id)
    }

    pub fn node_id(&self, key: &NodeKey) -> Option<NodeId> {
        self.by_key.get(key).copied()
    }

    pub fn node_by_key(&self, key: &NodeKey) -> Option<&MergedNode> {
        self.node_id(key).and_then(|id| self.nodes.get(id))
    }

    /// Shorthand for the merged node of an item.
    pub fn item(&self, name: &str) -> Option<&MergedNode> {
        self.node_by_key(&NodeKey::Item(ItemId::from(name)))
    }

    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&MergedEdge> {
        self.by_pair.get(&(from, to)).and_then(|&eid| self.edges.get(eid))
    }

    /// Edges whose destination is `node`.
    pub fn inputs(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(node)
            .map(|adj| adj.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Edges whose source is `node`.
    pub fn outputs(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(node)
            .map(|adj| adj.outputs.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes in first-visited order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &MergedNode)> {
        self.node_order
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|n| (id, n)))
    }

    /// Edges in first-created order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &MergedEdge)> {
        self.edge_order
            .iter()
            .filter_map(|&id| self.edges.get(id).map(|e| (id, e)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Serialize)]
struct FlowGraphView<'a> {
    nodes: Vec<&'a MergedNode>,
    edges: Vec<&'a MergedEdge>,
}

impl Serialize for FlowGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FlowGraphView {
            nodes: self.nodes().map(|(_, n)| n).collect(),
            edges: self.edges().map(|(_, e)| e).collect(),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

/// Merge a production forest into a [`FlowGraph`].
///
/// Unresolvable roots never touch the item nodes; each one appears only as
/// its own flagged target node without edges.
pub fn consolidate(roots: &[ProductionNode]) -> FlowGraph {
    let mut graph = FlowGraph::default();

    for root in roots.iter().filter(|r| !r.is_unresolvable()) {
        merge_tree(&mut graph, root, None);
    }

    for (index, root) in roots.iter().enumerate() {
        let key = NodeKey::Target {
            item: root.item.clone(),
            index,
        };
        if root.is_unresolvable() {
            graph.add_node(MergedNode::target(key, root));
            continue;
        }
        let Some(source) = graph.node_id(&NodeKey::Item(root.item.clone())) else {
            continue;
        };
        let target = graph.add_node(MergedNode::target(key, root));
        graph.add_flow(source, target, root.gross_rate(), FlowKind::Delivery);
    }

    debug!(
        "consolidated {} trees into {} nodes and {} edges",
        roots.len(),
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

fn merge_tree(graph: &mut FlowGraph, node: &ProductionNode, parent: Option<NodeId>) {
    let key = NodeKey::Item(node.item.clone());
    let id = match graph.node_id(&key) {
        Some(id) => {
            if let Some(existing) = graph.nodes.get_mut(id) {
                existing.absorb(node);
            }
            id
        }
        None => graph.add_node(MergedNode::seed(key, node)),
    };

    if let Some(parent) = parent {
        graph.add_flow(id, parent, node.rate, FlowKind::Material);
    }

    for input in &node.inputs {
        merge_tree(graph, input, Some(id));
    }
}
