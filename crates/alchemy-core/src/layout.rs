//! Layered layout of a [`FlowGraph`].
//!
//! The pipeline is:
//!
//! 1. **Cycle removal.** A greedy feedback-arc-set ordering; every edge that
//!    points backwards in it (and every self-loop) is dropped for layout
//!    purposes and reported in [`PositionedGraph::dropped_edges`].
//! 2. **Anchoring.** A hidden anchor node gets an edge to every source so all
//!    sources share the first rank.
//! 3. **Ranking.** Longest path from the anchor; the anchor's own rank is
//!    removed afterwards.
//! 4. **Ordering.** First-visited order, refined by alternating barycenter
//!    sweeps with stable tie-breaks.
//! 5. **Coordinates.** Ranks are `rank_sep` apart along the flow axis. Within
//!    a rank, nodes keep their order and `node_sep` spacing and are pulled
//!    toward the mean position of their upstream neighbours. The drawing is
//!    then translated so its top-left corner sits at the origin.
//!
//! Positions are reported as top-left corners. A saved position for a node
//! key replaces the computed one.
//!
//! Everything is a pure function of the graph, the options and the saved
//! positions: identical inputs give identical output.

use crate::consolidate::{FlowGraph, MergedNode, NodeKey};
use crate::id::{EdgeId, NodeId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

// ---------------------------------------------------------------------------
// Options and geometry
// ---------------------------------------------------------------------------

/// Main flow direction of the drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl Direction {
    /// `(target handle, source handle)`: where edges enter and leave a node.
    pub fn handles(self) -> (Side, Side) {
        match self {
            Direction::LeftToRight => (Side::Left, Side::Right),
            Direction::TopToBottom => (Side::Top, Side::Bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Positions the user placed by hand, keyed by node identity.
pub type SavedPositions = HashMap<NodeKey, Point>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub direction: Direction,
    pub node_width: f64,
    /// Height of a node showing only its name and rate.
    pub base_height: f64,
    /// Extra height per optional row (target badge, devices, heat).
    pub row_height: f64,
    /// Gap between adjacent ranks.
    pub rank_sep: f64,
    /// Gap between adjacent nodes in one rank.
    pub node_sep: f64,
    /// Barycenter sweeps (alternating down and up).
    pub sweeps: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: Direction::LeftToRight,
            node_width: 250.0,
            base_height: 66.0,
            row_height: 24.0,
            rank_sep: 180.0,
            node_sep: 50.0,
            sweeps: 8,
        }
    }
}

impl LayoutOptions {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// `(width, height)` of a node's box.
    pub fn node_size(&self, node: &MergedNode) -> (f64, f64) {
        let mut height = self.base_height;
        if node.is_target {
            height += self.row_height;
        }
        if node.device_count > 0.0 {
            height += self.row_height;
        }
        if node.heat_consumption > 0.0 {
            height += self.row_height;
        }
        (self.node_width, height)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    #[serde(skip)]
    pub id: NodeId,
    pub key: NodeKey,
    /// Top-left corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub rank: usize,
    /// Index within the rank after ordering.
    pub order: usize,
    pub target_handle: Side,
    pub source_handle: Side,
    /// True when `position` came from the saved positions.
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedEdge {
    #[serde(skip)]
    pub id: EdgeId,
    pub source: NodeKey,
    pub target: NodeKey,
    pub rate: f64,
    /// Ignored by the layering because it closed a cycle.
    pub dropped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedGraph {
    pub direction: Direction,
    /// First-visited order, as in the flow graph.
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
    #[serde(skip)]
    pub dropped_edges: Vec<EdgeId>,
}

impl PositionedGraph {
    pub fn node(&self, key: &NodeKey) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| &n.key == key)
    }

    pub fn rank_count(&self) -> usize {
        self.nodes.iter().map(|n| n.rank + 1).max().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Node indices into first-visited order and edges as index pairs.
struct Skeleton {
    ids: Vec<NodeId>,
    edges: Vec<(EdgeId, usize, usize)>,
}

impl Skeleton {
    fn new(graph: &FlowGraph) -> Self {
        let ids: Vec<NodeId> = graph.nodes().map(|(id, _)| id).collect();
        let index: HashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let edges = graph
            .edges()
            .filter_map(|(eid, e)| Some((eid, *index.get(&e.from)?, *index.get(&e.to)?)))
            .collect();
        Self { ids, edges }
    }
}

/// Lay out `graph`. Never fails; cycles are broken and reported.
pub fn layout(graph: &FlowGraph, options: &LayoutOptions, saved: &SavedPositions) -> PositionedGraph {
    let skeleton = Skeleton::new(graph);
    let n = skeleton.ids.len();

    let (kept, dropped) = break_cycles(n, &skeleton.edges);
    for &(_, from, to) in &dropped {
        if let (Some(a), Some(b)) = (graph.node(skeleton.ids[from]), graph.node(skeleton.ids[to])) {
            warn!("layout: dropping edge {} -> {} to break a cycle", a.key, b.key);
        }
    }

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(_, from, to) in &kept {
        succs[from].push(to);
        preds[to].push(from);
    }

    let ranks = rank_nodes(n, &preds, &succs);
    let layers = order_layers(&ranks, &preds, &succs, options.sweeps);

    let sizes: Vec<(f64, f64)> = skeleton
        .ids
        .iter()
        .map(|&id| match graph.node(id) {
            Some(node) => options.node_size(node),
            None => (options.node_width, options.base_height),
        })
        .collect();
    let centers = assign_coordinates(&layers, &preds, &sizes, options);

    let (target_handle, source_handle) = options.direction.handles();
    let mut order_in_layer = vec![0usize; n];
    for layer in &layers {
        for (pos, &v) in layer.iter().enumerate() {
            order_in_layer[v] = pos;
        }
    }

    let corners: Vec<Point> = centers
        .iter()
        .zip(&sizes)
        .map(|(c, &(w, h))| Point::new(c.x - w / 2.0, c.y - h / 2.0))
        .collect();
    let min_x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

    let mut nodes = Vec::with_capacity(n);
    for (i, &id) in skeleton.ids.iter().enumerate() {
        let Some(merged) = graph.node(id) else {
            continue;
        };
        let computed = Point::new(corners[i].x - min_x, corners[i].y - min_y);
        let pinned = saved.get(&merged.key).copied();
        nodes.push(PositionedNode {
            id,
            key: merged.key.clone(),
            position: pinned.unwrap_or(computed),
            width: sizes[i].0,
            height: sizes[i].1,
            rank: ranks[i],
            order: order_in_layer[i],
            target_handle,
            source_handle,
            pinned: pinned.is_some(),
        });
    }

    let dropped_ids: Vec<EdgeId> = dropped.iter().map(|&(eid, _, _)| eid).collect();
    let edges = graph
        .edges()
        .map(|(eid, e)| PositionedEdge {
            id: eid,
            source: e.source.clone(),
            target: e.target.clone(),
            rate: e.rate,
            dropped: dropped_ids.contains(&eid),
        })
        .collect();

    debug!(
        "layout: {} nodes in {} ranks, {} edges dropped",
        n,
        layers.len(),
        dropped_ids.len()
    );

    PositionedGraph {
        direction: options.direction,
        nodes,
        edges,
        dropped_edges: dropped_ids,
    }
}

// ---------------------------------------------------------------------------
// 1. Cycle removal (greedy feedback arc set)
// ---------------------------------------------------------------------------

type IndexEdge = (EdgeId, usize, usize);

/// Split edges into `(kept, dropped)` so the kept ones form a DAG.
fn break_cycles(n: usize, edges: &[IndexEdge]) -> (Vec<IndexEdge>, Vec<IndexEdge>) {
    let mut out_deg = vec![0i64; n];
    let mut in_deg = vec![0i64; n];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(_, from, to) in edges {
        if from == to {
            continue;
        }
        out_deg[from] += 1;
        in_deg[to] += 1;
        succs[from].push(to);
        preds[to].push(from);
    }

    let mut removed = vec![false; n];
    let mut head: Vec<usize> = Vec::with_capacity(n);
    let mut tail: Vec<usize> = Vec::new();
    let mut remaining = n;

    let remove = |v: usize,
                  removed: &mut Vec<bool>,
                  out_deg: &mut Vec<i64>,
                  in_deg: &mut Vec<i64>| {
        removed[v] = true;
        for &w in &succs[v] {
            in_deg[w] -= 1;
        }
        for &u in &preds[v] {
            out_deg[u] -= 1;
        }
    };

    while remaining > 0 {
        let mut progressed = true;
        while progressed {
            progressed = false;
            for v in 0..n {
                if !removed[v] && out_deg[v] == 0 {
                    remove(v, &mut removed, &mut out_deg, &mut in_deg);
                    tail.push(v);
                    remaining -= 1;
                    progressed = true;
                }
            }
            for v in 0..n {
                if !removed[v] && in_deg[v] == 0 {
                    remove(v, &mut removed, &mut out_deg, &mut in_deg);
                    head.push(v);
                    remaining -= 1;
                    progressed = true;
                }
            }
        }
        if remaining == 0 {
            break;
        }
        // Highest out-minus-in degree; lowest index wins ties.
        let mut best: Option<(i64, usize)> = None;
        for v in 0..n {
            if removed[v] {
                continue;
            }
            let delta = out_deg[v] - in_deg[v];
            if best.is_none_or(|(d, _)| delta > d) {
                best = Some((delta, v));
            }
        }
        if let Some((_, v)) = best {
            remove(v, &mut removed, &mut out_deg, &mut in_deg);
            head.push(v);
            remaining -= 1;
        }
    }

    let mut position = vec![0usize; n];
    for (pos, &v) in head.iter().chain(tail.iter().rev()).enumerate() {
        position[v] = pos;
    }

    edges
        .iter()
        .copied()
        .partition(|&(_, from, to)| from != to && position[from] < position[to])
}

// ---------------------------------------------------------------------------
// 2-3. Anchoring and longest-path ranking
// ---------------------------------------------------------------------------

/// Longest path from a hidden anchor linked to every source, minus one.
fn rank_nodes(n: usize, preds: &[Vec<usize>], succs: &[Vec<usize>]) -> Vec<usize> {
    // Index n is the anchor.
    let mut in_deg: Vec<usize> = preds.iter().map(Vec::len).collect();
    let anchor_succs: Vec<usize> = (0..n).filter(|&v| in_deg[v] == 0).collect();
    for &v in &anchor_succs {
        in_deg[v] += 1;
    }
    in_deg.push(0);

    let mut rank = vec![0usize; n + 1];
    let mut queue: VecDeque<usize> = VecDeque::from([n]);
    while let Some(u) = queue.pop_front() {
        let next: &[usize] = if u == n { &anchor_succs } else { &succs[u] };
        for &v in next {
            rank[v] = rank[v].max(rank[u] + 1);
            in_deg[v] -= 1;
            if in_deg[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    rank.truncate(n);
    rank.iter().map(|r| r.saturating_sub(1)).collect()
}

// ---------------------------------------------------------------------------
// 4. Ordering within ranks
// ---------------------------------------------------------------------------

fn order_layers(
    ranks: &[usize],
    preds: &[Vec<usize>],
    succs: &[Vec<usize>],
    sweeps: usize,
) -> Vec<Vec<usize>> {
    let rank_count = ranks.iter().map(|r| r + 1).max().unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (v, &r) in ranks.iter().enumerate() {
        layers[r].push(v);
    }

    let mut pos = vec![0.0f64; ranks.len()];
    let sync = |layers: &[Vec<usize>], pos: &mut Vec<f64>| {
        for layer in layers {
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i as f64;
            }
        }
    };
    sync(&layers, &mut pos);

    for sweep in 0..sweeps {
        let downward = sweep % 2 == 0;
        let rank_seq: Vec<usize> = if downward {
            (1..rank_count).collect()
        } else {
            (0..rank_count.saturating_sub(1)).rev().collect()
        };
        for r in rank_seq {
            let neighbours = if downward { preds } else { succs };
            let layer = &mut layers[r];
            let keys: HashMap<usize, f64> = layer
                .iter()
                .map(|&v| {
                    let adj = &neighbours[v];
                    let key = if adj.is_empty() {
                        pos[v]
                    } else {
                        adj.iter().map(|&u| pos[u]).sum::<f64>() / adj.len() as f64
                    };
                    (v, key)
                })
                .collect();
            layer.sort_by(|a, b| keys[a].total_cmp(&keys[b]));
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i as f64;
            }
        }
    }

    layers
}

// ---------------------------------------------------------------------------
// 5. Coordinates
// ---------------------------------------------------------------------------

/// Center point of every node.
fn assign_coordinates(
    layers: &[Vec<usize>],
    preds: &[Vec<usize>],
    sizes: &[(f64, f64)],
    options: &LayoutOptions,
) -> Vec<Point> {
    let n = sizes.len();
    let left_to_right = options.direction == Direction::LeftToRight;
    // (along the flow, across the flow)
    let extent = |v: usize| {
        let (w, h) = sizes[v];
        if left_to_right { (w, h) } else { (h, w) }
    };

    let mut main = vec![0.0f64; n];
    let mut cross = vec![0.0f64; n];

    let mut offset = 0.0;
    for layer in layers.iter() {
        let depth = layer.iter().map(|&v| extent(v).0).fold(0.0, f64::max);
        for &v in layer {
            main[v] = offset + depth / 2.0;
        }
        offset += depth + options.rank_sep;
    }

    for layer in layers.iter() {
        let mut prev: Option<usize> = None;
        for &v in layer {
            let floor = prev.map(|p| cross[p] + (extent(p).1 + extent(v).1) / 2.0 + options.node_sep);
            let desired = if preds[v].is_empty() {
                None
            } else {
                Some(preds[v].iter().map(|&u| cross[u]).sum::<f64>() / preds[v].len() as f64)
            };
            cross[v] = match (desired, floor) {
                (Some(d), Some(f)) => d.max(f),
                (Some(d), None) => d,
                (None, Some(f)) => f,
                (None, None) => 0.0,
            };
            prev = Some(v);
        }
    }

    (0..n)
        .map(|v| {
            if left_to_right {
                Point::new(main[v], cross[v])
            } else {
                Point::new(cross[v], main[v])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogBuilder, DeviceDef, DeviceKind, ItemDef, RecipeDef};
    use crate::consolidate::consolidate;
    use crate::id::ItemId;
    use crate::resolve::{ProductionNode, resolve};
    use crate::test_utils::*;

    fn healing_graph() -> FlowGraph {
        let catalog = sample_catalog();
        let plan = resolve(&catalog, &[target("Healing Potion", 10.0)], &planner_config()).unwrap();
        consolidate(&plan.roots)
    }

    fn overlaps(a: &PositionedNode, b: &PositionedNode) -> bool {
        a.position.x < b.position.x + b.width
            && b.position.x < a.position.x + a.width
            && a.position.y < b.position.y + b.height
            && b.position.y < a.position.y + a.height
    }

    #[test]
    fn node_sizes_follow_visible_rows() {
        let graph = healing_graph();
        let positioned = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        let water = positioned.node(&"Water".into()).unwrap();
        assert_eq!((water.width, water.height), (250.0, 66.0));
        // Root item: target badge plus device row.
        let potion = positioned.node(&"Healing Potion".into()).unwrap();
        assert_eq!(potion.height, 66.0 + 24.0 + 24.0);
        let glass = positioned.node(&"Glass".into()).unwrap();
        assert_eq!(glass.height, 66.0 + 24.0 + 24.0);
        let target_key = NodeKey::Target {
            item: ItemId::from("Healing Potion"),
            index: 0,
        };
        assert_eq!(positioned.node(&target_key).unwrap().height, 66.0 + 24.0);
    }

    #[test]
    fn sources_share_first_rank_and_flow_goes_right() {
        let graph = healing_graph();
        let positioned = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        for key in ["Water", "Herb Seed", "Sand"] {
            let node = positioned.node(&key.into()).unwrap();
            assert_eq!(node.rank, 0, "{key} should be a source");
            assert_eq!(node.position.x, 0.0);
        }
        for edge in &positioned.edges {
            let from = positioned.node(&edge.source).unwrap();
            let to = positioned.node(&edge.target).unwrap();
            assert!(from.rank < to.rank);
            assert!(from.position.x < to.position.x);
        }
        let target_node = positioned.nodes.last().unwrap();
        assert_eq!(target_node.rank, positioned.rank_count() - 1);
        assert!(positioned.dropped_edges.is_empty());
    }

    #[test]
    fn ranks_are_separated_by_rank_sep() {
        let graph = healing_graph();
        let positioned = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        let herb = positioned.node(&"Healing Herb".into()).unwrap();
        assert_eq!(herb.rank, 1);
        assert_eq!(herb.position.x, 250.0 + 180.0);
    }

    #[test]
    fn drawing_starts_at_origin_without_overlap() {
        for direction in [Direction::LeftToRight, Direction::TopToBottom] {
            let graph = healing_graph();
            let options = LayoutOptions::default().with_direction(direction);
            let positioned = layout(&graph, &options, &SavedPositions::new());
            let min_x = positioned.nodes.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min);
            let min_y = positioned.nodes.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);
            assert_eq!(min_x, 0.0);
            assert_eq!(min_y, 0.0);
            for (i, a) in positioned.nodes.iter().enumerate() {
                for b in &positioned.nodes[i + 1..] {
                    assert!(!overlaps(a, b), "{} overlaps {}", a.key, b.key);
                }
            }
        }
    }

    #[test]
    fn handles_follow_direction() {
        let graph = healing_graph();
        let lr = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        assert_eq!(lr.nodes[0].target_handle, Side::Left);
        assert_eq!(lr.nodes[0].source_handle, Side::Right);
        let options = LayoutOptions::default().with_direction(Direction::TopToBottom);
        let tb = layout(&graph, &options, &SavedPositions::new());
        assert_eq!(tb.nodes[0].target_handle, Side::Top);
        assert_eq!(tb.nodes[0].source_handle, Side::Bottom);
        for edge in &tb.edges {
            let from = tb.node(&edge.source).unwrap();
            let to = tb.node(&edge.target).unwrap();
            assert!(from.position.y < to.position.y);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = healing_graph();
        let a = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        let b = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        assert_eq!(a, b);
    }

    #[test]
    fn saved_positions_override_only_their_node() {
        let graph = healing_graph();
        let free = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        let mut saved = SavedPositions::new();
        saved.insert("Glass".into(), Point::new(-400.0, 1234.5));
        let pinned = layout(&graph, &LayoutOptions::default(), &saved);

        let glass = pinned.node(&"Glass".into()).unwrap();
        assert_eq!(glass.position, Point::new(-400.0, 1234.5));
        assert!(glass.pinned);
        for (a, b) in free.nodes.iter().zip(&pinned.nodes) {
            if a.key != NodeKey::from("Glass") {
                assert_eq!(a.position, b.position);
                assert!(!b.pinned);
            }
        }
    }

    #[test]
    fn saved_position_for_unknown_key_is_ignored() {
        let graph = healing_graph();
        let mut saved = SavedPositions::new();
        saved.insert("Unicorn Horn".into(), Point::new(5.0, 5.0));
        let positioned = layout(&graph, &LayoutOptions::default(), &saved);
        assert!(positioned.nodes.iter().all(|n| !n.pinned));
    }

    #[test]
    fn cycles_are_broken_and_reported() {
        // Two trees that each treat the other item as the ingredient.
        let mut b = CatalogBuilder::new();
        for name in ["Salt", "Brine"] {
            b.register_item(ItemDef::new(name)).unwrap();
        }
        b.register_device(DeviceDef::new("Pan", DeviceKind::Workshop, 10.0))
            .unwrap();
        b.register_recipe(RecipeDef::new("Boil", "Salt", 1.0, "Pan").input("Brine", 1.0))
            .unwrap();
        let catalog = b.build().unwrap();
        let plan = resolve(&catalog, &[target("Salt", 5.0)], &planner_config()).unwrap();

        // Hand-build a reversed tree so the merged graph has Salt <-> Brine.
        let mut reversed: ProductionNode = plan.roots[0].inputs[0].clone();
        let mut salt_leaf = plan.roots[0].clone();
        salt_leaf.inputs.clear();
        reversed.inputs.push(salt_leaf);
        let graph = consolidate(&[plan.roots[0].clone(), reversed]);

        let positioned = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        assert_eq!(positioned.dropped_edges.len(), 1);
        assert_eq!(positioned.edges.iter().filter(|e| e.dropped).count(), 1);
        assert_eq!(positioned.nodes.len(), graph.node_count());
    }

    #[test]
    fn disconnected_nodes_are_sources() {
        let catalog = sample_catalog();
        let plan = resolve(
            &catalog,
            &[target("Water", 5.0), target("Sand", 5.0)],
            &planner_config(),
        )
        .unwrap();
        let graph = consolidate(&plan.roots);
        let positioned = layout(&graph, &LayoutOptions::default(), &SavedPositions::new());
        assert_eq!(positioned.rank_count(), 2);
        let water = positioned.node(&"Water".into()).unwrap();
        let sand = positioned.node(&"Sand".into()).unwrap();
        assert_eq!(water.rank, 0);
        assert_eq!(sand.rank, 0);
        assert_eq!(water.order, 0);
        assert_eq!(sand.order, 1);
        // Both are roots, so both carry the target row.
        assert_eq!(sand.position.y, 90.0 + 50.0);
    }

    #[test]
    fn empty_graph_lays_out_to_nothing() {
        let positioned = layout(&FlowGraph::default(), &LayoutOptions::default(), &SavedPositions::new());
        assert!(positioned.nodes.is_empty());
        assert_eq!(positioned.rank_count(), 0);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: LayoutOptions = serde_json::from_str(r#"{"direction": "top_to_bottom"}"#).unwrap();
        assert_eq!(options.direction, Direction::TopToBottom);
        assert_eq!(options.rank_sep, 180.0);
        assert_eq!(options.node_sep, 50.0);
    }
}
