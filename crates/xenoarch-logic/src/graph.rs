//! Artifact node graph - an arena of nodes linked by index.
//!
//! Nodes live in one `Vec` owned by the graph and refer to each other only by
//! their index. Edges always run from a shallower node to a strictly deeper
//! one, so the graph is acyclic by construction and never needs a cycle check.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::catalog::TriggerKind;
use crate::triggers::TriggerBehavior;

/// One vertex of an artifact graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable position in the graph; the unlock aggregation key.
    pub index: usize,
    /// Layer the node was created in.
    pub depth: u32,
    /// Which generated segment the node belongs to.
    pub segment: usize,
    /// Catalog kind the trigger was built from.
    pub kind: TriggerKind,
    pub trigger: TriggerBehavior,
    /// Cleared when an unlock window resolves in this node's favor.
    pub locked: bool,
}

/// Derived metadata, recomputed after generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub segment_count: usize,
    pub component_count: usize,
    pub max_depth: u32,
    /// Nodes with no predecessors.
    pub roots: Vec<usize>,
    /// Nodes with no successors.
    pub leaves: Vec<usize>,
}

/// Directed acyclic graph of artifact nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    predecessors: Vec<BTreeSet<usize>>,
    successors: Vec<BTreeSet<usize>>,
    summary: GraphSummary,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            predecessors: Vec::with_capacity(capacity),
            successors: Vec::with_capacity(capacity),
            summary: GraphSummary::default(),
        }
    }

    /// Append a locked node carrying a fresh trigger for `kind`.
    pub fn add_node(&mut self, depth: u32, segment: usize, kind: TriggerKind) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            index,
            depth,
            segment,
            kind,
            trigger: TriggerBehavior::for_kind(kind),
            locked: true,
        });
        self.predecessors.push(BTreeSet::new());
        self.successors.push(BTreeSet::new());
        index
    }

    /// Link two nodes, pointing the edge from the shallower to the deeper.
    ///
    /// Returns `false` when either index is unknown, both nodes share a depth,
    /// or the edge already exists.
    pub fn add_edge(&mut self, a: usize, b: usize) -> bool {
        let (Some(node_a), Some(node_b)) = (self.nodes.get(a), self.nodes.get(b)) else {
            return false;
        };
        let (from, to) = match node_a.depth.cmp(&node_b.depth) {
            std::cmp::Ordering::Less => (a, b),
            std::cmp::Ordering::Greater => (b, a),
            std::cmp::Ordering::Equal => return false,
        };
        let inserted = self.successors[from].insert(to);
        self.predecessors[to].insert(from);
        inserted
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn predecessors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.predecessors.get(index).into_iter().flatten().copied()
    }

    pub fn successors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.successors.get(index).into_iter().flatten().copied()
    }

    /// Every edge as `(from, to)`, ordered by `from` then `to`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(from, tos)| tos.iter().map(move |&to| (from, to)))
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(BTreeSet::len).sum()
    }

    /// Undirected connected components among `subset`, following only edges
    /// whose both ends are in `subset`. Components are sorted internally and
    /// ordered by their smallest index.
    pub fn components(&self, subset: &[usize]) -> Vec<Vec<usize>> {
        let members: BTreeSet<usize> = subset.iter().copied().filter(|&i| i < self.len()).collect();
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();

        for &start in &members {
            if !seen.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                let neighbors = self.predecessors[current]
                    .iter()
                    .chain(self.successors[current].iter());
                for &next in neighbors {
                    if members.contains(&next) && seen.insert(next) {
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// Components of the whole graph.
    pub fn component_count(&self) -> usize {
        let all: Vec<usize> = (0..self.len()).collect();
        self.components(&all).len()
    }

    pub fn segment_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.segment)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Indices of nodes in one segment.
    pub fn segment_nodes(&self, segment: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .filter(|n| n.segment == segment)
            .map(|n| n.index)
            .collect()
    }

    /// Whether every predecessor of `index` appears in `indices`.
    pub fn predecessors_within(&self, index: usize, indices: &BTreeSet<usize>) -> bool {
        self.predecessors(index).all(|p| indices.contains(&p))
    }

    /// Nodes an unlock window with these activations would unlock: locked
    /// nodes that were themselves activated and whose predecessors all were.
    pub fn unlock_candidates(&self, triggered: &BTreeSet<usize>) -> Vec<usize> {
        triggered
            .iter()
            .copied()
            .filter(|&i| self.node(i).is_some_and(|n| n.locked))
            .filter(|&i| self.predecessors_within(i, triggered))
            .collect()
    }

    pub fn summary(&self) -> &GraphSummary {
        &self.summary
    }

    /// Recompute derived metadata after the graph changed shape.
    pub fn refresh_summary(&mut self) {
        self.summary = GraphSummary {
            node_count: self.len(),
            edge_count: self.edge_count(),
            segment_count: self.segment_count(),
            component_count: self.component_count(),
            max_depth: self.nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            roots: (0..self.len())
                .filter(|&i| self.predecessors[i].is_empty())
                .collect(),
            leaves: (0..self.len())
                .filter(|&i| self.successors[i].is_empty())
                .collect(),
        };
    }

    /// Read-only export for diagnostics and UI.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeSnapshot {
                    index: n.index,
                    depth: n.depth,
                    segment: n.segment,
                    kind: n.kind,
                    hint: n.kind.hint().to_string(),
                    locked: n.locked,
                    predecessors: self.predecessors(n.index).collect(),
                    successors: self.successors(n.index).collect(),
                })
                .collect(),
            summary: self.summary.clone(),
        }
    }
}

/// Serializable view of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub index: usize,
    pub depth: u32,
    pub segment: usize,
    pub kind: TriggerKind,
    pub hint: String,
    pub locked: bool,
    pub predecessors: Vec<usize>,
    pub successors: Vec<usize>,
}

/// Serializable view of a whole graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub summary: GraphSummary,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
