//! Procedural generation of artifact node graphs.
//!
//! A graph is grown one segment at a time. Each segment is a small DAG built
//! layer by layer: a layer of nodes at depth `d` is created, the rest of the
//! segment is built recursively at depth `d + 1`, and every deeper node is
//! given at least one parent in the layer above. Layers get wider with depth
//! so segments do not come out as tall single-file chains.
//!
//! Recursion can leave whole layers with no link upward when the layer sizes
//! do not line up, so after each segment is built its connected components
//! are stitched back onto the largest one. The same stitch runs once more
//! across the whole graph so separate segments end up joined too.
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use xenoarch_logic::catalog::WeightTable;
//! use xenoarch_logic::config::ArtifactConfig;
//! use xenoarch_logic::generation::generate_graph;
//!
//! let config = ArtifactConfig::default();
//! let mut rng = StdRng::seed_from_u64(42);
//! let generated = generate_graph(&config, &WeightTable::standard(), &config, &mut rng);
//! assert!(config.node_count.contains(generated.graph.len() as u32));
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::WeightTable;
use crate::config::{ArtifactConfig, IntRange};
use crate::graph::NodeGraph;
use crate::pool::{build_pool, Eligibility, TriggerPool};

/// Where a stitch pass was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StitchScope {
    /// Inside one segment, using only that segment's edges.
    Segment(usize),
    /// Across the finished graph.
    Graph,
}

/// Why a component could not be stitched to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StitchFailure {
    /// Depth ranges too far apart to bridge with one edge.
    NoDepthOverlap { min: i64, max: i64 },
    /// No node of the component lies inside the bracket.
    NoCandidate { min: i64, max: i64 },
    /// The parent has nothing one layer above or below the chosen node.
    NoPartner { depth: u32 },
}

/// A component left disconnected by a stitch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchSkip {
    pub scope: StitchScope,
    pub component: Vec<usize>,
    pub failure: StitchFailure,
}

/// What happened while generating one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Node count sampled from the config.
    pub requested_nodes: usize,
    /// Nodes actually created.
    pub actual_nodes: usize,
    /// How many nodes the trigger pool could not supply.
    pub shortfall: Option<usize>,
    /// Size of each segment in creation order.
    pub segment_sizes: Vec<usize>,
    /// Edges added by stitching.
    pub stitched_edges: usize,
    /// Components still disconnected once the graph-wide pass is done.
    /// Each entry is one component of the finished graph, so the graph is
    /// connected exactly when this is empty.
    pub unstitchable: Vec<StitchSkip>,
}

/// A generated graph and its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub graph: NodeGraph,
    pub report: GenerationReport,
}

/// Generate a complete graph for one artifact.
pub fn generate_graph(
    config: &ArtifactConfig,
    table: &WeightTable,
    eligibility: &impl Eligibility,
    rng: &mut impl Rng,
) -> Generated {
    let requested = config.node_count.sample(rng) as usize;
    let pool = build_pool(table, eligibility, requested, rng);
    let node_count = pool.len();
    let report = GenerationReport {
        requested_nodes: requested,
        shortfall: pool.shortfall(),
        ..GenerationReport::default()
    };

    let mut builder = GraphBuilder {
        config,
        graph: NodeGraph::with_capacity(node_count),
        pool,
        rng,
        report,
        segment: 0,
    };

    let mut remaining = node_count;
    while remaining > 0 {
        builder.generate_segment(&mut remaining);
    }
    let all: Vec<usize> = (0..builder.graph.len()).collect();
    builder.stitch(&all, StitchScope::Graph);

    let GraphBuilder {
        mut graph,
        mut report,
        ..
    } = builder;
    graph.refresh_summary();
    report.actual_nodes = graph.len();

    log::debug!(
        "Generated artifact graph: {} nodes, {} edges, {} segments, {} components",
        graph.len(),
        graph.summary().edge_count,
        graph.summary().segment_count,
        graph.summary().component_count
    );

    Generated { graph, report }
}

/// Size of the next segment given how many nodes are left.
///
/// The upper bound is capped at half of what remains so an artifact with more
/// than one segment's worth of nodes always gets at least two segments. A
/// leftover too small to make a segment of its own is absorbed.
pub fn pick_segment_size(range: IntRange, remaining: usize, rng: &mut impl Rng) -> usize {
    if remaining == 0 {
        return 0;
    }
    let min = range.min as usize;
    let max = range.max as usize;
    let cap = max.min((remaining / 2).max(min));
    let mut size = if cap >= min {
        rng.gen_range(min..=cap)
    } else {
        min
    };
    if remaining.saturating_sub(size) < min {
        size = remaining;
    }
    size.clamp(1, remaining)
}

struct GraphBuilder<'a, R: Rng> {
    config: &'a ArtifactConfig,
    graph: NodeGraph,
    pool: TriggerPool,
    rng: &'a mut R,
    report: GenerationReport,
    segment: usize,
}

impl<'a, R: Rng> GraphBuilder<'a, R> {
    fn generate_segment(&mut self, remaining: &mut usize) {
        let size = pick_segment_size(self.config.segment_size, *remaining, self.rng);
        *remaining -= size;
        self.report.segment_sizes.push(size);

        let first = self.graph.len();
        self.populate_layer(size, 0);
        let nodes: Vec<usize> = (first..self.graph.len()).collect();

        self.stitch(&nodes, StitchScope::Segment(self.segment));
        self.segment += 1;
    }

    /// Build one layer at depth `iteration` plus everything below it, and
    /// return the layer's nodes.
    fn populate_layer(&mut self, segment_size: usize, iteration: u32) -> Vec<usize> {
        if segment_size == 0 {
            return Vec::new();
        }

        // floor(iteration / 1.5): deeper layers are allowed to be wider.
        let modifier = self.rng.gen_range((iteration * 2 / 3)..=iteration) as usize;
        let per_layer = self.config.nodes_per_layer;
        let layer_min = (per_layer.min as usize + modifier).min(segment_size);
        let layer_max = (per_layer.max as usize + modifier).min(segment_size);
        let layer_count = if layer_max >= layer_min {
            self.rng.gen_range(layer_min..=layer_max)
        } else {
            1
        }
        .max(1);

        let mut layer = Vec::with_capacity(layer_count);
        for _ in 0..layer_count {
            let Some(kind) = self.pool.pop() else {
                log::error!("Trigger pool ran dry mid-segment at depth {}", iteration);
                break;
            };
            layer.push(self.graph.add_node(iteration, self.segment, kind));
        }

        let successors = self.populate_layer(segment_size - layer_count, iteration + 1);
        if successors.is_empty() || layer.is_empty() {
            return layer;
        }

        for &successor in &successors {
            if let Some(&parent) = layer.choose(&mut *self.rng) {
                self.graph.add_edge(parent, successor);
            }
        }

        let scatter = self.config.scatter_per_layer.sample(self.rng);
        for _ in 0..scatter {
            let from = layer.choose(&mut *self.rng).copied();
            let to = successors.choose(&mut *self.rng).copied();
            if let (Some(from), Some(to)) = (from, to) {
                self.graph.add_edge(from, to);
            }
        }

        layer
    }

    /// Join every component among `nodes` to the largest one where a single
    /// edge between adjacent depths can do it.
    fn stitch(&mut self, nodes: &[usize], scope: StitchScope) {
        let mut components = self.graph.components(nodes);
        if components.len() <= 1 {
            return;
        }

        // Largest component is the parent; ties go to the earliest.
        let mut parent_at = 0;
        for (i, component) in components.iter().enumerate() {
            if component.len() > components[parent_at].len() {
                parent_at = i;
            }
        }
        let parent = components.remove(parent_at);
        let (min_p, max_p) = self.depth_bounds(&parent);

        for component in components {
            let (min_s, max_s) = self.depth_bounds(&component);
            let min = min_s.max(min_p) - 1;
            let max = max_s.min(max_p) + 1;
            if min >= max {
                self.skip(scope, component, StitchFailure::NoDepthOverlap { min, max });
                continue;
            }

            let candidates: Vec<usize> = component
                .iter()
                .copied()
                .filter(|&i| (min..=max).contains(&self.depth(i)))
                .collect();
            let Some(&node1) = candidates.choose(&mut *self.rng) else {
                self.skip(scope, component, StitchFailure::NoCandidate { min, max });
                continue;
            };

            let depth1 = self.depth(node1);
            let partners: Vec<usize> = parent
                .iter()
                .copied()
                .filter(|&i| (self.depth(i) - depth1).abs() == 1)
                .collect();
            let Some(&node2) = partners.choose(&mut *self.rng) else {
                self.skip(
                    scope,
                    component,
                    StitchFailure::NoPartner {
                        depth: depth1 as u32,
                    },
                );
                continue;
            };

            if self.graph.add_edge(node1, node2) {
                self.report.stitched_edges += 1;
            }
        }
    }

    /// Segment skips may still be joined by the graph-wide pass, so only
    /// graph skips are reported.
    fn skip(&mut self, scope: StitchScope, component: Vec<usize>, failure: StitchFailure) {
        match scope {
            StitchScope::Segment(segment) => {
                log::debug!(
                    "Segment {} left component {:?} apart: {:?}",
                    segment,
                    component,
                    failure
                );
            }
            StitchScope::Graph => {
                log::warn!("Left component {:?} disconnected: {:?}", component, failure);
                self.report.unstitchable.push(StitchSkip {
                    scope,
                    component,
                    failure,
                });
            }
        }
    }

    fn depth(&self, index: usize) -> i64 {
        self.graph.node(index).map_or(0, |n| n.depth as i64)
    }

    fn depth_bounds(&self, nodes: &[usize]) -> (i64, i64) {
        let depths = nodes.iter().map(|&i| self.depth(i));
        let min = depths.clone().min().unwrap_or(0);
        let max = depths.max().unwrap_or(0);
        (min, max)
    }
}
