use crate::{Edge, Point, PointKey, Quantization};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use tracing::debug;

// Walls connect their endpoints in both directions, so the graph is undirected.
// Each graph edge keeps the first drawn segment between its two vertices.
pub type DrawingGraph = UnGraph<Point, Edge>;

/// Build an undirected graph from a list of edges.
///
/// Nodes are the distinct endpoints (by [`PointKey`] under `quantization`) in
/// the order they are first referenced. Parallel edges between the same pair
/// collapse into one graph edge and self-loops are dropped.
pub fn build_graph(edges: &[Edge], quantization: Quantization) -> DrawingGraph {
    let mut graph = UnGraph::new_undirected();
    let mut point_to_node: HashMap<PointKey, NodeIndex> = HashMap::new();
    let mut self_loops = 0usize;
    let mut parallel = 0usize;

    for edge in edges {
        if edge.is_degenerate(quantization) {
            self_loops += 1;
            continue;
        }

        let a = *point_to_node
            .entry(edge.a.key(quantization))
            .or_insert_with(|| graph.add_node(edge.a));
        let b = *point_to_node
            .entry(edge.b.key(quantization))
            .or_insert_with(|| graph.add_node(edge.b));

        if graph.find_edge(a, b).is_some() {
            parallel += 1;
            continue;
        }

        graph.add_edge(a, b, *edge);
    }

    debug!(
        "Built graph with {} nodes and {} edges ({} self-loops dropped, {} parallel edges collapsed)",
        graph.node_count(),
        graph.edge_count(),
        self_loops,
        parallel
    );

    graph
}
