use crate::graph_builder::{build_graph, DrawingGraph};
use crate::{Cycle, Edge, Point, Quantization};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Recover the enclosed regions of a drawing as a list of cycles.
///
/// Builds the connectivity graph from `edges` and returns its cycle basis,
/// keeping only cycles with at least three distinct points. Points that no
/// edge references cannot be part of a cycle and are not needed here.
///
/// The result depends only on the order of `edges`: the same input always
/// yields the same cycles in the same order.
pub fn compute_cycles(points: &[Point], edges: &[Edge], quantization: Quantization) -> Vec<Cycle> {
    let graph = build_graph(edges, quantization);

    if graph.node_count() < points.len() {
        debug!(
            "{} points are not referenced by any edge",
            points.len() - graph.node_count()
        );
    }

    let basis = cycle_basis(&graph);
    let basis_len = basis.len();

    let cycles: Vec<Cycle> = basis
        .into_iter()
        .filter(|nodes| nodes.len() > 2)
        .map(|nodes| Cycle::new(nodes.iter().map(|&n| graph[n]).collect()))
        .collect();

    if cycles.len() < basis_len {
        debug!("Dropped {} degenerate cycles", basis_len - cycles.len());
    }
    info!(
        "Found {} cycles in graph with {} nodes and {} edges",
        cycles.len(),
        graph.node_count(),
        graph.edge_count()
    );

    cycles
}

/// Fundamental cycles of an undirected graph.
///
/// Grows a spanning tree from every unvisited node (in node order) with an
/// explicit stack. Each non-tree edge closes exactly one cycle: the edge itself
/// plus the tree path between its endpoints. Neighbours are visited in edge
/// insertion order.
pub fn cycle_basis(graph: &DrawingGraph) -> Vec<Vec<NodeIndex>> {
    let adjacency: Vec<Vec<NodeIndex>> = graph
        .node_indices()
        .map(|node| ordered_neighbors(graph, node))
        .collect();

    let mut in_forest = vec![false; graph.node_count()];
    let mut cycles = Vec::new();

    for root in graph.node_indices() {
        if in_forest[root.index()] {
            continue;
        }

        let mut stack = vec![root];
        let mut pred: HashMap<NodeIndex, NodeIndex> = HashMap::from([(root, root)]);
        // For every discovered node: the neighbours whose edge to it is already accounted for
        let mut used: HashMap<NodeIndex, HashSet<NodeIndex>> = HashMap::from([(root, HashSet::new())]);

        while let Some(z) = stack.pop() {
            for &nbr in &adjacency[z.index()] {
                if !used.contains_key(&nbr) {
                    // tree edge
                    pred.insert(nbr, z);
                    stack.push(nbr);
                    used.insert(nbr, HashSet::from([z]));
                    continue;
                }

                let already_used = used.get(&z).is_some_and(|zused| zused.contains(&nbr));
                if nbr == z || already_used {
                    continue;
                }

                // back edge z -> nbr: walk up from z until reaching a node adjacent to nbr
                if let Some(cycle) = close_cycle(nbr, z, &pred, &used, graph.node_count()) {
                    cycles.push(cycle);
                }
                if let Some(nbr_used) = used.get_mut(&nbr) {
                    nbr_used.insert(z);
                }
            }
        }

        for node in pred.keys() {
            in_forest[node.index()] = true;
        }
    }

    cycles
}

fn close_cycle(
    nbr: NodeIndex,
    z: NodeIndex,
    pred: &HashMap<NodeIndex, NodeIndex>,
    used: &HashMap<NodeIndex, HashSet<NodeIndex>>,
    max_len: usize,
) -> Option<Vec<NodeIndex>> {
    let stop = used.get(&nbr)?;
    let mut cycle = vec![nbr, z];
    let mut p = *pred.get(&z)?;

    while !stop.contains(&p) {
        cycle.push(p);
        p = *pred.get(&p)?;

        // A simple cycle cannot visit more nodes than the graph has
        if cycle.len() > max_len {
            warn!(
                "Cycle reconstruction exceeded {} nodes for back edge {:?} -> {:?}",
                max_len, z, nbr
            );
            return None;
        }
    }
    cycle.push(p);

    Some(cycle)
}

/// Neighbours of `node` ordered by the insertion order of the connecting edges.
fn ordered_neighbors(graph: &DrawingGraph, node: NodeIndex) -> Vec<NodeIndex> {
    let mut incident: Vec<(usize, NodeIndex)> = graph
        .edges(node)
        .map(|edge| {
            let other = if edge.source() == node { edge.target() } else { edge.source() };
            (edge.id().index(), other)
        })
        .collect();
    incident.sort_by_key(|&(id, _)| id);
    incident.into_iter().map(|(_, other)| other).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointKey;

    fn ring(points: &[(f64, f64)]) -> Vec<Edge> {
        (0..points.len())
            .map(|i| {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                Edge::new(Point::new(ax, ay), Point::new(bx, by))
            })
            .collect()
    }

    fn key_set(cycle: &Cycle) -> HashSet<PointKey> {
        cycle.points.iter().map(PointKey::from).collect()
    }

    fn is_closed_walk(cycle: &Cycle, edges: &[Edge]) -> bool {
        let pairs: HashSet<(PointKey, PointKey)> = edges
            .iter()
            .flat_map(|e| {
                let (a, b) = (PointKey::from(&e.a), PointKey::from(&e.b));
                [(a, b), (b, a)]
            })
            .collect();
        let n = cycle.len();
        (0..n).all(|i| {
            let a = PointKey::from(&cycle.points[i]);
            let b = PointKey::from(&cycle.points[(i + 1) % n]);
            pairs.contains(&(a, b))
        })
    }

    #[test]
    fn test_single_rectangle() {
        let edges = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]);

        let cycles = compute_cycles(&[], &edges, Quantization::Exact);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 4);
        assert!(is_closed_walk(&cycles[0], &edges));
    }

    #[test]
    fn test_triangle() {
        let edges = ring(&[(0.0, 0.0), (100.0, 0.0), (50.0, 86.6)]);

        let cycles = compute_cycles(&[], &edges, Quantization::Exact);

        assert_eq!(cycles.len(), 1, "Triangle should have exactly 1 cycle");
        assert_eq!(cycles[0].len(), 3);
    }

    #[test]
    fn test_two_rooms_sharing_a_wall() {
        let p = |x, y| Point::new(x, y);
        let edges = vec![
            // left room
            Edge::new(p(0.0, 0.0), p(100.0, 0.0)),
            Edge::new(p(100.0, 0.0), p(100.0, 100.0)),
            Edge::new(p(100.0, 100.0), p(0.0, 100.0)),
            Edge::new(p(0.0, 100.0), p(0.0, 0.0)),
            // right room reuses the shared wall
            Edge::new(p(100.0, 0.0), p(200.0, 0.0)),
            Edge::new(p(200.0, 0.0), p(200.0, 100.0)),
            Edge::new(p(200.0, 100.0), p(100.0, 100.0)),
        ];

        let cycles = compute_cycles(&[], &edges, Quantization::Exact);

        // cycle space dimension: E - V + C = 7 - 6 + 1
        assert_eq!(cycles.len(), 2);
        for cycle in &cycles {
            assert!(is_closed_walk(cycle, &edges));
        }
    }

    #[test]
    fn test_dangling_wall_is_not_a_cycle() {
        let mut edges = ring(&[
            (0.0, 0.0),
            (200.0, 0.0),
            (200.0, 100.0),
            (100.0, 100.0),
            (100.0, 200.0),
            (0.0, 200.0),
        ]);
        // internal wall ending on a point that is not a vertex of the outline
        edges.push(Edge::new(Point::new(100.0, 0.0), Point::new(100.0, 100.0)));

        let cycles = compute_cycles(&[], &edges, Quantization::Exact);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 6);
    }

    #[test]
    fn test_open_lines_have_no_cycles() {
        let p = |x, y| Point::new(x, y);
        let edges = vec![
            Edge::new(p(0.0, 0.0), p(10.0, 0.0)),
            Edge::new(p(10.0, 0.0), p(10.0, 10.0)),
            Edge::new(p(10.0, 10.0), p(20.0, 10.0)),
        ];

        assert!(compute_cycles(&[], &edges, Quantization::Exact).is_empty());
    }

    #[test]
    fn test_two_point_ring_is_degenerate() {
        // A two-vertex polyline closes onto itself as a parallel edge
        let edges = ring(&[(0.0, 0.0), (5.0, 0.0)]);

        assert!(compute_cycles(&[], &edges, Quantization::Exact).is_empty());
    }

    #[test]
    fn test_disjoint_rectangles() {
        let mut edges = ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 3.0), (0.0, 3.0)]);
        edges.extend(ring(&[(10.0, 10.0), (12.0, 10.0), (12.0, 15.0), (10.0, 15.0)]));

        let cycles = compute_cycles(&[], &edges, Quantization::Exact);

        assert_eq!(cycles.len(), 2);
        assert_ne!(key_set(&cycles[0]), key_set(&cycles[1]));
    }

    #[test]
    fn test_complete_graph_basis_size() {
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let mut edges = Vec::new();
        for i in 0..corners.len() {
            for j in (i + 1)..corners.len() {
                edges.push(Edge::new(
                    Point::new(corners[i].0, corners[i].1),
                    Point::new(corners[j].0, corners[j].1),
                ));
            }
        }

        let cycles = compute_cycles(&[], &edges, Quantization::Exact);

        // 6 edges - 4 nodes + 1 component
        assert_eq!(cycles.len(), 3);
        for cycle in &cycles {
            assert!(cycle.len() >= 3);
            assert_eq!(key_set(cycle).len(), cycle.len(), "cycles must be simple");
            assert!(is_closed_walk(cycle, &edges));
        }
    }

    #[test]
    fn test_deterministic_order() {
        let mut edges = ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0)]);
        edges.push(Edge::new(Point::new(4.0, 0.0), Point::new(8.0, 0.0)));
        edges.push(Edge::new(Point::new(8.0, 0.0), Point::new(8.0, 3.0)));
        edges.push(Edge::new(Point::new(8.0, 3.0), Point::new(4.0, 3.0)));
        edges.push(Edge::new(Point::new(0.0, 0.0), Point::new(4.0, 3.0)));

        let first = compute_cycles(&[], &edges, Quantization::Exact);
        for _ in 0..10 {
            assert_eq!(compute_cycles(&[], &edges, Quantization::Exact), first);
        }
    }

    #[test]
    fn test_empty_graph() {
        assert!(compute_cycles(&[], &[], Quantization::Exact).is_empty());
    }
}
