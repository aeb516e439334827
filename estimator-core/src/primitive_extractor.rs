use crate::drawing::{Drawing, Entity, RawVertex};
use crate::cycle_basis::compute_cycles;
use crate::{Cycle, Edge, Point, PointKey, Quantization};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Points and edges pulled out of a drawing, plus what had to be skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    /// Distinct points in discovery order
    pub points: Vec<Point>,
    /// Edges in discovery order
    pub edges: Vec<Edge>,
    /// Entities skipped because their coordinates could not be read
    pub error_count: usize,
    /// Polyline vertices dropped from otherwise usable polylines
    pub dropped_vertices: usize,
    /// Point identity the points were deduplicated with
    #[serde(default)]
    pub quantization: Quantization,
}

impl Extraction {
    /// Cycle basis of the extracted edges, matching vertices the same way
    /// the points were deduplicated.
    pub fn cycles(&self) -> Vec<Cycle> {
        compute_cycles(&self.points, &self.edges, self.quantization)
    }

    fn add_point(&mut self, seen: &mut HashSet<PointKey>, point: Point, quantization: Quantization) {
        if seen.insert(point.key(quantization)) {
            self.points.push(point);
        }
    }
}

/// Extract points and edges from LINE and LWPOLYLINE entities.
///
/// A bad entity never aborts the pass: it is counted in `error_count` and
/// skipped. Polylines are always closed back to their first vertex, whatever
/// their closed flag says.
pub fn extract_primitives(drawing: &Drawing, quantization: Quantization) -> Extraction {
    let mut extraction = Extraction {
        quantization,
        ..Extraction::default()
    };
    let mut seen = HashSet::new();

    for (index, entity) in drawing.entities.iter().enumerate() {
        match entity {
            Entity::Line { start, end } => {
                let start = start.as_ref().and_then(RawVertex::to_point);
                let end = end.as_ref().and_then(RawVertex::to_point);

                match (start, end) {
                    (Some(start), Some(end)) => {
                        extraction.edges.push(Edge::new(start, end));
                        extraction.add_point(&mut seen, start, quantization);
                        extraction.add_point(&mut seen, end, quantization);
                    }
                    _ => {
                        debug!("Skipping LINE entity {}: endpoint is missing or not numeric", index);
                        extraction.error_count += 1;
                    }
                }
            }
            Entity::LwPolyline { points, .. } => {
                if points.is_empty() {
                    debug!("Ignoring LWPOLYLINE entity {} without vertices", index);
                    continue;
                }

                let vertices: Vec<Point> = points.iter().filter_map(RawVertex::to_point).collect();

                if vertices.is_empty() {
                    debug!(
                        "Skipping LWPOLYLINE entity {}: none of its {} vertices are numeric",
                        index,
                        points.len()
                    );
                    extraction.error_count += 1;
                    continue;
                }

                let dropped = points.len() - vertices.len();
                if dropped > 0 {
                    debug!("Dropped {} malformed vertices from LWPOLYLINE entity {}", dropped, index);
                    extraction.dropped_vertices += dropped;
                }

                for (i, &vertex) in vertices.iter().enumerate() {
                    let next = vertices[(i + 1) % vertices.len()];
                    extraction.edges.push(Edge::new(vertex, next));
                    extraction.add_point(&mut seen, vertex, quantization);
                }
            }
            Entity::Other => {}
        }
    }

    info!(
        "Extracted {} points and {} edges from {} entities ({} skipped)",
        extraction.points.len(),
        extraction.edges.len(),
        drawing.len(),
        extraction.error_count
    );

    extraction
}
