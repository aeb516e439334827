use crate::{Cycle, Point};
use geo::sweep::{Cross, Intersections, LineOrPoint};
use geo::{Area, BoundingRect, Coord, Line, LineIntersection, LineString, Polygon as GeoPolygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// A cycle that formed a valid, positive-area polygon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPolygon {
    /// Index of the source cycle
    pub id: usize,
    pub area: f64,
    pub bounding_box: [f64; 4], // [min_x, min_y, max_x, max_y]
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    TooFewVertices,
    NonFinite,
    SelfIntersecting,
    ZeroArea,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::TooFewVertices => write!(f, "fewer than 3 distinct vertices"),
            RejectionReason::NonFinite => write!(f, "non-finite coordinates"),
            RejectionReason::SelfIntersecting => write!(f, "boundary intersects itself"),
            RejectionReason::ZeroArea => write!(f, "encloses no area"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolygonRejection {
    pub cycle_index: usize,
    pub reason: RejectionReason,
}

/// Total enclosed area plus the per-cycle outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaSummary {
    pub total_area: f64,
    pub polygons: Vec<RoomPolygon>,
    pub rejected: Vec<PolygonRejection>,
}

impl AreaSummary {
    pub fn failed_cycle_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Sum the areas of all cycles that form simple polygons with positive area.
///
/// Rejected cycles contribute nothing and are listed in the summary.
/// Overlapping or nested polygons are not deducted from each other.
pub fn aggregate_area(cycles: &[Cycle]) -> AreaSummary {
    let mut summary = AreaSummary::default();

    for (index, cycle) in cycles.iter().enumerate() {
        match build_polygon(index, &cycle.points) {
            Ok(polygon) => {
                summary.total_area += polygon.area;
                summary.polygons.push(polygon);
            }
            Err(reason) => {
                debug!("Rejected cycle {} ({} points): {}", index, cycle.len(), reason);
                summary.rejected.push(PolygonRejection {
                    cycle_index: index,
                    reason,
                });
            }
        }
    }

    if !summary.rejected.is_empty() {
        warn!(
            "Rejected {} of {} cycles that did not form valid polygons",
            summary.rejected.len(),
            cycles.len()
        );
    }
    info!(
        "Total enclosed area {:.3} from {} polygons",
        summary.total_area,
        summary.polygons.len()
    );

    summary
}

fn build_polygon(id: usize, points: &[Point]) -> Result<RoomPolygon, RejectionReason> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(RejectionReason::NonFinite);
    }

    let mut coords: Vec<Coord> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    coords.dedup();
    while coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return Err(RejectionReason::TooFewVertices);
    }

    if !is_simple(&coords) {
        return Err(RejectionReason::SelfIntersecting);
    }

    // LineString::from + Polygon::new closes the ring
    let polygon = GeoPolygon::new(LineString::from(coords), vec![]);
    let area = polygon.unsigned_area();
    if area.is_nan() || area <= 0.0 {
        return Err(RejectionReason::ZeroArea);
    }

    let bounding_box = polygon
        .bounding_rect()
        .map(|rect| [rect.min().x, rect.min().y, rect.max().x, rect.max().y])
        .ok_or(RejectionReason::TooFewVertices)?;

    Ok(RoomPolygon {
        id,
        area,
        bounding_box,
        points: points.to_vec(),
    })
}

/// Ring edge tagged with its position, so crossings can be told apart from
/// the shared vertex of neighbouring edges.
#[derive(Debug, Clone, Copy)]
struct RingSegment {
    index: usize,
    line: Line<f64>,
}

impl Cross for RingSegment {
    type Scalar = f64;

    fn line(&self) -> LineOrPoint<f64> {
        self.line.into()
    }
}

/// True when no two ring edges meet except adjacent edges at their shared vertex.
///
/// Uses a Bentley-Ottmann sweep, so the cost grows with the number of edges
/// plus the number of contacts rather than with every pair of edges.
fn is_simple(ring: &[Coord]) -> bool {
    let n = ring.len();
    let segments = (0..n).map(|index| RingSegment {
        index,
        line: Line::new(ring[index], ring[(index + 1) % n]),
    });

    Intersections::from_iter(segments).all(|(a, b, intersection)| {
        let (i, j) = (a.index.min(b.index), a.index.max(b.index));
        let adjacent = j == i + 1 || (i == 0 && j == n - 1);
        // Adjacent edges always touch at their shared vertex
        adjacent && matches!(intersection, LineIntersection::SinglePoint { .. })
    })
}
