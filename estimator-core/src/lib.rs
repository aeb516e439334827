//! Geometry core for estimating construction materials from CAD drawings.
//!
//! The pipeline runs in four stages:
//! 1. [`extract_primitives`] turns drawing entities into points and edges
//! 2. [`compute_cycles`] builds a connectivity graph and recovers its cycle basis
//! 3. [`aggregate_area`] turns every cycle into a polygon and sums the valid areas
//! 4. [`estimate_materials`] applies per-area coefficients to the total
//!
//! [`estimate_drawing`] chains all four and collects the diagnostics.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

pub mod area_aggregator;
pub mod cycle_basis;
pub mod drawing;
pub mod error;
pub mod graph_builder;
pub mod materials;
pub mod pipeline;
pub mod primitive_extractor;
pub mod wall_materials;

pub use area_aggregator::{aggregate_area, AreaSummary, PolygonRejection, RejectionReason, RoomPolygon};
pub use cycle_basis::compute_cycles;
pub use drawing::{Drawing, Entity, RawVertex};
pub use error::{EstimateError, EstimateResult};
pub use materials::{
    estimate_materials, estimate_materials_default, MaterialCoefficient, MaterialEstimate,
    MaterialProfile, MaterialQuantity,
};
pub use pipeline::{estimate_drawing, Diagnostics, EstimateReport, EstimatorConfig};
pub use primitive_extractor::{extract_primitives, Extraction};
pub use wall_materials::{estimate_wall_materials, WallEstimate, WallSpec};

/// Largest decimal precision honoured by [`Quantization::Decimals`].
/// An f64 carries at most ~15 significant decimal digits.
pub const MAX_DECIMALS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn key(&self, quantization: Quantization) -> PointKey {
        PointKey::new(self, quantization)
    }
}

/// How point coordinates are compared when deduplicating vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Coordinates must match exactly (after folding `-0.0` into `0.0`).
    #[default]
    Exact,
    /// Coordinates are rounded to this many decimal places first.
    Decimals(u32),
}

impl Quantization {
    pub fn from_precision(precision: Option<u32>) -> Self {
        precision.map_or(Quantization::Exact, Quantization::Decimals)
    }

    fn normalize(self, value: f64) -> f64 {
        let value = match self {
            Quantization::Exact => value,
            Quantization::Decimals(decimals) => {
                let scale = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
                let scaled = value * scale;
                // Magnitudes this large have no fractional digits left to round
                if scaled.is_finite() {
                    scaled.round() / scale
                } else {
                    value
                }
            }
        };
        // -0.0 and 0.0 must share a key
        if value == 0.0 {
            0.0
        } else {
            value
        }
    }
}

/// Hashable identity of a [`Point`] under a given [`Quantization`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey {
    x: OrderedFloat<f64>,
    y: OrderedFloat<f64>,
}

impl PointKey {
    pub fn new(point: &Point, quantization: Quantization) -> Self {
        PointKey {
            x: OrderedFloat(quantization.normalize(point.x)),
            y: OrderedFloat(quantization.normalize(point.y)),
        }
    }
}

impl From<&Point> for PointKey {
    fn from(point: &Point) -> Self {
        PointKey::new(point, Quantization::Exact)
    }
}

/// Undirected segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: Point,
    pub b: Point,
}

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Both endpoints collapse to the same vertex.
    pub fn is_degenerate(&self, quantization: Quantization) -> bool {
        self.a.key(quantization) == self.b.key(quantization)
    }

    pub fn length(&self) -> f64 {
        let dx = self.b.x - self.a.x;
        let dy = self.b.y - self.a.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Closed loop of points taken from the cycle basis. The first point is not repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub points: Vec<Point>,
}

impl Cycle {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
