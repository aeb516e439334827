use crate::area_aggregator::{aggregate_area, PolygonRejection, RoomPolygon};
use crate::drawing::Drawing;
use crate::error::{EstimateError, EstimateResult};
use crate::materials::{estimate_materials, MaterialEstimate, MaterialProfile};
use crate::primitive_extractor::extract_primitives;
use crate::Quantization;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Point identity used when merging vertices
    #[serde(default)]
    pub quantization: Quantization,
    /// Coefficient table for the material estimate
    #[serde(default)]
    pub profile: MaterialProfile,
    /// Largest drawing accepted, in entities
    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
    /// Largest drawing accepted, in LINE endpoints plus polyline vertices
    #[serde(default = "default_max_vertices")]
    pub max_vertices: usize,
}

fn default_max_entities() -> usize {
    10_000
}

fn default_max_vertices() -> usize {
    50_000
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            quantization: Quantization::default(),
            profile: MaterialProfile::default(),
            max_entities: default_max_entities(),
            max_vertices: default_max_vertices(),
        }
    }
}

/// Counters from every stage, for callers to surface as warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub entities_total: usize,
    pub entities_skipped: usize,
    pub dropped_vertices: usize,
    pub point_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub cycles_rejected: usize,
    pub rejections: Vec<PolygonRejection>,
    pub execution_time_ms: u128,
}

impl Diagnostics {
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.entities_skipped > 0 {
            warnings.push(format!(
                "Skipped {} entities due to errors in data formatting.",
                self.entities_skipped
            ));
        }
        if self.dropped_vertices > 0 {
            warnings.push(format!(
                "Dropped {} polyline vertices with malformed coordinates.",
                self.dropped_vertices
            ));
        }
        if self.cycles_rejected > 0 {
            warnings.push(format!(
                "Rejected {} cycles that did not form valid polygons.",
                self.cycles_rejected
            ));
        }
        warnings
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateReport {
    pub total_area: f64,
    pub materials: MaterialEstimate,
    pub rooms: Vec<RoomPolygon>,
    pub diagnostics: Diagnostics,
}

/// Run the full pipeline: extract, find cycles, sum areas, estimate materials.
///
/// Malformed entities and invalid polygons only show up in the diagnostics.
/// Errors are reserved for oversized drawings and invalid configuration.
pub fn estimate_drawing(drawing: &Drawing, config: &EstimatorConfig) -> EstimateResult<EstimateReport> {
    if drawing.len() > config.max_entities {
        warn!(
            "Drawing rejected: too many entities ({} > {})",
            drawing.len(),
            config.max_entities
        );
        return Err(EstimateError::TooManyEntities {
            count: drawing.len(),
            max: config.max_entities,
        });
    }
    let vertex_count = drawing.vertex_count();
    if vertex_count > config.max_vertices {
        warn!(
            "Drawing rejected: too many vertices ({} > {})",
            vertex_count, config.max_vertices
        );
        return Err(EstimateError::TooManyVertices {
            count: vertex_count,
            max: config.max_vertices,
        });
    }
    config.profile.validate()?;

    let start = Instant::now();

    let extraction = extract_primitives(drawing, config.quantization);
    let cycles = extraction.cycles();
    let summary = aggregate_area(&cycles);
    let materials = estimate_materials(summary.total_area, &config.profile)?;

    let diagnostics = Diagnostics {
        entities_total: drawing.len(),
        entities_skipped: extraction.error_count,
        dropped_vertices: extraction.dropped_vertices,
        point_count: extraction.points.len(),
        edge_count: extraction.edges.len(),
        cycle_count: cycles.len(),
        cycles_rejected: summary.failed_cycle_count(),
        rejections: summary.rejected,
        execution_time_ms: start.elapsed().as_millis(),
    };

    for warning in diagnostics.warnings() {
        warn!("{}", warning);
    }
    info!(
        "Estimated {} rooms with total area {:.3} in {}ms",
        summary.polygons.len(),
        summary.total_area,
        diagnostics.execution_time_ms
    );

    Ok(EstimateReport {
        total_area: summary.total_area,
        materials,
        rooms: summary.polygons,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Entity, Point, RawVertex};
    use approx::assert_relative_eq;
    use serde_json::json;

    fn rectangle(x: f64, y: f64, w: f64, h: f64) -> Entity {
        Entity::polyline(
            &[
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ],
            true,
        )
    }

    #[test]
    fn test_single_rectangle_report() {
        let drawing = Drawing::new(vec![rectangle(0.0, 0.0, 4.0, 3.0)]);

        let report = estimate_drawing(&drawing, &EstimatorConfig::default()).unwrap();

        assert_relative_eq!(report.total_area, 12.0);
        assert_eq!(report.rooms.len(), 1);
        assert_eq!(report.diagnostics.cycle_count, 1);
        assert_relative_eq!(report.materials.get("Bricks").unwrap(), 720.0);
        assert!(report.diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_diagnostics_reported() {
        let drawing = Drawing::new(vec![
            Entity::Line {
                start: Some(RawVertex(json!(["x", "y"]))),
                end: Some(RawVertex(json!([1, 1]))),
            },
            rectangle(0.0, 0.0, 2.0, 3.0),
            Entity::Other,
        ]);

        let report = estimate_drawing(&drawing, &EstimatorConfig::default()).unwrap();

        assert_relative_eq!(report.total_area, 6.0);
        assert_eq!(report.diagnostics.entities_total, 3);
        assert_eq!(report.diagnostics.entities_skipped, 1);
        assert_eq!(
            report.diagnostics.warnings(),
            vec!["Skipped 1 entities due to errors in data formatting.".to_string()]
        );
    }

    #[test]
    fn test_too_many_entities() {
        let drawing = Drawing::new(vec![rectangle(0.0, 0.0, 1.0, 1.0); 3]);
        let config = EstimatorConfig {
            max_entities: 2,
            ..EstimatorConfig::default()
        };

        assert_eq!(
            estimate_drawing(&drawing, &config).unwrap_err(),
            EstimateError::TooManyEntities { count: 3, max: 2 }
        );
    }

    #[test]
    fn test_too_many_vertices() {
        let ring: Vec<Point> = (0..64)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 64.0;
                Point::new(angle.cos(), angle.sin())
            })
            .collect();
        let drawing = Drawing::new(vec![
            Entity::polyline(&ring, true),
            Entity::line(Point::new(5.0, 5.0), Point::new(6.0, 5.0)),
        ]);
        let config = EstimatorConfig {
            max_vertices: 65,
            ..EstimatorConfig::default()
        };

        assert_eq!(
            estimate_drawing(&drawing, &config).unwrap_err(),
            EstimateError::TooManyVertices { count: 66, max: 65 }
        );

        let config = EstimatorConfig {
            max_vertices: 66,
            ..EstimatorConfig::default()
        };
        assert_eq!(estimate_drawing(&drawing, &config).unwrap().rooms.len(), 1);
    }

    #[test]
    fn test_invalid_profile_fails_fast() {
        let config = EstimatorConfig {
            profile: MaterialProfile { materials: vec![] },
            ..EstimatorConfig::default()
        };

        assert!(matches!(
            estimate_drawing(&Drawing::default(), &config),
            Err(EstimateError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_quantization_joins_rounded_corners() {
        // second room's corner is off by CAD export noise
        let drawing = Drawing::new(vec![
            Entity::line(Point::new(0.0, 0.0), Point::new(5.0, 0.0)),
            Entity::line(Point::new(5.0, 0.0), Point::new(5.0, 2.0)),
            Entity::line(Point::new(5.0, 2.0), Point::new(0.0, 2.0)),
            Entity::line(Point::new(0.0, 2.0), Point::new(0.0000001, 0.0)),
        ]);

        let exact = estimate_drawing(&drawing, &EstimatorConfig::default()).unwrap();
        assert_eq!(exact.total_area, 0.0);

        let config = EstimatorConfig {
            quantization: Quantization::Decimals(3),
            ..EstimatorConfig::default()
        };
        let quantized = estimate_drawing(&drawing, &config).unwrap();
        assert_relative_eq!(quantized.total_area, 10.0);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: EstimatorConfig = serde_json::from_str(r#"{"quantization": {"decimals": 2}}"#).unwrap();

        assert_eq!(config.quantization, Quantization::Decimals(2));
        assert_eq!(config.max_entities, 10_000);
        assert_eq!(config.max_vertices, 50_000);
        assert_eq!(config.profile, MaterialProfile::default());
    }
}
