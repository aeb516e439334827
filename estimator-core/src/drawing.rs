//! Parsed drawing handed to the extractor.
//!
//! Loaders (DXF, JSON) produce a [`Drawing`]. Coordinates are kept raw so
//! malformed values reach the extractor, which decides whether an entity is
//! usable.

use crate::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Drawing {
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Drawing {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Raw vertices across all entities: two per LINE plus every polyline vertex.
    pub fn vertex_count(&self) -> usize {
        self.entities.iter().map(Entity::vertex_count).sum()
    }
}

/// A drawing entity, tagged by its DXF type name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    #[serde(rename = "LINE")]
    Line {
        #[serde(default)]
        start: Option<RawVertex>,
        #[serde(default)]
        end: Option<RawVertex>,
    },
    #[serde(rename = "LWPOLYLINE")]
    LwPolyline {
        #[serde(default)]
        points: Vec<RawVertex>,
        #[serde(default)]
        closed: bool,
    },
    /// Circles, arcs, text and anything else. Never contributes geometry.
    #[serde(other)]
    Other,
}

impl Entity {
    pub fn line(start: Point, end: Point) -> Self {
        Entity::Line {
            start: Some(RawVertex::from_point(start)),
            end: Some(RawVertex::from_point(end)),
        }
    }

    pub fn polyline(points: &[Point], closed: bool) -> Self {
        Entity::LwPolyline {
            points: points.iter().copied().map(RawVertex::from_point).collect(),
            closed,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Entity::Line { .. } => 2,
            Entity::LwPolyline { points, .. } => points.len(),
            Entity::Other => 0,
        }
    }

    pub fn dxf_type(&self) -> &'static str {
        match self {
            Entity::Line { .. } => "LINE",
            Entity::LwPolyline { .. } => "LWPOLYLINE",
            Entity::Other => "OTHER",
        }
    }
}

/// Raw coordinate data of one vertex.
///
/// Usually an array `[x, y, ...]`; an object `{"x": .., "y": ..}` is also
/// accepted. Components may be numbers or numeric strings. Anything past the
/// first two components (elevation, bulge, widths) is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawVertex(pub Value);

impl RawVertex {
    pub fn from_point(point: Point) -> Self {
        RawVertex(Value::Array(vec![Value::from(point.x), Value::from(point.y)]))
    }

    /// Vertex from unparsed text, e.g. DXF group values.
    pub fn from_text(x: impl Into<String>, y: impl Into<String>) -> Self {
        RawVertex(Value::Array(vec![
            Value::String(x.into()),
            Value::String(y.into()),
        ]))
    }

    /// Convert to a [`Point`], or `None` if the data is missing, non-numeric
    /// or non-finite.
    pub fn to_point(&self) -> Option<Point> {
        let (x, y) = match &self.0 {
            Value::Array(items) if items.len() >= 2 => (&items[0], &items[1]),
            Value::Object(map) => (map.get("x")?, map.get("y")?),
            _ => return None,
        };
        let point = Point::new(numeric(x)?, numeric(y)?);
        point.is_finite().then_some(point)
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_and_text_coordinates() {
        assert_eq!(
            RawVertex(json!([1.5, 2])).to_point(),
            Some(Point::new(1.5, 2.0))
        );
        assert_eq!(
            RawVertex::from_text(" 3.25", "-4").to_point(),
            Some(Point::new(3.25, -4.0))
        );
        assert_eq!(
            RawVertex(json!({"x": 1, "y": "2"})).to_point(),
            Some(Point::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_extra_components_ignored() {
        // x, y, start width, end width, bulge
        let raw = RawVertex(json!([4.0, 5.0, 0.0, 0.0, 0.5]));
        assert_eq!(raw.to_point(), Some(Point::new(4.0, 5.0)));
    }

    #[test]
    fn test_malformed_coordinates() {
        assert_eq!(RawVertex(json!(["abc", 1.0])).to_point(), None);
        assert_eq!(RawVertex(json!([1.0])).to_point(), None);
        assert_eq!(RawVertex(json!(null)).to_point(), None);
        assert_eq!(RawVertex(json!([true, 1.0])).to_point(), None);
        assert_eq!(RawVertex::from_text("inf", "0").to_point(), None);
        assert_eq!(RawVertex::from_text("nan", "0").to_point(), None);
    }

    #[test]
    fn test_entity_deserialization() {
        let drawing: Drawing = serde_json::from_value(json!({
            "entities": [
                {"type": "LINE", "start": [0, 0], "end": [1, 0]},
                {"type": "LWPOLYLINE", "points": [[0, 0], [1, 1]], "closed": true},
                {"type": "CIRCLE", "center": [0, 0], "radius": 2},
                {"type": "LINE", "start": "garbage"}
            ]
        }))
        .unwrap();

        assert_eq!(drawing.len(), 4);
        assert_eq!(drawing.vertex_count(), 2 + 2 + 0 + 2);
        assert_eq!(drawing.entities[0].dxf_type(), "LINE");
        assert_eq!(drawing.entities[1].dxf_type(), "LWPOLYLINE");
        assert!(matches!(drawing.entities[2], Entity::Other));
        match &drawing.entities[3] {
            Entity::Line { start, end } => {
                assert_eq!(start.as_ref().and_then(RawVertex::to_point), None);
                assert!(end.is_none());
            }
            other => panic!("unexpected entity {other:?}"),
        }
    }
}
