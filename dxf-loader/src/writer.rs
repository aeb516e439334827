//! DXF writer for fixture drawings.
//!
//! Well-formed drawings go through the `dxf` crate as an R2010 file. The
//! crate stores coordinates as f64, so a drawing with unreadable coordinate
//! text is written as a bare ENTITIES section with the raw text kept
//! verbatim, which keeps malformed fixtures malformed.

use crate::LoaderResult;
use dxf::entities::{self as cad, EntityType, LwPolyline};
use dxf::enums::AcadVersion;
use dxf::LwPolylineVertex;
use estimator_core::{Drawing, Entity, Point, RawVertex};
use serde_json::Value;
use std::fmt::Write;
use tracing::debug;

pub fn write_dxf(drawing: &Drawing) -> LoaderResult<String> {
    match to_cad_drawing(drawing) {
        Some(cad_drawing) => {
            let mut buffer = Vec::new();
            cad_drawing.save(&mut buffer)?;
            Ok(String::from_utf8_lossy(&buffer).into_owned())
        }
        None => {
            debug!("Drawing has unreadable coordinates, writing raw group codes");
            Ok(write_raw(drawing))
        }
    }
}

/// `None` as soon as one LINE or LWPOLYLINE coordinate cannot be read.
fn to_cad_drawing(drawing: &Drawing) -> Option<dxf::Drawing> {
    let mut cad_drawing = dxf::Drawing::new();
    cad_drawing.header.version = AcadVersion::R2010;

    for entity in &drawing.entities {
        let specific = match entity {
            Entity::Line { start, end } => {
                let mut line = cad::Line::default();
                line.p1 = cad_point(start.as_ref()?.to_point()?);
                line.p2 = cad_point(end.as_ref()?.to_point()?);
                EntityType::Line(line)
            }
            Entity::LwPolyline { points, closed } => {
                let mut polyline = LwPolyline::default();
                for raw in points {
                    let point = raw.to_point()?;
                    polyline.vertices.push(LwPolylineVertex {
                        x: point.x,
                        y: point.y,
                        ..Default::default()
                    });
                }
                polyline.set_is_closed(*closed);
                EntityType::LwPolyline(polyline)
            }
            Entity::Other => continue,
        };

        cad_drawing.add_entity(cad::Entity {
            common: cad::EntityCommon::default(),
            specific,
        });
    }

    Some(cad_drawing)
}

fn cad_point(point: Point) -> dxf::Point {
    dxf::Point {
        x: point.x,
        y: point.y,
        z: 0.0,
    }
}

fn write_raw(drawing: &Drawing) -> String {
    let mut out = String::new();
    group(&mut out, 0, "SECTION");
    group(&mut out, 2, "ENTITIES");

    for entity in &drawing.entities {
        match entity {
            Entity::Line { start, end } => {
                group(&mut out, 0, "LINE");
                group(&mut out, 8, "0");
                write_vertex(&mut out, start.as_ref(), 10, 20);
                write_vertex(&mut out, end.as_ref(), 11, 21);
            }
            Entity::LwPolyline { points, closed } => {
                group(&mut out, 0, "LWPOLYLINE");
                group(&mut out, 8, "0");
                group(&mut out, 90, &points.len().to_string());
                group(&mut out, 70, if *closed { "1" } else { "0" });
                for point in points {
                    write_vertex(&mut out, Some(point), 10, 20);
                }
            }
            Entity::Other => {}
        }
    }

    group(&mut out, 0, "ENDSEC");
    group(&mut out, 0, "EOF");
    out
}

fn group(out: &mut String, code: i32, value: &str) {
    // Writing to a String cannot fail
    let _ = writeln!(out, "{code}\n{value}");
}

fn write_vertex(out: &mut String, vertex: Option<&RawVertex>, x_code: i32, y_code: i32) {
    let Some(RawVertex(value)) = vertex else {
        return;
    };
    let (x, y) = match value {
        Value::Array(items) => (items.first(), items.get(1)),
        Value::Object(map) => (map.get("x"), map.get("y")),
        _ => (None, None),
    };
    if let Some(x) = x.and_then(text) {
        group(out, x_code, &x);
    }
    if let Some(y) = y.and_then(text) {
        group(out, y_code, &y);
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
