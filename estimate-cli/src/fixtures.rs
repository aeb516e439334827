//! Sample drawings for trying the CLI and the HTTP API by hand.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use estimator_core::{Drawing, Entity, Point, RawVertex};

/// Write every sample as `<name>.json`, `<name>.dxf` and an
/// `<name>_request.json` body for `POST /estimate`.
pub fn write_fixtures(out: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let mut written = Vec::new();
    for (name, drawing) in samples() {
        let json_path = out.join(format!("{}.json", name));
        fs::write(&json_path, serde_json::to_string_pretty(&drawing)?)?;
        written.push(json_path);

        let dxf_path = out.join(format!("{}.dxf", name));
        fs::write(&dxf_path, dxf_loader::write_dxf(&drawing)?)?;
        written.push(dxf_path);

        let request = serde_json::json!({ "drawing": drawing });
        let request_path = out.join(format!("{}_request.json", name));
        fs::write(&request_path, serde_json::to_string_pretty(&request)?)?;
        written.push(request_path);
    }

    Ok(written)
}

pub fn samples() -> Vec<(&'static str, Drawing)> {
    vec![
        ("single_rectangle", single_rectangle()),
        ("two_rooms", two_rooms()),
        ("open_lines", open_lines()),
        ("malformed_entity", malformed_entity()),
    ]
}

fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Entity {
    Entity::polyline(
        &[
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ],
        true,
    )
}

/// 4 x 3 room, area 12
fn single_rectangle() -> Drawing {
    Drawing::new(vec![rectangle(0.0, 0.0, 4.0, 3.0)])
}

/// Two disjoint rooms drawn with LINE walls, total area 12 + 10
fn two_rooms() -> Drawing {
    let corners = |x: f64, y: f64, w: f64, h: f64| {
        [
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    };

    let mut entities = Vec::new();
    for room in [corners(0.0, 0.0, 4.0, 3.0), corners(10.0, 0.0, 2.0, 5.0)] {
        for i in 0..room.len() {
            entities.push(Entity::line(room[i], room[(i + 1) % room.len()]));
        }
    }
    Drawing::new(entities)
}

/// Walls that never close a room
fn open_lines() -> Drawing {
    Drawing::new(vec![
        Entity::line(Point::new(0.0, 0.0), Point::new(5.0, 0.0)),
        Entity::line(Point::new(5.0, 0.0), Point::new(5.0, 5.0)),
        Entity::line(Point::new(8.0, 8.0), Point::new(9.0, 9.0)),
    ])
}

/// The 4 x 3 room plus a LINE whose start x is not a number
fn malformed_entity() -> Drawing {
    Drawing::new(vec![
        rectangle(0.0, 0.0, 4.0, 3.0),
        Entity::Line {
            start: Some(RawVertex::from_text("abc", "0")),
            end: Some(RawVertex::from_text("1", "1")),
        },
    ])
}
