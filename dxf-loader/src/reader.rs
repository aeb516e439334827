//! ASCII DXF reader.
//!
//! A DXF file is a flat list of `(group code, value)` line pairs. Only the
//! ENTITIES section is read. Coordinate values are kept as raw text so that
//! non-numeric data is reported by the extractor as a skipped entity instead
//! of failing the whole file.

use crate::{LoaderError, LoaderResult};
use estimator_core::{Drawing, Entity, RawVertex};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
struct Group<'a> {
    /// 1-based line number of the group code
    line: usize,
    code: i32,
    value: &'a str,
}

/// Parse ASCII DXF text into a [`Drawing`].
///
/// LINE and LWPOLYLINE entities keep their coordinates, every other entity
/// type becomes [`Entity::Other`].
pub fn read_dxf_str(content: &str) -> LoaderResult<Drawing> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let groups = parse_groups(content)?;

    let mut entities = Vec::new();
    let mut in_entities = false;
    let mut found_entities = false;
    let mut other_count = 0usize;
    let mut i = 0;

    while i < groups.len() {
        let group = groups[i];

        if group.code == 0 && group.value == "SECTION" {
            let is_entities = groups
                .get(i + 1)
                .is_some_and(|next| next.code == 2 && next.value == "ENTITIES");
            if is_entities {
                in_entities = true;
                found_entities = true;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if group.code == 0 && group.value == "ENDSEC" {
            in_entities = false;
            i += 1;
            continue;
        }

        if in_entities && group.code == 0 {
            let body_start = i + 1;
            let body_end = groups[body_start..]
                .iter()
                .position(|g| g.code == 0)
                .map_or(groups.len(), |offset| body_start + offset);

            let entity = build_entity(group, &groups[body_start..body_end]);
            if matches!(entity, Entity::Other) {
                debug!("Ignoring {} entity at line {}", group.value, group.line);
                other_count += 1;
            }
            entities.push(entity);
            i = body_end;
            continue;
        }

        i += 1;
    }

    if !found_entities {
        warn!("DXF content has no ENTITIES section");
    }
    info!(
        "Read {} entities from DXF ({} not used for geometry)",
        entities.len(),
        other_count
    );

    Ok(Drawing::new(entities))
}

fn parse_groups(content: &str) -> LoaderResult<Vec<Group<'_>>> {
    let lines: Vec<&str> = content.lines().collect();

    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    if end % 2 != 0 {
        return Err(LoaderError::MalformedDxf {
            line: end,
            message: "group code without a value".to_string(),
        });
    }

    lines[..end]
        .chunks(2)
        .enumerate()
        .map(|(index, pair)| {
            let line = index * 2 + 1;
            let code = pair[0].trim().parse::<i32>().map_err(|_| LoaderError::MalformedDxf {
                line,
                message: format!("expected an integer group code, found '{}'", pair[0].trim()),
            })?;
            Ok(Group {
                line,
                code,
                value: pair[1].trim(),
            })
        })
        .collect()
}

fn build_entity(header: Group<'_>, body: &[Group<'_>]) -> Entity {
    match header.value {
        "LINE" => Entity::Line {
            start: vertex(body, 10, 20),
            end: vertex(body, 11, 21),
        },
        "LWPOLYLINE" => build_polyline(header, body),
        _ => Entity::Other,
    }
}

/// First value of each coordinate code, `None` when both are absent.
fn vertex(body: &[Group<'_>], x_code: i32, y_code: i32) -> Option<RawVertex> {
    let find = |code: i32| body.iter().find(|g| g.code == code).map(|g| g.value);

    match (find(x_code), find(y_code)) {
        (None, None) => None,
        (x, y) => Some(RawVertex(Value::Array(vec![text_value(x), text_value(y)]))),
    }
}

fn text_value(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::String(v.to_string()))
}

fn build_polyline(header: Group<'_>, body: &[Group<'_>]) -> Entity {
    let mut vertices: Vec<Vec<Value>> = Vec::new();
    let mut flags = 0i32;

    for group in body {
        match group.code {
            10 => vertices.push(vec![Value::String(group.value.to_string())]),
            20 => match vertices.last_mut() {
                Some(vertex) if vertex.len() == 1 => vertex.push(Value::String(group.value.to_string())),
                // y without a preceding x
                _ => vertices.push(vec![Value::Null, Value::String(group.value.to_string())]),
            },
            70 => {
                flags = group.value.parse().unwrap_or_else(|_| {
                    debug!(
                        "Unreadable LWPOLYLINE flags '{}' at line {}",
                        group.value, group.line
                    );
                    0
                })
            }
            _ => {}
        }
    }

    if vertices.is_empty() {
        debug!("LWPOLYLINE at line {} has no vertices", header.line);
    }

    Entity::LwPolyline {
        points: vertices.into_iter().map(|v| RawVertex(Value::Array(v))).collect(),
        closed: flags & 1 == 1,
    }
}
