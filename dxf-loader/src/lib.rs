//! Loads drawings for the estimator from ASCII DXF or JSON files.

use estimator_core::Drawing;
use std::fs;
use std::path::Path;
use thiserror::Error;

mod reader;
mod writer;

pub use reader::read_dxf_str;
pub use writer::write_dxf;

/// Error types for the drawing loader
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structural problem in the DXF group-code stream
    #[error("malformed DXF at line {line}: {message}")]
    MalformedDxf { line: usize, message: String },

    #[error("unsupported drawing format: {0}")]
    UnsupportedFormat(String),

    #[error("DXF write error: {0}")]
    Dxf(#[from] dxf::DxfError),
}

pub type LoaderResult<T> = Result<T, LoaderError>;

/// Input formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingFormat {
    Dxf,
    Json,
}

impl DrawingFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("dxf") => Ok(DrawingFormat::Dxf),
            Some("json") => Ok(DrawingFormat::Json),
            _ => Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a drawing from its JSON form (`{"entities": [...]}`).
pub fn read_drawing_json(json: &str) -> LoaderResult<Drawing> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_drawing(content: &str, format: DrawingFormat) -> LoaderResult<Drawing> {
    match format {
        DrawingFormat::Dxf => read_dxf_str(content),
        DrawingFormat::Json => read_drawing_json(content),
    }
}

/// Read a `.dxf` or `.json` drawing from disk.
pub fn load_drawing(path: &Path) -> LoaderResult<Drawing> {
    let format = DrawingFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    parse_drawing(&content, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimator_core::{Entity, Point};
    use std::path::PathBuf;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DrawingFormat::from_path(&PathBuf::from("plan.DXF")).unwrap(),
            DrawingFormat::Dxf
        );
        assert_eq!(
            DrawingFormat::from_path(&PathBuf::from("plan.json")).unwrap(),
            DrawingFormat::Json
        );
        assert!(matches!(
            DrawingFormat::from_path(&PathBuf::from("plan.dwg")),
            Err(LoaderError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_dxf_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.dxf");
        let drawing = Drawing::new(vec![Entity::polyline(
            &[
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(4.0, 3.0),
                Point::new(0.0, 3.0),
            ],
            true,
        )]);
        fs::write(&path, write_dxf(&drawing).unwrap()).unwrap();

        let loaded = load_drawing(&path).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entities[0].dxf_type(), "LWPOLYLINE");
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.json");
        fs::write(
            &path,
            r#"{"entities": [{"type": "LINE", "start": [0, 0], "end": [1, 0]}]}"#,
        )
        .unwrap();

        let loaded = load_drawing(&path).unwrap();

        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let result = load_drawing(&PathBuf::from("/nonexistent/plan.dxf"));
        assert!(matches!(result, Err(LoaderError::Io(_))));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(read_drawing_json("{"), Err(LoaderError::Json(_))));
    }
}
