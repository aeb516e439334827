//! Materials for a run of brick wall given its total length.
//!
//! Used when only a wall length is known (for example measured off a raster
//! blueprint) rather than an enclosed area.

use crate::error::{EstimateError, EstimateResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    /// Wall height in metres
    #[serde(default = "default_height")]
    pub height: f64,
    /// Face dimensions of one brick in metres
    #[serde(default = "default_brick_length")]
    pub brick_length: f64,
    #[serde(default = "default_brick_height")]
    pub brick_height: f64,
    #[serde(default = "default_cement_bags_per_area")]
    pub cement_bags_per_area: f64,
    /// Sand volume per bag of cement (1:4 mix)
    #[serde(default = "default_sand_to_cement_ratio")]
    pub sand_to_cement_ratio: f64,
}

fn default_height() -> f64 {
    3.0
}

fn default_brick_length() -> f64 {
    0.19
}

fn default_brick_height() -> f64 {
    0.09
}

fn default_cement_bags_per_area() -> f64 {
    0.2
}

fn default_sand_to_cement_ratio() -> f64 {
    4.0
}

impl Default for WallSpec {
    fn default() -> Self {
        Self {
            height: default_height(),
            brick_length: default_brick_length(),
            brick_height: default_brick_height(),
            cement_bags_per_area: default_cement_bags_per_area(),
            sand_to_cement_ratio: default_sand_to_cement_ratio(),
        }
    }
}

impl WallSpec {
    pub fn with_height(height: f64) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EstimateResult<()> {
        let positive = [
            ("height", self.height),
            ("brick_length", self.brick_length),
            ("brick_height", self.brick_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EstimateError::invalid_wall_spec(format!(
                    "{field} must be finite and positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("cement_bags_per_area", self.cement_bags_per_area),
            ("sand_to_cement_ratio", self.sand_to_cement_ratio),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EstimateError::invalid_wall_spec(format!(
                    "{field} must be finite and non-negative, got {value}"
                )));
            }
        }

        let face_area = self.brick_face_area();
        if !face_area.is_finite() || face_area <= 0.0 {
            return Err(EstimateError::invalid_wall_spec(format!(
                "brick face area must be finite and positive, got {face_area}"
            )));
        }

        Ok(())
    }

    fn brick_face_area(&self) -> f64 {
        self.brick_length * self.brick_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallEstimate {
    pub wall_length: f64,
    pub wall_area: f64,
    pub bricks: f64,
    pub cement_bags: f64,
    pub sand_volume: f64,
}

/// Bricks, cement and sand for `wall_length` metres of wall built to `spec`.
pub fn estimate_wall_materials(wall_length: f64, spec: &WallSpec) -> EstimateResult<WallEstimate> {
    if !wall_length.is_finite() || wall_length < 0.0 {
        return Err(EstimateError::InvalidWallLength(wall_length));
    }
    spec.validate()?;

    let wall_area = wall_length * spec.height;
    let cement_bags = wall_area * spec.cement_bags_per_area;
    let estimate = WallEstimate {
        wall_length,
        wall_area,
        bricks: wall_area / spec.brick_face_area(),
        cement_bags,
        sand_volume: cement_bags * spec.sand_to_cement_ratio,
    };

    if !(estimate.wall_area.is_finite() && estimate.bricks.is_finite() && estimate.sand_volume.is_finite()) {
        return Err(EstimateError::InvalidWallLength(wall_length));
    }

    Ok(estimate)
}
