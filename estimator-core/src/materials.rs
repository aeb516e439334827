//! Area-based material quantities.
//!
//! Each material is `total_area × coefficient`. The coefficient table is a
//! [`MaterialProfile`] so projects can supply their own without code changes;
//! [`MaterialProfile::default`] is the built-in basement table.

use crate::error::{EstimateError, EstimateResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCoefficient {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    /// Quantity per unit of area
    pub coefficient: f64,
    /// Decimal places used when presenting the quantity
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,
}

fn default_category() -> String {
    "General".to_string()
}

fn default_display_decimals() -> u32 {
    2
}

impl MaterialCoefficient {
    pub fn new(name: &str, category: &str, unit: &str, coefficient: f64, display_decimals: u32) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            unit: unit.to_string(),
            coefficient,
            display_decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    pub materials: Vec<MaterialCoefficient>,
}

impl Default for MaterialProfile {
    fn default() -> Self {
        Self {
            materials: vec![
                MaterialCoefficient::new("Bricks", "Walls", "", 60.0, 0),
                MaterialCoefficient::new("Cement", "Walls", "bags", 0.2, 2),
                MaterialCoefficient::new("Sand", "Walls", "cubic units", 0.5, 2),
                MaterialCoefficient::new("Rebars", "Walls", "units", 2.0, 2),
                MaterialCoefficient::new("Tiles", "Flooring", "", 1.1, 0),
                MaterialCoefficient::new("Adhesive", "Flooring", "kg", 4.0, 2),
                MaterialCoefficient::new("Paint", "Painting", "liters", 0.1, 2),
                MaterialCoefficient::new("Wall cladding", "Painting", "panels", 0.67, 2),
                MaterialCoefficient::new("Putty", "Painting", "kg", 0.1, 2),
                MaterialCoefficient::new("Sealant", "Painting", "liters", 0.05, 2),
            ],
        }
    }
}

impl MaterialProfile {
    /// Load a profile from JSON and validate it.
    pub fn from_json(json: &str) -> EstimateResult<Self> {
        let profile: MaterialProfile = serde_json::from_str(json)
            .map_err(|e| EstimateError::invalid_profile(format!("malformed profile JSON: {e}")))?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> EstimateResult<()> {
        if self.materials.is_empty() {
            return Err(EstimateError::invalid_profile("profile lists no materials"));
        }

        let mut names = HashSet::new();
        for material in &self.materials {
            if material.name.trim().is_empty() {
                return Err(EstimateError::invalid_profile("material name is empty"));
            }
            if !names.insert(material.name.as_str()) {
                return Err(EstimateError::invalid_profile(format!(
                    "duplicate material '{}'",
                    material.name
                )));
            }
            if !material.coefficient.is_finite() || material.coefficient < 0.0 {
                return Err(EstimateError::invalid_profile(format!(
                    "coefficient for '{}' must be finite and non-negative, got {}",
                    material.name, material.coefficient
                )));
            }
        }

        Ok(())
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.materials
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.coefficient)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialQuantity {
    pub name: String,
    pub category: String,
    pub unit: String,
    /// Unrounded quantity
    pub quantity: f64,
    pub display_decimals: u32,
}

impl MaterialQuantity {
    /// Quantity rounded to `display_decimals` for presentation.
    pub fn display_value(&self) -> f64 {
        let scale = 10f64.powi(self.display_decimals.min(crate::MAX_DECIMALS) as i32);
        (self.quantity * scale).round() / scale
    }

    pub fn formatted(&self) -> String {
        let value = format!("{:.*}", self.display_decimals as usize, self.quantity);
        if self.unit.is_empty() {
            value
        } else {
            format!("{} {}", value, self.unit)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialEstimate {
    pub area: f64,
    pub quantities: Vec<MaterialQuantity>,
}

impl MaterialEstimate {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.quantities
            .iter()
            .find(|q| q.name == name)
            .map(|q| q.quantity)
    }

    /// Categories in profile order, each with its quantities.
    pub fn by_category(&self) -> Vec<(&str, Vec<&MaterialQuantity>)> {
        let mut groups: Vec<(&str, Vec<&MaterialQuantity>)> = Vec::new();
        for quantity in &self.quantities {
            match groups.iter_mut().find(|(name, _)| *name == quantity.category) {
                Some((_, items)) => items.push(quantity),
                None => groups.push((quantity.category.as_str(), vec![quantity])),
            }
        }
        groups
    }
}

/// Apply every coefficient in `profile` to `total_area`.
///
/// Fails on a negative or non-finite area, or when a quantity would overflow.
pub fn estimate_materials(total_area: f64, profile: &MaterialProfile) -> EstimateResult<MaterialEstimate> {
    if !total_area.is_finite() || total_area < 0.0 {
        return Err(EstimateError::InvalidAreaInput(total_area));
    }
    profile.validate()?;

    let quantities = profile
        .materials
        .iter()
        .map(|material| {
            let quantity = total_area * material.coefficient;
            if !quantity.is_finite() {
                return Err(EstimateError::InvalidAreaInput(total_area));
            }
            Ok(MaterialQuantity {
                name: material.name.clone(),
                category: material.category.clone(),
                unit: material.unit.clone(),
                quantity,
                display_decimals: material.display_decimals,
            })
        })
        .collect::<EstimateResult<Vec<_>>>()?;

    Ok(MaterialEstimate {
        area: total_area,
        quantities,
    })
}

/// [`estimate_materials`] with the built-in coefficient table.
pub fn estimate_materials_default(total_area: f64) -> EstimateResult<MaterialEstimate> {
    estimate_materials(total_area, &MaterialProfile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_table() {
        let estimate = estimate_materials_default(12.0).unwrap();

        assert_eq!(estimate.quantities.len(), 10);
        assert_relative_eq!(estimate.get("Bricks").unwrap(), 720.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Cement").unwrap(), 2.4, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Sand").unwrap(), 6.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Rebars").unwrap(), 24.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Tiles").unwrap(), 13.2, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Adhesive").unwrap(), 48.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Paint").unwrap(), 1.2, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Wall cladding").unwrap(), 8.04, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Putty").unwrap(), 1.2, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Sealant").unwrap(), 0.6, epsilon = 1e-9);
        assert_eq!(estimate.get("Gravel"), None);
    }

    #[test]
    fn test_zero_area() {
        let estimate = estimate_materials_default(0.0).unwrap();
        assert!(estimate.quantities.iter().all(|q| q.quantity == 0.0));
    }

    #[test]
    fn test_invalid_area_rejected() {
        for area in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                estimate_materials_default(area),
                Err(EstimateError::InvalidAreaInput(_))
            ));
        }
    }

    #[test]
    fn test_overflowing_quantity_rejected() {
        assert!(matches!(
            estimate_materials_default(f64::MAX),
            Err(EstimateError::InvalidAreaInput(_))
        ));
    }

    #[test]
    fn test_custom_profile() {
        let profile = MaterialProfile::from_json(
            r#"{"materials": [
                {"name": "Bricks", "category": "Walls", "coefficient": 55, "display_decimals": 0},
                {"name": "Waterproofing", "unit": "liters", "coefficient": 0.3}
            ]}"#,
        )
        .unwrap();

        let estimate = estimate_materials(10.0, &profile).unwrap();

        assert_relative_eq!(estimate.get("Bricks").unwrap(), 550.0, epsilon = 1e-9);
        assert_relative_eq!(estimate.get("Waterproofing").unwrap(), 3.0, epsilon = 1e-9);
        assert_eq!(estimate.quantities[1].category, "General");
        assert_eq!(estimate.quantities[1].display_decimals, 2);
    }

    #[test]
    fn test_profile_validation() {
        let mut profile = MaterialProfile::default();
        profile.materials.push(MaterialCoefficient::new("Bricks", "Walls", "", 1.0, 0));
        assert!(matches!(profile.validate(), Err(EstimateError::InvalidProfile(_))));

        let profile = MaterialProfile {
            materials: vec![MaterialCoefficient::new("Paint", "Painting", "liters", -0.1, 2)],
        };
        assert!(matches!(estimate_materials(1.0, &profile), Err(EstimateError::InvalidProfile(_))));

        let profile = MaterialProfile { materials: vec![] };
        assert!(profile.validate().is_err());

        assert!(MaterialProfile::from_json("{not json").is_err());
    }

    #[test]
    fn test_display_rounding() {
        let estimate = estimate_materials_default(12.345).unwrap();
        let bricks = &estimate.quantities[0];
        let cement = &estimate.quantities[1];

        assert_eq!(bricks.display_value(), 741.0);
        assert_eq!(bricks.formatted(), "741");
        assert_eq!(cement.formatted(), "2.47 bags");
        // stored quantity is untouched
        assert_relative_eq!(bricks.quantity, 740.7, epsilon = 1e-9);
    }

    #[test]
    fn test_grouped_by_category() {
        let estimate = estimate_materials_default(1.0).unwrap();
        let groups = estimate.by_category();

        let names: Vec<&str> = groups.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Walls", "Flooring", "Painting"]);
        assert_eq!(groups[0].1.len(), 4);
        assert_eq!(groups[1].1.len(), 2);
        assert_eq!(groups[2].1.len(), 4);
    }
}
