//! Tessellation and feature settings for model generation.

use insole_kernel::mm_to_m;
use insole_tessellation::ExtrudeSettings;
use serde::{Deserialize, Serialize};

use crate::error::DesignError;

/// Contour offset and edge rounding for one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// How far the layer's outline is pulled in from the foot outline (mm).
    pub contour_offset_mm: f64,
    pub bevel_thickness_mm: f64,
    pub bevel_size_mm: f64,
    pub bevel_segments: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self::base()
    }
}

impl LayerConfig {
    pub fn base() -> Self {
        Self {
            contour_offset_mm: 0.0,
            bevel_thickness_mm: 0.3,
            bevel_size_mm: 0.3,
            bevel_segments: 5,
        }
    }

    pub fn support() -> Self {
        Self {
            contour_offset_mm: 15.0,
            bevel_thickness_mm: 0.2,
            bevel_size_mm: 0.2,
            bevel_segments: 3,
        }
    }

    pub fn cushion() -> Self {
        Self {
            contour_offset_mm: 30.0,
            ..Self::support()
        }
    }

    /// Extrusion settings for a slab `thickness` meters tall.
    pub fn extrude_settings(&self, thickness: f64, curve_segments: usize) -> ExtrudeSettings {
        ExtrudeSettings {
            thickness,
            bevel_thickness: mm_to_m(self.bevel_thickness_mm),
            bevel_size: mm_to_m(self.bevel_size_mm),
            bevel_segments: self.bevel_segments,
            curve_segments,
        }
    }
}

/// Everything about generation that is not a property of the foot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub base: LayerConfig,
    pub support: LayerConfig,
    pub cushion: LayerConfig,
    /// Divisions per contour curve segment.
    pub curve_segments: usize,
    pub tube_segments: usize,
    pub tube_radial_segments: usize,
    pub tube_radius_mm: f64,
    pub heel_cup_segments: usize,
    pub pad_segments: usize,
    pub grid_segments: usize,
    pub foot_segments: usize,
    pub support_grid: bool,
    /// Include the stand-in foot when no scan is supplied.
    pub foot_preview: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            base: LayerConfig::base(),
            support: LayerConfig::support(),
            cushion: LayerConfig::cushion(),
            curve_segments: 20,
            tube_segments: 20,
            tube_radial_segments: 8,
            tube_radius_mm: 1.0,
            heel_cup_segments: 16,
            pad_segments: 8,
            grid_segments: 15,
            foot_segments: 20,
            support_grid: true,
            foot_preview: true,
        }
    }
}

impl GeometryConfig {
    /// Coarse tessellation for fast interactive previews.
    pub fn preview() -> Self {
        let flat = |layer: LayerConfig| LayerConfig {
            bevel_segments: 1,
            ..layer
        };
        Self {
            base: flat(LayerConfig::base()),
            support: flat(LayerConfig::support()),
            cushion: flat(LayerConfig::cushion()),
            curve_segments: 8,
            tube_segments: 10,
            tube_radial_segments: 6,
            heel_cup_segments: 8,
            pad_segments: 6,
            grid_segments: 8,
            foot_segments: 10,
            ..Self::default()
        }
    }

    /// Only the layer stack: no grid, no stand-in foot.
    pub fn layers_only() -> Self {
        Self {
            support_grid: false,
            foot_preview: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, DesignError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_offsets_increase() {
        let c = GeometryConfig::default();
        assert!(c.base.contour_offset_mm < c.support.contour_offset_mm);
        assert!(c.support.contour_offset_mm < c.cushion.contour_offset_mm);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = GeometryConfig::from_json_str(
            r#"{"curve_segments": 12, "support": {"bevel_segments": 0}, "foot_preview": false}"#,
        )
        .unwrap();
        assert_eq!(c.curve_segments, 12);
        assert!(!c.foot_preview);
        assert!(c.support_grid);
        assert_eq!(c.tube_segments, 20);
        assert_eq!(c.support.bevel_segments, 0);
    }

    #[test]
    fn test_preview_is_coarser() {
        let fine = GeometryConfig::default();
        let coarse = GeometryConfig::preview();
        assert!(coarse.curve_segments < fine.curve_segments);
        assert!(coarse.tube_segments < fine.tube_segments);
        assert_eq!(coarse.cushion.contour_offset_mm, fine.cushion.contour_offset_mm);
    }

    #[test]
    fn test_extrude_settings_in_meters() {
        let s = LayerConfig::base().extrude_settings(0.005, 20);
        assert_eq!(s.thickness, 0.005);
        assert!((s.bevel_thickness - 0.0003).abs() < 1e-12);
        assert_eq!(s.bevel_segments, 5);
    }
}
