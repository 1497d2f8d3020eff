//! Slicing parameters.

use serde::{Deserialize, Serialize};
use stratum_geom2d::FillPattern;
use stratum_math::Axis;

use crate::error::{Result, SlicerError};

/// Largest accepted kernel precision. Beyond this, quantized coordinates of
/// ordinary models stop fitting the kernel's integer range.
pub const MAX_PRECISION: u32 = 8;

/// What goes inside the innermost wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillType {
    /// Walls only.
    None,
    /// Dense lines everywhere.
    Solid,
    /// Perpendicular line pairs.
    #[default]
    Grid,
    /// Three line families 60° apart.
    Triangle,
    /// Honeycomb.
    Hex,
}

impl FillType {
    /// Kernel pattern used for the sparse interior, if any.
    pub fn pattern(self) -> Option<FillPattern> {
        match self {
            FillType::None => None,
            FillType::Solid => Some(FillPattern::Linear),
            FillType::Grid => Some(FillPattern::Grid),
            FillType::Triangle => Some(FillPattern::Triangle),
            FillType::Hex => Some(FillPattern::Hex),
        }
    }
}

/// Interior fill parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    /// Fill pattern.
    pub fill_type: FillType,
    /// Sparse fill density (0.0 exclusive to 1.0).
    pub density: f64,
    /// Fraction of half a line width by which fill overlaps the innermost
    /// wall (0.0 to 1.0).
    pub overlap: f64,
    /// Straight fill runs shorter than this are dropped (mm).
    pub min_segment_length: f64,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            fill_type: FillType::Grid,
            density: 0.2,
            overlap: 0.15,
            min_segment_length: 0.0,
        }
    }
}

/// Raft parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaftSettings {
    /// Build a raft under the model.
    pub enabled: bool,
    /// Coarse layers at the bottom of the raft.
    pub base_layers: usize,
    /// Dense layers on top of the base layers.
    pub main_layers: usize,
    /// Outward growth of the raft beyond the model footprint (mm).
    pub margin: f64,
    /// Vertical gap between the raft and the model (mm).
    pub gap: f64,
    /// Line spacing of the base layers (mm).
    pub spacing: f64,
}

impl Default for RaftSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_layers: 1,
            main_layers: 2,
            margin: 3.0,
            gap: 0.1,
            spacing: 2.0,
        }
    }
}

impl RaftSettings {
    /// Number of raft layers this configuration adds.
    pub fn layer_count(&self) -> usize {
        if self.enabled {
            self.base_layers + self.main_layers
        } else {
            0
        }
    }
}

/// Slicing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    /// Axis the mesh is sliced along.
    pub axis: Axis,
    /// Distance between slicing planes (mm).
    pub slice_height: f64,
    /// Line width; wall offsets and solid fill spacing derive from it (mm).
    pub resolution: f64,
    /// Decimal digits kept by the 2D kernel.
    pub precision: u32,
    /// Number of perimeter walls.
    pub wall_count: usize,
    /// Layers above and below that must back a region before it may use
    /// sparse fill.
    pub top_layers: usize,
    /// Interior fill.
    pub fill: FillSettings,
    /// Raft.
    pub raft: RaftSettings,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            axis: Axis::Z,
            slice_height: 0.2,
            resolution: 0.4,
            precision: 4,
            wall_count: 2,
            top_layers: 3,
            fill: FillSettings::default(),
            raft: RaftSettings::default(),
        }
    }
}

impl SliceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.slice_height.is_finite() && self.slice_height > 0.0) {
            return Err(SlicerError::InvalidSettings(
                "slice_height must be positive".into(),
            ));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(SlicerError::InvalidSettings(
                "resolution must be positive".into(),
            ));
        }
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(SlicerError::InvalidSettings(format!(
                "precision must be between 1 and {MAX_PRECISION}"
            )));
        }
        if self.resolution < 10f64.powi(-(self.precision as i32)) {
            return Err(SlicerError::InvalidSettings(
                "resolution is finer than the kernel precision".into(),
            ));
        }
        if !(self.fill.density > 0.0 && self.fill.density <= 1.0) {
            return Err(SlicerError::InvalidSettings(
                "fill density must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.fill.overlap) {
            return Err(SlicerError::InvalidSettings(
                "fill overlap must be between 0 and 1".into(),
            ));
        }
        if self.fill.min_segment_length.is_nan() || self.fill.min_segment_length < 0.0 {
            return Err(SlicerError::InvalidSettings(
                "min_segment_length must not be negative".into(),
            ));
        }
        if self.raft.enabled {
            if self.raft.layer_count() == 0 {
                return Err(SlicerError::InvalidSettings(
                    "raft is enabled but has no layers".into(),
                ));
            }
            if self.raft.margin.is_nan()
                || self.raft.gap.is_nan()
                || self.raft.margin < 0.0
                || self.raft.gap < 0.0
            {
                return Err(SlicerError::InvalidSettings(
                    "raft margin and gap must not be negative".into(),
                ));
            }
            if !(self.raft.spacing.is_finite() && self.raft.spacing > 0.0) {
                return Err(SlicerError::InvalidSettings(
                    "raft spacing must be positive".into(),
                ));
            }
        }
        Ok(())
    }

    /// Endpoints closer than this are merged before contours are chained.
    pub fn decimate_tolerance(&self) -> f64 {
        self.resolution * 0.01
    }

    /// Polygons smaller than this are dropped as slivers (mm²).
    pub fn sliver_area(&self) -> f64 {
        let edge = self.resolution * 0.1;
        edge * edge
    }

    /// Line spacing of the sparse interior fill.
    pub fn sparse_spacing(&self) -> f64 {
        self.resolution / self.fill.density
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(SliceSettings::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let cases = [
            SliceSettings {
                slice_height: 0.0,
                ..Default::default()
            },
            SliceSettings {
                resolution: -0.1,
                ..Default::default()
            },
            SliceSettings {
                precision: 12,
                ..Default::default()
            },
            SliceSettings {
                fill: FillSettings {
                    density: 0.0,
                    ..Default::default()
                },
                ..Default::default()
            },
            SliceSettings {
                fill: FillSettings {
                    overlap: 1.5,
                    ..Default::default()
                },
                ..Default::default()
            },
            SliceSettings {
                raft: RaftSettings {
                    enabled: true,
                    base_layers: 0,
                    main_layers: 0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];
        for settings in cases {
            assert!(matches!(
                settings.validate(),
                Err(SlicerError::InvalidSettings(_))
            ));
        }
    }

    #[test]
    fn test_raft_layer_count() {
        let mut raft = RaftSettings::default();
        assert_eq!(raft.layer_count(), 0);
        raft.enabled = true;
        assert_eq!(raft.layer_count(), 3);
    }

    #[test]
    fn test_sparse_spacing() {
        let settings = SliceSettings {
            resolution: 0.4,
            fill: FillSettings {
                density: 0.25,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!((settings.sparse_spacing() - 1.6).abs() < 1e-12);
    }
}
