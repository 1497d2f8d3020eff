//! Slice settings from TOML files and command-line flags.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::Path;
use stratum_math::Axis;
use stratum_slicer::{FillType, SliceSettings};

/// Load settings from a TOML file. Missing keys keep their defaults.
pub fn load(path: &Path) -> Result<SliceSettings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings =
        parse(&text).with_context(|| format!("invalid settings in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Loaded slice settings");
    Ok(settings)
}

fn parse(text: &str) -> Result<SliceSettings> {
    Ok(toml::from_str(text)?)
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FillArg {
    None,
    Solid,
    Grid,
    Triangle,
    Hex,
}

impl From<FillArg> for FillType {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::None => FillType::None,
            FillArg::Solid => FillType::Solid,
            FillArg::Grid => FillType::Grid,
            FillArg::Triangle => FillType::Triangle,
            FillArg::Hex => FillType::Hex,
        }
    }
}

/// Flags that override individual settings.
#[derive(Args, Default)]
pub struct Overrides {
    /// Slicing axis
    #[arg(long, value_enum)]
    axis: Option<AxisArg>,
    /// Distance between layers (mm)
    #[arg(long)]
    slice_height: Option<f64>,
    /// Line width (mm)
    #[arg(long)]
    resolution: Option<f64>,
    /// Number of walls
    #[arg(long)]
    walls: Option<usize>,
    /// Layers above and below that must back sparse fill
    #[arg(long)]
    top_layers: Option<usize>,
    /// Fill pattern
    #[arg(long, value_enum)]
    fill: Option<FillArg>,
    /// Sparse fill density (0 to 1)
    #[arg(long)]
    density: Option<f64>,
    /// Build a raft under the model
    #[arg(long)]
    raft: bool,
}

impl Overrides {
    /// Write every flag that was given into `settings`.
    pub fn apply(&self, settings: &mut SliceSettings) {
        if let Some(axis) = self.axis {
            settings.axis = axis.into();
        }
        if let Some(h) = self.slice_height {
            settings.slice_height = h;
        }
        if let Some(r) = self.resolution {
            settings.resolution = r;
        }
        if let Some(w) = self.walls {
            settings.wall_count = w;
        }
        if let Some(n) = self.top_layers {
            settings.top_layers = n;
        }
        if let Some(fill) = self.fill {
            settings.fill.fill_type = fill.into();
        }
        if let Some(d) = self.density {
            settings.fill.density = d;
        }
        if self.raft {
            settings.raft.enabled = true;
        }
    }
}
