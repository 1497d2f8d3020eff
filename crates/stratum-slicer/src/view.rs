//! Query values and outputs of the two slicer views.

use stratum_math::Point3;

/// Which output a view query produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// The mesh, faces partitioned around the selected plane.
    #[default]
    Mesh,
    /// Wall and fill segments of the selected layer.
    Paths,
}

/// A view query: what to show, and at which layer.
///
/// `level` is clamped to the layers that exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct View {
    /// Output kind.
    pub mode: ViewMode,
    /// Layer index, raft layers included.
    pub level: usize,
}

impl View {
    /// Mesh view at `level`.
    pub fn mesh(level: usize) -> Self {
        Self {
            mode: ViewMode::Mesh,
            level,
        }
    }

    /// Path view at `level`.
    pub fn paths(level: usize) -> Self {
        Self {
            mode: ViewMode::Paths,
            level,
        }
    }
}

/// Mesh faces split by the plane of one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeshPartition {
    /// Faces entirely at or below the plane.
    pub below: Vec<usize>,
    /// Faces the plane cuts.
    pub crossing: Vec<usize>,
    /// Faces entirely above the plane.
    pub above: Vec<usize>,
}

/// 3D segments of one layer: walls first (outermost wall first), then
/// fill.
#[derive(Debug, Clone, Default)]
pub struct LayerPaths {
    /// Layer index.
    pub level: usize,
    /// Plane height.
    pub height: f64,
    /// Raft layer.
    pub raft: bool,
    /// Endpoint pairs.
    pub segments: Vec<[Point3; 2]>,
    /// Number of leading wall segments in `segments`.
    pub wall_count: usize,
}

impl LayerPaths {
    /// Wall segments.
    pub fn walls(&self) -> &[[Point3; 2]] {
        &self.segments[..self.wall_count]
    }

    /// Fill segments.
    pub fn fill(&self) -> &[[Point3; 2]] {
        &self.segments[self.wall_count..]
    }

    /// Total length of all segments.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(|[a, b]| (b - a).norm()).sum()
    }

    /// True if the layer has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Result of a view query.
#[derive(Debug, Clone)]
pub enum ViewOutput {
    /// See [`ViewMode::Mesh`].
    Mesh(MeshPartition),
    /// See [`ViewMode::Paths`].
    Paths(LayerPaths),
}
