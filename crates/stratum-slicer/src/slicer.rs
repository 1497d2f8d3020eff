//! The slicing orchestrator.

use serde::{Deserialize, Serialize};
use stratum_geom2d::SegmentSet;
use stratum_mesh::Mesh;
use tracing::{info, warn};

use crate::bounds::FaceBoundsIndex;
use crate::error::Result;
use crate::layer::{Layer, LayerStack};
use crate::raft::RaftBuilder;
use crate::settings::{FillType, SliceSettings};
use crate::sweep::{sweep, SlicePlanes};
use crate::view::{LayerPaths, MeshPartition, View, ViewMode, ViewOutput};

/// Statistics about a slicing run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceStats {
    /// Faces in the input mesh.
    pub faces: usize,
    /// Lowest mesh coordinate along the slicing axis.
    pub mesh_min: f64,
    /// Highest mesh coordinate along the slicing axis.
    pub mesh_max: f64,
    /// Raft layers built.
    pub raft_layers: usize,
    /// Mesh layers built.
    pub mesh_layers: usize,
    /// Segments produced by the sweep over all mesh layers.
    pub segments: usize,
}

/// A sliced mesh.
///
/// Holds the layer stack and settings of one run and nothing else; which
/// layer to look at is part of each [`View`] query. Changing any setting
/// means building a new `Slicer`.
#[derive(Debug)]
pub struct Slicer {
    bounds: FaceBoundsIndex,
    planes: SlicePlanes,
    stack: LayerStack,
    stats: SliceStats,
}

impl Slicer {
    /// Slice `mesh`.
    ///
    /// Settings are validated before any work. A mesh without faces or
    /// without extent along the axis gives a slicer with no layers.
    pub fn new(mesh: &Mesh, settings: SliceSettings) -> Result<Self> {
        settings.validate()?;

        info!(
            faces = mesh.face_count(),
            axis = %settings.axis,
            slice_height = settings.slice_height,
            "Starting mesh slicing"
        );

        let bounds = FaceBoundsIndex::new(mesh, settings.axis);
        let planes = SlicePlanes::for_index(&bounds, settings.slice_height);
        let sources = sweep(mesh, &bounds, &planes, settings.precision);
        let segments = sources.iter().map(SegmentSet::len).sum();

        let raft_count = if sources.is_empty() {
            0
        } else {
            settings.raft.layer_count()
        };
        let mesh_layers: Vec<Layer> = sources
            .into_iter()
            .enumerate()
            .map(|(i, source)| Layer::mesh(raft_count + i, source))
            .collect();
        let raft = match mesh_layers.first() {
            Some(lowest) => RaftBuilder::new(&settings).build(lowest),
            None => Vec::new(),
        };

        let stats = SliceStats {
            faces: mesh.face_count(),
            mesh_min: bounds.min(),
            mesh_max: bounds.max(),
            raft_layers: raft.len(),
            mesh_layers: mesh_layers.len(),
            segments,
        };
        let stack = LayerStack::new(settings, raft, mesh_layers);

        info!(
            layers = stack.len(),
            raft_layers = stats.raft_layers,
            segments = stats.segments,
            "Slicing complete"
        );

        Ok(Self {
            bounds,
            planes,
            stack,
            stats,
        })
    }

    /// Settings of this run.
    pub fn settings(&self) -> &SliceSettings {
        self.stack.settings()
    }

    /// The layer stack, for direct access to derived geometry.
    pub fn layers(&self) -> &LayerStack {
        &self.stack
    }

    /// Per-face extents of the input mesh.
    pub fn face_bounds(&self) -> &FaceBoundsIndex {
        &self.bounds
    }

    /// Mesh slicing planes.
    pub fn planes(&self) -> &SlicePlanes {
        &self.planes
    }

    /// Run statistics.
    pub fn stats(&self) -> &SliceStats {
        &self.stats
    }

    /// Number of layers, raft included.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// True if nothing was sliced.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Nearest existing layer to `level`.
    pub fn clamp_level(&self, level: usize) -> Option<usize> {
        if self.stack.is_empty() {
            None
        } else {
            Some(level.min(self.stack.len() - 1))
        }
    }

    /// Plane height of layer `level`.
    pub fn height(&self, level: usize) -> Option<f64> {
        self.stack.get(level).map(Layer::height)
    }

    /// Answer a view query. `None` only when there are no layers.
    pub fn view(&self, view: View) -> Option<ViewOutput> {
        let level = self.clamp_level(view.level)?;
        Some(match view.mode {
            ViewMode::Mesh => ViewOutput::Mesh(self.mesh_partition(level)),
            ViewMode::Paths => ViewOutput::Paths(self.layer_paths(level)),
        })
    }

    /// Split the mesh faces around the plane of layer `level` (clamped).
    pub fn mesh_partition(&self, level: usize) -> MeshPartition {
        let mut partition = MeshPartition::default();
        let Some(height) = self.clamp_level(level).and_then(|l| self.height(l)) else {
            return partition;
        };
        for bound in self.bounds.bounds() {
            if bound.max <= height {
                partition.below.push(bound.face);
            } else if bound.min > height {
                partition.above.push(bound.face);
            } else {
                partition.crossing.push(bound.face);
            }
        }
        partition
    }

    /// Wall and fill segments of layer `level` (clamped), in 3D.
    ///
    /// Raft layers draw their outline and their fill. Mesh layers draw
    /// their walls, plus fill unless the fill type is `None`. If fill
    /// generation fails the failure is logged and the layer is returned
    /// empty.
    pub fn layer_paths(&self, level: usize) -> LayerPaths {
        let Some(level) = self.clamp_level(level) else {
            return LayerPaths::default();
        };
        let stack = &self.stack;
        let Some(layer) = stack.get(level) else {
            return LayerPaths::default();
        };

        let mut paths = LayerPaths {
            level,
            height: layer.height(),
            raft: layer.is_raft(),
            ..Default::default()
        };
        if layer.is_raft() {
            paths.segments.extend(stack.base(level).outline().lift());
        }
        for wall in stack.print_contours(level) {
            paths.segments.extend(wall.outline().lift());
        }
        paths.wall_count = paths.segments.len();

        if layer.is_raft() || self.settings().fill.fill_type != FillType::None {
            match stack.infill(level) {
                Ok(fill) => {
                    paths.segments.extend(fill.solid.lift());
                    paths.segments.extend(fill.inner.lift());
                }
                Err(error) => {
                    warn!(layer = level, %error, "Fill generation failed, layer left empty");
                    paths.segments.clear();
                    paths.wall_count = 0;
                }
            }
        }
        paths
    }

    /// Path view of every layer, lowest first.
    pub fn export_paths(&self) -> Vec<LayerPaths> {
        (0..self.stack.len())
            .map(|level| self.layer_paths(level))
            .collect()
    }
}
