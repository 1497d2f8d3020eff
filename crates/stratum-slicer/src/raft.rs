//! Raft layers below the model.

use stratum_geom2d::{clean, offset, PolygonSet};
use tracing::debug;

use crate::layer::{Layer, RaftTier};
use crate::settings::SliceSettings;

/// Builds raft layers from the lowest mesh layer.
///
/// Every raft layer holds the same region, the lowest layer's base grown
/// by the raft margin; only the plane height differs.
#[derive(Debug, Clone, Copy)]
pub struct RaftBuilder<'a> {
    settings: &'a SliceSettings,
}

impl<'a> RaftBuilder<'a> {
    /// Create a builder for `settings`.
    pub fn new(settings: &'a SliceSettings) -> Self {
        Self { settings }
    }

    /// Number of raft layers, zero when the raft is disabled.
    pub fn layer_count(&self) -> usize {
        self.settings.raft.layer_count()
    }

    /// Heights of the raft layers, lowest first, given the height of the
    /// lowest mesh layer.
    ///
    /// Layer `j` of `R` sits at `first - gap - slice_height * (R - j - 0.5)`.
    pub fn heights(&self, first_mesh_height: f64) -> Vec<f64> {
        let count = self.layer_count();
        let h = self.settings.slice_height;
        let top = first_mesh_height - self.settings.raft.gap;
        (0..count)
            .map(|j| top - h * ((count - j) as f64 - 0.5))
            .collect()
    }

    /// Raft footprint: `base` grown by the margin.
    pub fn region(&self, base: &PolygonSet) -> PolygonSet {
        let grown = offset(base, self.settings.raft.margin, self.settings.resolution);
        clean(&grown).without_slivers(self.settings.sliver_area())
    }

    /// Raft layers for a stack whose lowest mesh layer is `lowest`, indexed
    /// from zero.
    pub fn build(&self, lowest: &Layer) -> Vec<Layer> {
        let count = self.layer_count();
        if count == 0 {
            return Vec::new();
        }

        let base = lowest.base(self.settings);
        let region = self.region(base);
        debug!(
            layers = count,
            area = region.area(),
            "Built raft footprint"
        );

        self.heights(lowest.height())
            .into_iter()
            .enumerate()
            .map(|(j, height)| {
                let tier = if j < self.settings.raft.base_layers {
                    RaftTier::Base
                } else {
                    RaftTier::Main
                };
                let context = base.context().at(height);
                Layer::raft(j, tier, region.in_context(context))
            })
            .collect()
    }
}
