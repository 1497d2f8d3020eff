//! Layers and their lazily derived geometry.
//!
//! Layers live in one [`LayerStack`], ordered by height: raft layers first,
//! then mesh layers. Each derived field is computed on first request and
//! cached; a stage pulls the stages it depends on (its own or a
//! neighbor's) before running. Neighbors are addressed by index, and a
//! lookup past either end of the stack yields no neighbor, which the stages
//! treat as empty geometry.

use std::cell::OnceCell;
use std::ops::Range;

use stratum_geom2d::{
    clean, full_difference, infill_generate, offset, resolve_loops, Context, FillPattern,
    FullDifference, InfillOptions, PolygonSet, SegmentSet,
};
use tracing::warn;

use crate::error::{Result, SlicerError};
use crate::settings::{FillType, SliceSettings};

/// Role of a raft layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaftTier {
    /// Coarse bottom layers.
    Base,
    /// Dense layers the model sits on.
    Main,
}

/// Where a layer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Synthesized support below the model.
    Raft(RaftTier),
    /// A cross-section of the mesh.
    Mesh,
}

/// A derived field of a [`Layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Clean region resolved from the slice segments.
    Base,
    /// Wall regions, outermost first.
    PrintContours,
    /// Region left for fill inside the walls.
    InfillContour,
    /// Split against the layer below.
    LayerDifferences,
    /// Fill region split into sparse and solid parts.
    DisjointInfill,
    /// Fill segments.
    Infill,
}

impl Stage {
    /// Every stage, in dependency order.
    pub const ALL: [Stage; 6] = [
        Stage::Base,
        Stage::PrintContours,
        Stage::InfillContour,
        Stage::LayerDifferences,
        Stage::DisjointInfill,
        Stage::Infill,
    ];

    /// Stages of the same layer that must be computed before this one.
    ///
    /// `LayerDifferences` and `DisjointInfill` also read the
    /// `InfillContour` of neighboring layers.
    pub fn dependencies(self) -> &'static [Stage] {
        match self {
            Stage::Base => &[],
            Stage::PrintContours => &[Stage::Base],
            Stage::InfillContour => &[Stage::Base, Stage::PrintContours],
            Stage::LayerDifferences => &[Stage::InfillContour],
            Stage::DisjointInfill => &[Stage::InfillContour],
            Stage::Infill => &[Stage::InfillContour, Stage::DisjointInfill],
        }
    }
}

/// Fill region split by vertical exposure.
#[derive(Debug, Clone)]
pub struct DisjointInfill {
    /// Backed by material above and below; may use sparse fill.
    pub inner: PolygonSet,
    /// Exposed; needs solid fill.
    pub solid: PolygonSet,
}

/// Fill segments, split the same way as [`DisjointInfill`].
#[derive(Debug, Clone)]
pub struct Infill {
    /// Sparse pattern over the inner region.
    pub inner: SegmentSet,
    /// Dense lines over the solid region.
    pub solid: SegmentSet,
}

impl Infill {
    /// Total number of fill segments.
    pub fn len(&self) -> usize {
        self.inner.len() + self.solid.len()
    }

    /// True if there is no fill.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty() && self.solid.is_empty()
    }
}

/// One slice level.
#[derive(Debug)]
pub struct Layer {
    index: usize,
    kind: LayerKind,
    context: Context,
    source: SegmentSet,
    base: OnceCell<PolygonSet>,
    print_contours: OnceCell<Vec<PolygonSet>>,
    infill_contour: OnceCell<PolygonSet>,
    layer_differences: OnceCell<Result<FullDifference>>,
    disjoint_infill: OnceCell<Result<DisjointInfill>>,
    infill: OnceCell<Result<Infill>>,
}

impl Layer {
    fn with_base(
        index: usize,
        kind: LayerKind,
        source: SegmentSet,
        base: OnceCell<PolygonSet>,
    ) -> Self {
        Self {
            index,
            kind,
            context: *source.context(),
            source,
            base,
            print_contours: OnceCell::new(),
            infill_contour: OnceCell::new(),
            layer_differences: OnceCell::new(),
            disjoint_infill: OnceCell::new(),
            infill: OnceCell::new(),
        }
    }

    /// A mesh layer built from its slice segments.
    pub fn mesh(index: usize, source: SegmentSet) -> Self {
        Self::with_base(index, LayerKind::Mesh, source, OnceCell::new())
    }

    /// A raft layer whose region is already known.
    pub fn raft(index: usize, tier: RaftTier, region: PolygonSet) -> Self {
        let source = region.outline();
        Self::with_base(index, LayerKind::Raft(tier), source, OnceCell::from(region))
    }

    /// Position in the stack.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raft or mesh.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// True for raft layers.
    pub fn is_raft(&self) -> bool {
        matches!(self.kind, LayerKind::Raft(_))
    }

    /// Frame of every geometry this layer owns.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Height of the layer's plane.
    pub fn height(&self) -> f64 {
        self.context.offset
    }

    /// Raw slice segments.
    pub fn source(&self) -> &SegmentSet {
        &self.source
    }

    /// Whether `stage` has been computed.
    pub fn is_computed(&self, stage: Stage) -> bool {
        match stage {
            Stage::Base => self.base.get().is_some(),
            Stage::PrintContours => self.print_contours.get().is_some(),
            Stage::InfillContour => self.infill_contour.get().is_some(),
            Stage::LayerDifferences => self.layer_differences.get().is_some(),
            Stage::DisjointInfill => self.disjoint_infill.get().is_some(),
            Stage::Infill => self.infill.get().is_some(),
        }
    }

    /// Clean region of this layer.
    ///
    /// Depends only on the layer's own segments, so it is available before
    /// the stack is assembled.
    pub fn base(&self, settings: &SliceSettings) -> &PolygonSet {
        self.base.get_or_init(|| {
            let chains = self
                .source
                .decimate(settings.decimate_tolerance())
                .chain();
            if chains.open > 0 {
                warn!(
                    layer = self.index,
                    open = chains.open,
                    "Dropped open contour chains"
                );
            }
            resolve_loops(self.context, &chains.loops).without_slivers(settings.sliver_area())
        })
    }
}

/// All layers of one slicing run.
///
/// Neighbor lookups ([`get`](Self::get), [`below`](Self::below),
/// [`above`](Self::above)) return `None` past either end of the stack.
///
/// # Panics
///
/// The stage accessors ([`base`](Self::base) through
/// [`infill`](Self::infill)) take an index the caller got from this stack
/// and panic if it is out of range. Check it against [`len`](Self::len)
/// or go through [`get`](Self::get) first.
#[derive(Debug)]
pub struct LayerStack {
    settings: SliceSettings,
    layers: Vec<Layer>,
    raft_count: usize,
}

impl LayerStack {
    /// Assemble a stack from raft layers (lowest first) and mesh layers
    /// (lowest first). Layer indices must already match their positions.
    pub fn new(settings: SliceSettings, raft: Vec<Layer>, mesh: Vec<Layer>) -> Self {
        let raft_count = raft.len();
        let mut layers = raft;
        layers.extend(mesh);
        debug_assert!(layers.iter().enumerate().all(|(i, l)| l.index == i));
        Self {
            settings,
            layers,
            raft_count,
        }
    }

    /// Settings the stack was built with.
    pub fn settings(&self) -> &SliceSettings {
        &self.settings
    }

    /// Number of layers, raft included.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True if there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of raft layers at the bottom of the stack.
    pub fn raft_count(&self) -> usize {
        self.raft_count
    }

    /// Indices of the mesh layers.
    pub fn mesh_range(&self) -> Range<usize> {
        self.raft_count..self.layers.len()
    }

    /// Layer at `index`.
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// All layers, lowest first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Index of the layer below, if any.
    pub fn below(&self, index: usize) -> Option<usize> {
        index.checked_sub(1).filter(|&i| i < self.layers.len())
    }

    /// Index of the layer above, if any.
    pub fn above(&self, index: usize) -> Option<usize> {
        index.checked_add(1).filter(|&i| i < self.layers.len())
    }

    fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    /// Clean region of layer `index`.
    pub fn base(&self, index: usize) -> &PolygonSet {
        self.layer(index).base(&self.settings)
    }

    /// Wall regions of layer `index`, outermost first.
    ///
    /// The first wall is `base` shrunk by half a resolution, each further
    /// wall the previous one shrunk by a full resolution. Stops early when
    /// a wall vanishes. Raft layers have no walls.
    pub fn print_contours(&self, index: usize) -> &[PolygonSet] {
        let layer = self.layer(index);
        layer.print_contours.get_or_init(|| {
            if layer.is_raft() {
                return Vec::new();
            }
            let base = self.base(index);
            let res = self.settings.resolution;
            let mut walls: Vec<PolygonSet> = Vec::with_capacity(self.settings.wall_count);
            for k in 0..self.settings.wall_count {
                let distance = if k == 0 { -0.5 * res } else { -res };
                let next = {
                    let from = walls.last().unwrap_or(base);
                    clean(&offset(from, distance, res)).without_slivers(self.settings.sliver_area())
                };
                if next.is_empty() {
                    break;
                }
                walls.push(next);
            }
            walls
        })
    }

    /// Region available for fill inside the innermost wall.
    ///
    /// Shrinks the innermost wall (or `base` with no walls configured) by
    /// half a resolution, reduced by the fill overlap. Empty if the walls
    /// collapsed before reaching the configured count. Raft layers fill
    /// their whole region.
    pub fn infill_contour(&self, index: usize) -> &PolygonSet {
        let layer = self.layer(index);
        layer.infill_contour.get_or_init(|| {
            let base = self.base(index);
            if layer.is_raft() {
                return base.clone();
            }
            let walls = self.print_contours(index);
            let from = match walls.last() {
                Some(_) if walls.len() < self.settings.wall_count => {
                    return PolygonSet::empty(layer.context);
                }
                Some(innermost) => innermost,
                None if self.settings.wall_count == 0 => base,
                None => return PolygonSet::empty(layer.context),
            };
            let res = self.settings.resolution;
            let distance = -0.5 * res * (1.0 - self.settings.fill.overlap);
            clean(&offset(from, distance, res)).without_slivers(self.settings.sliver_area())
        })
    }

    /// This layer's fill region against the one below it.
    ///
    /// `a_minus_b` is only in this layer, `b_minus_a` only in the layer
    /// below, `intersection` in both. The bottom layer compares against
    /// nothing.
    pub fn layer_differences(&self, index: usize) -> Result<&FullDifference> {
        let layer = self.layer(index);
        layer
            .layer_differences
            .get_or_init(|| {
                let own = self.infill_contour(index);
                let below = match self.below(index) {
                    Some(j) => self.infill_contour(j).in_context(layer.context),
                    None => PolygonSet::empty(layer.context),
                };
                Ok(full_difference(own, &[below], 1)?)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Split the fill region into the part backed by material in the
    /// neighboring layers and the exposed rest.
    ///
    /// A point counts as backed when it is covered by the fill regions of
    /// at least `2 * top_layers` mesh layers within `top_layers` above and
    /// below. Near the top and bottom of the model there are fewer
    /// neighbors than that, so everything there is exposed. With
    /// `top_layers == 0` everything counts as backed.
    pub fn disjoint_infill(&self, index: usize) -> Result<&DisjointInfill> {
        let layer = self.layer(index);
        layer
            .disjoint_infill
            .get_or_init(|| {
                let own = self.infill_contour(index);
                if layer.is_raft() {
                    return Ok(DisjointInfill {
                        inner: PolygonSet::empty(layer.context),
                        solid: own.clone(),
                    });
                }

                let window = self.settings.top_layers;
                let mesh = self.mesh_range();
                let lo = index.saturating_sub(window).max(mesh.start);
                let hi = index.saturating_add(window).min(mesh.end.saturating_sub(1));
                let neighbors: Vec<PolygonSet> = (lo..=hi)
                    .filter(|&j| j != index)
                    .map(|j| self.infill_contour(j).in_context(layer.context))
                    .collect();

                let split = full_difference(own, &neighbors, 2 * window)?;
                let sliver = self.settings.sliver_area();
                Ok(DisjointInfill {
                    inner: split.intersection.without_slivers(sliver),
                    solid: split.a_minus_b.without_slivers(sliver),
                })
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Fill segments for layer `index`.
    ///
    /// Solid fill covers the whole fill region with dense lines. Other fill
    /// types put their pattern over the inner region and dense lines over
    /// the solid region. Line direction turns on odd layers. Raft layers
    /// use lines at the raft spacing in their base tier and dense lines in
    /// their main tier.
    pub fn infill(&self, index: usize) -> Result<&Infill> {
        let layer = self.layer(index);
        layer
            .infill
            .get_or_init(|| {
                let split = self.disjoint_infill(index)?;
                let empty = SegmentSet::new(layer.context);
                let settings = &self.settings;
                let dense = InfillOptions {
                    spacing: settings.resolution,
                    parity: index % 2 == 1,
                    min_segment_length: settings.fill.min_segment_length,
                    ..Default::default()
                };
                let fill = |region: &PolygonSet, pattern: FillPattern, options: &InfillOptions| {
                    infill_generate(region, pattern, options)
                        .map_err(|source| SlicerError::FillFailed { layer: index, source })
                };

                match (layer.kind, settings.fill.fill_type.pattern()) {
                    (LayerKind::Raft(tier), _) => {
                        let spacing = match tier {
                            RaftTier::Base => settings.raft.spacing,
                            RaftTier::Main => settings.resolution,
                        };
                        let options = InfillOptions { spacing, ..dense };
                        Ok(Infill {
                            inner: empty,
                            solid: fill(&split.solid, FillPattern::Linear, &options)?,
                        })
                    }
                    (LayerKind::Mesh, None) => Ok(Infill {
                        inner: empty.clone(),
                        solid: empty,
                    }),
                    (LayerKind::Mesh, Some(_)) if settings.fill.fill_type == FillType::Solid => {
                        Ok(Infill {
                            inner: empty,
                            solid: fill(self.infill_contour(index), FillPattern::Linear, &dense)?,
                        })
                    }
                    (LayerKind::Mesh, Some(pattern)) => {
                        let sparse = InfillOptions {
                            spacing: settings.sparse_spacing(),
                            ..dense
                        };
                        Ok(Infill {
                            inner: fill(&split.inner, pattern, &sparse)?,
                            solid: fill(&split.solid, FillPattern::Linear, &dense)?,
                        })
                    }
                }
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FillSettings;
    use approx::assert_relative_eq;
    use stratum_geom2d::{coverage, difference, intersection, union};
    use stratum_math::{Axis, Point2};

    const PRECISION: u32 = 4;

    fn square_source(height: f64, min: f64, max: f64) -> SegmentSet {
        let ctx = Context::new(Axis::Z, height, PRECISION);
        PolygonSet::rectangle(ctx, Point2::new(min, min), Point2::new(max, max)).outline()
    }

    /// `count` layers 1 apart; `sizes[i]` is the side of layer i's square.
    fn stack(settings: SliceSettings, sizes: &[f64]) -> LayerStack {
        let mesh = sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Layer::mesh(i, square_source(i as f64, 0.0, size)))
            .collect();
        LayerStack::new(settings, Vec::new(), mesh)
    }

    fn settings(wall_count: usize, top_layers: usize) -> SliceSettings {
        SliceSettings {
            resolution: 0.2,
            wall_count,
            top_layers,
            ..Default::default()
        }
    }

    fn contains_region(outer: &PolygonSet, inner: &PolygonSet) -> bool {
        let outside = difference(inner, outer).unwrap();
        outside.area() < 1e-6
    }

    #[test]
    fn test_neighbors_are_bounds_checked() {
        let s = stack(settings(1, 1), &[4.0, 4.0, 4.0]);
        assert_eq!(s.below(0), None);
        assert_eq!(s.below(1), Some(0));
        assert_eq!(s.above(2), None);
        assert_eq!(s.above(1), Some(2));
        assert_eq!(s.above(usize::MAX), None);
        assert!(s.get(3).is_none());
    }

    #[test]
    #[should_panic]
    fn test_stage_accessor_past_end_panics() {
        let s = stack(settings(1, 1), &[4.0, 4.0]);
        assert!(s.get(s.len()).is_none());
        s.infill_contour(s.len());
    }

    #[test]
    fn test_base_resolves_source() {
        let s = stack(settings(1, 1), &[4.0]);
        assert!(!s.get(0).unwrap().is_computed(Stage::Base));
        assert_relative_eq!(s.base(0).area(), 16.0, epsilon = 1e-9);
        assert!(s.get(0).unwrap().is_computed(Stage::Base));
    }

    #[test]
    fn test_walls_nest_inward() {
        let s = stack(settings(3, 1), &[4.0]);
        let walls = s.print_contours(0);
        assert_eq!(walls.len(), 3);
        // 4 - 0.2, then 0.4 smaller per wall.
        for (k, side) in [3.8, 3.4, 3.0].into_iter().enumerate() {
            assert_relative_eq!(walls[k].area(), side * side, epsilon = 1e-3);
        }
        assert!(contains_region(s.base(0), &walls[0]));
        for k in 1..walls.len() {
            assert!(contains_region(&walls[k - 1], &walls[k]));
        }
    }

    #[test]
    fn test_collapsed_walls_stop_early() {
        let s = stack(settings(5, 1), &[0.6]);
        // 0.6 -> 0.4 -> 0.0: only one wall fits.
        assert_eq!(s.print_contours(0).len(), 1);
        assert!(s.infill_contour(0).is_empty());
    }

    #[test]
    fn test_infill_contour_overlap() {
        let mut cfg = settings(1, 1);
        cfg.fill.overlap = 0.5;
        let s = stack(cfg, &[4.0]);
        // 3.8 wall shrunk by 0.1 * 0.5 on each side.
        assert_relative_eq!(s.infill_contour(0).area(), 3.7 * 3.7, epsilon = 1e-3);

        let s = stack(settings(0, 1), &[4.0]);
        assert!(s.print_contours(0).is_empty());
        // No walls: base shrunk by 0.1 * 0.85 on each side.
        assert_relative_eq!(s.infill_contour(0).area(), 3.83 * 3.83, epsilon = 1e-3);
    }

    #[test]
    fn test_stages_pull_dependencies() {
        let s = stack(settings(1, 1), &[4.0, 4.0, 4.0]);
        s.infill(1).unwrap();
        let layer = s.get(1).unwrap();
        for stage in Stage::ALL {
            if stage == Stage::LayerDifferences {
                continue;
            }
            assert!(layer.is_computed(stage), "{stage:?}");
            for dep in stage.dependencies() {
                assert!(layer.is_computed(*dep));
            }
        }
        // The exposure window reached both neighbors.
        assert!(s.get(0).unwrap().is_computed(Stage::InfillContour));
        assert!(s.get(2).unwrap().is_computed(Stage::InfillContour));
        assert!(!s.get(0).unwrap().is_computed(Stage::Infill));
    }

    #[test]
    fn test_layer_differences_against_below() {
        let s = stack(settings(0, 1), &[4.0, 2.0]);
        let bottom = s.layer_differences(0).unwrap();
        assert!(bottom.b_minus_a.is_empty());
        assert_relative_eq!(bottom.a_minus_b.area(), s.infill_contour(0).area(), epsilon = 1e-6);

        let top = s.layer_differences(1).unwrap();
        assert!(top.a_minus_b.area() < 1e-6);
        assert_relative_eq!(top.intersection.area(), s.infill_contour(1).area(), epsilon = 1e-6);
        assert!(top.b_minus_a.area() > 1.0);
        assert_eq!(top.intersection.context(), s.get(1).unwrap().context());
    }

    #[test]
    fn test_disjoint_infill_partitions_contour() {
        // Layer 2 sits in a stack of equal squares; layer 3 is smaller, so
        // the ring around it on layer 2 is exposed from above.
        let s = stack(settings(1, 1), &[6.0, 6.0, 6.0, 3.0, 3.0]);
        let contour = s.infill_contour(2);
        let split = s.disjoint_infill(2).unwrap();
        assert!(!split.inner.is_empty());
        assert!(!split.solid.is_empty());

        let overlap = intersection(&split.inner, &split.solid).unwrap();
        assert!(overlap.area() < 1e-6);
        let rebuilt = union(contour.context(), &[&split.inner, &split.solid]).unwrap();
        assert_relative_eq!(rebuilt.area(), contour.area(), epsilon = 1e-4);
        assert!(difference(contour, &rebuilt).unwrap().area() < 1e-4);

        // Inner is exactly the part under layer 3.
        assert_relative_eq!(split.inner.area(), s.infill_contour(3).area(), epsilon = 1e-4);
    }

    #[test]
    fn test_enclosed_layer_is_all_inner() {
        let s = stack(settings(1, 2), &[5.0; 7]);
        let split = s.disjoint_infill(3).unwrap();
        assert!(split.solid.is_empty());
        assert_relative_eq!(split.inner.area(), s.infill_contour(3).area(), epsilon = 1e-4);
        // Bottom and top layers lack neighbors on one side.
        assert!(s.disjoint_infill(0).unwrap().inner.is_empty());
        assert!(s.disjoint_infill(6).unwrap().inner.is_empty());
    }

    #[test]
    fn test_zero_top_layers_is_all_inner() {
        let s = stack(settings(1, 0), &[5.0]);
        let split = s.disjoint_infill(0).unwrap();
        assert!(split.solid.is_empty());
        assert_relative_eq!(split.inner.area(), s.infill_contour(0).area(), epsilon = 1e-9);
    }

    #[test]
    fn test_window_matches_coverage() {
        let s = stack(settings(1, 1), &[6.0, 4.0, 6.0]);
        let own = s.infill_contour(1);
        let ctx = *own.context();
        let neighbors = [
            s.infill_contour(0).in_context(ctx),
            s.infill_contour(2).in_context(ctx),
        ];
        let covered = coverage(&ctx, &neighbors, 2).unwrap();
        let split = s.disjoint_infill(1).unwrap();
        let expected = intersection(own, &covered).unwrap();
        assert_relative_eq!(split.inner.area(), expected.area(), epsilon = 1e-6);
    }

    #[test]
    fn test_solid_fill_ignores_split() {
        let mut cfg = settings(1, 1);
        cfg.fill = FillSettings {
            fill_type: FillType::Solid,
            ..Default::default()
        };
        let s = stack(cfg, &[4.0, 4.0, 4.0]);
        let fill = s.infill(1).unwrap();
        assert!(fill.inner.is_empty());
        // One line per resolution step across the contour.
        let area = s.infill_contour(1).area();
        assert_relative_eq!(fill.solid.total_length(), area / 0.2, max_relative = 0.05);
    }

    #[test]
    fn test_sparse_fill_is_lighter() {
        let s = stack(settings(1, 1), &[6.0, 6.0, 6.0]);
        let fill = s.infill(1).unwrap();
        assert!(fill.solid.is_empty());
        let dense_length = s.infill_contour(1).area() / 0.2;
        let ratio = fill.inner.total_length() / dense_length;
        assert!((ratio - 0.2).abs() < 0.05, "ratio {ratio}");
    }

    #[test]
    fn test_no_fill_type() {
        let mut cfg = settings(1, 1);
        cfg.fill.fill_type = FillType::None;
        let s = stack(cfg, &[4.0]);
        assert!(s.infill(0).unwrap().is_empty());
    }

    #[test]
    fn test_fill_failure_names_layer() {
        let mut cfg = settings(0, 0);
        cfg.resolution = 1e-4;
        cfg.precision = 6;
        cfg.fill.fill_type = FillType::Solid;
        let s = stack(cfg, &[200.0]);
        match s.infill(0) {
            Err(SlicerError::FillFailed { layer, .. }) => assert_eq!(layer, 0),
            other => panic!("expected fill failure, got {other:?}"),
        }
        // Cached, including the error.
        assert!(s.get(0).unwrap().is_computed(Stage::Infill));
        assert!(s.infill(0).is_err());
    }
}
