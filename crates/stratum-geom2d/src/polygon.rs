//! Clean polygon sets.

use geo::{Area, BoundingRect, Coord, LineString, MultiPolygon, Polygon};
use stratum_math::Point2;

use crate::context::Context;
use crate::segment::{Segment, SegmentSet};

/// Non-overlapping polygons with holes, in one plane.
///
/// Produced by the boolean and offset operations in [`crate::ops`]; outer
/// rings wind counter-clockwise and holes clockwise.
#[derive(Debug, Clone)]
pub struct PolygonSet {
    context: Context,
    shape: MultiPolygon<f64>,
}

impl PolygonSet {
    /// The empty region.
    pub fn empty(context: Context) -> Self {
        Self {
            context,
            shape: MultiPolygon::new(Vec::new()),
        }
    }

    /// Wrap a multipolygon that is already clean.
    pub fn from_multi_polygon(context: Context, shape: MultiPolygon<f64>) -> Self {
        Self { context, shape }
    }

    /// Axis-aligned rectangle, mostly useful for tests and fixtures.
    pub fn rectangle(context: Context, min: Point2, max: Point2) -> Self {
        let ring = vec![
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ];
        Self::from_multi_polygon(
            context,
            MultiPolygon::new(vec![Polygon::new(to_ring(&ring), Vec::new())]),
        )
    }

    /// The plane this region lives in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Underlying geometry.
    pub fn multi_polygon(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    /// Number of disjoint polygons.
    pub fn len(&self) -> usize {
        self.shape.0.len()
    }

    /// True if the region is empty.
    pub fn is_empty(&self) -> bool {
        self.shape.0.is_empty()
    }

    /// Enclosed area, holes excluded.
    pub fn area(&self) -> f64 {
        self.shape.unsigned_area()
    }

    /// `(min, max)` corners of the bounding box.
    pub fn bounding_box(&self) -> Option<(Point2, Point2)> {
        let rect = self.shape.bounding_rect()?;
        Some((
            Point2::new(rect.min().x, rect.min().y),
            Point2::new(rect.max().x, rect.max().y),
        ))
    }

    /// Total length of all rings.
    pub fn perimeter(&self) -> f64 {
        self.rings()
            .flat_map(|ring| ring.lines())
            .map(|l| (l.dx() * l.dx() + l.dy() * l.dy()).sqrt())
            .sum()
    }

    /// Every ring, exteriors and holes alike.
    pub fn rings(&self) -> impl Iterator<Item = &LineString<f64>> {
        self.shape
            .0
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
    }

    /// Whether `point` lies strictly inside the region.
    pub fn contains(&self, point: &Point2) -> bool {
        self.shape.0.iter().any(|polygon| {
            std::iter::once(polygon.exterior())
                .chain(polygon.interiors())
                .filter(|ring| ring_encloses(ring, point))
                .count()
                % 2
                == 1
        })
    }

    /// The same region re-expressed in another plane.
    ///
    /// Coordinates are kept; only the frame changes.
    pub fn in_context(&self, context: Context) -> Self {
        Self {
            context,
            shape: self.shape.clone(),
        }
    }

    /// Drop polygons whose area is below `min_area`.
    pub fn without_slivers(&self, min_area: f64) -> Self {
        let kept = self
            .shape
            .0
            .iter()
            .filter(|p| p.unsigned_area() >= min_area)
            .cloned()
            .collect();
        Self {
            context: self.context,
            shape: MultiPolygon::new(kept),
        }
    }

    /// Ring edges as segments, ring by ring in traversal order.
    pub fn outline(&self) -> SegmentSet {
        let segments = self
            .rings()
            .flat_map(|ring| ring.lines())
            .map(|l| {
                Segment::new(
                    Point2::new(l.start.x, l.start.y),
                    Point2::new(l.end.x, l.end.y),
                )
            })
            .collect();
        SegmentSet::from_segments(self.context, segments)
    }
}

/// Close a point loop into a geo ring.
pub(crate) fn to_ring(points: &[Point2]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    if let Some(&first) = coords.first() {
        coords.push(first);
    }
    LineString::new(coords)
}

/// Even-odd ray cast toward +x: is `point` inside `ring`?
fn ring_encloses(ring: &LineString<f64>, point: &Point2) -> bool {
    let mut inside = false;
    for l in ring.lines() {
        let (pi, pj) = (l.start, l.end);
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
    }
    inside
}
