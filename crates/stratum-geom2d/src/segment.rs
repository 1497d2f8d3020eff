//! Unordered line segment sets.
//!
//! Slicing produces a [`SegmentSet`] per plane. Before it can be resolved
//! into polygons, near-coincident endpoints are merged ([`SegmentSet::decimate`])
//! and the segments are chained head to tail into loops ([`SegmentSet::chain`]).

use std::collections::{HashMap, HashSet};

use stratum_math::{Point2, Point3};

use crate::context::Context;

/// A directed 2D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub a: Point2,
    /// End point.
    pub b: Point2,
}

impl Segment {
    /// Create a segment from `a` to `b`.
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    /// The same segment traversed the other way.
    pub fn reversed(&self) -> Self {
        Self::new(self.b, self.a)
    }
}

/// Segments lying in one plane.
#[derive(Debug, Clone)]
pub struct SegmentSet {
    context: Context,
    segments: Vec<Segment>,
}

/// Loops recovered from a segment set.
#[derive(Debug, Clone, Default)]
pub struct Chains {
    /// Closed loops, without repeating the first point.
    pub loops: Vec<Vec<Point2>>,
    /// Chains that ran into a dead end and were dropped.
    pub open: usize,
}

impl SegmentSet {
    /// An empty set in `context`.
    pub fn new(context: Context) -> Self {
        Self {
            context,
            segments: Vec::new(),
        }
    }

    /// Wrap existing segments.
    pub fn from_segments(context: Context, segments: Vec<Segment>) -> Self {
        Self { context, segments }
    }

    /// The plane these segments live in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Add a segment.
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Append every segment of `other`.
    pub fn extend(&mut self, other: &SegmentSet) {
        self.segments.extend_from_slice(&other.segments);
    }

    /// The segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if there are no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of segment lengths.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Endpoints placed back in 3D.
    pub fn lift(&self) -> Vec<[Point3; 2]> {
        self.segments
            .iter()
            .map(|s| [self.context.lift(&s.a), self.context.lift(&s.b)])
            .collect()
    }

    /// Merge endpoints that share a `tolerance` grid cell, or sit within
    /// `tolerance` of a point already kept in a neighboring cell.
    ///
    /// Segments whose ends collapse onto one point disappear, and repeated
    /// segments are kept once. Every surviving endpoint is replaced by the
    /// first point it merged with, so chaining can match ends exactly.
    pub fn decimate(&self, tolerance: f64) -> SegmentSet {
        let tolerance = tolerance.max(self.context.quantum());
        let mut snap = Snapper::new(tolerance);
        let mut seen = HashSet::new();
        let mut segments = Vec::with_capacity(self.segments.len());

        for s in &self.segments {
            let (ka, a) = snap.point(s.a);
            let (kb, b) = snap.point(s.b);
            if ka == kb {
                continue;
            }
            if seen.insert((ka, kb)) {
                segments.push(Segment::new(a, b));
            }
        }

        SegmentSet {
            context: self.context,
            segments,
        }
    }

    /// Chain segments head to tail into closed loops.
    ///
    /// Ends are matched exactly, so call [`decimate`](Self::decimate) first
    /// on raw slicing output.
    pub fn chain(&self) -> Chains {
        let mut starts: HashMap<[u64; 2], Vec<usize>> = HashMap::new();
        for (i, s) in self.segments.iter().enumerate() {
            starts.entry(point_key(&s.a)).or_default().push(i);
        }

        let mut used = vec![false; self.segments.len()];
        let mut chains = Chains::default();

        for first in 0..self.segments.len() {
            if used[first] {
                continue;
            }
            used[first] = true;
            let origin = point_key(&self.segments[first].a);
            let mut points = vec![self.segments[first].a];
            let mut tail = self.segments[first].b;

            let closed = loop {
                let key = point_key(&tail);
                if key == origin {
                    break true;
                }
                points.push(tail);
                let next = starts
                    .get(&key)
                    .and_then(|candidates| candidates.iter().copied().find(|&c| !used[c]));
                match next {
                    Some(n) => {
                        used[n] = true;
                        tail = self.segments[n].b;
                    }
                    None => break false,
                }
            };

            if closed && points.len() >= 3 {
                chains.loops.push(points);
            } else if !closed {
                chains.open += 1;
            }
        }

        chains
    }
}

fn point_key(p: &Point2) -> [u64; 2] {
    [p.x.to_bits(), p.y.to_bits()]
}

/// Maps points to grid cells, remembering the first point seen per cell.
///
/// A point whose own cell is still empty joins a representative in one of
/// the eight surrounding cells if that one lies within `tolerance`, so
/// near-identical points on either side of a cell edge still merge.
struct Snapper {
    tolerance: f64,
    inv: f64,
    cells: HashMap<(i64, i64), Point2>,
}

impl Snapper {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            inv: 1.0 / tolerance,
            cells: HashMap::new(),
        }
    }

    fn point(&mut self, p: Point2) -> ((i64, i64), Point2) {
        let cell = (
            (p.x * self.inv).floor() as i64,
            (p.y * self.inv).floor() as i64,
        );
        if let Some(&rep) = self.cells.get(&cell) {
            return (cell, rep);
        }

        let mut nearest: Option<((i64, i64), Point2, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (cell.0 + dx, cell.1 + dy);
                let Some(&rep) = self.cells.get(&key) else {
                    continue;
                };
                let d = (rep - p).norm();
                if d <= self.tolerance && nearest.map_or(true, |(_, _, best)| d < best) {
                    nearest = Some((key, rep, d));
                }
            }
        }

        match nearest {
            Some((key, rep, _)) => (key, rep),
            None => {
                self.cells.insert(cell, p);
                (cell, p)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_math::Axis;

    fn ctx() -> Context {
        Context::new(Axis::Z, 0.0, 4)
    }

    fn square() -> Vec<Segment> {
        let p = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        (0..4).map(|i| Segment::new(p[i], p[(i + 1) % 4])).collect()
    }

    #[test]
    fn test_chain_closes_square() {
        let mut segments = square();
        segments.swap(0, 2);
        let set = SegmentSet::from_segments(ctx(), segments);
        let chains = set.chain();
        assert_eq!(chains.loops.len(), 1);
        assert_eq!(chains.loops[0].len(), 4);
        assert_eq!(chains.open, 0);
    }

    #[test]
    fn test_decimate_merges_close_ends() {
        // Break the loop by a tiny gap at two corners.
        let mut segments = square();
        segments[0].b.x += 1e-7;
        segments[2].b.y -= 1e-7;
        let set = SegmentSet::from_segments(ctx(), segments);
        assert_eq!(set.chain().loops.len(), 0);

        let chains = set.decimate(1e-3).chain();
        assert_eq!(chains.loops.len(), 1);
        assert_eq!(chains.open, 0);
    }

    #[test]
    fn test_decimate_merges_across_cell_edge() {
        // 1.0 - 1e-9 and 1.0 + 1e-9 fall in different 1e-3 cells.
        let p = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0 - 1e-9, 0.0),
            Point2::new(1.0 + 1e-9, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let set = SegmentSet::from_segments(
            ctx(),
            vec![
                Segment::new(p[0], p[1]),
                Segment::new(p[2], p[3]),
                Segment::new(p[3], p[4]),
                Segment::new(p[4], p[0]),
            ],
        );
        let decimated = set.decimate(1e-3);
        assert_eq!(decimated.len(), 4);
        let chains = decimated.chain();
        assert_eq!(chains.open, 0);
        assert_eq!(chains.loops.len(), 1);
        assert_eq!(chains.loops[0].len(), 4);
    }

    #[test]
    fn test_decimate_keeps_points_a_cell_apart() {
        let set = SegmentSet::from_segments(
            ctx(),
            vec![Segment::new(Point2::new(0.0, 0.0), Point2::new(1.5e-3, 0.0))],
        );
        assert_eq!(set.decimate(1e-3).len(), 1);
    }

    #[test]
    fn test_decimate_drops_short_and_duplicate() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        let set = SegmentSet::from_segments(
            ctx(),
            vec![
                Segment::new(a, b),
                Segment::new(a, b),
                Segment::new(a, Point2::new(1e-6, 0.0)),
            ],
        );
        assert_eq!(set.decimate(1e-3).len(), 1);
    }

    #[test]
    fn test_open_chain_counted() {
        let set = SegmentSet::from_segments(
            ctx(),
            vec![
                Segment::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)),
                Segment::new(Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)),
            ],
        );
        let chains = set.chain();
        assert!(chains.loops.is_empty());
        assert_eq!(chains.open, 1);
    }

    #[test]
    fn test_lift_uses_plane_height() {
        let mut set = SegmentSet::new(Context::new(Axis::Z, 2.5, 3));
        set.push(Segment::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)));
        assert_eq!(set.total_length(), 5.0);
        let lifted = set.lift();
        assert_eq!(lifted[0][1], Point3::new(3.0, 4.0, 2.5));
    }
}
