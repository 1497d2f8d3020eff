//! Sweep-plane mesh slicing.
//!
//! Faces are bucketed by the first plane that can reach them, then the
//! planes are visited bottom to top with a working set of candidate faces.
//! A face joins the set at its bucket and leaves once the plane has passed
//! its top, so each face is only tested against the planes it spans.

use stratum_geom2d::{Context, Segment, SegmentSet};
use stratum_math::{Axis, Point2, Point3, Tolerance, Vec2, Vec3};
use stratum_mesh::Mesh;
use tracing::debug;

use crate::bounds::FaceBoundsIndex;

/// Evenly spaced slicing planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlicePlanes {
    first: f64,
    spacing: f64,
    count: usize,
}

impl SlicePlanes {
    /// Planes covering `[min, max]`: the first sits half a spacing above
    /// `min` and there are `floor(0.5 + (max - min) / spacing) + 1` of them.
    ///
    /// A zero or negative extent gives no planes.
    pub fn covering(min: f64, max: f64, spacing: f64) -> Self {
        let extent = max - min;
        let count = if extent > 0.0 && spacing > 0.0 {
            (0.5 + extent / spacing).floor() as usize + 1
        } else {
            0
        };
        Self {
            first: min + 0.5 * spacing,
            spacing,
            count,
        }
    }

    /// Planes covering every face of `index`.
    pub fn for_index(index: &FaceBoundsIndex, spacing: f64) -> Self {
        if index.is_empty() {
            return Self::covering(0.0, 0.0, spacing);
        }
        Self::covering(index.min(), index.max(), spacing)
    }

    /// Number of planes.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Distance between consecutive planes.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Height of plane `i`.
    pub fn height(&self, i: usize) -> f64 {
        self.first + i as f64 * self.spacing
    }

    /// Every plane height, lowest first.
    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|i| self.height(i))
    }

    /// First plane that can intersect a face whose lowest point is at
    /// `face_min`.
    pub fn bucket(&self, face_min: f64) -> usize {
        let last = self.count.saturating_sub(1);
        if face_min <= self.first {
            0
        } else if face_min > self.height(last) {
            last
        } else {
            let mut k = (((face_min - self.first) / self.spacing).ceil() as usize).min(last);
            // The quotient can round one step off either way.
            while k > 0 && self.height(k - 1) >= face_min {
                k -= 1;
            }
            while k < last && self.height(k) < face_min {
                k += 1;
            }
            k
        }
    }
}

/// Triangle vertices ordered along the slicing axis.
#[derive(Debug, Clone, Copy)]
struct SortedTriangle {
    low: Point3,
    mid: Point3,
    high: Point3,
    /// The reorder was an odd permutation, reversing the winding.
    flipped: bool,
}

impl SortedTriangle {
    fn new(mut v: [Point3; 3], axis: Axis) -> Self {
        let mut flipped = false;
        for (i, j) in [(0, 1), (1, 2), (0, 1)] {
            if axis.height(&v[i]) > axis.height(&v[j]) {
                v.swap(i, j);
                flipped = !flipped;
            }
        }
        Self {
            low: v[0],
            mid: v[1],
            high: v[2],
            flipped,
        }
    }

    /// Normal implied by the original vertex winding.
    fn winding_normal(&self) -> Vec3 {
        let n = (self.mid - self.low).cross(&(self.high - self.low));
        if self.flipped {
            -n
        } else {
            n
        }
    }
}

/// Point where the edge `p -> q` crosses the plane at `height`.
///
/// `p` must be the lower end so both faces sharing an edge produce the same
/// bits.
fn cut(p: &Point3, q: &Point3, height: f64, axis: Axis) -> Point2 {
    let (hp, hq) = (axis.height(p), axis.height(q));
    let t = (height - hp) / (hq - hp);
    axis.project(&(p + (q - p) * t))
}

/// Intersect one triangle with the plane at `height`.
///
/// Vertices on the plane count as below it. The segment is oriented so the
/// solid lies on its left, given the outward `normal`; outer loops then run
/// counter-clockwise. Returns `None` for triangles entirely on one side and
/// for cuts that degenerate to a point.
pub fn slice_triangle(
    triangle: [Point3; 3],
    normal: &Vec3,
    height: f64,
    axis: Axis,
) -> Option<Segment> {
    let t = SortedTriangle::new(triangle, axis);
    let (ha, hb, hc) = (
        axis.height(&t.low),
        axis.height(&t.mid),
        axis.height(&t.high),
    );
    if hc <= height || ha > height {
        return None;
    }

    let (p, q) = if hb > height {
        (
            cut(&t.low, &t.mid, height, axis),
            cut(&t.low, &t.high, height, axis),
        )
    } else {
        (
            cut(&t.mid, &t.high, height, axis),
            cut(&t.low, &t.high, height, axis),
        )
    };
    let tol = Tolerance::DEFAULT;
    if tol.is_zero((q - p).norm()) {
        return None;
    }

    let mut n = axis.project_vec(normal);
    if tol.is_zero(n.norm()) {
        n = axis.project_vec(&t.winding_normal());
    }
    let tangent = Vec2::new(-n.y, n.x);
    let segment = Segment::new(p, q);
    if (q - p).dot(&tangent) < 0.0 {
        Some(segment.reversed())
    } else {
        Some(segment)
    }
}

/// Slice `mesh` at every plane, returning one segment set per plane in a
/// context at that plane's height.
pub fn sweep(
    mesh: &Mesh,
    index: &FaceBoundsIndex,
    planes: &SlicePlanes,
    precision: u32,
) -> Vec<SegmentSet> {
    let axis = index.axis();
    let count = planes.count();
    if count == 0 {
        return Vec::new();
    }

    let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); count];
    for bound in index.bounds() {
        buckets[planes.bucket(bound.min)].push(bound.face);
    }

    let faces = mesh.faces();
    let mut candidates: Vec<usize> = Vec::new();
    let mut peak = 0;
    let mut total = 0;
    let mut out = Vec::with_capacity(count);

    for (i, bucket) in buckets.into_iter().enumerate() {
        let height = planes.height(i);
        candidates.extend(bucket);
        let mut set = SegmentSet::new(Context::new(axis, height, precision));

        // Faces whose top touches the plane contribute nothing here or above.
        candidates.retain(|&face| {
            if index.bounds()[face].max <= height {
                return false;
            }
            if let Some(s) = slice_triangle(mesh.triangle(face), &faces[face].normal, height, axis) {
                set.push(s);
            }
            true
        });

        peak = peak.max(candidates.len());
        total += set.len();
        out.push(set);
    }

    debug!(
        faces = index.len(),
        planes = count,
        peak_candidates = peak,
        segments = total,
        "Swept mesh"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use stratum_mesh::triangle_normal;

    fn convex_area(points: &[Point2]) -> f64 {
        let n = points.len() as f64;
        let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| {
            let ta = (a.y - cy).atan2(a.x - cx);
            let tb = (b.y - cy).atan2(b.x - cx);
            ta.total_cmp(&tb)
        });
        let mut area = 0.0;
        for i in 0..sorted.len() {
            let (p, q) = (sorted[i], sorted[(i + 1) % sorted.len()]);
            area += p.x * q.y - q.x * p.y;
        }
        area.abs() / 2.0
    }

    fn loop_area(points: &[Point2]) -> f64 {
        let mut area = 0.0;
        for i in 0..points.len() {
            let (p, q) = (points[i], points[(i + 1) % points.len()]);
            area += p.x * q.y - q.x * p.y;
        }
        area / 2.0
    }

    #[test]
    fn test_slice_count_formula() {
        let planes = SlicePlanes::covering(0.0, 1.0, 0.5);
        assert_eq!(planes.count(), 3);
        let heights: Vec<f64> = planes.heights().collect();
        assert_eq!(heights, vec![0.25, 0.75, 1.25]);

        let planes = SlicePlanes::covering(-2.0, 1.3, 0.3);
        assert_eq!(planes.count(), (0.5f64 + 3.3 / 0.3).floor() as usize + 1);
        let heights: Vec<f64> = planes.heights().collect();
        for w in heights.windows(2) {
            assert!(w[1] > w[0]);
            assert_relative_eq!(w[1] - w[0], 0.3, epsilon = 1e-12);
        }
        assert_relative_eq!(heights[0], -1.85, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_extent_has_no_planes() {
        assert_eq!(SlicePlanes::covering(1.0, 1.0, 0.2).count(), 0);
        let index = FaceBoundsIndex::new(&Mesh::default(), Axis::Z);
        assert_eq!(SlicePlanes::for_index(&index, 0.2).count(), 0);
    }

    #[test]
    fn test_bucket_clamps() {
        let planes = SlicePlanes::covering(0.0, 1.0, 0.25);
        // planes at 0.125, 0.375, 0.625, 0.875, 1.125
        assert_eq!(planes.bucket(-5.0), 0);
        assert_eq!(planes.bucket(0.125), 0);
        assert_eq!(planes.bucket(0.2), 1);
        assert_eq!(planes.bucket(0.375), 1);
        assert_eq!(planes.bucket(0.9), 4);
        assert_eq!(planes.bucket(50.0), 4);
    }

    #[test]
    fn test_bucket_of_plane_height_is_that_plane() {
        let planes = SlicePlanes::covering(0.0, 20.0, 0.1);
        let last = planes.count() - 1;
        for k in 0..planes.count() {
            let h = planes.height(k);
            assert_eq!(planes.bucket(h), k, "plane {k} at {h}");
            assert_eq!(planes.bucket(h + 1e-9), (k + 1).min(last));
        }
    }

    #[test]
    fn test_sweep_keeps_edges_lying_on_planes() {
        let planes = SlicePlanes::covering(0.0, 2.0, 0.1);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        // One upright wedge per inner plane, bottom edge exactly on it.
        for k in 1..planes.count() - 1 {
            let (x, h) = (k as f64, planes.height(k));
            let first = vertices.len() as u32;
            vertices.push(Point3::new(x, 0.0, h));
            vertices.push(Point3::new(x, 1.0, h));
            vertices.push(Point3::new(x, 0.5, h + 0.05));
            indices.extend([first, first + 1, first + 2]);
        }
        let mesh = Mesh::from_triangles(vertices, &indices).unwrap();
        let index = FaceBoundsIndex::new(&mesh, Axis::Z);
        let swept = sweep(&mesh, &index, &planes, 4);

        for (i, set) in swept.iter().enumerate() {
            let height = planes.height(i);
            let brute = (0..mesh.face_count())
                .filter_map(|f| {
                    slice_triangle(mesh.triangle(f), &mesh.faces()[f].normal, height, Axis::Z)
                })
                .count();
            let expected = usize::from(i > 0 && i + 1 < planes.count());
            assert_eq!(brute, expected, "plane {i}");
            assert_eq!(set.len(), brute, "plane {i}");
        }
    }

    #[test]
    fn test_triangle_on_one_side_yields_nothing() {
        let tri = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 1.0, 3.0),
        ];
        let n = triangle_normal(&tri[0], &tri[1], &tri[2]);
        assert!(slice_triangle(tri, &n, 0.5, Axis::Z).is_none());
        assert!(slice_triangle(tri, &n, 3.5, Axis::Z).is_none());
        // Top vertex on the plane: the whole triangle is below.
        assert!(slice_triangle(tri, &n, 3.0, Axis::Z).is_none());
        // Bottom vertex on the plane: the cut collapses to a point.
        assert!(slice_triangle(tri, &n, 1.0, Axis::Z).is_none());
    }

    #[test]
    fn test_slicing_conserves_area() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 2.0, 2.0),
        ];
        let n = triangle_normal(&tri[0], &tri[1], &tri[2]);
        let total = convex_area(&tri.map(|p| Axis::Z.project(&p)));

        for height in [0.3, 1.0, 1.5, 1.99] {
            let s = slice_triangle(tri, &n, height, Axis::Z).unwrap();
            let mut below = vec![s.a, s.b];
            let mut above = vec![s.a, s.b];
            for p in &tri {
                if p.z <= height {
                    below.push(Axis::Z.project(p));
                } else {
                    above.push(Axis::Z.project(p));
                }
            }
            let sum = convex_area(&below) + convex_area(&above);
            assert_relative_eq!(sum, total, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_vertex_on_plane_is_below() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(0.0, 2.0, 2.0),
        ];
        let n = triangle_normal(&tri[0], &tri[1], &tri[2]);
        let s = slice_triangle(tri, &n, 1.0, Axis::Z).unwrap();
        let mid = Point2::new(2.0, 0.0);
        assert!(s.a == mid || s.b == mid);
    }

    #[test]
    fn test_segment_has_solid_on_left() {
        // Side of a box facing -y: the solid is at +y.
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
        ];
        let normal = Vec3::new(0.0, -1.0, 0.0);
        let s = slice_triangle(tri, &normal, 0.5, Axis::Z).unwrap();
        assert!(s.b.x > s.a.x);

        // A bad stored normal falls back to the winding.
        let s = slice_triangle(tri, &Vec3::z(), 0.5, Axis::Z).unwrap();
        assert!(s.b.x > s.a.x);
    }

    #[test]
    fn test_sweep_matches_brute_force() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(2.0, 1.0, 3.0));
        let index = FaceBoundsIndex::new(&mesh, Axis::Z);
        let planes = SlicePlanes::for_index(&index, 0.4);
        let swept = sweep(&mesh, &index, &planes, 4);
        assert_eq!(swept.len(), planes.count());

        for (i, set) in swept.iter().enumerate() {
            let height = planes.height(i);
            assert_eq!(set.context().offset, height);
            let brute = (0..mesh.face_count())
                .filter_map(|f| {
                    slice_triangle(mesh.triangle(f), &mesh.faces()[f].normal, height, Axis::Z)
                })
                .count();
            assert_eq!(set.len(), brute);
        }
    }

    #[test]
    fn test_sweep_closes_ccw_loops() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let index = FaceBoundsIndex::new(&mesh, Axis::Z);
        let planes = SlicePlanes::for_index(&index, 0.5);
        let swept = sweep(&mesh, &index, &planes, 4);

        for set in &swept[..2] {
            let chains = set.decimate(1e-3).chain();
            assert_eq!(chains.open, 0);
            assert_eq!(chains.loops.len(), 1);
            assert_relative_eq!(loop_area(&chains.loops[0]), 1.0, epsilon = 1e-9);
        }
        // The last plane is above the cube.
        assert!(swept[2].is_empty());
    }

    #[test]
    fn test_sweep_along_x() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let index = FaceBoundsIndex::new(&mesh, Axis::X);
        let planes = SlicePlanes::for_index(&index, 0.25);
        let swept = sweep(&mesh, &index, &planes, 4);
        let chains = swept[1].decimate(1e-3).chain();
        assert_eq!(chains.loops.len(), 1);
        // (y, z) cross-section of a 2 x 3 box, counter-clockwise.
        assert_relative_eq!(loop_area(&chains.loops[0]), 6.0, epsilon = 1e-9);
    }
}
