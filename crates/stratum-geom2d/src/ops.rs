//! Boolean and offset operations.
//!
//! These delegate to Clipper through `geo-clipper`, which quantizes every
//! coordinate onto the integer grid given by [`Context::factor`]. Binary
//! operations require both operands to share one [`Context`].

use geo::{MultiPolygon, Polygon};
use geo_clipper::{Clipper, EndType, JoinType};
use stratum_math::Point2;

use crate::context::Context;
use crate::error::{GeomError, Result};
use crate::polygon::{to_ring, PolygonSet};

/// Three-way split of two regions.
#[derive(Debug, Clone)]
pub struct FullDifference {
    /// Part of A not covered by B.
    pub a_minus_b: PolygonSet,
    /// Part of B not covered by A.
    pub b_minus_a: PolygonSet,
    /// Part of A covered by B.
    pub intersection: PolygonSet,
}

fn ensure_same(expected: &Context, found: &Context) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(GeomError::ContextMismatch {
            expected: *expected,
            found: *found,
        })
    }
}

fn empty_shape() -> MultiPolygon<f64> {
    MultiPolygon::new(Vec::new())
}

/// Resolve raw point loops into a clean region.
///
/// Counter-clockwise loops add area and clockwise loops cut it away. Loops
/// are applied largest first, so a hole removes what its enclosing outline
/// added and an island inside the hole puts it back, at any nesting depth.
/// Same-orientation loops may overlap; the result never self-intersects.
pub fn resolve_loops(context: Context, loops: &[Vec<Point2>]) -> PolygonSet {
    let mut ordered: Vec<(f64, &[Point2])> = loops
        .iter()
        .filter(|points| points.len() >= 3)
        .map(|points| (signed_area(points), points.as_slice()))
        .filter(|(area, _)| *area != 0.0)
        .collect();
    // An enclosing loop is always larger than the loops it encloses.
    ordered.sort_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));

    let factor = context.factor();
    let mut shape = empty_shape();
    for run in ordered.chunk_by(|a, b| (a.0 > 0.0) == (b.0 > 0.0)) {
        let adds = run[0].0 > 0.0;
        let polygons = run
            .iter()
            .map(|&(_, points)| {
                if adds {
                    Polygon::new(to_ring(points), Vec::new())
                } else {
                    let reversed: Vec<Point2> = points.iter().rev().copied().collect();
                    Polygon::new(to_ring(&reversed), Vec::new())
                }
            })
            .collect();
        let batch = MultiPolygon::new(polygons).union(&empty_shape(), factor);
        shape = if adds {
            shape.union(&batch, factor)
        } else {
            shape.difference(&batch, factor)
        };
    }
    PolygonSet::from_multi_polygon(context, shape)
}

/// Union of any number of regions sharing `context`.
pub fn union(context: &Context, sets: &[&PolygonSet]) -> Result<PolygonSet> {
    if sets.is_empty() {
        return Ok(PolygonSet::empty(*context));
    }
    let factor = context.factor();
    let mut acc = empty_shape();
    for set in sets {
        ensure_same(context, set.context())?;
        acc = set.multi_polygon().union(&acc, factor);
    }
    Ok(PolygonSet::from_multi_polygon(*context, acc))
}

/// Re-run union on a single region, repairing any self-overlap.
pub fn clean(set: &PolygonSet) -> PolygonSet {
    if set.is_empty() {
        return set.clone();
    }
    let shape = set
        .multi_polygon()
        .union(&empty_shape(), set.context().factor());
    PolygonSet::from_multi_polygon(*set.context(), shape)
}

/// Part of `a` inside `b`.
pub fn intersection(a: &PolygonSet, b: &PolygonSet) -> Result<PolygonSet> {
    ensure_same(a.context(), b.context())?;
    if a.is_empty() || b.is_empty() {
        return Ok(PolygonSet::empty(*a.context()));
    }
    let shape = a
        .multi_polygon()
        .intersection(b.multi_polygon(), a.context().factor());
    Ok(PolygonSet::from_multi_polygon(*a.context(), shape))
}

/// Part of `a` outside `b`.
pub fn difference(a: &PolygonSet, b: &PolygonSet) -> Result<PolygonSet> {
    ensure_same(a.context(), b.context())?;
    if a.is_empty() || b.is_empty() {
        return Ok(a.clone());
    }
    let shape = a
        .multi_polygon()
        .difference(b.multi_polygon(), a.context().factor());
    Ok(PolygonSet::from_multi_polygon(*a.context(), shape))
}

/// Grow (positive `distance`) or shrink (negative) a region.
///
/// Convex corners are rounded with an arc tolerance of a quarter of
/// `resolution`. Shrinking can split a region or make it vanish.
pub fn offset(set: &PolygonSet, distance: f64, resolution: f64) -> PolygonSet {
    if set.is_empty() {
        return set.clone();
    }
    let context = *set.context();
    let arc_tolerance = (resolution * 0.25).max(context.quantum());
    let shape = set.multi_polygon().offset(
        distance,
        JoinType::Round(arc_tolerance),
        EndType::ClosedPolygon,
        context.factor(),
    );
    PolygonSet::from_multi_polygon(context, shape)
}

/// Region covered by at least `min_depth` of `sets`.
///
/// Tracks one accumulated region per depth level: adding a set raises
/// everything it overlaps by one level.
pub fn coverage(context: &Context, sets: &[PolygonSet], min_depth: usize) -> Result<PolygonSet> {
    for set in sets {
        ensure_same(context, set.context())?;
    }
    if min_depth == 0 || min_depth > sets.len() {
        return Ok(PolygonSet::empty(*context));
    }

    let factor = context.factor();
    // levels[d] holds the area covered by at least d + 1 sets so far.
    let mut levels: Vec<MultiPolygon<f64>> = vec![empty_shape(); min_depth];
    for (seen, set) in sets.iter().enumerate() {
        let top = min_depth.min(seen + 1);
        for d in (1..top).rev() {
            let raised = levels[d - 1].intersection(set.multi_polygon(), factor);
            levels[d] = levels[d].union(&raised, factor);
        }
        levels[0] = levels[0].union(set.multi_polygon(), factor);
    }

    let deepest = levels.pop().unwrap_or_else(empty_shape);
    Ok(PolygonSet::from_multi_polygon(*context, deepest))
}

/// Split `a` against the region covered by at least `min_depth` of `b`.
///
/// With `min_depth == 0` every point counts as covered: all of `a` is
/// intersection and `b_minus_a` is the union of `b` outside `a`. A depth
/// greater than `b.len()` can never be reached, so nothing is covered.
pub fn full_difference(a: &PolygonSet, b: &[PolygonSet], min_depth: usize) -> Result<FullDifference> {
    let context = *a.context();
    if min_depth == 0 {
        let refs: Vec<&PolygonSet> = b.iter().collect();
        let all = union(&context, &refs)?;
        return Ok(FullDifference {
            a_minus_b: PolygonSet::empty(context),
            b_minus_a: difference(&all, a)?,
            intersection: a.clone(),
        });
    }

    let covered = coverage(&context, b, min_depth)?;
    Ok(FullDifference {
        a_minus_b: difference(a, &covered)?,
        b_minus_a: difference(&covered, a)?,
        intersection: intersection(a, &covered)?,
    })
}

fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    area / 2.0
}
