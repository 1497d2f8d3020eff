//! Infill pattern generation.
//!
//! Every pattern is built from straight segments clipped to the target
//! region. Line families are anchored to a global grid (the `k`-th line of
//! a family always sits at `(k + 0.5) * spacing` from the origin), so the
//! same pattern stacks identically from one layer to the next.

use serde::{Deserialize, Serialize};
use stratum_math::{Point2, Vec2};

use crate::error::{GeomError, Result};
use crate::polygon::PolygonSet;
use crate::segment::{Segment, SegmentSet};

/// Upper bound on scanlines (or honeycomb cells) per fill call.
pub const MAX_SCANLINES: usize = 250_000;

/// Infill pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillPattern {
    /// One family of parallel lines, turned 90° on odd layers.
    Linear,
    /// Two perpendicular families.
    Grid,
    /// Three families 60° apart.
    Triangle,
    /// Honeycomb cells.
    Hex,
}

impl FillPattern {
    /// Whether the pattern is made of independent straight runs, which
    /// makes very short runs worth dropping.
    pub fn is_disconnected(self) -> bool {
        !matches!(self, FillPattern::Hex)
    }

    fn family_angles(self, angle: f64, parity: bool) -> Vec<f64> {
        use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};
        match self {
            FillPattern::Linear if parity => vec![angle + FRAC_PI_2],
            FillPattern::Linear => vec![angle],
            FillPattern::Grid => vec![angle, angle + FRAC_PI_2],
            FillPattern::Triangle => vec![angle, angle + FRAC_PI_3, angle + 2.0 * FRAC_PI_3],
            FillPattern::Hex => Vec::new(),
        }
    }
}

/// Options for [`infill_generate`].
#[derive(Debug, Clone, Copy)]
pub struct InfillOptions {
    /// Base line direction, radians.
    pub angle: f64,
    /// Line spacing of the equivalent single-family fill. Multi-family
    /// patterns widen their own spacing so the deposited density matches.
    pub spacing: f64,
    /// Odd layer. Only single-family fill changes with parity.
    pub parity: bool,
    /// Runs shorter than this are dropped from disconnected patterns.
    pub min_segment_length: f64,
}

impl Default for InfillOptions {
    fn default() -> Self {
        Self {
            angle: std::f64::consts::FRAC_PI_4,
            spacing: 1.0,
            parity: false,
            min_segment_length: 0.0,
        }
    }
}

/// Fill `contour` with `pattern`.
pub fn infill_generate(
    contour: &PolygonSet,
    pattern: FillPattern,
    options: &InfillOptions,
) -> Result<SegmentSet> {
    if !(options.spacing.is_finite() && options.spacing > 0.0) {
        return Err(GeomError::InvalidSpacing(options.spacing));
    }
    let mut out = SegmentSet::new(*contour.context());
    if contour.is_empty() {
        return Ok(out);
    }

    let edges = ring_edges(contour);
    match pattern {
        FillPattern::Hex => honeycomb(&edges, options, &mut out)?,
        _ => {
            let angles = pattern.family_angles(options.angle, options.parity);
            let spacing = options.spacing * angles.len() as f64;
            for angle in angles {
                scanlines(&edges, angle, spacing, &mut out)?;
            }
        }
    }

    let min_len = if pattern.is_disconnected() {
        options.min_segment_length.max(contour.context().quantum())
    } else {
        contour.context().quantum()
    };
    let kept = out
        .segments()
        .iter()
        .copied()
        .filter(|s| s.length() >= min_len)
        .collect();
    Ok(SegmentSet::from_segments(*contour.context(), kept))
}

type Edge = (Point2, Point2);

fn ring_edges(contour: &PolygonSet) -> Vec<Edge> {
    contour
        .rings()
        .flat_map(|ring| ring.lines())
        .map(|l| {
            (
                Point2::new(l.start.x, l.start.y),
                Point2::new(l.end.x, l.end.y),
            )
        })
        .collect()
}

/// Positions along `origin + t * dir` where the line crosses a ring edge.
///
/// An edge counts when its endpoints fall on different sides of the line,
/// with points on the line treated as being on the negative side, so a
/// vertex touching the line is never counted twice.
fn crossings(edges: &[Edge], origin: &Point2, dir: &Vec2) -> Vec<f64> {
    let perp = Vec2::new(-dir.y, dir.x);
    let c = perp.dot(&origin.coords);
    let mut ts: Vec<f64> = edges
        .iter()
        .filter_map(|(a, b)| {
            let sa = perp.dot(&a.coords) - c;
            let sb = perp.dot(&b.coords) - c;
            if (sa > 0.0) == (sb > 0.0) {
                return None;
            }
            let hit = a + (b - a) * (sa / (sa - sb));
            Some(dir.dot(&(hit - origin)))
        })
        .collect();
    ts.sort_by(f64::total_cmp);
    ts
}

fn projected_range(edges: &[Edge], axis: &Vec2) -> (f64, f64) {
    edges.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (a, _)| {
        let p = axis.dot(&a.coords);
        (lo.min(p), hi.max(p))
    })
}

fn scanlines(edges: &[Edge], angle: f64, spacing: f64, out: &mut SegmentSet) -> Result<()> {
    let dir = Vec2::new(angle.cos(), angle.sin());
    let perp = Vec2::new(-dir.y, dir.x);
    let (lo, hi) = projected_range(edges, &perp);

    let first = (lo / spacing - 0.5).ceil() as i64;
    let last = (hi / spacing - 0.5).floor() as i64;
    if last < first {
        return Ok(());
    }
    let count = (last - first + 1) as usize;
    if count > MAX_SCANLINES {
        return Err(GeomError::TooManyScanlines {
            requested: count,
            limit: MAX_SCANLINES,
        });
    }

    for k in first..=last {
        let origin = Point2::from(perp * ((k as f64 + 0.5) * spacing));
        let ts = crossings(edges, &origin, &dir);
        for pair in ts.chunks_exact(2) {
            out.push(Segment::new(origin + dir * pair[0], origin + dir * pair[1]));
        }
    }
    Ok(())
}

/// Clip one segment to the region bounded by `edges`.
fn clip_segment(edges: &[Edge], a: Point2, b: Point2, out: &mut SegmentSet) {
    let len = (b - a).norm();
    if len <= 0.0 {
        return;
    }
    let dir = (b - a) / len;
    let ts = crossings(edges, &a, &dir);
    for pair in ts.chunks_exact(2) {
        let t0 = pair[0].max(0.0);
        let t1 = pair[1].min(len);
        if t1 > t0 {
            out.push(Segment::new(a + dir * t0, a + dir * t1));
        }
    }
}

/// Pointy-top honeycomb with the same line length per unit area as a
/// linear fill at `options.spacing`.
fn honeycomb(edges: &[Edge], options: &InfillOptions, out: &mut SegmentSet) -> Result<()> {
    // A honeycomb of side r lays 2 / (sqrt(3) r) of line per unit area.
    let r = 2.0 * options.spacing / 3f64.sqrt();
    let width = 3f64.sqrt() * r;
    let row_step = 1.5 * r;

    let u_axis = Vec2::new(options.angle.cos(), options.angle.sin());
    let v_axis = Vec2::new(-u_axis.y, u_axis.x);
    let (u_lo, u_hi) = projected_range(edges, &u_axis);
    let (v_lo, v_hi) = projected_range(edges, &v_axis);

    let col_first = (u_lo / width).floor() as i64 - 1;
    let col_last = (u_hi / width).ceil() as i64 + 1;
    let row_first = (v_lo / row_step).floor() as i64 - 1;
    let row_last = (v_hi / row_step).ceil() as i64 + 1;
    let cells = ((col_last - col_first + 1) * (row_last - row_first + 1)) as usize;
    if cells > MAX_SCANLINES {
        return Err(GeomError::TooManyScanlines {
            requested: cells,
            limit: MAX_SCANLINES,
        });
    }

    let to_plane = |u: f64, v: f64| Point2::from(u_axis * u + v_axis * v);
    // Three of the six edges per cell; neighbors supply the other three.
    let corner = |k: usize| {
        let theta = std::f64::consts::FRAC_PI_6 + std::f64::consts::FRAC_PI_3 * k as f64;
        (r * theta.cos(), r * theta.sin())
    };
    let corners: [(f64, f64); 4] = [corner(0), corner(1), corner(2), corner(3)];

    for row in row_first..=row_last {
        let shift = if row.rem_euclid(2) == 1 { width / 2.0 } else { 0.0 };
        let cv = row as f64 * row_step;
        for col in col_first..=col_last {
            let cu = col as f64 * width + shift;
            for w in corners.windows(2) {
                let a = to_plane(cu + w[0].0, cv + w[0].1);
                let b = to_plane(cu + w[1].0, cv + w[1].1);
                clip_segment(edges, a, b, out);
            }
        }
    }

    Ok(())
}
