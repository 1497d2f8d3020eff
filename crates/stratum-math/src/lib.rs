#![warn(missing_docs)]

//! Math types for the stratum slicer.
//!
//! Thin wrappers around nalgebra providing the points and vectors used by
//! the mesh and layer crates, the [`Axis`] a mesh is sliced along, and
//! tolerance constants.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in a slicing plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in a slicing plane.
pub type Vec2 = Vector2<f64>;

/// Coordinate axis a mesh is sliced along.
///
/// The two remaining axes span the slicing plane. They are taken in cyclic
/// order (`Z` → `(x, y)`, `X` → `(y, z)`, `Y` → `(z, x)`) so that the
/// projected plane keeps the handedness of the 3D frame and a loop that is
/// counter-clockwise seen from the positive axis stays counter-clockwise
/// in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Slice along X.
    X,
    /// Slice along Y.
    Y,
    /// Slice along Z (the usual build direction).
    #[default]
    Z,
}

impl Axis {
    /// Index of this axis in a 3-component vector.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Indices of the in-plane `(u, v)` axes.
    pub fn plane_indices(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (2, 0),
            Axis::Z => (0, 1),
        }
    }

    /// Coordinate of `p` along this axis.
    pub fn height(self, p: &Point3) -> f64 {
        p[self.index()]
    }

    /// Project a 3D point onto the slicing plane.
    pub fn project(self, p: &Point3) -> Point2 {
        let (u, v) = self.plane_indices();
        Point2::new(p[u], p[v])
    }

    /// Project a 3D vector onto the slicing plane.
    pub fn project_vec(self, v: &Vec3) -> Vec2 {
        let (iu, iv) = self.plane_indices();
        Vec2::new(v[iu], v[iv])
    }

    /// Place a plane point back in 3D at `height` along this axis.
    pub fn lift(self, p: &Point2, height: f64) -> Point3 {
        let (u, v) = self.plane_indices();
        let mut out = Point3::origin();
        out[u] = p.x;
        out[v] = p.y;
        out[self.index()] = height;
        out
    }

    /// Unit vector pointing along this axis.
    pub fn unit(self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Area below which a polygon counts as a sliver, in mm².
    pub area: f64,
}

impl Tolerance {
    /// Default slicing tolerances (1e-6 mm linear, 1e-6 mm² area).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        area: 1e-6,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if an area is too small to be kept.
    pub fn is_sliver(&self, area: f64) -> bool {
        area.abs() < self.area
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
