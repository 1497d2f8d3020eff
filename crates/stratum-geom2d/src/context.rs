//! Coordinate frames for planar geometry.

use std::fmt;

use stratum_math::{Axis, Point2, Point3};

/// The plane a piece of 2D geometry lives in.
///
/// `precision` is the number of decimal digits kept when coordinates are
/// quantized to integers for boolean and offset operations. Two geometries
/// may only be combined when their contexts are equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Context {
    /// Axis normal to the plane.
    pub axis: Axis,
    /// Position of the plane along `axis`.
    pub offset: f64,
    /// Decimal digits of quantization.
    pub precision: u32,
}

impl Context {
    /// Create a frame at `offset` along `axis`.
    pub fn new(axis: Axis, offset: f64, precision: u32) -> Self {
        Self {
            axis,
            offset,
            precision,
        }
    }

    /// Scale factor from model units to the integer grid.
    pub fn factor(&self) -> f64 {
        10f64.powi(self.precision as i32)
    }

    /// Smallest representable step in model units.
    pub fn quantum(&self) -> f64 {
        1.0 / self.factor()
    }

    /// Same axis and precision, different plane height.
    pub fn at(&self, offset: f64) -> Self {
        Self { offset, ..*self }
    }

    /// Place a plane point in 3D.
    pub fn lift(&self, p: &Point2) -> Point3 {
        self.axis.lift(p, self.offset)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} (1e-{} grid)",
            self.axis, self.offset, self.precision
        )
    }
}
