#![warn(missing_docs)]

//! Planar geometry kernel for the stratum slicer.
//!
//! Provides the operations the layer pipeline is written against:
//!
//! - [`Context`]: the plane a piece of geometry lives in, including the
//!   fixed-precision grid used for robust boolean operations
//! - [`SegmentSet`]: raw slicing output, with [`decimate`](SegmentSet::decimate)
//!   and loop [`chain`](SegmentSet::chain)ing
//! - [`PolygonSet`]: clean regions, combined with [`union`], [`offset`],
//!   [`full_difference`] and friends
//! - [`infill_generate`]: fill patterns clipped to a region
//!
//! Polygon clipping and offsetting are delegated to Clipper via
//! `geo-clipper`.

pub mod context;
pub mod error;
pub mod infill;
pub mod ops;
pub mod polygon;
pub mod segment;

pub use context::Context;
pub use error::{GeomError, Result};
pub use infill::{infill_generate, FillPattern, InfillOptions};
pub use ops::{
    clean, coverage, difference, full_difference, intersection, offset, resolve_loops, union,
    FullDifference,
};
pub use polygon::PolygonSet;
pub use segment::{Chains, Segment, SegmentSet};
