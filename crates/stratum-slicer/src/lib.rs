#![warn(missing_docs)]

//! Layer slicing for the stratum slicer.
//!
//! This crate turns a triangle mesh into a stack of planar layers. A
//! sweep over the mesh produces one segment set per plane; each layer then
//! derives, on demand, its clean region, walls, fill region, exposure
//! against neighboring layers and fill pattern. An optional raft is
//! synthesized below the lowest layer.
//!
//! # Example
//!
//! ```ignore
//! use stratum_mesh::stl::read_stl;
//! use stratum_slicer::{SliceSettings, Slicer, View, ViewOutput};
//!
//! let mesh = read_stl("part.stl")?;
//! let slicer = Slicer::new(&mesh, SliceSettings::default())?;
//!
//! println!("Layers: {}", slicer.len());
//! if let Some(ViewOutput::Paths(paths)) = slicer.view(View::paths(10)) {
//!     println!("Layer 10: {} segments", paths.segments.len());
//! }
//! ```

pub mod bounds;
pub mod error;
pub mod layer;
pub mod raft;
pub mod settings;
pub mod slicer;
pub mod sweep;
pub mod view;

pub use bounds::{FaceBound, FaceBoundsIndex};
pub use error::{Result, SlicerError};
pub use layer::{DisjointInfill, Infill, Layer, LayerKind, LayerStack, RaftTier, Stage};
pub use raft::RaftBuilder;
pub use settings::{FillSettings, FillType, RaftSettings, SliceSettings};
pub use slicer::{SliceStats, Slicer};
pub use sweep::{slice_triangle, sweep, SlicePlanes};
pub use view::{LayerPaths, MeshPartition, View, ViewMode, ViewOutput};
