//! Error types for mesh construction and I/O.

use thiserror::Error;

/// Errors that can occur while building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Reading or writing a mesh file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending face.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// The flat index list is not a multiple of three.
    #[error("index list of length {0} is not a list of triangles")]
    MalformedIndices(usize),

    /// STL data could not be parsed.
    #[error("malformed STL: {0}")]
    MalformedStl(String),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
