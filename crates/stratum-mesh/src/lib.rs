#![warn(missing_docs)]

//! Indexed triangle meshes for the stratum slicer.
//!
//! A [`Mesh`] is an ordered vertex list plus an ordered face list; every
//! face references three vertices and carries its outward unit normal.
//! Meshes are immutable once built and are the input to slicing.

pub mod error;
pub mod stl;

pub use error::{MeshError, Result};

use stratum_math::{Point3, Vec3};

/// A triangular face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Vertex indices, counter-clockwise seen from outside.
    pub indices: [u32; 3],
    /// Outward unit normal.
    pub normal: Vec3,
}

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Point3>,
    faces: Vec<Face>,
}

impl Mesh {
    /// Build a mesh from vertices and faces with precomputed normals.
    ///
    /// Fails if any face references a vertex that does not exist.
    pub fn new(vertices: Vec<Point3>, faces: Vec<Face>) -> Result<Self> {
        for (face, f) in faces.iter().enumerate() {
            for &index in &f.indices {
                if index as usize >= vertices.len() {
                    return Err(MeshError::IndexOutOfRange {
                        face,
                        index,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Build a mesh from vertices and a flat index list, computing normals
    /// from the winding of each triangle.
    pub fn from_triangles(vertices: Vec<Point3>, indices: &[u32]) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::MalformedIndices(indices.len()));
        }
        let mut faces = Vec::with_capacity(indices.len() / 3);
        for (face, tri) in indices.chunks(3).enumerate() {
            let [a, b, c] = [tri[0], tri[1], tri[2]];
            for index in [a, b, c] {
                if index as usize >= vertices.len() {
                    return Err(MeshError::IndexOutOfRange {
                        face,
                        index,
                        vertex_count: vertices.len(),
                    });
                }
            }
            let normal = triangle_normal(
                &vertices[a as usize],
                &vertices[b as usize],
                &vertices[c as usize],
            );
            faces.push(Face {
                indices: [a, b, c],
                normal,
            });
        }
        Ok(Self { vertices, faces })
    }

    /// An axis-aligned box spanning `min` to `max`, 12 outward-facing triangles.
    pub fn cuboid(min: Point3, max: Point3) -> Self {
        let vertices = vec![
            Point3::new(min.x, min.y, min.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, max.z),
            Point3::new(min.x, max.y, max.z),
        ];
        #[rustfmt::skip]
        let indices = [
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        let faces = indices
            .chunks(3)
            .map(|tri| {
                let normal = triangle_normal(
                    &vertices[tri[0] as usize],
                    &vertices[tri[1] as usize],
                    &vertices[tri[2] as usize],
                );
                Face {
                    indices: [tri[0], tri[1], tri[2]],
                    normal,
                }
            })
            .collect();
        Self { vertices, faces }
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Faces in mesh order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Number of faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True if the mesh has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Corner positions of face `index`, in stored winding order.
    pub fn triangle(&self, index: usize) -> [Point3; 3] {
        let f = &self.faces[index];
        f.indices.map(|i| self.vertices[i as usize])
    }

    /// Axis-aligned bounding box, `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.vertices.first()?;
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p)));
        Some((min, max))
    }
}

/// Unit normal of a triangle from its winding; zero for degenerate triangles.
pub fn triangle_normal(a: &Point3, b: &Point3, c: &Point3) -> Vec3 {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > 1e-12 {
        n / len
    } else {
        Vec3::zeros()
    }
}
