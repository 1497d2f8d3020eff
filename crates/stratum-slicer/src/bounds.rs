//! Per-face extents along the slicing axis.

use rayon::prelude::*;
use stratum_math::Axis;
use stratum_mesh::Mesh;

/// Extent of one face along the slicing axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBound {
    /// Index of the face in the mesh.
    pub face: usize,
    /// Lowest vertex coordinate.
    pub min: f64,
    /// Highest vertex coordinate.
    pub max: f64,
}

/// Face extents in mesh order, plus the extent of the whole mesh.
#[derive(Debug, Clone, Default)]
pub struct FaceBoundsIndex {
    axis: Axis,
    bounds: Vec<FaceBound>,
    min: f64,
    max: f64,
}

impl FaceBoundsIndex {
    /// Measure every face of `mesh` along `axis`.
    ///
    /// An empty mesh gives an empty index with `min == max == 0`.
    pub fn new(mesh: &Mesh, axis: Axis) -> Self {
        let bounds: Vec<FaceBound> = (0..mesh.face_count())
            .into_par_iter()
            .map(|face| {
                let [a, b, c] = mesh.triangle(face);
                let (ha, hb, hc) = (axis.height(&a), axis.height(&b), axis.height(&c));
                FaceBound {
                    face,
                    min: ha.min(hb).min(hc),
                    max: ha.max(hb).max(hc),
                }
            })
            .collect();

        let (min, max) = if bounds.is_empty() {
            (0.0, 0.0)
        } else {
            bounds
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
                    (lo.min(b.min), hi.max(b.max))
                })
        };

        Self {
            axis,
            bounds,
            min,
            max,
        }
    }

    /// Axis the extents were measured along.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// All face extents, in mesh order.
    pub fn bounds(&self) -> &[FaceBound] {
        &self.bounds
    }

    /// Extent of one face.
    pub fn get(&self, face: usize) -> Option<&FaceBound> {
        self.bounds.get(face)
    }

    /// Lowest coordinate over the mesh.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Highest coordinate over the mesh.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// `max - min`.
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// True if the mesh had no faces.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_math::Point3;

    #[test]
    fn test_bounds_follow_axis() {
        let mesh = Mesh::cuboid(Point3::new(0.0, -1.0, 2.0), Point3::new(4.0, 1.0, 3.0));
        let z = FaceBoundsIndex::new(&mesh, Axis::Z);
        assert_eq!(z.len(), 12);
        assert_eq!((z.min(), z.max()), (2.0, 3.0));
        let x = FaceBoundsIndex::new(&mesh, Axis::X);
        assert_eq!(x.extent(), 4.0);
        let y = FaceBoundsIndex::new(&mesh, Axis::Y);
        assert_eq!((y.min(), y.max()), (-1.0, 1.0));
    }

    #[test]
    fn test_bounds_in_mesh_order() {
        let mesh = Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let index = FaceBoundsIndex::new(&mesh, Axis::Z);
        for (i, b) in index.bounds().iter().enumerate() {
            assert_eq!(b.face, i);
            assert!(b.min <= b.max);
        }
    }

    #[test]
    fn test_empty_mesh() {
        let index = FaceBoundsIndex::new(&Mesh::default(), Axis::Z);
        assert!(index.is_empty());
        assert_eq!(index.extent(), 0.0);
    }
}
