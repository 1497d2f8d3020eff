//! STL reading and writing.
//!
//! Both binary and ASCII STL are read. Coincident corners are welded into
//! shared vertices so that neighboring faces slice into connected loops.
//! Writing always produces binary STL.

use std::collections::HashMap;
use std::path::Path;

use stratum_math::{Point3, Vec3};

use crate::error::{MeshError, Result};
use crate::{triangle_normal, Face, Mesh};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Read an STL file from disk.
pub fn read_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let data = std::fs::read(path)?;
    parse_stl(&data)
}

/// Write a mesh to disk as binary STL.
pub fn write_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, to_stl_bytes(mesh))?;
    Ok(())
}

/// Parse STL bytes, detecting ASCII or binary encoding.
pub fn parse_stl(data: &[u8]) -> Result<Mesh> {
    if looks_ascii(data) {
        parse_ascii(data)
    } else {
        parse_binary(data)
    }
}

/// A binary STL may also start with "solid", so the size check decides.
fn looks_ascii(data: &[u8]) -> bool {
    if !data.starts_with(b"solid") {
        return false;
    }
    if data.len() >= HEADER_LEN + 4 {
        let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
        if HEADER_LEN + 4 + count * FACET_LEN == data.len() {
            return false;
        }
    }
    true
}

fn parse_binary(data: &[u8]) -> Result<Mesh> {
    if data.len() < HEADER_LEN + 4 {
        return Err(MeshError::MalformedStl(format!(
            "binary STL needs at least 84 bytes, got {}",
            data.len()
        )));
    }
    let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
    let expected = HEADER_LEN + 4 + count * FACET_LEN;
    if data.len() < expected {
        return Err(MeshError::MalformedStl(format!(
            "header announces {count} facets ({expected} bytes), file has {} bytes",
            data.len()
        )));
    }

    let mut welder = Welder::default();
    for facet in data[HEADER_LEN + 4..expected].chunks_exact(FACET_LEN) {
        let f = |offset: usize| {
            f32::from_le_bytes([
                facet[offset],
                facet[offset + 1],
                facet[offset + 2],
                facet[offset + 3],
            ])
        };
        let stored = Vec3::new(f(0) as f64, f(4) as f64, f(8) as f64);
        let corners = [12, 24, 36].map(|o| [f(o), f(o + 4), f(o + 8)]);
        welder.push_facet(corners, stored);
    }
    Ok(welder.finish())
}

fn parse_ascii(data: &[u8]) -> Result<Mesh> {
    let text = std::str::from_utf8(data)
        .map_err(|e| MeshError::MalformedStl(format!("ASCII STL is not UTF-8: {e}")))?;

    let mut welder = Welder::default();
    let mut stored = Vec3::zeros();
    let mut corners: Vec<[f32; 3]> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("facet") => {
                // "facet normal nx ny nz"
                let values = parse_floats(words.skip(1), line_no)?;
                stored = Vec3::new(values[0] as f64, values[1] as f64, values[2] as f64);
                corners.clear();
            }
            Some("vertex") => {
                corners.push(parse_floats(words, line_no)?);
            }
            Some("endfacet") => {
                if corners.len() != 3 {
                    return Err(MeshError::MalformedStl(format!(
                        "line {}: facet has {} vertices",
                        line_no + 1,
                        corners.len()
                    )));
                }
                welder.push_facet([corners[0], corners[1], corners[2]], stored);
            }
            _ => {}
        }
    }
    Ok(welder.finish())
}

fn parse_floats<'a>(words: impl Iterator<Item = &'a str>, line_no: usize) -> Result<[f32; 3]> {
    let mut out = [0.0f32; 3];
    let mut n = 0;
    for word in words.take(3) {
        out[n] = word.parse().map_err(|_| {
            MeshError::MalformedStl(format!("line {}: bad number {word:?}", line_no + 1))
        })?;
        n += 1;
    }
    if n != 3 {
        return Err(MeshError::MalformedStl(format!(
            "line {}: expected 3 numbers",
            line_no + 1
        )));
    }
    Ok(out)
}

/// Merges bit-identical corners into shared vertices.
#[derive(Default)]
struct Welder {
    lookup: HashMap<[u32; 3], u32>,
    vertices: Vec<Point3>,
    faces: Vec<Face>,
}

impl Welder {
    fn vertex(&mut self, p: [f32; 3]) -> u32 {
        let key = p.map(f32::to_bits);
        let next = self.vertices.len() as u32;
        *self.lookup.entry(key).or_insert_with(|| {
            self.vertices
                .push(Point3::new(p[0] as f64, p[1] as f64, p[2] as f64));
            next
        })
    }

    fn push_facet(&mut self, corners: [[f32; 3]; 3], stored: Vec3) {
        let indices = corners.map(|c| self.vertex(c));
        let [a, b, c] = indices.map(|i| self.vertices[i as usize]);
        let mut normal = triangle_normal(&a, &b, &c);
        if normal == Vec3::zeros() && stored.norm() > 0.0 {
            normal = stored.normalize();
        }
        self.faces.push(Face { indices, normal });
    }

    fn finish(self) -> Mesh {
        Mesh {
            vertices: self.vertices,
            faces: self.faces,
        }
    }
}

/// Encode a mesh as binary STL.
pub fn to_stl_bytes(mesh: &Mesh) -> Vec<u8> {
    let mut data = Vec::with_capacity(HEADER_LEN + 4 + mesh.face_count() * FACET_LEN);

    let mut header = [b' '; HEADER_LEN];
    let tag = b"stratum STL export";
    header[..tag.len()].copy_from_slice(tag);
    data.extend_from_slice(&header);
    data.extend_from_slice(&(mesh.face_count() as u32).to_le_bytes());

    for (i, face) in mesh.faces().iter().enumerate() {
        for c in face.normal.iter() {
            data.extend_from_slice(&(*c as f32).to_le_bytes());
        }
        for v in mesh.triangle(i) {
            data.extend_from_slice(&(v.x as f32).to_le_bytes());
            data.extend_from_slice(&(v.y as f32).to_le_bytes());
            data.extend_from_slice(&(v.z as f32).to_le_bytes());
        }
        // Attribute byte count
        data.extend_from_slice(&0u16.to_le_bytes());
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Mesh {
        Mesh::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_binary_welds_vertices() {
        let bytes = to_stl_bytes(&unit_cube());
        assert_eq!(bytes.len(), 84 + 12 * 50);

        let mesh = parse_stl(&bytes).unwrap();
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.vertices().len(), 8);
    }

    #[test]
    fn test_ascii_facet() {
        let text = "solid tri\n\
            facet normal 0 0 1\n\
              outer loop\n\
                vertex 0 0 0\n\
                vertex 1 0 0\n\
                vertex 0 1 0\n\
              endloop\n\
            endfacet\n\
            endsolid tri\n";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.faces()[0].normal, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_ascii_bad_number() {
        let text = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 x 0\n";
        let err = parse_stl(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_truncated_binary() {
        let mut bytes = to_stl_bytes(&unit_cube());
        bytes.truncate(200);
        assert!(matches!(
            parse_stl(&bytes),
            Err(MeshError::MalformedStl(_))
        ));
    }
}
