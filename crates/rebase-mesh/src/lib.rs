#![warn(missing_docs)]

//! Triangle meshes for the rebase pipeline.
//!
//! Holds a mesh as an ordered list of triangles in f64 so that candidate
//! rotations do not lose precision, and decodes/encodes STL through
//! `stl_io`.
//!
//! # Example
//!
//! ```ignore
//! use rebase_mesh::load_stl;
//!
//! let mesh = load_stl("bin.stl")?;
//! println!("{} triangles, min z {:?}", mesh.len(), mesh.min_z());
//! ```

pub mod error;
pub mod io;

pub use error::{MeshError, Result};
pub use io::{load_stl, load_stl_bytes, MeshFormat};

use rebase_math::{Bounds3, Point3, Transform};

/// A single triangle. Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner positions in file order.
    pub vertices: [Point3; 3],
}

impl Triangle {
    /// Create a triangle from its corners.
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Apply a transform to every corner.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            vertices: self.vertices.map(|v| transform.apply_point(&v)),
        }
    }

    /// Unit face normal from the winding, or +Z for degenerate triangles.
    pub fn normal(&self) -> rebase_math::Vec3 {
        let [a, b, c] = self.vertices;
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len > 1e-12 {
            n / len
        } else {
            rebase_math::Vec3::z()
        }
    }
}

/// An ordered triangle soup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Triangles in file order.
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a triangle list.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Iterate over every corner of every triangle.
    pub fn points(&self) -> impl Iterator<Item = &Point3> {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Axis-aligned bounding box, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds3> {
        Bounds3::from_points(self.points())
    }

    /// Lowest Z over all vertices, `None` for an empty mesh.
    pub fn min_z(&self) -> Option<f64> {
        self.points().map(|p| p.z).reduce(f64::min)
    }

    /// A copy of this mesh with `transform` applied to every vertex.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            triangles: self
                .triangles
                .iter()
                .map(|t| t.transformed(transform))
                .collect(),
        }
    }

    /// Axis-aligned box between two corners, 12 outward-facing triangles.
    ///
    /// For building test fixtures; enable the `fixtures` feature to use it
    /// outside this crate's tests.
    #[cfg(any(test, feature = "fixtures"))]
    pub fn cuboid(min: Point3, max: Point3) -> Self {
        let p = |x: bool, y: bool, z: bool| {
            Point3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let quads = [
            // bottom, top
            [p(false, false, false), p(false, true, false), p(true, true, false), p(true, false, false)],
            [p(false, false, true), p(true, false, true), p(true, true, true), p(false, true, true)],
            // front, back
            [p(false, false, false), p(true, false, false), p(true, false, true), p(false, false, true)],
            [p(false, true, false), p(false, true, true), p(true, true, true), p(true, true, false)],
            // left, right
            [p(false, false, false), p(false, false, true), p(false, true, true), p(false, true, false)],
            [p(true, false, false), p(true, true, false), p(true, true, true), p(true, false, true)],
        ];
        let triangles = quads
            .iter()
            .flat_map(|[a, b, c, d]| [Triangle::new(*a, *b, *c), Triangle::new(*a, *c, *d)])
            .collect();
        Self { triangles }
    }

    /// Append another mesh's triangles.
    pub fn merge(&mut self, other: &TriangleMesh) {
        self.triangles.extend_from_slice(&other.triangles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn make_tetra() -> TriangleMesh {
        let a = Point3::new(0.0, 0.0, 1.0);
        let b = Point3::new(10.0, 0.0, 1.0);
        let c = Point3::new(0.0, 10.0, 1.0);
        let d = Point3::new(0.0, 0.0, 11.0);
        TriangleMesh::from_triangles(vec![
            Triangle::new(a, c, b),
            Triangle::new(a, b, d),
            Triangle::new(a, d, c),
            Triangle::new(b, c, d),
        ])
    }

    #[test]
    fn test_bounds_and_min_z() {
        let mesh = make_tetra();
        let b = mesh.bounds().unwrap();
        assert_eq!(b.min, Point3::new(0.0, 0.0, 1.0));
        assert_eq!(b.max, Point3::new(10.0, 10.0, 11.0));
        assert_eq!(mesh.min_z(), Some(1.0));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let mesh = TriangleMesh::new();
        assert!(mesh.is_empty());
        assert!(mesh.bounds().is_none());
        assert!(mesh.min_z().is_none());
    }

    #[test]
    fn test_transformed_keeps_order_and_source() {
        let mesh = make_tetra();
        let rotated = mesh.transformed(&Transform::rotation_y(PI));
        assert_eq!(rotated.len(), mesh.len());
        // the source is untouched
        assert_eq!(mesh.min_z(), Some(1.0));
        assert!((rotated.min_z().unwrap() + 11.0).abs() < 1e-9);
        let first = rotated.triangles[0].vertices[0];
        assert!((first.z + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normal() {
        let mesh = make_tetra();
        let n = mesh.triangles[0].normal();
        assert!((n.z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let min = Point3::new(0.0, 0.0, 0.0);
        let max = Point3::new(2.0, 3.0, 4.0);
        let mesh = TriangleMesh::cuboid(min, max);
        assert_eq!(mesh.len(), 12);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, min);
        assert_eq!(bounds.max, max);

        let center = Point3::new(1.0, 1.5, 2.0);
        for t in &mesh.triangles {
            let outward = t.vertices[0] - center;
            assert!(t.normal().dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_merge() {
        let mut mesh = make_tetra();
        let other = make_tetra();
        mesh.merge(&other);
        assert_eq!(mesh.len(), 8);
    }
}
