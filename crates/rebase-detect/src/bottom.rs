//! Bottom-layer face extraction.

use rebase_math::Point2;
use rebase_mesh::Triangle;

/// A triangle lying on the mesh's lowest Z plane, projected onto XY.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottomFace {
    /// Projected corners in the source triangle's order.
    pub points: [Point2; 3],
}

impl BottomFace {
    /// Project a triangle onto XY, dropping Z.
    pub fn from_triangle(triangle: &Triangle) -> Self {
        Self {
            points: triangle.vertices.map(|v| Point2::new(v.x, v.y)),
        }
    }
}

/// Collect triangles whose three corners all sit within `z_tolerance`
/// of `min_z`, in mesh order.
///
/// An empty slice gives an empty result; callers treat that as zero
/// islands.
pub fn bottom_faces(triangles: &[Triangle], min_z: f64, z_tolerance: f64) -> Vec<BottomFace> {
    triangles
        .iter()
        .filter(|t| t.vertices.iter().all(|v| (v.z - min_z).abs() < z_tolerance))
        .map(BottomFace::from_triangle)
        .collect()
}
