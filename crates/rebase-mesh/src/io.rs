//! STL decoding and encoding.

use std::io::Cursor;
use std::path::Path;

use rebase_math::Point3;
use tracing::{debug, info};

use crate::error::{MeshError, Result};
use crate::{Triangle, TriangleMesh};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Binary or ASCII STL.
    Stl,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "stl" => Some(MeshFormat::Stl),
                _ => None,
            })
    }
}

/// Load an STL file from disk.
pub fn load_stl(path: impl AsRef<Path>) -> Result<TriangleMesh> {
    let path = path.as_ref();
    MeshFormat::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    let bytes = std::fs::read(path).map_err(|e| MeshError::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mesh = load_stl_bytes(&bytes)?;

    info!("Loaded {} triangles from {:?}", mesh.len(), path);
    if let Some(bounds) = mesh.bounds() {
        let dims = bounds.dimensions();
        debug!(
            "Dimensions: {:.1} x {:.1} x {:.1}",
            dims.x, dims.y, dims.z
        );
    }
    Ok(mesh)
}

/// Decode an in-memory STL buffer (binary or ASCII).
///
/// Triangles come back in file order. A file with zero facets decodes to
/// an empty mesh rather than an error.
pub fn load_stl_bytes(bytes: &[u8]) -> Result<TriangleMesh> {
    let mut reader = Cursor::new(bytes);
    let stl = stl_io::read_stl(&mut reader).map_err(|e| MeshError::Parse(e.to_string()))?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let mut triangles = Vec::with_capacity(stl.faces.len());
    for face in &stl.faces {
        let mut corners = [Point3::origin(); 3];
        for (corner, &index) in corners.iter_mut().zip(face.vertices.iter()) {
            let v = stl.vertices.get(index).ok_or_else(|| {
                MeshError::Parse(format!("face references missing vertex {index}"))
            })?;
            *corner = Point3::new(v.0[0] as f64, v.0[1] as f64, v.0[2] as f64);
        }
        triangles.push(Triangle { vertices: corners });
    }

    Ok(TriangleMesh::from_triangles(triangles))
}

impl TriangleMesh {
    /// Encode as binary STL.
    ///
    /// Normals are recomputed from the winding; coordinates are narrowed
    /// to f32 as the format requires.
    pub fn to_stl_bytes(&self) -> Result<Vec<u8>> {
        let triangles: Vec<stl_io::Triangle> = self
            .triangles
            .iter()
            .map(|t| {
                let n = t.normal();
                stl_io::Triangle {
                    normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                    vertices: t
                        .vertices
                        .map(|v| stl_io::Vertex::new([v.x as f32, v.y as f32, v.z as f32])),
                }
            })
            .collect();

        let mut data = Vec::with_capacity(84 + triangles.len() * 50);
        stl_io::write_stl(&mut data, triangles.iter()).map_err(MeshError::Encode)?;
        Ok(data)
    }

    /// Write as binary STL.
    pub fn write_stl(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_stl_bytes()?;
        std::fs::write(path, data).map_err(|e| MeshError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
