//! Subcommands.

pub mod detect;
pub mod run;
pub mod script;

use std::path::Path;

use anyhow::{Context, Result};
use rebase_detect::{detect_bases, BaseDetection, DetectSettings};
use rebase_mesh::TriangleMesh;

/// Load an STL file and detect its bases.
pub fn load_and_detect(path: &Path, settings: &DetectSettings) -> Result<(TriangleMesh, BaseDetection)> {
    let mesh = rebase_mesh::load_stl(path)
        .with_context(|| format!("Failed to load mesh from {:?}", path))?;
    let detection = detect_bases(&mesh, settings)
        .with_context(|| format!("Failed to detect bases in {:?}", path))?;
    Ok((mesh, detection))
}
