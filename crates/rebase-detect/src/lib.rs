#![warn(missing_docs)]

//! Base detection for printed storage modules.
//!
//! Finds the square base footprints on the underside of a triangle mesh
//! and picks which of six fixed orientations puts them there:
//!
//! 1. Take the triangles lying flat on the lowest Z plane
//! 2. Group them into islands of faces that share vertices
//! 3. Hull each island in XY
//! 4. Repeat for every candidate rotation and keep the one with the
//!    fewest hulls that are not base-sized
//!
//! # Example
//!
//! ```ignore
//! use rebase_detect::{detect_bases, DetectSettings};
//!
//! let mesh = rebase_mesh::load_stl("bin.stl")?;
//! let detection = detect_bases(&mesh, &DetectSettings::default())?;
//!
//! println!("orientation: {}", detection.orientation);
//! println!("bases: {}", detection.base_count());
//! ```

pub mod bottom;
pub mod error;
pub mod hull;
pub mod islands;
pub mod orient;

pub use bottom::{bottom_faces, BottomFace};
pub use error::{DetectError, Result};
pub use hull::{build_hulls, island_hull, HullShape};
pub use islands::{partition_islands, DisjointSet, Island};
pub use orient::{
    badness, best_orientation, is_hull_bad, score_orientation, BaseAnnotation, BaseDetection,
    CandidateSummary, Orientation, OrientationScore,
};

use rebase_mesh::TriangleMesh;
use serde::{Deserialize, Serialize};

/// Max Z distance from the lowest vertex for a face to count as bottom.
pub const Z_TOLERANCE: f64 = 0.001;

/// Max per-axis distance for two vertices to count as shared.
pub const CLOSENESS_THRESHOLD: f64 = 0.001;

/// Side length of one base footprint (mm).
pub const EXPECTED_BASE_SIZE: f64 = 35.6;

/// Allowed deviation from [`EXPECTED_BASE_SIZE`] before a hull is bad (mm).
pub const BADNESS_THRESHOLD: f64 = 1.0;

/// Detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectSettings {
    /// Bottom-face Z tolerance (mm).
    pub z_tolerance: f64,
    /// Shared-vertex tolerance (mm).
    pub closeness_threshold: f64,
    /// Expected base side length (mm).
    pub expected_base_size: f64,
    /// Allowed deviation from the expected size (mm).
    pub badness_threshold: f64,
}

impl Default for DetectSettings {
    fn default() -> Self {
        Self {
            z_tolerance: Z_TOLERANCE,
            closeness_threshold: CLOSENESS_THRESHOLD,
            expected_base_size: EXPECTED_BASE_SIZE,
            badness_threshold: BADNESS_THRESHOLD,
        }
    }
}

impl DetectSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.z_tolerance > 0.0) {
            return Err(DetectError::InvalidSettings(
                "z_tolerance must be positive".into(),
            ));
        }
        if !(self.closeness_threshold > 0.0) {
            return Err(DetectError::InvalidSettings(
                "closeness_threshold must be positive".into(),
            ));
        }
        if !(self.expected_base_size > 0.0) {
            return Err(DetectError::InvalidSettings(
                "expected_base_size must be positive".into(),
            ));
        }
        if !(self.badness_threshold >= 0.0) {
            return Err(DetectError::InvalidSettings(
                "badness_threshold must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Detect bases and the orientation that puts them on the bottom.
///
/// This is the main entry point. Settings are validated, then the six
/// orientations are searched with [`best_orientation`].
pub fn detect_bases(mesh: &TriangleMesh, settings: &DetectSettings) -> Result<BaseDetection> {
    settings.validate()?;
    best_orientation(mesh, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(DetectSettings::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let settings = DetectSettings {
            z_tolerance: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = DetectSettings {
            expected_base_size: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_detect_rejects_bad_settings_before_geometry() {
        let settings = DetectSettings {
            badness_threshold: -1.0,
            ..Default::default()
        };
        let err = detect_bases(&TriangleMesh::new(), &settings).unwrap_err();
        assert!(matches!(err, DetectError::InvalidSettings(_)));
    }
}
