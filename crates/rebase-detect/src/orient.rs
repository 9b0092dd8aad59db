//! Orientation search.
//!
//! The mesh is tried in six fixed orientations. For each one the bottom
//! layer is re-extracted, partitioned and hulled, and every hull whose
//! bounding box strays from the expected base size counts against it.
//! The first orientation with the lowest count wins.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

use rebase_math::{Point3, Transform};
use rebase_mesh::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bottom::bottom_faces;
use crate::error::{DetectError, Result};
use crate::hull::{build_hulls, HullShape};
use crate::islands::partition_islands;
use crate::DetectSettings;

/// One of the six candidate orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// As loaded.
    #[serde(rename = "original")]
    Original,
    /// +90° about X.
    #[serde(rename = "x+")]
    XPos,
    /// -90° about X.
    #[serde(rename = "x-")]
    XNeg,
    /// +90° about Y.
    #[serde(rename = "y+")]
    YPos,
    /// -90° about Y.
    #[serde(rename = "y-")]
    YNeg,
    /// 180° about Y.
    #[serde(rename = "180")]
    Flip180,
}

impl Orientation {
    /// Candidates in search order. Earlier entries win ties.
    pub const ALL: [Orientation; 6] = [
        Orientation::Original,
        Orientation::XPos,
        Orientation::XNeg,
        Orientation::YPos,
        Orientation::YNeg,
        Orientation::Flip180,
    ];

    /// Short tag used in reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Orientation::Original => "original",
            Orientation::XPos => "x+",
            Orientation::XNeg => "x-",
            Orientation::YPos => "y+",
            Orientation::YNeg => "y-",
            Orientation::Flip180 => "180",
        }
    }

    /// Rotation that takes the loaded mesh into this orientation.
    pub fn transform(&self) -> Transform {
        match self {
            Orientation::Original => Transform::identity(),
            Orientation::XPos => Transform::rotation_x(FRAC_PI_2),
            Orientation::XNeg => Transform::rotation_x(-FRAC_PI_2),
            Orientation::YPos => Transform::rotation_y(FRAC_PI_2),
            Orientation::YNeg => Transform::rotation_y(-FRAC_PI_2),
            Orientation::Flip180 => Transform::rotation_y(PI),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// True when a hull's bounding box is off the expected base size by more
/// than the threshold in either direction.
pub fn is_hull_bad(hull: &HullShape, settings: &DetectSettings) -> bool {
    (hull.width() - settings.expected_base_size).abs() > settings.badness_threshold
        || (hull.height() - settings.expected_base_size).abs() > settings.badness_threshold
}

/// Number of wrongly sized hulls.
pub fn badness(hulls: &[HullShape], settings: &DetectSettings) -> usize {
    hulls.iter().filter(|h| is_hull_bad(h, settings)).count()
}

/// The detection subpipeline run on one rotated copy of the mesh.
#[derive(Debug, Clone)]
pub struct OrientationScore {
    /// Which candidate this is.
    pub orientation: Orientation,
    /// The rotated mesh.
    pub mesh: TriangleMesh,
    /// Rotation applied to produce `mesh`.
    pub rotation: Transform,
    /// Lowest Z of the rotated mesh.
    pub min_z: f64,
    /// One hull per island, in island order.
    pub shapes: Vec<HullShape>,
    /// Count of wrongly sized hulls.
    pub badness: usize,
}

/// Rotate the mesh into `orientation` and score it.
///
/// Returns `None` when the rotated mesh has no triangles.
pub fn score_orientation(
    mesh: &TriangleMesh,
    orientation: Orientation,
    settings: &DetectSettings,
) -> Option<OrientationScore> {
    let rotation = orientation.transform();
    let rotated = mesh.transformed(&rotation);
    let min_z = rotated.min_z()?;

    let faces = bottom_faces(&rotated.triangles, min_z, settings.z_tolerance);
    let islands = partition_islands(&faces, settings.closeness_threshold);
    let shapes = build_hulls(&faces, &islands);
    let badness = badness(&shapes, settings);

    debug!(
        orientation = orientation.tag(),
        bottom_faces = faces.len(),
        islands = shapes.len(),
        badness,
        "scored orientation"
    );

    Some(OrientationScore {
        orientation,
        mesh: rotated,
        rotation,
        min_z,
        shapes,
        badness,
    })
}

/// Per-candidate outcome kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    /// Which candidate.
    pub orientation: Orientation,
    /// Islands found.
    pub islands: usize,
    /// Wrongly sized hull count.
    pub badness: usize,
}

/// A label anchor for one detected base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseAnnotation {
    /// 1-based base number, in island order.
    pub number: usize,
    /// Bounding-box midpoint at min-Z, in the detection frame.
    pub centroid: Point3,
    /// The same point mapped back into the loaded mesh's frame.
    pub source_anchor: Point3,
    /// Hull bounding-box width.
    pub width: f64,
    /// Hull bounding-box height.
    pub height: f64,
}

/// The winning orientation and what was found in it.
#[derive(Debug, Clone)]
pub struct BaseDetection {
    /// Winning orientation.
    pub orientation: Orientation,
    /// Its wrongly sized hull count.
    pub badness: usize,
    /// Base footprints in island order.
    pub shapes: Vec<HullShape>,
    /// Lowest Z in the winning orientation.
    pub min_z: f64,
    /// The mesh rotated into the winning orientation.
    pub mesh: TriangleMesh,
    /// Rotation that produced `mesh`.
    pub rotation: Transform,
    /// Every evaluated candidate, in search order.
    pub candidates: Vec<CandidateSummary>,
}

impl BaseDetection {
    /// Number of detected bases.
    pub fn base_count(&self) -> usize {
        self.shapes.len()
    }

    /// Label anchors for each base, numbered from 1.
    pub fn annotations(&self) -> Vec<BaseAnnotation> {
        let back = self.rotation.rigid_inverse();
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| {
                let c = shape.centroid();
                let centroid = Point3::new(c.x, c.y, self.min_z);
                BaseAnnotation {
                    number: i + 1,
                    centroid,
                    source_anchor: back.apply_point(&centroid),
                    width: shape.width(),
                    height: shape.height(),
                }
            })
            .collect()
    }
}

/// Score all six orientations and keep the best.
///
/// Only a strictly lower badness replaces the current best, so the
/// earliest candidate in [`Orientation::ALL`] wins ties. Fails with
/// [`DetectError::NoGeometry`] when no candidate has any triangles.
pub fn best_orientation(mesh: &TriangleMesh, settings: &DetectSettings) -> Result<BaseDetection> {
    let mut best: Option<OrientationScore> = None;
    let mut candidates = Vec::with_capacity(Orientation::ALL.len());

    for orientation in Orientation::ALL {
        let Some(score) = score_orientation(mesh, orientation, settings) else {
            continue;
        };
        candidates.push(CandidateSummary {
            orientation,
            islands: score.shapes.len(),
            badness: score.badness,
        });
        if best.as_ref().map_or(true, |b| score.badness < b.badness) {
            best = Some(score);
        }
    }

    let best = best.ok_or(DetectError::NoGeometry)?;
    info!(
        orientation = best.orientation.tag(),
        badness = best.badness,
        bases = best.shapes.len(),
        "selected orientation"
    );

    Ok(BaseDetection {
        orientation: best.orientation,
        badness: best.badness,
        shapes: best.shapes,
        min_z: best.min_z,
        mesh: best.mesh,
        rotation: best.rotation,
        candidates,
    })
}
