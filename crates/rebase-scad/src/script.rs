//! OpenSCAD cut-script generation.
//!
//! The generated program has three parts:
//!
//! - `simple_cut()`, the two stacked square cuboids that carve one base
//!   out of a module
//! - `preferred_bottom()`, the reference mesh rotated into its detection
//!   frame, moved so its first base sits at the origin, and clipped to
//!   `simple_cut()`
//! - the top-level `union()` that subtracts `simple_cut()` at every
//!   subject base and adds `preferred_bottom()` back in its place

use std::fmt::Write as _;

use rebase_detect::{BaseDetection, HullShape, Orientation};
use rebase_math::Point2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScadError};

/// Dimensions of the cut made at every base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutProfile {
    /// Side of the wide, shallow cuboid (mm).
    pub outer_size: f64,
    /// Height of the wide cuboid (mm).
    pub outer_height: f64,
    /// Side of the narrow, deep cuboid (mm).
    pub inner_size: f64,
    /// Height of the narrow cuboid (mm).
    pub inner_height: f64,
}

impl Default for CutProfile {
    fn default() -> Self {
        Self {
            outer_size: 42.0,
            outer_height: 2.6,
            inner_size: 34.0,
            inner_height: 5.5,
        }
    }
}

/// Where the evaluator finds its inputs and writes its output.
///
/// These are paths inside the evaluator's own filesystem, not on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportPaths {
    /// Mesh being fixed.
    pub subject: String,
    /// Mesh providing the replacement base.
    pub reference: String,
    /// Result mesh.
    pub output: String,
}

impl Default for ImportPaths {
    fn default() -> Self {
        Self {
            subject: "/toFix.stl".into(),
            reference: "/gold.stl".into(),
            output: "/fixed.stl".into(),
        }
    }
}

impl ImportPaths {
    /// The default file names relative to a working directory.
    pub fn relative() -> Self {
        Self {
            subject: "toFix.stl".into(),
            reference: "gold.stl".into(),
            output: "fixed.stl".into(),
        }
    }
}

/// Script generation parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Cut dimensions.
    pub profile: CutProfile,
    /// In-evaluator file paths.
    pub paths: ImportPaths,
}

impl ScriptSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let p = &self.profile;
        for (name, value) in [
            ("outer_size", p.outer_size),
            ("outer_height", p.outer_height),
            ("inner_size", p.inner_size),
            ("inner_height", p.inner_height),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ScadError::InvalidSettings(format!(
                    "{name} must be a positive number"
                )));
            }
        }
        for (name, path) in [
            ("subject", &self.paths.subject),
            ("reference", &self.paths.reference),
            ("output", &self.paths.output),
        ] {
            if path.is_empty() {
                return Err(ScadError::InvalidSettings(format!(
                    "{name} path must not be empty"
                )));
            }
            if path.contains('"') || path.contains('\\') {
                return Err(ScadError::InvalidSettings(format!(
                    "{name} path must not contain quotes or backslashes"
                )));
            }
        }
        Ok(())
    }
}

/// The mesh being fixed, as seen by the script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSubject {
    /// Orientation the subject is rotated into.
    pub orientation: Orientation,
    /// One centroid per base, in island order.
    pub centroids: Vec<Point2>,
    /// Lowest Z in that orientation.
    pub min_z: f64,
}

impl ScriptSubject {
    /// Build from base shapes.
    ///
    /// Fails with [`ScadError::NonFinite`] when a centroid or `min_z` is
    /// NaN or infinite, which OpenSCAD cannot parse.
    pub fn new(orientation: Orientation, shapes: &[HullShape], min_z: f64) -> Result<Self> {
        let centroids: Vec<Point2> = shapes.iter().map(HullShape::centroid).collect();
        finite("subject min_z", min_z)?;
        for c in &centroids {
            finite("subject base centroid", c.x)?;
            finite("subject base centroid", c.y)?;
        }
        Ok(Self {
            orientation,
            centroids,
            min_z,
        })
    }

    /// Every detected base of the subject.
    pub fn from_detection(detection: &BaseDetection) -> Result<Self> {
        Self::new(detection.orientation, &detection.shapes, detection.min_z)
    }
}

/// The reference mesh, as seen by the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptReference {
    /// Orientation the reference is rotated into.
    pub orientation: Orientation,
    /// Centroid of the base that is copied.
    pub centroid: Point2,
    /// Lowest Z in that orientation.
    pub min_z: f64,
}

impl ScriptReference {
    /// Use the reference's first detected base.
    pub fn from_detection(detection: &BaseDetection) -> Result<Self> {
        let first = detection.shapes.first().ok_or(ScadError::NoReferenceBase)?;
        let centroid = first.centroid();
        finite("reference min_z", detection.min_z)?;
        finite("reference base centroid", centroid.x)?;
        finite("reference base centroid", centroid.y)?;
        Ok(Self {
            orientation: detection.orientation,
            centroid,
            min_z: detection.min_z,
        })
    }
}

/// A generated script and the files it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct CutScript {
    /// OpenSCAD source.
    pub source: String,
    /// Files the script imports and the file the evaluator must write.
    pub paths: ImportPaths,
    /// Number of bases cut and replaced.
    pub bases: usize,
}

impl CutScript {
    /// Evaluator arguments after the script file name.
    pub fn evaluator_args(&self, backend: Option<&str>, extra: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(extra.len() + 3);
        if let Some(backend) = backend {
            args.push(format!("--backend={backend}"));
        }
        args.extend_from_slice(extra);
        args.push("-o".into());
        args.push(self.paths.output.clone());
        args
    }
}

fn finite(what: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScadError::NonFinite(what))
    }
}

/// Rotation angles in degrees, `None` for the loaded orientation.
pub fn rotation_angles(orientation: Orientation) -> Option<[i32; 3]> {
    match orientation {
        Orientation::Original => None,
        Orientation::XPos => Some([90, 0, 0]),
        Orientation::XNeg => Some([-90, 0, 0]),
        Orientation::YPos => Some([0, 90, 0]),
        Orientation::YNeg => Some([0, -90, 0]),
        Orientation::Flip180 => Some([0, 180, 0]),
    }
}

/// `rotate([..]) ` prefix for an orientation, empty for the original.
pub fn rotate_statement(orientation: Orientation) -> String {
    match rotation_angles(orientation) {
        Some([x, y, z]) => format!("rotate([{x}, {y}, {z}]) "),
        None => String::new(),
    }
}

/// Format a number the way the script prints it.
///
/// Shortest round-trip decimal, with negative zero printed as `0`.
/// Callers keep NaN and infinities out; see [`ScriptSubject::new`].
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".into()
    } else {
        format!("{value}")
    }
}

/// Generate the cut script for a subject and reference.
///
/// Settings are not re-validated here; callers that take them from user
/// input should call [`ScriptSettings::validate`] first.
pub fn generate_cut_script(
    subject: &ScriptSubject,
    reference: &ScriptReference,
    settings: &ScriptSettings,
) -> CutScript {
    let n = format_number;
    let p = &settings.profile;
    let paths = &settings.paths;
    let mut s = String::new();

    // writing to a String cannot fail
    let _ = writeln!(s, "module simple_cut() {{");
    let _ = writeln!(
        s,
        "    translate([-{o} / 2, -{o} / 2, 0]) cube([{o}, {o}, {h}]);",
        o = n(p.outer_size),
        h = n(p.outer_height),
    );
    let _ = writeln!(
        s,
        "    translate([-{i} / 2, -{i} / 2, 0]) cube([{i}, {i}, {h}]);",
        i = n(p.inner_size),
        h = n(p.inner_height),
    );
    let _ = writeln!(s, "}}");
    let _ = writeln!(s);

    let _ = writeln!(s, "module preferred_bottom() {{");
    let _ = writeln!(s, "    intersection() {{");
    let _ = writeln!(
        s,
        "        translate([{}, {}, {}]) {}import(\"{}\");",
        n(-reference.centroid.x),
        n(-reference.centroid.y),
        n(-reference.min_z),
        rotate_statement(reference.orientation),
        paths.reference,
    );
    let _ = writeln!(s, "        simple_cut();");
    let _ = writeln!(s, "    }}");
    let _ = writeln!(s, "}}");
    let _ = writeln!(s);

    let z = n(subject.min_z);
    let _ = writeln!(s, "union() {{");
    let _ = writeln!(s, "    difference() {{");
    let _ = writeln!(
        s,
        "        {}import(\"{}\");",
        rotate_statement(subject.orientation),
        paths.subject,
    );
    for c in &subject.centroids {
        let _ = writeln!(
            s,
            "        translate([{}, {}, {z}]) simple_cut();",
            n(c.x),
            n(c.y)
        );
    }
    let _ = writeln!(s, "    }}");
    for c in &subject.centroids {
        let _ = writeln!(
            s,
            "    translate([{}, {}, {z}]) preferred_bottom();",
            n(c.x),
            n(c.y)
        );
    }
    let _ = writeln!(s, "}}");

    debug!(
        subject = subject.orientation.tag(),
        reference = reference.orientation.tag(),
        bases = subject.centroids.len(),
        "generated cut script"
    );

    CutScript {
        source: s,
        paths: paths.clone(),
        bases: subject.centroids.len(),
    }
}
