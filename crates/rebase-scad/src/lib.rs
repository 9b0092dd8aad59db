#![warn(missing_docs)]

//! OpenSCAD cut scripts and evaluator runs for rebase.
//!
//! Turns two base detections (the module being fixed and a reference
//! module with the preferred base) into an OpenSCAD program that cuts
//! out every base of the first and pastes in the base of the second,
//! and runs that program through an evaluator.
//!
//! # Example
//!
//! ```ignore
//! use rebase_scad::{script_for_detections, EvaluationJob, OpenScadProcess, RebaseSession};
//!
//! let evaluator = OpenScadProcess::default();
//! let mut settings = ScriptSettings::default();
//! settings.paths = evaluator.import_paths();
//!
//! let script = script_for_detections(&to_fix, &gold, &settings)?;
//! let session = RebaseSession::new(evaluator);
//! let job = EvaluationJob::new(script, to_fix_bytes.into(), gold_bytes.into());
//!
//! if let Some(outcome) = session.submit(job).await? {
//!     println!("failed: {}", outcome.output.is_failure());
//! }
//! ```

pub mod error;
pub mod evaluator;
pub mod process;
pub mod script;
pub mod session;

pub use error::{Result, ScadError};
pub use evaluator::{EvaluationJob, EvaluationOutput, Evaluator, ERROR_MARKER, WARNING_MARKER};
pub use process::{EvaluatorSettings, OpenScadProcess};
pub use script::{
    format_number, generate_cut_script, rotate_statement, rotation_angles, CutProfile, CutScript,
    ImportPaths, ScriptReference, ScriptSettings, ScriptSubject,
};
pub use session::{RebaseOutcome, RebaseSession, RequestId};

use rebase_detect::BaseDetection;

/// Validate settings and build the script for two detections.
///
/// Every base of `subject` is replaced with the first base of
/// `reference`. Fails with [`ScadError::NoReferenceBase`] when the
/// reference has none, and with [`ScadError::NonFinite`] when either
/// detection carries NaN or infinite coordinates.
pub fn script_for_detections(
    subject: &BaseDetection,
    reference: &BaseDetection,
    settings: &ScriptSettings,
) -> Result<CutScript> {
    settings.validate()?;
    let reference = ScriptReference::from_detection(reference)?;
    let subject = ScriptSubject::from_detection(subject)?;
    Ok(generate_cut_script(&subject, &reference, settings))
}
