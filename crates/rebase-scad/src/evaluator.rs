//! The boundary to an OpenSCAD evaluator.
//!
//! An evaluator is a black box: it takes a script plus the two meshes the
//! script imports and hands back an output mesh and whatever it printed.
//! Evaluation failures are data, not errors.

use std::sync::Arc;

use crate::script::{CutScript, ImportPaths};

/// Marker the evaluator prints on a hard error.
pub const ERROR_MARKER: &str = "ERROR:";

/// Marker the evaluator prints on a warning.
pub const WARNING_MARKER: &str = "WARNING:";

/// One evaluation request.
#[derive(Debug, Clone)]
pub struct EvaluationJob {
    /// Script to run.
    pub script: CutScript,
    /// STL bytes made available at `script.paths.subject`.
    pub subject_stl: Arc<[u8]>,
    /// STL bytes made available at `script.paths.reference`.
    pub reference_stl: Arc<[u8]>,
}

impl EvaluationJob {
    /// Bundle a script with its input meshes.
    pub fn new(script: CutScript, subject_stl: Arc<[u8]>, reference_stl: Arc<[u8]>) -> Self {
        Self {
            script,
            subject_stl,
            reference_stl,
        }
    }
}

/// What came back from one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOutput {
    /// Output mesh bytes, if the evaluator wrote any.
    pub mesh: Option<Vec<u8>>,
    /// Diagnostic lines in the order they were printed.
    pub diagnostics: Vec<String>,
}

impl EvaluationOutput {
    /// A failed evaluation carrying one diagnostic.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            mesh: None,
            diagnostics: vec![message.into()],
        }
    }

    /// True when there is no mesh or any diagnostic reports an error.
    pub fn is_failure(&self) -> bool {
        self.mesh.is_none() || self.errors().next().is_some()
    }

    /// Diagnostic lines that report an error.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.marked(ERROR_MARKER)
    }

    /// Diagnostic lines that report a warning.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.marked(WARNING_MARKER)
    }

    fn marked<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a str> {
        self.diagnostics
            .iter()
            .map(String::as_str)
            .filter(move |line| line.contains(marker))
    }
}

/// Runs cut scripts.
pub trait Evaluator: Send + Sync {
    /// Paths this evaluator expects the script to import from and write to.
    fn import_paths(&self) -> ImportPaths {
        ImportPaths::default()
    }

    /// Evaluate one job. Must not panic on evaluator failure.
    fn evaluate(&self, job: &EvaluationJob) -> EvaluationOutput;
}

impl<E: Evaluator + ?Sized> Evaluator for Arc<E> {
    fn import_paths(&self) -> ImportPaths {
        (**self).import_paths()
    }

    fn evaluate(&self, job: &EvaluationJob) -> EvaluationOutput {
        (**self).evaluate(job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(mesh: bool, lines: &[&str]) -> EvaluationOutput {
        EvaluationOutput {
            mesh: mesh.then(|| b"solid x\nendsolid x\n".to_vec()),
            diagnostics: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_clean_output_is_success() {
        let out = output(true, &["Geometries in cache: 3", "Total rendering time: 0:00:01"]);
        assert!(!out.is_failure());
        assert_eq!(out.warnings().count(), 0);
    }

    #[test]
    fn test_error_line_fails_even_with_mesh() {
        let out = output(true, &["ERROR: Parser error in file input.scad, line 3"]);
        assert!(out.is_failure());
        assert_eq!(out.errors().count(), 1);
    }

    #[test]
    fn test_missing_mesh_fails() {
        assert!(output(false, &[]).is_failure());
        assert!(EvaluationOutput::failed("ERROR: could not start").is_failure());
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let out = output(
            true,
            &[
                "WARNING: Object may not be a valid 2-manifold",
                "Rendering finished.",
                "WARNING: Ignoring unknown variable",
            ],
        );
        assert!(!out.is_failure());
        let warnings: Vec<&str> = out.warnings().collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("WARNING: Object"));
    }
}
