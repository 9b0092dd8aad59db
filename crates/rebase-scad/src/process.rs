//! Evaluate scripts with a local `openscad` binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScadError};
use crate::evaluator::{EvaluationJob, EvaluationOutput, Evaluator, ERROR_MARKER};
use crate::script::ImportPaths;

/// File name the script is written to inside the sandbox.
pub const SCRIPT_FILE: &str = "input.scad";

/// How to launch the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorSettings {
    /// Binary name or path.
    pub binary: PathBuf,
    /// Geometry backend passed as `--backend=`, if any.
    pub backend: Option<String>,
    /// Extra arguments placed before `-o`.
    pub extra_args: Vec<String>,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("openscad"),
            backend: Some("manifold".into()),
            extra_args: Vec::new(),
        }
    }
}

impl EvaluatorSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.binary.as_os_str().is_empty() {
            return Err(ScadError::InvalidSettings(
                "evaluator binary must not be empty".into(),
            ));
        }
        if self.backend.as_deref() == Some("") {
            return Err(ScadError::InvalidSettings(
                "backend must be omitted rather than empty".into(),
            ));
        }
        Ok(())
    }
}

/// Runs one `openscad` process per evaluation in a fresh temp directory.
#[derive(Debug, Clone, Default)]
pub struct OpenScadProcess {
    settings: EvaluatorSettings,
}

impl OpenScadProcess {
    /// Create an evaluator after validating its settings.
    pub fn new(settings: EvaluatorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Launch settings.
    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    fn run(&self, job: &EvaluationJob) -> io::Result<EvaluationOutput> {
        let sandbox = tempfile::tempdir()?;
        let root = sandbox.path();
        let paths = &job.script.paths;

        fs::write(root.join(SCRIPT_FILE), &job.script.source)?;
        fs::write(sandboxed(root, &paths.subject), &job.subject_stl)?;
        fs::write(sandboxed(root, &paths.reference), &job.reference_stl)?;

        let mut command = Command::new(&self.settings.binary);
        command
            .current_dir(root)
            .arg(SCRIPT_FILE)
            .args(job.script.evaluator_args(
                self.settings.backend.as_deref(),
                &self.settings.extra_args,
            ));
        debug!(?command, "running evaluator");

        let output = command.output()?;
        let mut diagnostics: Vec<String> = String::from_utf8_lossy(&output.stderr)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_owned)
            .collect();
        if !output.status.success() && !diagnostics.iter().any(|l| l.contains(ERROR_MARKER)) {
            diagnostics.push(format!("ERROR: evaluator exited with {}", output.status));
        }

        let mesh = match fs::read(sandboxed(root, &paths.output)) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => None,
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };
        Ok(EvaluationOutput { mesh, diagnostics })
    }
}

impl Evaluator for OpenScadProcess {
    fn import_paths(&self) -> ImportPaths {
        ImportPaths::relative()
    }

    fn evaluate(&self, job: &EvaluationJob) -> EvaluationOutput {
        match self.run(job) {
            Ok(output) => {
                info!(
                    binary = %self.settings.binary.display(),
                    produced_mesh = output.mesh.is_some(),
                    diagnostics = output.diagnostics.len(),
                    "evaluator finished"
                );
                output
            }
            Err(e) => EvaluationOutput::failed(format!(
                "ERROR: could not run {}: {e}",
                self.settings.binary.display()
            )),
        }
    }
}

/// Place an in-evaluator path under the sandbox root.
fn sandboxed(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::CutScript;
    use std::sync::Arc;

    fn job() -> EvaluationJob {
        EvaluationJob::new(
            CutScript {
                source: "cube(1);\n".into(),
                paths: ImportPaths::relative(),
                bases: 0,
            },
            Arc::from(&b"subject"[..]),
            Arc::from(&b"reference"[..]),
        )
    }

    #[test]
    fn test_default_settings() {
        let settings = EvaluatorSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.binary, PathBuf::from("openscad"));
        assert_eq!(settings.backend.as_deref(), Some("manifold"));
    }

    #[test]
    fn test_invalid_settings() {
        let settings = EvaluatorSettings {
            binary: PathBuf::new(),
            ..Default::default()
        };
        assert!(OpenScadProcess::new(settings).is_err());

        let settings = EvaluatorSettings {
            backend: Some(String::new()),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_sandboxed_strips_leading_slash() {
        let root = Path::new("/tmp/box");
        assert_eq!(sandboxed(root, "/toFix.stl"), root.join("toFix.stl"));
        assert_eq!(sandboxed(root, "gold.stl"), root.join("gold.stl"));
    }

    #[test]
    fn test_missing_binary_is_a_diagnostic() {
        let evaluator = OpenScadProcess::new(EvaluatorSettings {
            binary: PathBuf::from("/nonexistent/rebase-openscad"),
            ..Default::default()
        })
        .unwrap();
        let out = evaluator.evaluate(&job());
        assert!(out.is_failure());
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].starts_with("ERROR: could not run"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stand_in_binary_sees_inputs() {
        use std::os::unix::fs::PermissionsExt;

        // stands in for openscad: echoes its arguments as a warning and
        // concatenates both inputs into the output file
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("fake-openscad");
        fs::write(
            &bin,
            "#!/bin/sh\n\
             echo \"WARNING: args $*\" >&2\n\
             test -f input.scad || { echo 'ERROR: no script' >&2; exit 1; }\n\
             cat toFix.stl gold.stl > \"$4\"\n",
        )
        .unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

        let evaluator = OpenScadProcess::new(EvaluatorSettings {
            binary: bin,
            ..Default::default()
        })
        .unwrap();
        let out = evaluator.evaluate(&job());

        assert!(!out.is_failure(), "{:?}", out.diagnostics);
        assert_eq!(out.mesh.as_deref(), Some(&b"subjectreference"[..]));
        let warnings: Vec<&str> = out.warnings().collect();
        assert_eq!(
            warnings,
            ["WARNING: args input.scad --backend=manifold -o fixed.stl"]
        );
    }
}
