//! rebase run command - full pipeline through OpenSCAD.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use rebase_scad::{EvaluationJob, Evaluator, OpenScadProcess, RebaseSession};
use serde::Serialize;
use tracing::info;

use crate::config::RebaseConfig;
use crate::{output, Cli, OutputFormat};

#[derive(Serialize)]
struct RunReport {
    output: String,
    bases: usize,
    failed: bool,
    elapsed_ms: u64,
    diagnostics: Vec<String>,
}

pub async fn run(
    to_fix: &Path,
    gold: &Path,
    output_path: &Path,
    keep_script: Option<&Path>,
    config: &RebaseConfig,
    cli: &Cli,
) -> Result<()> {
    let evaluator =
        OpenScadProcess::new(config.evaluator.clone()).context("Invalid evaluator settings")?;

    // the subprocess sees its inputs relative to its working directory
    let mut settings = config.script.clone();
    settings.paths = evaluator.import_paths();
    let (script, _, _) = super::script::build(to_fix, gold, &config.detect, &settings)?;

    if let Some(path) = keep_script {
        fs::write(path, &script.source)
            .with_context(|| format!("Failed to write script to {:?}", path))?;
    }

    let subject_stl: Arc<[u8]> = fs::read(to_fix)
        .with_context(|| format!("Failed to read {:?}", to_fix))?
        .into();
    let reference_stl: Arc<[u8]> = fs::read(gold)
        .with_context(|| format!("Failed to read {:?}", gold))?
        .into();
    let bases = script.bases;

    let session = RebaseSession::new(evaluator);
    let outcome = session
        .submit(EvaluationJob::new(script, subject_stl, reference_stl))
        .await
        .context("Evaluator task did not complete")?
        .context("Evaluation was superseded")?;

    let result = outcome.output;
    let failed = result.is_failure();
    if let (false, Some(mesh)) = (failed, result.mesh.as_ref()) {
        fs::write(output_path, mesh)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        info!(path = %output_path.display(), bytes = mesh.len(), "wrote fixed mesh");
    }

    match cli.format {
        OutputFormat::Json => {
            let report = RunReport {
                output: output_path.display().to_string(),
                bases,
                failed,
                elapsed_ms: outcome.elapsed.as_millis() as u64,
                diagnostics: result.diagnostics.clone(),
            };
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                for line in &result.diagnostics {
                    eprintln!("{line}");
                }
                if !failed {
                    println!(
                        "Replaced {} base(s), wrote {}",
                        bases,
                        output_path.display()
                    );
                }
            }
        }
    }

    if failed {
        // errors stay visible under -q, the rest of the output does not
        if cli.quiet {
            for line in result.errors() {
                eprintln!("{line}");
            }
        }
        bail!("OpenSCAD could not evaluate the cut script");
    }
    Ok(())
}
