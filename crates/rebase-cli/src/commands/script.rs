//! rebase script command - print or save the cut script.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rebase_detect::Orientation;
use rebase_scad::{script_for_detections, CutScript, ScriptSettings};
use serde::Serialize;

use crate::config::RebaseConfig;
use crate::{output, Cli, OutputFormat};

#[derive(Serialize)]
struct ScriptReport<'a> {
    subject_orientation: Orientation,
    reference_orientation: Orientation,
    bases: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
    script: &'a str,
}

/// Detect both meshes and build the script with the given settings.
pub fn build(
    to_fix: &Path,
    gold: &Path,
    detect: &rebase_detect::DetectSettings,
    settings: &ScriptSettings,
) -> Result<(CutScript, Orientation, Orientation)> {
    let (_, subject) = super::load_and_detect(to_fix, detect)?;
    let (_, reference) = super::load_and_detect(gold, detect)?;
    let script = script_for_detections(&subject, &reference, settings)
        .with_context(|| format!("Cannot build a cut script for {:?} from {:?}", to_fix, gold))?;
    Ok((script, subject.orientation, reference.orientation))
}

pub fn run(
    to_fix: &Path,
    gold: &Path,
    output_path: Option<&Path>,
    config: &RebaseConfig,
    cli: &Cli,
) -> Result<()> {
    let (script, subject_orientation, reference_orientation) =
        build(to_fix, gold, &config.detect, &config.script)?;

    if let Some(path) = output_path {
        fs::write(path, &script.source)
            .with_context(|| format!("Failed to write script to {:?}", path))?;
    }

    match cli.format {
        OutputFormat::Json => {
            let report = ScriptReport {
                subject_orientation,
                reference_orientation,
                bases: script.bases,
                written_to: output_path.map(|p| p.display().to_string()),
                script: &script.source,
            };
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => match output_path {
            Some(path) if !cli.quiet => {
                println!(
                    "Wrote script for {} base(s) to {}",
                    script.bases,
                    path.display()
                );
            }
            Some(_) => {}
            // the script itself is the result, so print it even when quiet
            None => print!("{}", script.source),
        },
    }
    Ok(())
}
