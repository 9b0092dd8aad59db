//! rebase detect command - report orientation and bases.

use std::path::Path;

use anyhow::{Context, Result};
use rebase_detect::{BaseDetection, CandidateSummary, Orientation};
use serde::Serialize;

use crate::config::RebaseConfig;
use crate::{output, Cli, OutputFormat};

#[derive(Debug, Serialize)]
pub struct DetectReport {
    pub path: String,
    pub triangles: usize,
    pub orientation: Orientation,
    pub badness: usize,
    pub bases: Vec<BaseReport>,
    pub candidates: Vec<CandidateSummary>,
}

#[derive(Debug, Serialize)]
pub struct BaseReport {
    pub number: usize,
    pub centroid: [f64; 3],
    pub size: [f64; 2],
    /// Centroid in the input file's own coordinates.
    pub anchor: [f64; 3],
}

impl DetectReport {
    pub fn new(path: &Path, triangles: usize, detection: &BaseDetection) -> Self {
        let bases = detection
            .annotations()
            .into_iter()
            .map(|a| BaseReport {
                number: a.number,
                centroid: [a.centroid.x, a.centroid.y, a.centroid.z],
                size: [a.width, a.height],
                anchor: [a.source_anchor.x, a.source_anchor.y, a.source_anchor.z],
            })
            .collect();
        Self {
            path: path.display().to_string(),
            triangles,
            orientation: detection.orientation,
            badness: detection.badness,
            bases,
            candidates: detection.candidates.clone(),
        }
    }
}

pub fn run(
    input: &Path,
    write_oriented: Option<&Path>,
    config: &RebaseConfig,
    cli: &Cli,
) -> Result<()> {
    let (mesh, detection) = super::load_and_detect(input, &config.detect)?;

    if let Some(path) = write_oriented {
        detection
            .mesh
            .write_stl(path)
            .with_context(|| format!("Failed to write oriented mesh to {:?}", path))?;
    }

    let report = DetectReport::new(input, mesh.len(), &detection);
    match cli.format {
        OutputFormat::Json => output::print(&report, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                print_text(&report);
                if let Some(path) = write_oriented {
                    println!("Wrote oriented mesh to {}", path.display());
                }
            }
        }
    }
    Ok(())
}

fn print_text(report: &DetectReport) {
    println!("File: {}", report.path);
    println!("Triangles: {}", report.triangles);
    println!("Orientation: {}", report.orientation);
    println!("Badness: {}", report.badness);
    println!("Bases: {}", report.bases.len());
    for base in &report.bases {
        println!(
            "  #{}: centre ({:.3}, {:.3}, {:.3}), size {:.3} x {:.3}, source ({:.3}, {:.3}, {:.3})",
            base.number,
            base.centroid[0],
            base.centroid[1],
            base.centroid[2],
            base.size[0],
            base.size[1],
            base.anchor[0],
            base.anchor[1],
            base.anchor[2],
        );
    }
    let scores: Vec<String> = report
        .candidates
        .iter()
        .map(|c| format!("{}={}", c.orientation, c.badness))
        .collect();
    println!("Candidates: {}", scores.join(" "));
}
