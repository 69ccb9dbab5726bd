//! lithophane build command - generate and certify a cylinder mesh.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use litho_mesh::progress::ProgressCallback;
use litho_shell::{
    CylinderSpec, IntensityBuffer, LithophanePipeline, LithophaneResult, PipelineWarning,
    PrintEstimate,
};
use serde::{Deserialize, Serialize};

use crate::commands::{SpecOverrides, load_spec};
use crate::{Cli, OutputFormat, output};

/// On-disk intensity image: row-major samples in `[0, 1]`.
#[derive(Deserialize)]
struct IntensityFile {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

#[derive(Serialize)]
struct BuildResult {
    input: String,
    success: bool,
    image: [usize; 2],
    vertices: usize,
    faces: usize,
    angular_segments: usize,
    height_segments: usize,
    blend_columns: usize,
    interpolation: String,
    validation: ValidationInfo,
    warnings: Vec<PipelineWarning>,
    estimate: PrintEstimate,
    timings_ms: Vec<(String, f64)>,
}

#[derive(Serialize)]
struct ValidationInfo {
    watertight: bool,
    manifold: bool,
    consistently_wound: bool,
    components: usize,
    dimensions: Option<[f64; 3]>,
    volume: f64,
    surface_area: f64,
}

pub fn load_intensity(path: &Path) -> Result<IntensityBuffer> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read intensity file {:?}", path))?;
    let file: IntensityFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse intensity file {:?}", path))?;
    Ok(IntensityBuffer::new(file.width, file.height, file.data)?)
}

pub fn run(
    input: &Path,
    config: Option<&Path>,
    overrides: SpecOverrides,
    layer_height: f64,
    cli: &Cli,
) -> Result<()> {
    let spec = load_spec(config, overrides)?;
    let buffer = load_intensity(input)?;

    output::info(
        &format!(
            "Building {:.0} x {:.0} mm lithophane from {} x {} image...",
            spec.outer_diameter_mm,
            spec.height_mm,
            buffer.width(),
            buffer.height()
        ),
        cli.format,
        cli.quiet,
    );

    let result = run_pipeline(&spec, &buffer, cli)?;
    let estimate = PrintEstimate::from_mesh(&result.mesh, layer_height)?;
    let summary = summarize(input, &buffer, &result, estimate);

    match cli.format {
        OutputFormat::Json => output::print(&summary, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                print_text(&summary, &result);
            }
        }
    }

    Ok(())
}

fn run_pipeline(spec: &CylinderSpec, buffer: &IntensityBuffer, cli: &Cli) -> Result<LithophaneResult> {
    let mut pipeline = LithophanePipeline::new(spec.clone());
    if !cli.quiet && matches!(cli.format, OutputFormat::Text) {
        let callback: ProgressCallback = Box::new(|progress| {
            eprintln!(
                "  {} {} ({}/{})",
                "·".dimmed(),
                progress.message,
                progress.current + 1,
                progress.total
            );
            true
        });
        pipeline = pipeline.with_progress(callback);
    }
    Ok(pipeline.run(buffer)?)
}

fn summarize(
    input: &Path,
    buffer: &IntensityBuffer,
    result: &LithophaneResult,
    estimate: PrintEstimate,
) -> BuildResult {
    let report = result.validation();
    BuildResult {
        input: input.display().to_string(),
        success: true,
        image: [buffer.width(), buffer.height()],
        vertices: result.mesh.vertex_count(),
        faces: result.mesh.face_count(),
        angular_segments: result.tessellation.angular_segments,
        height_segments: result.tessellation.height_segments,
        blend_columns: result.tessellation.blend_columns,
        interpolation: result.tessellation.interpolation.to_string(),
        validation: ValidationInfo {
            watertight: report.is_watertight,
            manifold: report.is_manifold,
            consistently_wound: report.is_consistently_wound,
            components: report.component_count,
            dimensions: report.dimensions.map(|(x, y, z)| [x, y, z]),
            volume: report.volume,
            surface_area: report.surface_area,
        },
        warnings: result.warnings.clone(),
        estimate,
        timings_ms: result
            .timings
            .iter()
            .map(|t| (t.stage.to_string(), t.duration.as_secs_f64() * 1000.0))
            .collect(),
    }
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "Yes".green()
    } else {
        "No".red().bold()
    }
}

fn print_text(summary: &BuildResult, result: &LithophaneResult) {
    output::success(
        &format!("Lithophane generated from {}", summary.input),
        OutputFormat::Text,
        false,
    );

    println!("\n{}", "Mesh".bold().underline());
    println!("  {}: {}", "Vertices".cyan(), summary.vertices);
    println!("  {}: {}", "Faces".cyan(), summary.faces);
    println!(
        "  {}: {} angular x {} height",
        "Segments".cyan(),
        summary.angular_segments,
        summary.height_segments
    );
    println!(
        "  {}: {}, {} blend columns",
        "Sampling".cyan(),
        summary.interpolation,
        summary.blend_columns
    );
    if let Some([x, y, z]) = summary.validation.dimensions {
        println!("  {}: {:.2} x {:.2} x {:.2} mm", "Size".cyan(), x, y, z);
    }

    let v = &summary.validation;
    println!("\n{}", "Validation".bold().underline());
    println!("  {}: {}", "Watertight".cyan(), yes_no(v.watertight));
    println!("  {}: {}", "Manifold".cyan(), yes_no(v.manifold));
    println!("  {}: {}", "Consistent winding".cyan(), yes_no(v.consistently_wound));
    println!("  {}: {}", "Components".cyan(), v.components);
    if result.repair.is_clean() {
        println!("  {}: none needed", "Repairs".cyan());
    }

    if !summary.warnings.is_empty() {
        println!("\n{}", "Warnings:".bold());
        for warning in &summary.warnings {
            output::warning(&warning.to_string(), OutputFormat::Text, false);
        }
    }

    println!("\n{}", summary.estimate);
    println!(
        "  {}: {:.1} ms",
        "Total time".cyan(),
        result.total_duration().as_secs_f64() * 1000.0
    );
}
