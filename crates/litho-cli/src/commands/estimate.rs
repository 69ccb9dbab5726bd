//! lithophane estimate command - predict mesh size without building it.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use litho_shell::{CylinderLayout, InterpolationMethod, Tessellation, ThicknessParams};
use serde::Serialize;

use crate::commands::{SpecOverrides, load_spec};
use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct EstimateResult {
    outer_radius_mm: f64,
    inner_radius_mm: f64,
    image_band_height_mm: f64,
    coverage_deg: f64,
    angular_segments: usize,
    height_segments: usize,
    rings: usize,
    vertices: usize,
    faces: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<ImageEstimate>,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct ImageEstimate {
    width: usize,
    height: usize,
    blend_columns: usize,
    interpolation: String,
    /// Image pixels per angular segment.
    pixels_per_segment: f64,
}

pub fn run(
    config: Option<&Path>,
    overrides: SpecOverrides,
    image_size: Option<(usize, usize)>,
    cli: &Cli,
) -> Result<()> {
    let spec = load_spec(config, overrides)?;
    let tessellation = Tessellation::for_spec(&spec);
    let layout = CylinderLayout::new(&spec, tessellation);
    let mut warnings: Vec<String> = tessellation.warnings().iter().map(|w| w.to_string()).collect();

    let image = image_size.map(|(width, height)| {
        let params = ThicknessParams::from_spec(&spec);
        let blend_columns = params.blend_columns_for(width);
        if blend_columns != params.requested_blend_columns() {
            warnings.push(format!(
                "edge blend reduced from {} to {} columns for a {} px wide image",
                params.requested_blend_columns(),
                blend_columns,
                width
            ));
        }
        let window_columns = spec.coverage_angle_deg / 360.0 * tessellation.angular_segments as f64;
        ImageEstimate {
            width,
            height,
            blend_columns,
            interpolation: InterpolationMethod::for_grid(height, width).to_string(),
            pixels_per_segment: width as f64 / window_columns.max(1.0),
        }
    });

    let result = EstimateResult {
        outer_radius_mm: spec.outer_radius(),
        inner_radius_mm: spec.inner_radius(),
        image_band_height_mm: spec.image_band_height(),
        coverage_deg: spec.coverage_angle_deg,
        angular_segments: tessellation.angular_segments,
        height_segments: tessellation.height_segments,
        rings: layout.ring_count(),
        vertices: layout.vertex_count(),
        faces: layout.face_count(),
        image,
        warnings,
    };

    match cli.format {
        OutputFormat::Json => output::print(&result, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                print_text(&result);
            }
        }
    }

    Ok(())
}

fn print_text(result: &EstimateResult) {
    println!("{}", "Cylinder Estimate".bold().underline());
    println!(
        "  {}: {:.2} mm outer, {:.2} mm inner",
        "Radius".cyan(),
        result.outer_radius_mm,
        result.inner_radius_mm
    );
    println!(
        "  {}: {:.2} mm over {:.0}°",
        "Image band".cyan(),
        result.image_band_height_mm,
        result.coverage_deg
    );
    println!(
        "  {}: {} angular x {} height",
        "Segments".cyan(),
        result.angular_segments,
        result.height_segments
    );
    println!("  {}: {}", "Rings".cyan(), result.rings);
    println!("  {}: {}", "Vertices".cyan(), result.vertices);
    println!("  {}: {}", "Faces".cyan(), result.faces);

    if let Some(image) = &result.image {
        println!("\n{}", "Image".bold().underline());
        println!("  {}: {} x {}", "Size".cyan(), image.width, image.height);
        println!("  {}: {}", "Interpolation".cyan(), image.interpolation);
        println!("  {}: {}", "Blend columns".cyan(), image.blend_columns);
        println!(
            "  {}: {:.2} px/segment",
            "Density".cyan(),
            image.pixels_per_segment
        );
    }

    if !result.warnings.is_empty() {
        println!("\n{}", "Warnings:".bold());
        for warning in &result.warnings {
            output::warning(warning, OutputFormat::Text, false);
        }
    }
}
