//! Cylindrical lithophane generation from grayscale images.
//!
//! A lithophane is a thin shell whose wall thickness varies with image
//! brightness, so the picture appears when the shell is lit from inside.
//! This crate turns a normalized intensity image into a watertight,
//! outward-oriented cylinder mesh ready for slicing.
//!
//! # Features
//!
//! - **Thickness mapping**: gamma, inversion and range remapping, with edge
//!   blending so the image wraps without a visible seam
//! - **Surface interpolation**: bicubic resampling of the thickness field
//!   onto the mesh grid, bilinear for small images
//! - **Cylinder tessellation**: partial coverage with a solid back arc,
//!   curvature compensation, open or closed ends with optional cable bore
//! - **Certification**: every mesh is repaired and proven closed and
//!   consistently oriented before it is returned
//! - **Builder API**: fluent configuration with progress and cancellation
//!
//! # Quick Start with LithophaneBuilder
//!
//! ```
//! use litho_shell::{IntensityBuffer, LithophaneBuilder};
//!
//! let image = IntensityBuffer::from_fn(64, 32, |row, col| {
//!     ((row as f64 / 4.0).sin() * (col as f64 / 6.0).cos() + 1.0) / 2.0
//! }).unwrap();
//!
//! let result = LithophaneBuilder::new(&image)
//!     .outer_diameter(40.0)
//!     .height(30.0)
//!     .preview()              // 1 mm tessellation
//!     .build()
//!     .unwrap();
//!
//! assert!(result.validation().is_printable());
//! println!("{} faces", result.mesh.face_count());
//! ```
//!
//! # Advanced Configuration
//!
//! ```
//! use litho_mesh::progress::ProgressCallback;
//! use litho_shell::{CylinderSpec, EndCap, ImageCategory, IntensityBuffer, LithophanePipeline};
//!
//! let spec = CylinderSpec {
//!     outer_diameter_mm: 40.0,
//!     height_mm: 30.0,
//!     coverage_angle_deg: 240.0,
//!     resolution_mm: 1.0,
//!     top_cap: EndCap::Closed { thickness_mm: 1.5, bore_diameter_mm: 8.0 },
//!     ..Default::default()
//! }
//! .with_image_category(ImageCategory::Portrait);
//!
//! let callback: ProgressCallback = Box::new(|progress| {
//!     println!("{}%: {}", progress.percent(), progress.message);
//!     true // continue
//! });
//!
//! let image = IntensityBuffer::uniform(32, 16, 0.4).unwrap();
//! let result = LithophanePipeline::new(spec)
//!     .with_progress(callback)
//!     .run(&image)
//!     .unwrap();
//! assert!(result.warnings.is_empty());
//! ```
//!
//! # Low-Level API
//!
//! Each stage is usable on its own:
//!
//! ```
//! use litho_shell::{
//!     CylinderSpec, CylindricalMeshBuilder, IntensityBuffer, MeshValidator, ThicknessParams,
//!     map_thickness,
//! };
//!
//! let spec = CylinderSpec { resolution_mm: 1.0, ..Default::default() };
//! let image = IntensityBuffer::uniform(24, 12, 0.5).unwrap();
//!
//! let mapping = map_thickness(&image, &ThicknessParams::from_spec(&spec)).unwrap();
//! let mut shell = CylindricalMeshBuilder::new(&spec).unwrap().generate(&mapping.field).unwrap();
//! let outcome = MeshValidator::default().validate(&mut shell.mesh).unwrap();
//! assert!(outcome.repair.is_clean());
//! ```

mod builder;
mod cylinder;
mod error;
mod estimate;
mod intensity;
mod interpolate;
mod pipeline;
mod spec;
mod thickness;
mod validator;
mod warning;

pub use error::{LithoResult, LithophaneError, LithophaneErrorCode, LithophaneRecoverySuggestion};

// Builder API (recommended)
pub use builder::LithophaneBuilder;

// Configuration and input
pub use intensity::IntensityBuffer;
pub use spec::{
    ConfigError, CylinderSpec, DEFAULT_MAX_SEGMENTS, EndCap, ImageCategory,
    MAX_PRINTABLE_THICKNESS_MM, MAX_RESOLUTION_MM, MIN_ANGULAR_SEGMENTS, MIN_FEATURE_MM,
};

// Thickness mapping and interpolation
pub use interpolate::{InterpolationMethod, MIN_CUBIC_SAMPLES, SurfaceInterpolator};
pub use thickness::{
    ThicknessField, ThicknessMapper, ThicknessMapping, ThicknessParams, map_thickness,
};

// Geometry and validation
pub use cylinder::{CylinderLayout, CylindricalMeshBuilder, GeneratedShell, SurfaceTag, Tessellation};
pub use validator::{MeshValidator, ValidationOutcome};

// Pipeline
pub use pipeline::{
    LithophanePipeline, LithophaneResult, PipelineStage, StageTiming, TessellationSummary,
    generate_lithophane,
};
pub use warning::{PipelineWarning, SegmentAxis};

// Print estimates
pub use estimate::{
    DEFAULT_LAYER_HEIGHT_MM, MIN_PRINT_HOURS, PLA_DENSITY_G_PER_CM3, PRINT_HOURS_PER_CM3,
    PrintEstimate,
};
