//! Fluent builder API for lithophane generation.
//!
//! # Example
//!
//! ```
//! use litho_shell::{EndCap, IntensityBuffer, LithophaneBuilder};
//!
//! let image = IntensityBuffer::from_fn(48, 24, |r, c| ((r + c) % 12) as f64 / 11.0).unwrap();
//!
//! let result = LithophaneBuilder::new(&image)
//!     .outer_diameter(40.0)
//!     .height(30.0)
//!     .coverage(270.0)
//!     .thickness_range(0.8, 3.0)
//!     .top_cap(EndCap::Open)
//!     .preview()
//!     .build()
//!     .unwrap();
//!
//! assert!(result.validation().is_watertight);
//! ```

use litho_mesh::progress::{ProgressCallback, SharedProgressTracker};

use crate::error::LithoResult;
use crate::intensity::IntensityBuffer;
use crate::pipeline::{LithophanePipeline, LithophaneResult};
use crate::spec::{CylinderSpec, EndCap, ImageCategory};

/// Fluent builder for lithophane generation.
///
/// Starts from [`CylinderSpec::default`]; each method overrides one setting.
/// Nothing is validated until [`build`](Self::build).
pub struct LithophaneBuilder<'a> {
    image: &'a IntensityBuffer,
    spec: CylinderSpec,
    progress_callback: Option<ProgressCallback>,
    tracker: Option<SharedProgressTracker>,
}

impl<'a> LithophaneBuilder<'a> {
    pub fn new(image: &'a IntensityBuffer) -> Self {
        Self {
            image,
            spec: CylinderSpec::default(),
            progress_callback: None,
            tracker: None,
        }
    }

    /// Replace every setting with `spec`.
    pub fn spec(mut self, spec: CylinderSpec) -> Self {
        self.spec = spec;
        self
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn outer_diameter(mut self, mm: f64) -> Self {
        self.spec.outer_diameter_mm = mm;
        self
    }

    pub fn height(mut self, mm: f64) -> Self {
        self.spec.height_mm = mm;
        self
    }

    /// Wall thickness of the solid back arc and the margins.
    pub fn wall_thickness(mut self, mm: f64) -> Self {
        self.spec.wall_thickness_mm = mm;
        self
    }

    /// Arc covered by the image, in degrees.
    pub fn coverage(mut self, degrees: f64) -> Self {
        self.spec.coverage_angle_deg = degrees;
        self
    }

    /// Angle of the middle of the image, in degrees.
    pub fn coverage_center(mut self, degrees: f64) -> Self {
        self.spec.coverage_center_deg = degrees;
        self
    }

    /// Plain bands above and below the image.
    pub fn margins(mut self, top_mm: f64, bottom_mm: f64) -> Self {
        self.spec.top_margin_mm = top_mm;
        self.spec.bottom_margin_mm = bottom_mm;
        self
    }

    pub fn bottom_cap(mut self, cap: EndCap) -> Self {
        self.spec.bottom_cap = cap;
        self
    }

    pub fn top_cap(mut self, cap: EndCap) -> Self {
        self.spec.top_cap = cap;
        self
    }

    // =========================================================================
    // Thickness mapping
    // =========================================================================

    /// Thickness of white and black pixels.
    pub fn thickness_range(mut self, min_mm: f64, max_mm: f64) -> Self {
        self.spec.min_thickness_mm = min_mm;
        self.spec.max_thickness_mm = max_mm;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.spec.gamma = gamma;
        self
    }

    /// Pick the gamma for an upstream image classification.
    pub fn image_category(mut self, category: ImageCategory) -> Self {
        self.spec = self.spec.with_image_category(category);
        self
    }

    pub fn edge_blend(mut self, mm: f64) -> Self {
        self.spec.edge_blend_width_mm = mm;
        self
    }

    pub fn curvature_compensation(mut self, k: f64) -> Self {
        self.spec.curvature_compensation = k;
        self
    }

    // =========================================================================
    // Tessellation
    // =========================================================================

    pub fn resolution(mut self, mm: f64) -> Self {
        self.spec.resolution_mm = mm;
        self
    }

    pub fn quality(mut self, multiplier: f64) -> Self {
        self.spec.mesh_quality_multiplier = multiplier;
        self
    }

    pub fn max_segments(mut self, max: usize) -> Self {
        self.spec.max_segments = max;
        self
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Coarse 1 mm tessellation for quick previews.
    pub fn preview(mut self) -> Self {
        self.spec.resolution_mm = 1.0;
        self.spec.mesh_quality_multiplier = 1.0;
        self
    }

    /// Fine 0.1 mm tessellation for printing detailed images.
    pub fn high_quality(mut self) -> Self {
        self.spec.resolution_mm = 0.1;
        self.spec.mesh_quality_multiplier = 1.0;
        self
    }

    // =========================================================================
    // Progress Reporting
    // =========================================================================

    /// Set a progress callback, called before each stage.
    ///
    /// Return `false` from the callback to cancel the job.
    ///
    /// # Example
    ///
    /// ```
    /// use litho_mesh::progress::ProgressCallback;
    /// use litho_shell::{IntensityBuffer, LithophaneBuilder, LithophaneError};
    ///
    /// let image = IntensityBuffer::uniform(16, 8, 0.5).unwrap();
    /// let callback: ProgressCallback = Box::new(|progress| progress.message != "building");
    ///
    /// let result = LithophaneBuilder::new(&image)
    ///     .preview()
    ///     .with_progress(callback)
    ///     .build();
    /// assert!(matches!(result, Err(LithophaneError::Cancelled { .. })));
    /// ```
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Share a tracker so the job can be cancelled from another thread.
    pub fn with_tracker(mut self, tracker: SharedProgressTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Current settings.
    pub fn current_spec(&self) -> &CylinderSpec {
        &self.spec
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Validate the settings and run the pipeline.
    pub fn build(self) -> LithoResult<LithophaneResult> {
        let mut pipeline = LithophanePipeline::new(self.spec);
        if let Some(tracker) = self.tracker {
            pipeline = pipeline.with_tracker(tracker);
        }
        if let Some(callback) = self.progress_callback {
            pipeline = pipeline.with_progress(callback);
        }
        pipeline.run(self.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LithophaneError;

    #[test]
    fn test_setters_update_spec() {
        let image = IntensityBuffer::uniform(4, 4, 0.5).unwrap();
        let builder = LithophaneBuilder::new(&image)
            .outer_diameter(50.0)
            .coverage(180.0)
            .margins(3.0, 4.0)
            .thickness_range(0.8, 2.8)
            .image_category(ImageCategory::Overexposed)
            .max_segments(512);

        let spec = builder.current_spec();
        assert_eq!(spec.outer_diameter_mm, 50.0);
        assert_eq!(spec.coverage_angle_deg, 180.0);
        assert_eq!((spec.top_margin_mm, spec.bottom_margin_mm), (3.0, 4.0));
        assert_eq!((spec.min_thickness_mm, spec.max_thickness_mm), (0.8, 2.8));
        assert_eq!(spec.gamma, 1.1);
        assert_eq!(spec.max_segments, 512);
    }

    #[test]
    fn test_build_validates() {
        let image = IntensityBuffer::uniform(4, 4, 0.5).unwrap();
        let result = LithophaneBuilder::new(&image)
            .preview()
            .thickness_range(3.0, 1.0)
            .build();
        assert!(matches!(result, Err(LithophaneError::InvalidRange { .. })));
    }

    #[test]
    fn test_shared_tracker_cancels() {
        let image = IntensityBuffer::uniform(8, 8, 0.5).unwrap();
        let tracker = litho_mesh::shared_tracker(4);
        tracker.cancel();
        let result = LithophaneBuilder::new(&image)
            .preview()
            .with_tracker(tracker)
            .build();
        assert!(matches!(result, Err(LithophaneError::Cancelled { .. })));
    }
}
