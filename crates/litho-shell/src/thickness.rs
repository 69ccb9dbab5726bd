//! Intensity to wall thickness mapping.
//!
//! The mapping per pixel is `gamma → inversion → range remap`, so bright
//! pixels produce thin walls that let light through. The columns at both
//! edges of the image are then blended toward the mean thickness, which makes
//! the first and last columns meet at the same value where the window wraps
//! around the cylinder.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use litho_mesh::OperationTimer;

use crate::error::{LithoResult, LithophaneError};
use crate::intensity::IntensityBuffer;
use crate::spec::CylinderSpec;
use crate::warning::PipelineWarning;

/// Parameters for [`ThicknessMapper`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessParams {
    pub gamma: f64,
    pub min_thickness_mm: f64,
    pub max_thickness_mm: f64,
    pub edge_blend_width_mm: f64,
    pub resolution_mm: f64,
}

impl Default for ThicknessParams {
    fn default() -> Self {
        Self::from_spec(&CylinderSpec::default())
    }
}

impl ThicknessParams {
    /// Take the mapping fields of a cylinder spec.
    pub fn from_spec(spec: &CylinderSpec) -> Self {
        Self {
            gamma: spec.gamma,
            min_thickness_mm: spec.min_thickness_mm,
            max_thickness_mm: spec.max_thickness_mm,
            edge_blend_width_mm: spec.edge_blend_width_mm,
            resolution_mm: spec.resolution_mm,
        }
    }

    fn validate(&self) -> LithoResult<()> {
        if !(self.min_thickness_mm < self.max_thickness_mm) {
            return Err(LithophaneError::InvalidRange {
                min: self.min_thickness_mm,
                max: self.max_thickness_mm,
            });
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(LithophaneError::invalid_config(
                "gamma",
                format!("must be positive, got {}", self.gamma),
            ));
        }
        if !(self.resolution_mm.is_finite() && self.resolution_mm > 0.0) {
            return Err(LithophaneError::invalid_config(
                "resolution_mm",
                format!("must be positive, got {}", self.resolution_mm),
            ));
        }
        if !(self.edge_blend_width_mm.is_finite() && self.edge_blend_width_mm >= 0.0) {
            return Err(LithophaneError::invalid_config(
                "edge_blend_width_mm",
                format!("must not be negative, got {}", self.edge_blend_width_mm),
            ));
        }
        Ok(())
    }

    /// Thickness of one intensity sample before blending.
    ///
    /// Black maps to exactly `max_thickness_mm`, white to exactly `min_thickness_mm`.
    #[inline]
    pub fn thickness_for(&self, intensity: f64) -> f64 {
        let inverted = 1.0 - intensity.powf(self.gamma);
        if inverted >= 1.0 {
            self.max_thickness_mm
        } else if inverted <= 0.0 {
            self.min_thickness_mm
        } else {
            let range = self.max_thickness_mm - self.min_thickness_mm;
            (self.min_thickness_mm + inverted * range).min(self.max_thickness_mm)
        }
    }

    /// Requested blend band in columns, before fitting it to an image.
    pub fn requested_blend_columns(&self) -> usize {
        (self.edge_blend_width_mm / self.resolution_mm).ceil() as usize
    }

    /// Blend band actually applied to an image `width` columns wide.
    ///
    /// The requested band is halved until both bands fit side by side.
    pub fn blend_columns_for(&self, width: usize) -> usize {
        let mut columns = self.requested_blend_columns();
        while columns > width / 2 {
            columns /= 2;
        }
        columns
    }
}

/// Wall thickness in mm per image pixel, row-major like the source image.
///
/// Every value lies in `[min_mm, max_mm]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThicknessField {
    width: usize,
    height: usize,
    values: Vec<f64>,
    min_mm: f64,
    max_mm: f64,
}

impl ThicknessField {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.width..(row + 1) * self.width]
    }

    /// Configured thickness range `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        (self.min_mm, self.max_mm)
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Smallest and largest thickness actually present.
    pub fn extent(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Output of [`ThicknessMapper::map`].
#[derive(Debug, Clone)]
pub struct ThicknessMapping {
    pub field: ThicknessField,
    /// Columns blended at each edge after fitting the band to the image.
    pub blend_columns: usize,
    pub warnings: Vec<PipelineWarning>,
}

/// Converts intensity buffers into thickness fields.
#[derive(Debug, Clone)]
pub struct ThicknessMapper {
    params: ThicknessParams,
}

impl ThicknessMapper {
    /// Create a mapper, validating the parameters.
    ///
    /// # Errors
    ///
    /// [`LithophaneError::InvalidRange`] if min ≥ max,
    /// [`LithophaneError::InvalidConfiguration`] for a non-positive gamma or
    /// resolution, or a negative blend width.
    pub fn new(params: ThicknessParams) -> LithoResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ThicknessParams {
        &self.params
    }

    /// Map every pixel to a thickness, then blend the edge columns.
    ///
    /// # Example
    ///
    /// ```
    /// use litho_shell::{IntensityBuffer, ThicknessMapper, ThicknessParams};
    ///
    /// let params = ThicknessParams {
    ///     gamma: 1.0,
    ///     min_thickness_mm: 0.5,
    ///     max_thickness_mm: 2.2,
    ///     edge_blend_width_mm: 0.0,
    ///     resolution_mm: 0.2,
    /// };
    /// let buffer = IntensityBuffer::uniform(8, 4, 0.5).unwrap();
    /// let mapping = ThicknessMapper::new(params).unwrap().map(&buffer).unwrap();
    /// assert!((mapping.field.get(2, 3) - 1.35).abs() < 1e-12);
    /// ```
    pub fn map(&self, buffer: &IntensityBuffer) -> LithoResult<ThicknessMapping> {
        let _timer = OperationTimer::new("map_thickness");
        let width = buffer.width();
        let height = buffer.height();
        if width == 0 || height == 0 {
            return Err(LithophaneError::EmptyInput);
        }
        let params = &self.params;

        let mut values = vec![0.0; width * height];
        values
            .par_chunks_mut(width)
            .zip(buffer.data().par_chunks(width))
            .for_each(|(out, row)| {
                for (t, &v) in out.iter_mut().zip(row) {
                    *t = params.thickness_for(v);
                }
            });

        let mut warnings = Vec::new();
        let requested = params.requested_blend_columns();
        let columns = params.blend_columns_for(width);
        if columns != requested {
            warn!(
                requested,
                applied = columns,
                width,
                "Edge blend band wider than half the image, reduced"
            );
            warnings.push(PipelineWarning::BlendWidthReduced {
                requested_columns: requested,
                applied_columns: columns,
                image_width: width,
            });
        }

        if columns > 0 {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            debug!(columns, mean, "Blending edge columns toward mean thickness");
            values.par_chunks_mut(width).for_each(|row| {
                for c in 0..columns {
                    let factor = c as f64 / columns as f64;
                    for col in [c, width - 1 - c] {
                        row[col] = mean + factor * (row[col] - mean);
                    }
                }
            });
        }

        let field = ThicknessField {
            width,
            height,
            values,
            min_mm: params.min_thickness_mm,
            max_mm: params.max_thickness_mm,
        };
        let (lo, hi) = field.extent();
        info!(
            width,
            height,
            blend_columns = columns,
            min = lo,
            max = hi,
            "Mapped intensity to thickness"
        );

        Ok(ThicknessMapping {
            field,
            blend_columns: columns,
            warnings,
        })
    }
}

/// Map a buffer with the given parameters.
pub fn map_thickness(
    buffer: &IntensityBuffer,
    params: &ThicknessParams,
) -> LithoResult<ThicknessMapping> {
    ThicknessMapper::new(params.clone())?.map(buffer)
}
