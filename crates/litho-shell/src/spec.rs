//! Cylinder configuration.
//!
//! [`CylinderSpec`] is an immutable value describing the shell to build. It
//! loads from and saves to TOML or JSON; every field has a default so partial
//! files are accepted. Loading never validates: call
//! [`CylinderSpec::validate`] before building.
//!
//! ```toml
//! outer_diameter_mm = 80.0
//! height_mm = 100.0
//! coverage_angle_deg = 270.0
//!
//! [bottom_cap]
//! type = "closed"
//! thickness_mm = 2.0
//! bore_diameter_mm = 10.0
//!
//! [top_cap]
//! type = "open"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LithoResult, LithophaneError};

/// Default ceiling for angular and height segment counts.
pub const DEFAULT_MAX_SEGMENTS: usize = 2048;

/// Largest wall thickness light still passes through on common filaments.
pub const MAX_PRINTABLE_THICKNESS_MM: f64 = 5.0;

/// Coarsest accepted tessellation step.
pub const MAX_RESOLUTION_MM: f64 = 1.0;

/// Minimum number of angular segments regardless of resolution.
pub const MIN_ANGULAR_SEGMENTS: usize = 16;

/// Smallest cap thickness, bore diameter or bore-to-wall ledge that is built.
///
/// Features below this would collapse into faces under the degenerate area
/// threshold and open holes in the shell.
pub const MIN_FEATURE_MM: f64 = 0.01;

/// How an end of the cylinder is finished.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndCap {
    /// Annular rim joining the inner and outer walls.
    Open,
    /// Solid floor (or ceiling) of the given thickness.
    ///
    /// A positive `bore_diameter_mm` leaves a centered hole for cables.
    Closed {
        thickness_mm: f64,
        bore_diameter_mm: f64,
    },
}

impl EndCap {
    /// Floor thickness, zero for an open end.
    pub fn thickness(&self) -> f64 {
        match self {
            EndCap::Open => 0.0,
            EndCap::Closed { thickness_mm, .. } => *thickness_mm,
        }
    }

    /// True for a closed end without a bore.
    pub fn is_sealed(&self) -> bool {
        matches!(self, EndCap::Closed { bore_diameter_mm, .. } if *bore_diameter_mm <= 0.0)
    }
}

impl std::fmt::Display for EndCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndCap::Open => write!(f, "open"),
            EndCap::Closed {
                thickness_mm,
                bore_diameter_mm,
            } if *bore_diameter_mm > 0.0 => write!(
                f,
                "closed ({:.1} mm, {:.1} mm bore)",
                thickness_mm, bore_diameter_mm
            ),
            EndCap::Closed { thickness_mm, .. } => write!(f, "closed ({:.1} mm)", thickness_mm),
        }
    }
}

/// Upstream image classification, used only to pick a gamma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    Portrait,
    PortraitLowContrast,
    Underexposed,
    Overexposed,
    LowContrast,
    ShadowHeavy,
    HighlightHeavy,
    Balanced,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 8] = [
        ImageCategory::Portrait,
        ImageCategory::PortraitLowContrast,
        ImageCategory::Underexposed,
        ImageCategory::Overexposed,
        ImageCategory::LowContrast,
        ImageCategory::ShadowHeavy,
        ImageCategory::HighlightHeavy,
        ImageCategory::Balanced,
    ];

    /// Gamma applied to intensities of this category.
    pub fn gamma(&self) -> f64 {
        match self {
            ImageCategory::Portrait => 0.95,
            ImageCategory::PortraitLowContrast => 0.9,
            ImageCategory::Underexposed => 0.95,
            ImageCategory::Overexposed => 1.1,
            ImageCategory::LowContrast => 0.9,
            ImageCategory::ShadowHeavy => 0.95,
            ImageCategory::HighlightHeavy => 1.05,
            ImageCategory::Balanced => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::Portrait => "portrait",
            ImageCategory::PortraitLowContrast => "portrait_low_contrast",
            ImageCategory::Underexposed => "underexposed",
            ImageCategory::Overexposed => "overexposed",
            ImageCategory::LowContrast => "low_contrast",
            ImageCategory::ShadowHeavy => "shadow_heavy",
            ImageCategory::HighlightHeavy => "highlight_heavy",
            ImageCategory::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImageCategory {
    type Err = LithophaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ImageCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                LithophaneError::invalid_config(
                    "image_category",
                    format!("unknown category '{}'", s),
                )
            })
    }
}

/// Geometry and mapping parameters of one lithophane cylinder.
///
/// All lengths are millimeters, angles degrees.
///
/// # Example
///
/// ```
/// use litho_shell::{CylinderSpec, EndCap};
///
/// let spec = CylinderSpec {
///     coverage_angle_deg: 270.0,
///     top_cap: EndCap::Open,
///     ..Default::default()
/// };
/// spec.validate().unwrap();
/// assert_eq!(spec.inner_radius(), 38.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CylinderSpec {
    pub outer_diameter_mm: f64,
    pub height_mm: f64,
    /// Wall thickness outside the image window and in the margins.
    pub wall_thickness_mm: f64,
    /// Arc covered by the image, in (0, 360].
    pub coverage_angle_deg: f64,
    /// Angle of the middle of the image window.
    pub coverage_center_deg: f64,
    pub top_margin_mm: f64,
    pub bottom_margin_mm: f64,
    /// Thickness of white pixels.
    pub min_thickness_mm: f64,
    /// Thickness of black pixels.
    pub max_thickness_mm: f64,
    pub gamma: f64,
    /// Target tessellation step.
    pub resolution_mm: f64,
    /// Multiplies segment counts derived from `resolution_mm`.
    pub mesh_quality_multiplier: f64,
    /// Width of the band at each window edge blended toward the mean thickness.
    pub edge_blend_width_mm: f64,
    /// k in `1 + k·cos(2φ)`, in [0, 1).
    pub curvature_compensation: f64,
    /// Ceiling for angular and height segment counts.
    pub max_segments: usize,
    pub bottom_cap: EndCap,
    pub top_cap: EndCap,
}

impl Default for CylinderSpec {
    fn default() -> Self {
        Self {
            outer_diameter_mm: 80.0,
            height_mm: 100.0,
            wall_thickness_mm: 2.0,
            coverage_angle_deg: 360.0,
            coverage_center_deg: 0.0,
            top_margin_mm: 5.0,
            bottom_margin_mm: 5.0,
            min_thickness_mm: 0.6,
            max_thickness_mm: 3.0,
            gamma: 1.0,
            resolution_mm: 0.2,
            mesh_quality_multiplier: 1.0,
            edge_blend_width_mm: 2.0,
            curvature_compensation: 0.05,
            max_segments: DEFAULT_MAX_SEGMENTS,
            bottom_cap: EndCap::Closed {
                thickness_mm: 2.0,
                bore_diameter_mm: 10.0,
            },
            top_cap: EndCap::Open,
        }
    }
}

/// Reject non-finite and non-positive values.
fn positive(field: &str, value: f64) -> LithoResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LithophaneError::invalid_config(
            field,
            format!("must be a positive number, got {}", value),
        ))
    }
}

fn non_negative(field: &str, value: f64) -> LithoResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(LithophaneError::invalid_config(
            field,
            format!("must be zero or positive, got {}", value),
        ))
    }
}

impl CylinderSpec {
    /// Apply the gamma associated with an image category.
    pub fn with_image_category(mut self, category: ImageCategory) -> Self {
        self.gamma = category.gamma();
        self
    }

    /// Check every field constraint.
    ///
    /// # Errors
    ///
    /// [`LithophaneError::InvalidRange`] when `min_thickness_mm >= max_thickness_mm`,
    /// [`LithophaneError::InvalidConfiguration`] naming the field for anything else.
    pub fn validate(&self) -> LithoResult<()> {
        positive("outer_diameter_mm", self.outer_diameter_mm)?;
        positive("height_mm", self.height_mm)?;
        positive("wall_thickness_mm", self.wall_thickness_mm)?;
        if self.wall_thickness_mm >= self.outer_diameter_mm / 2.0 {
            return Err(LithophaneError::invalid_config(
                "wall_thickness_mm",
                format!(
                    "{} mm leaves no cavity in a {} mm diameter cylinder",
                    self.wall_thickness_mm, self.outer_diameter_mm
                ),
            ));
        }

        if !(self.coverage_angle_deg.is_finite()
            && self.coverage_angle_deg > 0.0
            && self.coverage_angle_deg <= 360.0)
        {
            return Err(LithophaneError::invalid_config(
                "coverage_angle_deg",
                format!("must be in (0, 360], got {}", self.coverage_angle_deg),
            ));
        }
        if !self.coverage_center_deg.is_finite() {
            return Err(LithophaneError::invalid_config(
                "coverage_center_deg",
                "must be finite",
            ));
        }

        non_negative("top_margin_mm", self.top_margin_mm)?;
        non_negative("bottom_margin_mm", self.bottom_margin_mm)?;
        if self.top_margin_mm + self.bottom_margin_mm >= self.height_mm {
            return Err(LithophaneError::invalid_config(
                "top_margin_mm",
                format!(
                    "margins {} + {} mm leave no image band in {} mm",
                    self.top_margin_mm, self.bottom_margin_mm, self.height_mm
                ),
            ));
        }

        positive("min_thickness_mm", self.min_thickness_mm)?;
        positive("max_thickness_mm", self.max_thickness_mm)?;
        if self.min_thickness_mm >= self.max_thickness_mm {
            return Err(LithophaneError::InvalidRange {
                min: self.min_thickness_mm,
                max: self.max_thickness_mm,
            });
        }
        if self.max_thickness_mm > MAX_PRINTABLE_THICKNESS_MM {
            return Err(LithophaneError::invalid_config(
                "max_thickness_mm",
                format!(
                    "{} mm exceeds {} mm, light will not pass",
                    self.max_thickness_mm, MAX_PRINTABLE_THICKNESS_MM
                ),
            ));
        }

        positive("gamma", self.gamma)?;
        positive("resolution_mm", self.resolution_mm)?;
        if self.resolution_mm > MAX_RESOLUTION_MM {
            return Err(LithophaneError::invalid_config(
                "resolution_mm",
                format!("must be at most {} mm, got {}", MAX_RESOLUTION_MM, self.resolution_mm),
            ));
        }
        positive("mesh_quality_multiplier", self.mesh_quality_multiplier)?;
        non_negative("edge_blend_width_mm", self.edge_blend_width_mm)?;
        if !(self.curvature_compensation.is_finite()
            && (0.0..1.0).contains(&self.curvature_compensation))
        {
            return Err(LithophaneError::invalid_config(
                "curvature_compensation",
                format!("must be in [0, 1), got {}", self.curvature_compensation),
            ));
        }
        if self.max_segments < MIN_ANGULAR_SEGMENTS {
            return Err(LithophaneError::invalid_config(
                "max_segments",
                format!("must be at least {}", MIN_ANGULAR_SEGMENTS),
            ));
        }

        self.validate_caps()
    }

    fn validate_caps(&self) -> LithoResult<()> {
        let inner_radius = self.inner_radius();
        for (field, cap) in [("bottom_cap", &self.bottom_cap), ("top_cap", &self.top_cap)] {
            if let EndCap::Closed {
                thickness_mm,
                bore_diameter_mm,
            } = cap
            {
                positive(&format!("{}.thickness_mm", field), *thickness_mm)?;
                non_negative(&format!("{}.bore_diameter_mm", field), *bore_diameter_mm)?;
                if *thickness_mm < MIN_FEATURE_MM {
                    return Err(LithophaneError::invalid_config(
                        format!("{}.thickness_mm", field),
                        format!("must be at least {} mm, got {}", MIN_FEATURE_MM, thickness_mm),
                    ));
                }
                if *bore_diameter_mm > 0.0 && *bore_diameter_mm < MIN_FEATURE_MM {
                    return Err(LithophaneError::invalid_config(
                        format!("{}.bore_diameter_mm", field),
                        format!(
                            "must be 0 or at least {} mm, got {}",
                            MIN_FEATURE_MM, bore_diameter_mm
                        ),
                    ));
                }
                if *bore_diameter_mm / 2.0 > inner_radius - MIN_FEATURE_MM {
                    return Err(LithophaneError::invalid_config(
                        format!("{}.bore_diameter_mm", field),
                        format!(
                            "{} mm bore does not fit the {} mm cavity",
                            bore_diameter_mm,
                            2.0 * inner_radius
                        ),
                    ));
                }
            }
        }

        if self.bottom_cap.thickness() + self.top_cap.thickness() >= self.height_mm {
            return Err(LithophaneError::invalid_config(
                "top_cap.thickness_mm",
                "cap thicknesses leave no cavity",
            ));
        }
        if self.bottom_cap.is_sealed() && self.top_cap.is_sealed() {
            return Err(LithophaneError::invalid_config(
                "top_cap",
                "both ends closed without a bore would seal the cavity; open one end or add a bore",
            ));
        }
        Ok(())
    }

    // Derived geometry

    pub fn outer_radius(&self) -> f64 {
        self.outer_diameter_mm / 2.0
    }

    pub fn inner_radius(&self) -> f64 {
        self.outer_radius() - self.wall_thickness_mm
    }

    /// Height of the band carrying the image, between the margins.
    pub fn image_band_height(&self) -> f64 {
        self.height_mm - self.top_margin_mm - self.bottom_margin_mm
    }

    pub fn coverage_rad(&self) -> f64 {
        self.coverage_angle_deg.to_radians()
    }

    /// θ0, the angle where the image window starts.
    pub fn window_start_rad(&self) -> f64 {
        (self.coverage_center_deg - self.coverage_angle_deg / 2.0).to_radians()
    }

    // Serialization

    /// Parse from TOML without validating.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load from a TOML file without validating.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn save_toml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Errors that can occur when loading or saving a [`CylinderSpec`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
