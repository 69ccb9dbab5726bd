// Allow unused_assignments lint for error struct fields that are used in thiserror Display macros
// but appear as "never read" to the compiler. This is a false positive in newer Rust versions.
#![allow(unused_assignments)]

//! Error types for lithophane generation with rich diagnostics.
//!
//! Codes follow the pattern `LITHO-XXXX` where:
//! - 1xxx = Input and configuration errors
//! - 2xxx = Interpolation errors
//! - 3xxx = Mesh and pipeline errors

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for lithophane operations.
pub type LithoResult<T> = Result<T, LithophaneError>;

/// Machine-readable error codes for lithophane operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LithophaneErrorCode {
    /// LITHO-1001: A configuration value violates its constraint
    InvalidConfiguration = 1001,
    /// LITHO-1002: Minimum thickness is not below maximum thickness
    InvalidRange = 1002,
    /// LITHO-1003: Intensity buffer has zero area
    EmptyInput = 1003,
    /// LITHO-1004: Intensity sample is not finite or outside [0, 1]
    InvalidIntensity = 1004,

    /// LITHO-2001: Interpolation axis is malformed
    InvalidAxis = 2001,
    /// LITHO-2002: Query point lies outside the sampled domain
    OutOfDomain = 2002,

    /// LITHO-3001: Generated mesh could not be certified
    MeshIntegrity = 3001,
    /// LITHO-3002: Job cancelled at a stage boundary
    Cancelled = 3002,
    /// LITHO-3003: Lower-level mesh operation failed
    MeshOperation = 3003,
}

impl LithophaneErrorCode {
    /// Returns the error code as a string in the format `LITHO-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LithophaneErrorCode::InvalidConfiguration => "LITHO-1001",
            LithophaneErrorCode::InvalidRange => "LITHO-1002",
            LithophaneErrorCode::EmptyInput => "LITHO-1003",
            LithophaneErrorCode::InvalidIntensity => "LITHO-1004",
            LithophaneErrorCode::InvalidAxis => "LITHO-2001",
            LithophaneErrorCode::OutOfDomain => "LITHO-2002",
            LithophaneErrorCode::MeshIntegrity => "LITHO-3001",
            LithophaneErrorCode::Cancelled => "LITHO-3002",
            LithophaneErrorCode::MeshOperation => "LITHO-3003",
        }
    }
}

impl std::fmt::Display for LithophaneErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for lithophane errors.
#[derive(Debug, Clone, PartialEq)]
pub enum LithophaneRecoverySuggestion {
    /// Change one configuration field.
    AdjustField { field: String, hint: String },
    /// Swap or widen the thickness range.
    FixThicknessRange { min: f64, max: f64 },
    /// Provide a non-empty, normalized intensity image.
    CheckImage,
    /// Coarsen the tessellation.
    CoarsenResolution,
    /// No specific suggestion.
    None,
}

impl std::fmt::Display for LithophaneRecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LithophaneRecoverySuggestion::AdjustField { field, hint } => {
                write!(f, "Adjust `{}`: {}", field, hint)
            }
            LithophaneRecoverySuggestion::FixThicknessRange { min, max } => {
                write!(
                    f,
                    "Set min_thickness_mm below max_thickness_mm (currently {:.2} and {:.2})",
                    min, max
                )
            }
            LithophaneRecoverySuggestion::CheckImage => {
                write!(
                    f,
                    "Provide a non-empty grayscale image with samples normalized to [0, 1]"
                )
            }
            LithophaneRecoverySuggestion::CoarsenResolution => {
                write!(f, "Increase resolution_mm or lower mesh_quality_multiplier")
            }
            LithophaneRecoverySuggestion::None => {
                write!(f, "No specific suggestion available")
            }
        }
    }
}

/// Errors that can occur while generating a lithophane.
#[derive(Debug, Error, Diagnostic)]
pub enum LithophaneError {
    /// A configuration value violates its constraint.
    #[error("invalid configuration for `{field}`: {details}")]
    #[diagnostic(
        code(litho::config::invalid),
        help("Check the cylinder settings; run `lithophane config` to print the effective values.")
    )]
    InvalidConfiguration { field: String, details: String },

    /// min_thickness_mm >= max_thickness_mm.
    #[error("invalid thickness range: min {min} mm must be below max {max} mm")]
    #[diagnostic(
        code(litho::config::range),
        help("Bright pixels map to the minimum and dark pixels to the maximum thickness.")
    )]
    InvalidRange { min: f64, max: f64 },

    /// The intensity buffer has no samples.
    #[error("intensity buffer is empty")]
    #[diagnostic(
        code(litho::input::empty),
        help("The image must be at least 1 x 1 pixels.")
    )]
    EmptyInput,

    /// An intensity sample is not finite or is outside [0, 1].
    #[error("intensity sample {index} is {value}, expected a value in [0, 1]")]
    #[diagnostic(
        code(litho::input::intensity),
        help("Normalize the grayscale image to [0, 1] before generating.")
    )]
    InvalidIntensity { index: usize, value: f64 },

    /// An interpolation axis is malformed.
    #[error("invalid interpolation axis: {details}")]
    #[diagnostic(code(litho::interpolate::axis))]
    InvalidAxis { details: String },

    /// A query point lies outside the sampled domain.
    #[error(
        "query ({row}, {col}) is outside the domain rows [{}, {}], cols [{}, {}]",
        row_range.0, row_range.1, col_range.0, col_range.1
    )]
    #[diagnostic(
        code(litho::interpolate::domain),
        help("Clamp query coordinates to the axis range; the interpolator never extrapolates.")
    )]
    OutOfDomain {
        row: f64,
        col: f64,
        row_range: (f64, f64),
        col_range: (f64, f64),
    },

    /// The generated mesh is not closed, manifold and outward oriented after repair.
    ///
    /// Edge counts are zero when repair removed every face or the closed
    /// mesh came out inside out.
    #[error("generated mesh failed integrity check: {details}")]
    #[diagnostic(
        code(litho::mesh::integrity),
        help("Try a coarser resolution_mm; very fine tessellation can collapse faces below the degenerate area threshold.")
    )]
    MeshIntegrity {
        boundary_edges: usize,
        non_manifold_edges: usize,
        inconsistent_edges: usize,
        face_count: usize,
        details: String,
    },

    /// The job was cancelled before the named stage.
    #[error("lithophane generation cancelled before stage `{stage}`")]
    #[diagnostic(code(litho::pipeline::cancelled))]
    Cancelled { stage: String },

    /// Underlying mesh error.
    #[error("mesh operation failed: {0}")]
    #[diagnostic(code(litho::mesh::error))]
    Mesh(litho_mesh::MeshError),
}

impl From<litho_mesh::MeshError> for LithophaneError {
    fn from(err: litho_mesh::MeshError) -> Self {
        match err {
            litho_mesh::MeshError::CertificationFailed {
                boundary_edges,
                non_manifold_edges,
                inconsistent_edges,
                face_count,
            } => LithophaneError::MeshIntegrity {
                boundary_edges,
                non_manifold_edges,
                inconsistent_edges,
                face_count,
                details: format!(
                    "{} boundary, {} non-manifold, {} inconsistent edges ({} faces)",
                    boundary_edges, non_manifold_edges, inconsistent_edges, face_count
                ),
            },
            litho_mesh::MeshError::EmptyMesh { details } => LithophaneError::MeshIntegrity {
                boundary_edges: 0,
                non_manifold_edges: 0,
                inconsistent_edges: 0,
                face_count: 0,
                details,
            },
            litho_mesh::MeshError::InsideOut {
                signed_volume,
                face_count,
            } => LithophaneError::MeshIntegrity {
                boundary_edges: 0,
                non_manifold_edges: 0,
                inconsistent_edges: 0,
                face_count,
                details: format!(
                    "closed mesh is inside out (signed volume {:.3}, {} faces)",
                    signed_volume, face_count
                ),
            },
            other => LithophaneError::Mesh(other),
        }
    }
}

impl LithophaneError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> LithophaneErrorCode {
        match self {
            LithophaneError::InvalidConfiguration { .. } => {
                LithophaneErrorCode::InvalidConfiguration
            }
            LithophaneError::InvalidRange { .. } => LithophaneErrorCode::InvalidRange,
            LithophaneError::EmptyInput => LithophaneErrorCode::EmptyInput,
            LithophaneError::InvalidIntensity { .. } => LithophaneErrorCode::InvalidIntensity,
            LithophaneError::InvalidAxis { .. } => LithophaneErrorCode::InvalidAxis,
            LithophaneError::OutOfDomain { .. } => LithophaneErrorCode::OutOfDomain,
            LithophaneError::MeshIntegrity { .. } => LithophaneErrorCode::MeshIntegrity,
            LithophaneError::Cancelled { .. } => LithophaneErrorCode::Cancelled,
            LithophaneError::Mesh(_) => LithophaneErrorCode::MeshOperation,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> LithophaneRecoverySuggestion {
        match self {
            LithophaneError::InvalidConfiguration { field, details } => {
                LithophaneRecoverySuggestion::AdjustField {
                    field: field.clone(),
                    hint: details.clone(),
                }
            }
            LithophaneError::InvalidRange { min, max } => {
                LithophaneRecoverySuggestion::FixThicknessRange {
                    min: *min,
                    max: *max,
                }
            }
            LithophaneError::EmptyInput | LithophaneError::InvalidIntensity { .. } => {
                LithophaneRecoverySuggestion::CheckImage
            }
            LithophaneError::MeshIntegrity { .. } => LithophaneRecoverySuggestion::CoarsenResolution,
            LithophaneError::InvalidAxis { .. }
            | LithophaneError::OutOfDomain { .. }
            | LithophaneError::Cancelled { .. }
            | LithophaneError::Mesh(_) => LithophaneRecoverySuggestion::None,
        }
    }

    // Constructor helpers

    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, details: impl Into<String>) -> Self {
        LithophaneError::InvalidConfiguration {
            field: field.into(),
            details: details.into(),
        }
    }

    /// Create an invalid axis error.
    pub fn invalid_axis(details: impl Into<String>) -> Self {
        LithophaneError::InvalidAxis {
            details: details.into(),
        }
    }

    /// Create a cancellation error for the stage that did not run.
    pub fn cancelled(stage: impl Into<String>) -> Self {
        LithophaneError::Cancelled {
            stage: stage.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LithophaneError::invalid_config("wall_thickness_mm", "too thick");
        assert_eq!(err.code(), LithophaneErrorCode::InvalidConfiguration);
        assert_eq!(err.code().as_str(), "LITHO-1001");
        assert_eq!(LithophaneError::EmptyInput.code().as_str(), "LITHO-1003");
        assert_eq!(LithophaneError::cancelled("building").code().as_str(), "LITHO-3002");
    }

    #[test]
    fn test_range_suggestion() {
        let err = LithophaneError::InvalidRange { min: 3.0, max: 1.0 };
        match err.recovery_suggestion() {
            LithophaneRecoverySuggestion::FixThicknessRange { min, max } => {
                assert_eq!(min, 3.0);
                assert_eq!(max, 1.0);
            }
            other => panic!("Expected FixThicknessRange, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_domain_display() {
        let err = LithophaneError::OutOfDomain {
            row: -1.0,
            col: 2.5,
            row_range: (0.0, 3.0),
            col_range: (0.0, 7.0),
        };
        let display = err.to_string();
        assert!(display.contains("(-1, 2.5)"));
        assert!(display.contains("rows [0, 3]"));
        assert!(display.contains("cols [0, 7]"));
    }

    #[test]
    fn test_certification_failure_becomes_integrity_error() {
        let mesh_err = litho_mesh::MeshError::CertificationFailed {
            boundary_edges: 2,
            non_manifold_edges: 1,
            inconsistent_edges: 0,
            face_count: 40,
        };
        let err: LithophaneError = mesh_err.into();
        assert!(matches!(
            err,
            LithophaneError::MeshIntegrity {
                boundary_edges: 2,
                non_manifold_edges: 1,
                face_count: 40,
                ..
            }
        ));
    }

    #[test]
    fn test_certification_message_lists_counts() {
        let err: LithophaneError = litho_mesh::MeshError::CertificationFailed {
            boundary_edges: 96,
            non_manifold_edges: 0,
            inconsistent_edges: 0,
            face_count: 8836,
        }
        .into();
        assert!(
            err.to_string()
                .contains("96 boundary, 0 non-manifold, 0 inconsistent edges (8836 faces)")
        );
    }

    #[test]
    fn test_post_repair_failures_become_integrity_errors() {
        let emptied: LithophaneError =
            litho_mesh::MeshError::empty_mesh("no faces left after repair").into();
        assert_eq!(emptied.code(), LithophaneErrorCode::MeshIntegrity);
        assert!(emptied.to_string().contains("no faces left"));

        let inverted: LithophaneError = litho_mesh::MeshError::InsideOut {
            signed_volume: -3.0,
            face_count: 12,
        }
        .into();
        match inverted {
            LithophaneError::MeshIntegrity {
                face_count,
                boundary_edges,
                ref details,
                ..
            } => {
                assert_eq!(face_count, 12);
                assert_eq!(boundary_edges, 0);
                assert!(details.contains("inside out"));
            }
            other => panic!("Expected MeshIntegrity, got {:?}", other),
        }
    }

    #[test]
    fn test_from_mesh_error() {
        let mesh_err = litho_mesh::MeshError::invalid_coordinate(3, "x", f64::NAN);
        let err: LithophaneError = mesh_err.into();
        assert!(matches!(err, LithophaneError::Mesh(_)));
        assert_eq!(err.code(), LithophaneErrorCode::MeshOperation);
    }
}
