//! Error types for mesh operations with rich diagnostics.
//!
//! Every error carries a machine-readable code in the format `MESH-XXXX`:
//! - `MESH-1xxx`: input data errors (empty mesh, bad indices, bad coordinates)
//! - `MESH-2xxx`: topology errors (certification failures)
//! - `MESH-3xxx`: operation errors (cancellation)
//!
//! # Example
//!
//! ```
//! use litho_mesh::{ErrorCode, MeshError};
//!
//! let err = MeshError::invalid_vertex_index(5, 100, 50);
//! assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
//! assert_eq!(err.code().as_str(), "MESH-1002");
//! ```

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes for mesh operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input data errors (1xxx)
    /// MESH-1001: Mesh has no vertices or faces
    EmptyMesh = 1001,
    /// MESH-1002: Face references invalid vertex index
    InvalidVertexIndex = 1002,
    /// MESH-1003: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 1003,

    // Topology errors (2xxx)
    /// MESH-2001: Invalid mesh topology
    InvalidTopology = 2001,
    /// MESH-2002: Mesh failed watertight/orientation certification
    CertificationFailed = 2002,
    /// MESH-2003: Closed mesh encloses negative volume
    InsideOut = 2003,

    // Operation errors (3xxx)
    /// MESH-3001: Operation cancelled through a progress callback
    Cancelled = 3001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `MESH-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyMesh => "MESH-1001",
            ErrorCode::InvalidVertexIndex => "MESH-1002",
            ErrorCode::InvalidCoordinate => "MESH-1003",
            ErrorCode::InvalidTopology => "MESH-2001",
            ErrorCode::CertificationFailed => "MESH-2002",
            ErrorCode::InsideOut => "MESH-2003",
            ErrorCode::Cancelled => "MESH-3001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for mesh errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Run repair operations to fix the issue.
    RunRepair { operations: Vec<String> },
    /// Check the generating input for issues.
    CheckInput { checks: Vec<String> },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::RunRepair { operations } => {
                write!(f, "Run repair operations: {}", operations.join(", "))
            }
            RecoverySuggestion::CheckInput { checks } => {
                write!(f, "Check the input for: {}", checks.join(", "))
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::None => {
                write!(f, "No automatic recovery available")
            }
        }
    }
}

/// Location information for mesh errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshLocation {
    /// Error at a specific vertex.
    Vertex { index: usize },
    /// Error at a specific face.
    Face { index: usize },
}

impl std::fmt::Display for MeshLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeshLocation::Vertex { index } => write!(f, "vertex {}", index),
            MeshLocation::Face { index } => write!(f, "face {}", index),
        }
    }
}

/// Errors that can occur during mesh operations.
#[derive(Debug, Error, Diagnostic)]
pub enum MeshError {
    /// Empty mesh (no vertices or faces).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(mesh::validation::empty),
        help("The mesh must have at least one vertex and one face.")
    )]
    EmptyMesh { details: String },

    /// Invalid vertex index in face data.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(mesh::validation::vertex_index),
        help("Faces must only reference vertices that exist in the vertex array.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// Invalid coordinate value (NaN or Infinity).
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(mesh::validation::coordinate),
        help("Check for numerical issues in the generating parameters.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// Invalid mesh topology.
    #[error("invalid mesh topology: {details}")]
    #[diagnostic(
        code(mesh::validation::topology),
        help("Run the repair passes or inspect the validation report for details.")
    )]
    InvalidTopology { details: String },

    /// The mesh is not closed, not manifold, or not consistently oriented after repair.
    #[error(
        "mesh failed certification: {boundary_edges} boundary, {non_manifold_edges} non-manifold, {inconsistent_edges} inconsistently wound edges across {face_count} faces"
    )]
    #[diagnostic(
        code(mesh::certify::failed),
        help("The generated surface has holes or overlapping faces. Check the generating parameters.")
    )]
    CertificationFailed {
        boundary_edges: usize,
        non_manifold_edges: usize,
        inconsistent_edges: usize,
        face_count: usize,
    },

    /// The mesh is closed but its faces point inward.
    #[error("closed mesh is inside out: signed volume {signed_volume:.3} across {face_count} faces")]
    #[diagnostic(
        code(mesh::certify::inside_out),
        help("Run orient_outward, or check that the generating profile is counter-clockwise.")
    )]
    InsideOut { signed_volume: f64, face_count: usize },

    /// Operation cancelled by a progress callback or tracker.
    #[error("operation cancelled: {operation}")]
    #[diagnostic(code(mesh::operation::cancelled))]
    Cancelled { operation: String },
}

impl MeshError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            MeshError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            MeshError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            MeshError::InvalidTopology { .. } => ErrorCode::InvalidTopology,
            MeshError::CertificationFailed { .. } => ErrorCode::CertificationFailed,
            MeshError::InsideOut { .. } => ErrorCode::InsideOut,
            MeshError::Cancelled { .. } => ErrorCode::Cancelled,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            MeshError::EmptyMesh { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["mesh has geometry".into()],
            },
            MeshError::InvalidVertexIndex { .. } => RecoverySuggestion::RunRepair {
                operations: vec!["validate_mesh_data".into()],
            },
            MeshError::InvalidCoordinate { .. } => RecoverySuggestion::CheckInput {
                checks: vec!["coordinate values".into(), "finite parameters".into()],
            },
            MeshError::InvalidTopology { .. } => RecoverySuggestion::RunRepair {
                operations: vec![
                    "remove_duplicate_faces".into(),
                    "remove_degenerate_triangles".into(),
                    "fix_winding_order".into(),
                ],
            },
            MeshError::CertificationFailed { .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![
                    ("resolution_mm".into(), "try a coarser value".into()),
                    ("degenerate_area_epsilon".into(), "check it is not too large".into()),
                ],
            },
            MeshError::InsideOut { .. } => RecoverySuggestion::RunRepair {
                operations: vec!["orient_outward".into()],
            },
            MeshError::Cancelled { .. } => RecoverySuggestion::None,
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<MeshLocation> {
        match self {
            MeshError::InvalidVertexIndex { face_index, .. } => {
                Some(MeshLocation::Face { index: *face_index })
            }
            MeshError::InvalidCoordinate { vertex_index, .. } => Some(MeshLocation::Vertex {
                index: *vertex_index,
            }),
            _ => None,
        }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        MeshError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        MeshError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        MeshError::InvalidCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    /// Create an InvalidTopology error.
    pub fn invalid_topology(details: impl Into<String>) -> Self {
        MeshError::InvalidTopology {
            details: details.into(),
        }
    }

    /// Create a Cancelled error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        MeshError::Cancelled {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = MeshError::invalid_vertex_index(5, 100, 50);
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
        assert_eq!(err.code().as_str(), "MESH-1002");
        assert_eq!(MeshError::cancelled("repair").code().as_str(), "MESH-3001");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = MeshError::invalid_topology("non-manifold edge");
        match err.recovery_suggestion() {
            RecoverySuggestion::RunRepair { operations } => {
                assert!(!operations.is_empty());
            }
            other => panic!("Expected RunRepair suggestion, got {:?}", other),
        }
    }

    #[test]
    fn test_location_info() {
        let err = MeshError::invalid_vertex_index(5, 100, 50);
        assert_eq!(err.location(), Some(MeshLocation::Face { index: 5 }));
        assert!(MeshError::empty_mesh("none").location().is_none());
    }

    #[test]
    fn test_certification_display() {
        let err = MeshError::CertificationFailed {
            boundary_edges: 4,
            non_manifold_edges: 0,
            inconsistent_edges: 2,
            face_count: 96,
        };
        let display = err.to_string();
        assert!(display.contains("4 boundary"));
        assert!(display.contains("2 inconsistently wound"));
        assert!(display.contains("96 faces"));
        assert_eq!(err.code(), ErrorCode::CertificationFailed);
    }

    #[test]
    fn test_inside_out_display() {
        let err = MeshError::InsideOut {
            signed_volume: -12.5,
            face_count: 4,
        };
        assert!(err.to_string().contains("-12.500"));
        assert_eq!(err.code().as_str(), "MESH-2003");
    }

    #[test]
    fn test_suggestion_display() {
        let suggestion = RecoverySuggestion::AdjustParameters {
            parameters: vec![("resolution_mm".into(), "0.5".into())],
        };
        assert_eq!(suggestion.to_string(), "Try adjusting: resolution_mm = 0.5");
    }
}
