//! Triangle mesh validation, repair and certification for generated solids.
//!
//! This crate holds the mesh layer of the lithophane toolchain: an indexed
//! triangle mesh type, edge adjacency, validation reports, the repair passes
//! that clean up generated geometry, and [`certify_mesh`], which proves the
//! result is a closed, outward-oriented solid ready for slicing.
//!
//! # Units and Scale
//!
//! **This library assumes millimeter (mm) units.** The default degenerate face
//! threshold is `1e-10` mm².
//!
//! # Coordinate System
//!
//! Right-handed, Z up. Face winding is **counter-clockwise (CCW) when viewed
//! from outside** the solid, so normals point outward by the right-hand rule.
//!
//! # Quick Start
//!
//! ```
//! use litho_mesh::{Mesh, Vertex};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
//! mesh.faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
//!
//! let repair = mesh.certify().unwrap();
//! assert!(repair.report.is_printable());
//! println!("{}", repair);
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return `MeshResult<T>`, which is `Result<T, MeshError>`.
//!
//! ```
//! use litho_mesh::{Mesh, MeshError, Vertex};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! match mesh.certify() {
//!     Err(MeshError::CertificationFailed { boundary_edges, .. }) => {
//!         assert_eq!(boundary_edges, 3);
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

mod error;
pub mod tracing_ext;
mod types;

pub mod adjacency;
pub mod certify;
pub mod components;
pub mod progress;
pub mod repair;
pub mod validate;
pub mod winding;

// Re-export core types at crate root
pub use error::{ErrorCode, MeshError, MeshLocation, MeshResult, RecoverySuggestion};
pub use types::{Mesh, Triangle, Vertex};

pub use adjacency::MeshAdjacency;
pub use certify::{RepairReport, certify_mesh};
pub use components::{ComponentAnalysis, find_connected_components};
pub use repair::{
    DEFAULT_DEGENERATE_AREA_EPSILON, RepairParams, compute_vertex_normals,
    remove_degenerate_triangles, remove_duplicate_faces, remove_unreferenced_vertices,
};
pub use validate::{MeshReport, validate_mesh, validate_mesh_data};
pub use winding::{fix_winding_order, orient_outward};

pub use progress::{
    Progress, ProgressCallback, ProgressTracker, SharedProgressTracker, shared_tracker,
};

pub use tracing_ext::{
    OperationTimer, log_mesh_stats, log_repair_result, log_validation_result,
};

// Convenience methods on Mesh
impl Mesh {
    /// Validate the mesh and return a report of any issues.
    pub fn validate(&self) -> MeshReport {
        validate::validate_mesh(self)
    }

    /// Repair and certify the mesh using default parameters.
    pub fn certify(&mut self) -> MeshResult<RepairReport> {
        certify::certify_mesh(self, &RepairParams::default())
    }

    /// Repair and certify the mesh with custom parameters.
    pub fn certify_with_config(&mut self, params: &RepairParams) -> MeshResult<RepairReport> {
        certify::certify_mesh(self, params)
    }

    /// Compute vertex normals from face normals (area-weighted average).
    pub fn compute_normals(&mut self) {
        repair::compute_vertex_normals(self)
    }

    /// Fix inconsistent face winding. Returns the number of faces flipped.
    pub fn fix_winding(&mut self) -> MeshResult<usize> {
        winding::fix_winding_order(self)
    }

    /// Find connected components in the mesh.
    pub fn find_components(&self) -> ComponentAnalysis {
        components::find_connected_components(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverted_tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
        mesh.faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
        mesh
    }

    #[test]
    fn test_mesh_convenience_methods() {
        let mut mesh = inverted_tetrahedron();
        assert!(mesh.validate().is_inside_out);
        assert_eq!(mesh.fix_winding().unwrap(), 0);
        assert!(mesh.find_components().is_connected());

        let repair = mesh.certify().unwrap();
        assert_eq!(repair.orientation_flips, 4);
        assert!(!mesh.validate().is_inside_out);
    }

    #[test]
    fn test_compute_normals_method() {
        let mut mesh = inverted_tetrahedron();
        mesh.compute_normals();
        assert!(mesh.vertices.iter().all(|v| v.normal.is_some()));
    }
}
