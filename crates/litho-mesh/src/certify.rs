//! Repair-then-certify pass for generated meshes.
//!
//! [`certify_mesh`] runs the repair passes in a fixed order and then proves
//! the result is a closed, manifold, consistently wound and outward oriented
//! surface. A mesh that cannot be certified is rejected as a whole.

use tracing::{debug, info};

use crate::Mesh;
use crate::error::{MeshError, MeshResult};
use crate::repair::{
    RepairParams, compute_vertex_normals, remove_degenerate_triangles, remove_duplicate_faces,
    remove_unreferenced_vertices,
};
use crate::tracing_ext::{OperationTimer, log_repair_result, log_validation_result};
use crate::validate::{MeshReport, validate_mesh, validate_mesh_data};
use crate::winding::{fix_winding_order, orient_outward};

/// What the repair passes changed, plus the final validation report.
#[derive(Debug, Clone)]
pub struct RepairReport {
    /// Faces removed because another face used the same vertex set.
    pub duplicate_faces_removed: usize,
    /// Faces removed for having area below the epsilon.
    pub degenerate_faces_removed: usize,
    /// Vertices dropped by compaction.
    pub unreferenced_vertices_removed: usize,
    /// Faces flipped to make winding consistent within a component.
    pub winding_flips: usize,
    /// Faces flipped because their component was inside out.
    pub orientation_flips: usize,
    /// Validation report of the certified mesh.
    pub report: MeshReport,
}

impl RepairReport {
    /// Total faces flipped by either orientation pass.
    pub fn faces_flipped(&self) -> usize {
        self.winding_flips + self.orientation_flips
    }

    /// True when no pass had anything to do.
    pub fn is_clean(&self) -> bool {
        self.duplicate_faces_removed == 0
            && self.degenerate_faces_removed == 0
            && self.unreferenced_vertices_removed == 0
            && self.faces_flipped() == 0
    }
}

impl std::fmt::Display for RepairReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Repair Report:")?;
        writeln!(f, "  Duplicate faces removed: {}", self.duplicate_faces_removed)?;
        writeln!(f, "  Degenerate faces removed: {}", self.degenerate_faces_removed)?;
        writeln!(
            f,
            "  Unreferenced vertices removed: {}",
            self.unreferenced_vertices_removed
        )?;
        writeln!(
            f,
            "  Faces flipped: {} (winding {}, orientation {})",
            self.faces_flipped(),
            self.winding_flips,
            self.orientation_flips
        )?;
        write!(f, "{}", self.report)
    }
}

/// Repair a mesh in place and certify it is watertight and outward oriented.
///
/// Passes, in order:
/// 1. reject empty meshes, invalid indices and non-finite coordinates;
/// 2. remove duplicate faces (any winding);
/// 3. remove degenerate faces (area below `params.degenerate_area_epsilon`);
/// 4. compact unreferenced vertices;
/// 5. make winding consistent per component, then flip inside-out components;
/// 6. certify: every edge has exactly two faces traversing it in opposite directions;
/// 7. compute vertex normals.
///
/// Returns [`MeshError::CertificationFailed`] when step 6 fails,
/// [`MeshError::EmptyMesh`] when repair removes every face and
/// [`MeshError::InsideOut`] when the closed result encloses negative volume.
///
/// # Example
///
/// ```
/// use litho_mesh::{Mesh, RepairParams, Vertex, certify_mesh};
///
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
/// // Every face wound inward.
/// mesh.faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
///
/// let repair = certify_mesh(&mut mesh, &RepairParams::default()).unwrap();
/// assert_eq!(repair.orientation_flips, 4);
/// assert!(mesh.signed_volume() > 0.0);
/// ```
pub fn certify_mesh(mesh: &mut Mesh, params: &RepairParams) -> MeshResult<RepairReport> {
    let _timer = OperationTimer::with_context("certify_mesh", mesh.face_count(), mesh.vertex_count());

    validate_mesh_data(mesh)?;

    let duplicate_faces_removed = remove_duplicate_faces(mesh);
    log_repair_result("remove_duplicate_faces", duplicate_faces_removed);

    let degenerate_faces_removed = remove_degenerate_triangles(mesh, params.degenerate_area_epsilon);
    log_repair_result("remove_degenerate_triangles", degenerate_faces_removed);

    if mesh.faces.is_empty() {
        return Err(MeshError::empty_mesh("no faces left after repair"));
    }

    let unreferenced_vertices_removed = if params.remove_unreferenced {
        remove_unreferenced_vertices(mesh)
    } else {
        0
    };
    log_repair_result("remove_unreferenced_vertices", unreferenced_vertices_removed);

    let (winding_flips, orientation_flips) = if params.fix_winding {
        let winding = fix_winding_order(mesh)?;
        (winding, orient_outward(mesh))
    } else {
        (0, 0)
    };
    log_repair_result("fix_winding_order", winding_flips);
    log_repair_result("orient_outward", orientation_flips);

    let report = validate_mesh(mesh);
    log_validation_result(&report);

    if !(report.is_watertight && report.is_manifold && report.is_consistently_wound) {
        return Err(MeshError::CertificationFailed {
            boundary_edges: report.boundary_edge_count,
            non_manifold_edges: report.non_manifold_edge_count,
            inconsistent_edges: report.inconsistent_edge_count,
            face_count: report.face_count,
        });
    }

    if report.is_inside_out {
        return Err(MeshError::InsideOut {
            signed_volume: report.signed_volume,
            face_count: report.face_count,
        });
    }

    if params.compute_normals {
        compute_vertex_normals(mesh);
    }

    let repair = RepairReport {
        duplicate_faces_removed,
        degenerate_faces_removed,
        unreferenced_vertices_removed,
        winding_flips,
        orientation_flips,
        report,
    };

    if repair.is_clean() {
        debug!("Mesh certified without repairs");
    } else {
        info!(
            "Mesh certified after repair: {} duplicate, {} degenerate faces removed, {} faces flipped",
            repair.duplicate_faces_removed,
            repair.degenerate_faces_removed,
            repair.faces_flipped()
        );
    }

    Ok(repair)
}
