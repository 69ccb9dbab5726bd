//! Mandatory repair and certification pass for generated shells.

use tracing::{info, warn};

use litho_mesh::{Mesh, RepairParams, RepairReport, certify_mesh};

use crate::error::LithoResult;
use crate::warning::PipelineWarning;

/// Result of [`MeshValidator::validate`].
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub repair: RepairReport,
    pub warnings: Vec<PipelineWarning>,
}

/// Repairs a raw shell in place and certifies it is a closed, outward-facing solid.
///
/// Wraps [`certify_mesh`]: duplicate and degenerate faces are removed,
/// unreferenced vertices compacted, winding reconciled and inside-out
/// components flipped. Anything the passes had to fix becomes a
/// [`PipelineWarning`].
#[derive(Debug, Clone)]
pub struct MeshValidator {
    params: RepairParams,
}

impl Default for MeshValidator {
    fn default() -> Self {
        Self::new(RepairParams::default())
    }
}

impl MeshValidator {
    pub fn new(params: RepairParams) -> Self {
        Self { params }
    }

    /// Validator that leaves vertex normals for a later stage.
    pub fn without_normals() -> Self {
        Self::new(RepairParams {
            compute_normals: false,
            ..Default::default()
        })
    }

    pub fn params(&self) -> &RepairParams {
        &self.params
    }

    /// Repair and certify `mesh`.
    ///
    /// # Errors
    ///
    /// [`LithophaneError::MeshIntegrity`](crate::LithophaneError::MeshIntegrity)
    /// if the repaired mesh still has boundary, non-manifold or inconsistently
    /// wound edges, if repair removed every face, or if the closed result is
    /// inside out. The mesh is left in its partially repaired state and must
    /// not be used.
    pub fn validate(&self, mesh: &mut Mesh) -> LithoResult<ValidationOutcome> {
        let repair = certify_mesh(mesh, &self.params)?;

        let mut warnings = Vec::new();
        if repair.duplicate_faces_removed > 0 {
            warnings.push(PipelineWarning::DuplicateFacesRemoved {
                count: repair.duplicate_faces_removed,
            });
        }
        if repair.degenerate_faces_removed > 0 {
            warnings.push(PipelineWarning::DegenerateFacesRemoved {
                count: repair.degenerate_faces_removed,
            });
        }
        if repair.faces_flipped() > 0 {
            warnings.push(PipelineWarning::FacesFlipped {
                count: repair.faces_flipped(),
            });
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        info!(
            faces = mesh.face_count(),
            volume = repair.report.volume,
            "Shell certified watertight"
        );
        Ok(ValidationOutcome { repair, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LithophaneError;
    use litho_mesh::Vertex;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
        mesh.faces = vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]];
        mesh
    }

    #[test]
    fn test_clean_mesh_has_no_warnings() {
        let mut mesh = tetrahedron();
        let outcome = MeshValidator::default().validate(&mut mesh).unwrap();
        assert!(outcome.warnings.is_empty());
        assert!(outcome.repair.is_clean());
    }

    #[test]
    fn test_repairs_become_warnings() {
        let mut mesh = tetrahedron();
        mesh.faces.push([3, 1, 0]);
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }

        let outcome = MeshValidator::default().validate(&mut mesh).unwrap();
        assert_eq!(
            outcome.warnings,
            vec![
                PipelineWarning::DuplicateFacesRemoved { count: 1 },
                PipelineWarning::FacesFlipped { count: 4 },
            ]
        );
    }

    #[test]
    fn test_open_mesh_is_integrity_error() {
        let mut mesh = tetrahedron();
        mesh.faces.pop();
        let err = MeshValidator::default().validate(&mut mesh).unwrap_err();
        match err {
            LithophaneError::MeshIntegrity {
                boundary_edges,
                face_count,
                ..
            } => {
                assert_eq!(boundary_edges, 3);
                assert_eq!(face_count, 3);
            }
            other => panic!("Expected MeshIntegrity, got {:?}", other),
        }
    }

    #[test]
    fn test_all_degenerate_is_integrity_error() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 0.0));
        mesh.faces = vec![[0, 1, 2], [2, 1, 0]];

        let err = MeshValidator::default().validate(&mut mesh).unwrap_err();
        assert!(matches!(
            err,
            LithophaneError::MeshIntegrity { face_count: 0, .. }
        ));
    }

    #[test]
    fn test_without_normals() {
        let mut mesh = tetrahedron();
        MeshValidator::without_normals().validate(&mut mesh).unwrap();
        assert!(mesh.vertices.iter().all(|v| v.normal.is_none()));
    }
}
