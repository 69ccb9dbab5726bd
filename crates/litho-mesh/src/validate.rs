//! Mesh validation and reporting.

use nalgebra::Point3;
use tracing::{debug, warn};

use crate::Mesh;
use crate::adjacency::MeshAdjacency;
use crate::components::find_connected_components;
use crate::error::{MeshError, MeshResult};

/// Validation report for a mesh.
#[derive(Debug, Clone)]
pub struct MeshReport {
    /// Whether every edge has exactly two adjacent faces.
    pub is_watertight: bool,

    /// Whether all edges have at most 2 adjacent faces.
    pub is_manifold: bool,

    /// Whether every two-face edge is traversed once in each direction.
    pub is_consistently_wound: bool,

    /// Number of boundary edges (edges with 1 adjacent face).
    pub boundary_edge_count: usize,

    /// Number of non-manifold edges (edges with >2 adjacent faces).
    pub non_manifold_edge_count: usize,

    /// Number of two-face edges traversed twice in the same direction.
    pub inconsistent_edge_count: usize,

    /// Total vertex count.
    pub vertex_count: usize,

    /// Total face count.
    pub face_count: usize,

    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,

    /// Dimensions (x, y, z).
    pub dimensions: Option<(f64, f64, f64)>,

    /// Signed volume of the mesh (positive = outward normals, negative = inside-out).
    /// Only meaningful for closed (watertight) meshes.
    pub signed_volume: f64,

    /// Absolute volume of the mesh.
    pub volume: f64,

    /// Total surface area of the mesh.
    pub surface_area: f64,

    /// Whether the mesh appears to be inside-out (negative signed volume).
    pub is_inside_out: bool,

    /// Number of connected components.
    pub component_count: usize,
}

impl MeshReport {
    /// Check if mesh passes basic validity checks.
    pub fn is_valid(&self) -> bool {
        self.vertex_count > 0 && self.face_count > 0
    }

    /// Check if mesh is suitable for 3D printing.
    ///
    /// A printable mesh is watertight, manifold, consistently wound and not inside-out.
    pub fn is_printable(&self) -> bool {
        self.is_valid()
            && self.is_watertight
            && self.is_manifold
            && self.is_consistently_wound
            && !self.is_inside_out
    }
}

impl std::fmt::Display for MeshReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(f, "  Components: {}", self.component_count)?;

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.1}, {:.1}, {:.1}] to [{:.1}, {:.1}, {:.1}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }

        if let Some((dx, dy, dz)) = &self.dimensions {
            writeln!(f, "  Dimensions: {:.1} x {:.1} x {:.1}", dx, dy, dz)?;
        }

        writeln!(f, "  Surface Area: {:.2}", self.surface_area)?;
        writeln!(
            f,
            "  Volume: {:.2} (signed: {:.2})",
            self.volume, self.signed_volume
        )?;

        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            if self.is_watertight { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;

        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {})",
            if self.is_manifold { "yes" } else { "NO" },
            self.non_manifold_edge_count
        )?;

        writeln!(
            f,
            "  Winding: {} (inconsistent edges: {})",
            if self.is_consistently_wound {
                "consistent"
            } else {
                "INCONSISTENT"
            },
            self.inconsistent_edge_count
        )?;

        writeln!(
            f,
            "  Orientation: {}",
            if self.is_inside_out {
                "INSIDE-OUT"
            } else {
                "correct"
            }
        )?;

        writeln!(
            f,
            "  Printable: {}",
            if self.is_printable() { "yes" } else { "NO" }
        )?;

        Ok(())
    }
}

/// Validate a mesh and return a report.
pub fn validate_mesh(mesh: &Mesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(&mesh.faces);

    let boundary_edge_count = adjacency.boundary_edge_count();
    let non_manifold_edge_count = adjacency.non_manifold_edge_count();
    let inconsistent_edge_count = adjacency.inconsistent_edge_count();

    let bounds = mesh.bounds();
    let dimensions = bounds.map(|(min, max)| (max.x - min.x, max.y - min.y, max.z - min.z));

    let signed_volume = mesh.signed_volume();

    let report = MeshReport {
        is_watertight: adjacency.is_watertight(),
        is_manifold: non_manifold_edge_count == 0,
        is_consistently_wound: inconsistent_edge_count == 0,
        boundary_edge_count,
        non_manifold_edge_count,
        inconsistent_edge_count,
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        bounds,
        dimensions,
        signed_volume,
        volume: signed_volume.abs(),
        surface_area: mesh.surface_area(),
        is_inside_out: signed_volume < 0.0,
        component_count: find_connected_components(mesh).component_count,
    };

    if !report.is_watertight {
        warn!(
            "Mesh is not watertight: {} boundary edges",
            boundary_edge_count
        );
    }

    if !report.is_manifold {
        warn!(
            "Mesh is not manifold: {} non-manifold edges",
            non_manifold_edge_count
        );
    }

    if report.is_inside_out && report.is_watertight {
        warn!("Mesh appears to be inside-out (negative signed volume)");
    }

    debug!("{}", report);

    report
}

/// Validate mesh data for empty input, invalid indices and non-finite coordinates.
///
/// Rejects on the first issue found.
///
/// # Example
/// ```
/// use litho_mesh::{Mesh, Vertex, validate_mesh_data};
///
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// assert!(validate_mesh_data(&mesh).is_err());
/// ```
pub fn validate_mesh_data(mesh: &Mesh) -> MeshResult<()> {
    if mesh.is_empty() {
        return Err(MeshError::empty_mesh(format!(
            "{} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        )));
    }

    for (vertex_idx, vertex) in mesh.vertices.iter().enumerate() {
        let p = &vertex.position;
        for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
            if !value.is_finite() {
                return Err(MeshError::invalid_coordinate(vertex_idx, coordinate, value));
            }
        }
    }

    let vertex_count = mesh.vertices.len();
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(MeshError::invalid_vertex_index(face_idx, bad, vertex_count));
        }
    }

    debug!("Mesh data validation passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use crate::error::ErrorCode;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
        mesh.vertices.push(Vertex::from_coords(0.5, 0.866025, 0.0)); // 2
        mesh.vertices
            .push(Vertex::from_coords(0.5, 0.288675, 0.816497)); // 3 (apex)

        mesh.faces.push([0, 2, 1]); // Bottom face
        mesh.faces.push([0, 1, 3]); // Front face
        mesh.faces.push([1, 2, 3]); // Right face
        mesh.faces.push([2, 0, 3]); // Left face

        mesh
    }

    fn single_triangle() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_validate_watertight_mesh() {
        let report = validate_mesh(&tetrahedron());

        assert!(report.is_valid());
        assert!(report.is_watertight);
        assert!(report.is_manifold);
        assert!(report.is_consistently_wound);
        assert!(report.is_printable());
        assert_eq!(report.boundary_edge_count, 0);
        assert_eq!(report.component_count, 1);
        assert!(report.volume > 0.0);
        assert!(!report.is_inside_out);
    }

    #[test]
    fn test_validate_open_mesh() {
        let report = validate_mesh(&single_triangle());

        assert!(!report.is_watertight);
        assert!(report.is_manifold);
        assert!(!report.is_printable());
        assert_eq!(report.boundary_edge_count, 3);
    }

    #[test]
    fn test_validate_inside_out_mesh() {
        let mut mesh = tetrahedron();
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }

        let report = validate_mesh(&mesh);
        assert!(report.is_watertight);
        assert!(report.is_consistently_wound);
        assert!(report.is_inside_out);
        assert!(!report.is_printable());
    }

    #[test]
    fn test_validate_inconsistent_winding() {
        let mut mesh = tetrahedron();
        mesh.faces[3].swap(1, 2);

        let report = validate_mesh(&mesh);
        assert!(report.is_watertight);
        assert!(!report.is_consistently_wound);
        assert_eq!(report.inconsistent_edge_count, 3);
    }

    #[test]
    fn test_report_display() {
        let output = validate_mesh(&tetrahedron()).to_string();

        assert!(output.contains("Vertices: 4"));
        assert!(output.contains("Faces: 4"));
        assert!(output.contains("Watertight: yes"));
        assert!(output.contains("Winding: consistent"));
        assert!(output.contains("Orientation: correct"));
    }

    #[test]
    fn test_validate_mesh_data_passes() {
        assert!(validate_mesh_data(&tetrahedron()).is_ok());
    }

    #[test]
    fn test_validate_mesh_data_rejects_bad_index() {
        let mut mesh = tetrahedron();
        mesh.faces.push([0, 1, 99]);
        let err = validate_mesh_data(&mesh).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
    }

    #[test]
    fn test_validate_mesh_data_rejects_nan() {
        let mut mesh = tetrahedron();
        mesh.vertices[2].position.y = f64::NAN;
        match validate_mesh_data(&mesh) {
            Err(MeshError::InvalidCoordinate {
                vertex_index,
                coordinate,
                ..
            }) => {
                assert_eq!(vertex_index, 2);
                assert_eq!(coordinate, "y");
            }
            other => panic!("Expected InvalidCoordinate, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_mesh_data_rejects_empty() {
        let err = validate_mesh_data(&Mesh::new()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyMesh);
    }
}
