//! Mesh repair passes: duplicate and degenerate removal, compaction, normals.
//!
//! Detection runs in parallel with rayon; the filtering step that follows is
//! serial and preserves the original face order, so repeated runs on the same
//! input produce identical output.

use hashbrown::HashSet;
use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::Mesh;

/// Default minimum face area in mm² below which a face is degenerate.
pub const DEFAULT_DEGENERATE_AREA_EPSILON: f64 = 1e-10;

/// Configuration for the repair passes.
///
/// # Example
///
/// ```
/// use litho_mesh::RepairParams;
///
/// let params = RepairParams {
///     degenerate_area_epsilon: 1e-8,
///     ..Default::default()
/// };
/// assert!(params.fix_winding);
/// ```
#[derive(Debug, Clone)]
pub struct RepairParams {
    /// Faces with area below this threshold (mm²) are removed.
    ///
    /// Default: `1e-10`
    pub degenerate_area_epsilon: f64,

    /// Whether to reconcile winding order and orientation.
    ///
    /// Default: `true`
    pub fix_winding: bool,

    /// Whether to compact the vertex array after face removal.
    ///
    /// Default: `true`
    pub remove_unreferenced: bool,

    /// Whether to compute area-weighted vertex normals at the end.
    ///
    /// Default: `true`
    pub compute_normals: bool,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            degenerate_area_epsilon: DEFAULT_DEGENERATE_AREA_EPSILON,
            fix_winding: true,
            remove_unreferenced: true,
            compute_normals: true,
        }
    }
}

/// Normalize a face so the smallest index comes first, keeping cyclic order.
fn normalize_face(face: [u32; 3]) -> [u32; 3] {
    let mut min_idx = 0;
    for i in 1..3 {
        if face[i] < face[min_idx] {
            min_idx = i;
        }
    }
    [
        face[min_idx],
        face[(min_idx + 1) % 3],
        face[(min_idx + 2) % 3],
    ]
}

/// Winding-independent key: the sorted vertex triple.
fn face_key(face: [u32; 3]) -> [u32; 3] {
    let fwd = normalize_face(face);
    let rev = normalize_face([face[0], face[2], face[1]]);
    fwd.min(rev)
}

/// Remove duplicate faces from the mesh.
///
/// Faces are duplicates if they reference the same set of vertices,
/// regardless of winding or starting vertex. The first occurrence is kept.
///
/// Returns the number of duplicate faces removed.
pub fn remove_duplicate_faces(mesh: &mut Mesh) -> usize {
    let original_count = mesh.faces.len();

    let keys: Vec<[u32; 3]> = mesh.faces.par_iter().map(|&f| face_key(f)).collect();

    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(keys.len());
    let keep: Vec<bool> = keys.into_iter().map(|key| seen.insert(key)).collect();

    if keep.iter().all(|&k| k) {
        return 0;
    }

    let mut flags = keep.into_iter();
    mesh.faces.retain(|_| flags.next().unwrap_or(true));

    let removed = original_count - mesh.faces.len();
    info!("Removed {} duplicate faces", removed);
    removed
}

/// Remove triangles with area below `area_threshold`.
///
/// Faces that repeat a vertex index are always removed.
///
/// Returns the number of triangles removed.
pub fn remove_degenerate_triangles(mesh: &mut Mesh, area_threshold: f64) -> usize {
    let original_count = mesh.faces.len();

    let keep: Vec<bool> = mesh
        .faces
        .par_iter()
        .map(|&face| {
            let [a, b, c] = face;
            a != b && b != c && a != c && mesh.triangle_of(face).area() >= area_threshold
        })
        .collect();

    if keep.iter().all(|&k| k) {
        return 0;
    }

    let mut flags = keep.into_iter();
    mesh.faces.retain(|_| flags.next().unwrap_or(true));

    let removed = original_count - mesh.faces.len();
    info!(
        "Removed {} degenerate triangles (area < {:.2e})",
        removed, area_threshold
    );
    removed
}

/// Remove unreferenced vertices and compact the vertex array.
///
/// Relative vertex order is preserved.
///
/// Returns the number of vertices removed.
pub fn remove_unreferenced_vertices(mesh: &mut Mesh) -> usize {
    let original_count = mesh.vertices.len();

    let mut referenced = vec![false; original_count];
    for face in &mesh.faces {
        for &v in face {
            referenced[v as usize] = true;
        }
    }

    if referenced.iter().all(|&r| r) {
        return 0;
    }

    let mut remap: Vec<u32> = vec![u32::MAX; original_count];
    let mut new_vertices = Vec::with_capacity(original_count);
    for (old_idx, vertex) in mesh.vertices.drain(..).enumerate() {
        if referenced[old_idx] {
            remap[old_idx] = new_vertices.len() as u32;
            new_vertices.push(vertex);
        }
    }

    for face in &mut mesh.faces {
        for v in face.iter_mut() {
            *v = remap[*v as usize];
        }
    }

    let removed = original_count - new_vertices.len();
    mesh.vertices = new_vertices;
    info!("Removed {} unreferenced vertices", removed);
    removed
}

/// Compute vertex normals as the area-weighted average of adjacent face normals.
pub fn compute_vertex_normals(mesh: &mut Mesh) {
    let mut normal_accum: Vec<Vector3<f64>> = vec![Vector3::zeros(); mesh.vertices.len()];

    for &face in &mesh.faces {
        // Unnormalized normal has length 2*area, giving area weighting.
        let weighted_normal = mesh.triangle_of(face).normal_unnormalized();
        for &v in &face {
            normal_accum[v as usize] += weighted_normal;
        }
    }

    for (vertex, accum) in mesh.vertices.iter_mut().zip(normal_accum) {
        let len_sq = accum.norm_squared();
        vertex.normal = (len_sq > f64::EPSILON).then(|| accum / len_sq.sqrt());
    }

    debug!(
        "Computed vertex normals for {} vertices",
        mesh.vertices.len()
    );
}
