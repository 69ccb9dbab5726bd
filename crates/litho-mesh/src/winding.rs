//! Winding order consistency and outward orientation.

use std::collections::VecDeque;

use nalgebra::Point3;
use tracing::{debug, info};

use crate::Mesh;
use crate::adjacency::{MeshAdjacency, edge_key};
use crate::components::find_connected_components;
use crate::error::MeshResult;

/// Fix winding order so all faces in each component have consistent orientation.
///
/// Uses BFS flood fill from the lowest-index face of each connected component.
/// Shared edges must be traversed in opposite directions by the two faces;
/// a neighbor that traverses an edge the same way as an already settled face
/// is flipped. Faces are flipped by swapping indices 1 and 2.
///
/// Returns the number of faces flipped.
pub fn fix_winding_order(mesh: &mut Mesh) -> MeshResult<usize> {
    if mesh.faces.is_empty() {
        return Ok(0);
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let face_count = mesh.faces.len();

    let mut visited = vec![false; face_count];
    let mut flipped = vec![false; face_count];
    let mut component_count = 0;
    let mut total_flipped = 0;

    for start_face in 0..face_count {
        if visited[start_face] {
            continue;
        }

        component_count += 1;
        let mut queue: VecDeque<u32> = VecDeque::new();
        queue.push_back(start_face as u32);
        visited[start_face] = true;

        while let Some(face_idx) = queue.pop_front() {
            let mut face = mesh.faces[face_idx as usize];
            if flipped[face_idx as usize] {
                face.swap(1, 2);
            }

            for edge_idx in 0..3 {
                let v0 = face[edge_idx];
                let v1 = face[(edge_idx + 1) % 3];

                let Some(neighbors) = adjacency.edge_to_faces.get(&edge_key(v0, v1)) else {
                    continue;
                };

                // Orientation is only propagated across manifold edges.
                if neighbors.len() != 2 {
                    continue;
                }

                for &neighbor_idx in neighbors {
                    if neighbor_idx == face_idx || visited[neighbor_idx as usize] {
                        continue;
                    }
                    visited[neighbor_idx as usize] = true;

                    let neighbor_face = mesh.faces[neighbor_idx as usize];
                    // Same direction as the settled face means the neighbor is reversed.
                    if edge_direction_in_face(&neighbor_face, v0, v1).unwrap_or_default() {
                        flipped[neighbor_idx as usize] = true;
                        total_flipped += 1;
                    }

                    queue.push_back(neighbor_idx);
                }
            }
        }
    }

    for (face, &flip) in mesh.faces.iter_mut().zip(&flipped) {
        if flip {
            face.swap(1, 2);
        }
    }

    if total_flipped > 0 {
        info!(
            "Fixed winding order: flipped {} faces across {} component(s)",
            total_flipped, component_count
        );
    } else {
        debug!(
            "Winding order already consistent across {} component(s)",
            component_count
        );
    }

    Ok(total_flipped)
}

/// Flip every component whose faces point into the solid.
///
/// Each face votes with the signed volume of the tetrahedron it spans with
/// the component's vertex centroid; a component whose total is negative is
/// inside out and all its faces are flipped. Winding must already be
/// consistent within each component.
///
/// Returns the number of faces flipped.
pub fn orient_outward(mesh: &mut Mesh) -> usize {
    let analysis = find_connected_components(mesh);
    let mut total_flipped = 0;

    for component in &analysis.components {
        let apex = component_centroid(mesh, component);
        let vote: f64 = component
            .iter()
            .map(|&f| {
                mesh.triangle_of(mesh.faces[f as usize])
                    .signed_volume_about(&apex)
            })
            .sum();

        if vote < 0.0 {
            for &f in component {
                mesh.faces[f as usize].swap(1, 2);
            }
            total_flipped += component.len();
        }
    }

    if total_flipped > 0 {
        info!(
            "Reoriented {} inside-out faces across {} component(s)",
            total_flipped, analysis.component_count
        );
    }

    total_flipped
}

/// Average position of the vertices referenced by a set of faces.
fn component_centroid(mesh: &Mesh, faces: &[u32]) -> Point3<f64> {
    let mut sum = nalgebra::Vector3::zeros();
    let mut count = 0usize;
    for &f in faces {
        for &v in &mesh.faces[f as usize] {
            sum += mesh.vertices[v as usize].position.coords;
            count += 1;
        }
    }
    if count == 0 {
        Point3::origin()
    } else {
        Point3::from(sum / count as f64)
    }
}

/// Check if edge (a, b) appears in face in the same direction (a -> b).
/// Returns Some(true) if same direction, Some(false) if opposite, None if edge not found.
pub(crate) fn edge_direction_in_face(face: &[u32; 3], a: u32, b: u32) -> Option<bool> {
    for i in 0..3 {
        let v0 = face[i];
        let v1 = face[(i + 1) % 3];

        if v0 == a && v1 == b {
            return Some(true);
        }
        if v0 == b && v1 == a {
            return Some(false);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 0.5, 1.0));
        mesh.faces.push([0, 2, 1]);
        mesh.faces.push([0, 1, 3]);
        mesh.faces.push([1, 2, 3]);
        mesh.faces.push([2, 0, 3]);
        mesh
    }

    #[test]
    fn test_already_consistent() {
        let mut mesh = tetrahedron();
        let original = mesh.faces.clone();
        assert_eq!(fix_winding_order(&mut mesh).unwrap(), 0);
        assert_eq!(mesh.faces, original);
    }

    #[test]
    fn test_fix_inconsistent() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(0.5, -1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 1, 3]); // should be [1, 0, 3]

        assert_eq!(fix_winding_order(&mut mesh).unwrap(), 1);

        let dir0 = edge_direction_in_face(&mesh.faces[0], 0, 1);
        let dir1 = edge_direction_in_face(&mesh.faces[1], 0, 1);
        match (dir0, dir1) {
            (Some(d0), Some(d1)) => assert_ne!(d0, d1),
            _ => panic!("Edge should exist in both faces"),
        }
    }

    #[test]
    fn test_fix_two_flipped_faces() {
        let mut mesh = tetrahedron();
        mesh.faces[1].swap(1, 2);
        mesh.faces[2].swap(1, 2);
        fix_winding_order(&mut mesh).unwrap();

        let adjacency = MeshAdjacency::build(&mesh.faces);
        assert_eq!(adjacency.inconsistent_edge_count(), 0);
    }

    #[test]
    fn test_orient_outward_flips_inside_out_component() {
        let mut mesh = tetrahedron();
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        assert!(mesh.is_inside_out());

        assert_eq!(orient_outward(&mut mesh), 4);
        assert!(!mesh.is_inside_out());
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orient_outward_per_component() {
        let mut mesh = tetrahedron();
        let shifted: Vec<Vertex> = mesh
            .vertices
            .iter()
            .map(|v| Vertex::from_coords(v.position.x + 5.0, v.position.y, v.position.z))
            .collect();
        mesh.vertices.extend(shifted);
        let reversed: Vec<[u32; 3]> = mesh.faces[..4]
            .iter()
            .map(|f| [f[0] + 4, f[2] + 4, f[1] + 4])
            .collect();
        mesh.faces.extend(reversed);

        assert_eq!(orient_outward(&mut mesh), 4);
        assert_relative_eq!(mesh.signed_volume(), 2.0 / 6.0, epsilon = 1e-12);
    }
}
