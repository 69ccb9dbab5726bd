//! Connected component analysis for meshes.
//!
//! Two faces belong to the same component when they share a manifold edge.

use std::cmp::Reverse;

use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::types::Mesh;

/// Result of connected component analysis.
#[derive(Debug, Clone)]
pub struct ComponentAnalysis {
    /// Number of connected components found.
    pub component_count: usize,
    /// Face indices for each component, largest component first.
    pub components: Vec<Vec<u32>>,
    /// Size of the largest component (number of faces).
    pub largest_component_size: usize,
}

impl ComponentAnalysis {
    /// Check if the mesh is fully connected (single component).
    pub fn is_connected(&self) -> bool {
        self.component_count == 1
    }

    /// Get the face indices of the largest component.
    pub fn largest_component(&self) -> &[u32] {
        self.components.first().map(|v| v.as_slice()).unwrap_or(&[])
    }
}

impl std::fmt::Display for ComponentAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Component Analysis:")?;
        writeln!(f, "  Connected components: {}", self.component_count)?;
        for (i, comp) in self.components.iter().enumerate() {
            writeln!(f, "    Component {}: {} faces", i + 1, comp.len())?;
        }
        Ok(())
    }
}

/// Find all connected components in a mesh.
///
/// Uses flood fill from each unvisited face. Each component's face list is
/// sorted ascending, and components are ordered largest first (ties keep
/// discovery order), so the result is deterministic.
///
/// # Example
/// ```
/// use litho_mesh::{Mesh, Vertex};
/// use litho_mesh::components::find_connected_components;
///
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(11.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(10.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([3, 4, 5]);
///
/// let analysis = find_connected_components(&mesh);
/// assert_eq!(analysis.component_count, 2);
/// ```
pub fn find_connected_components(mesh: &Mesh) -> ComponentAnalysis {
    if mesh.faces.is_empty() {
        return ComponentAnalysis {
            component_count: 0,
            components: Vec::new(),
            largest_component_size: 0,
        };
    }

    let adjacency = MeshAdjacency::build(&mesh.faces);
    let face_count = mesh.faces.len();

    let mut face_neighbors: Vec<Vec<u32>> = vec![Vec::new(); face_count];
    for faces in adjacency.edge_to_faces.values() {
        if let [f0, f1] = faces[..] {
            face_neighbors[f0 as usize].push(f1);
            face_neighbors[f1 as usize].push(f0);
        }
    }

    let mut visited = vec![false; face_count];
    let mut components: Vec<Vec<u32>> = Vec::new();

    for start_face in 0..face_count {
        if visited[start_face] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start_face as u32];
        visited[start_face] = true;

        while let Some(face_idx) = stack.pop() {
            component.push(face_idx);

            for &neighbor in &face_neighbors[face_idx as usize] {
                if !visited[neighbor as usize] {
                    visited[neighbor as usize] = true;
                    stack.push(neighbor);
                }
            }
        }

        component.sort_unstable();
        components.push(component);
    }

    components.sort_by_key(|c| Reverse(c.len()));

    let component_count = components.len();
    let largest_component_size = components.first().map(|c| c.len()).unwrap_or(0);

    debug!(
        "Found {} connected component(s) in mesh with {} faces",
        component_count, face_count
    );

    ComponentAnalysis {
        component_count,
        components,
        largest_component_size,
    }
}
