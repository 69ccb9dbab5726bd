//! Edge-to-face adjacency.

use hashbrown::HashMap;

/// Undirected edge key with the smaller vertex index first.
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// Edge adjacency for a triangle soup.
///
/// Maps every undirected edge to the faces that contain it, and records
/// how many times each edge is traversed in its canonical direction
/// (smaller index to larger index).
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    /// Faces incident to each undirected edge, in face order.
    pub edge_to_faces: HashMap<(u32, u32), Vec<u32>>,

    /// Number of incident faces that traverse the edge as `key.0 -> key.1`.
    forward_uses: HashMap<(u32, u32), u32>,
}

impl MeshAdjacency {
    /// Build adjacency from face index triples.
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_to_faces: HashMap<(u32, u32), Vec<u32>> =
            HashMap::with_capacity(faces.len() * 3 / 2);
        let mut forward_uses: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3 / 2);

        for (face_idx, face) in faces.iter().enumerate() {
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let key = edge_key(a, b);
                edge_to_faces.entry(key).or_default().push(face_idx as u32);
                let forward = forward_uses.entry(key).or_insert(0);
                if a < b {
                    *forward += 1;
                }
            }
        }

        Self {
            edge_to_faces,
            forward_uses,
        }
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_to_faces.len()
    }

    /// Edges with exactly one incident face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(&edge, _)| edge)
    }

    /// Edges with more than two incident faces.
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(&edge, _)| edge)
    }

    /// Two-face edges whose faces traverse the edge in the same direction.
    pub fn inconsistent_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_to_faces
            .iter()
            .filter(|(edge, faces)| {
                faces.len() == 2 && self.forward_uses.get(*edge).copied().unwrap_or(0) != 1
            })
            .map(|(&edge, _)| edge)
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    pub fn non_manifold_edge_count(&self) -> usize {
        self.non_manifold_edges().count()
    }

    pub fn inconsistent_edge_count(&self) -> usize {
        self.inconsistent_edges().count()
    }

    /// True when every edge has exactly two incident faces.
    pub fn is_watertight(&self) -> bool {
        !self.edge_to_faces.is_empty() && self.edge_to_faces.values().all(|f| f.len() == 2)
    }

    /// Faces sharing an edge with `face_idx`, excluding itself.
    pub fn face_neighbors(&self, faces: &[[u32; 3]], face_idx: u32) -> Vec<u32> {
        let face = faces[face_idx as usize];
        let mut neighbors = Vec::with_capacity(3);
        for i in 0..3 {
            let key = edge_key(face[i], face[(i + 1) % 3]);
            if let Some(incident) = self.edge_to_faces.get(&key) {
                neighbors.extend(incident.iter().copied().filter(|&f| f != face_idx));
            }
        }
        neighbors
    }
}
