//! Core mesh data types.

use nalgebra::{Point3, Vector3};

/// A vertex in the mesh with optional computed attributes.
///
/// Coordinates are in millimeters.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,

    /// Unit normal vector, computed from adjacent faces.
    pub normal: Option<Vector3<f64>>,

    /// Application-specific tag (e.g. which surface ring produced the vertex).
    pub tag: Option<u32>,
}

impl Vertex {
    /// Create a new vertex with only position set.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            tag: None,
        }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Create a tagged vertex from raw coordinates.
    #[inline]
    pub fn tagged(x: f64, y: f64, z: f64, tag: u32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: None,
            tag: Some(tag),
        }
    }
}

/// A triangle mesh with indexed vertices and faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is [v0, v1, v2] with counter-clockwise winding seen from outside the solid.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;

        let mut min = first.position;
        let mut max = first.position;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Vertex positions as flat `[x, y, z]` triples, in vertex order.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.vertices
            .iter()
            .map(|v| [v.position.x, v.position.y, v.position.z])
            .collect()
    }

    /// Iterate over triangles, yielding Triangle structs with actual vertex data.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&face| self.triangle_of(face))
    }

    /// Get a specific triangle by face index.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        self.faces.get(face_idx).map(|&face| self.triangle_of(face))
    }

    #[inline]
    pub(crate) fn triangle_of(&self, [i0, i1, i2]: [u32; 3]) -> Triangle {
        Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        }
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Uses the divergence theorem: the signed volume is the sum of signed tetrahedra
    /// volumes formed by each face and the origin. For a closed mesh with outward-facing
    /// normals (CCW winding when viewed from outside), this returns a positive value.
    ///
    /// # Note
    /// This calculation assumes the mesh is closed (watertight). For open meshes,
    /// the result is not meaningful as a volume measurement.
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|&face| self.triangle_of(face).signed_volume_about(&Point3::origin()))
            .sum()
    }

    /// Compute the absolute volume of the mesh.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check if the mesh appears to be inside-out (negative signed volume).
    #[inline]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangle with concrete vertex positions.
///
/// Utility type for geometric calculations. Winding is counter-clockwise
/// when viewed from the front (normal points toward viewer).
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the centroid (center of mass).
    #[inline]
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }

    /// Signed volume of the tetrahedron spanned by this triangle and `apex`.
    ///
    /// Positive when the triangle's normal points away from `apex`.
    #[inline]
    pub fn signed_volume_about(&self, apex: &Point3<f64>) -> f64 {
        let a = self.v0 - apex;
        let b = self.v1 - apex;
        let c = self.v2 - apex;
        a.dot(&b.cross(&c)) / 6.0
    }

    /// Check if the triangle is degenerate (zero or near-zero area).
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() < epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    fn make_unit_cube() -> Mesh {
        let mut mesh = Mesh::new();
        let verts = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        for v in &verts {
            mesh.vertices.push(Vertex::from_coords(v[0], v[1], v[2]));
        }
        mesh.faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        mesh
    }

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::from_coords(1.0, 2.0, 3.0);
        assert!(approx_eq(v.position.x, 1.0));
        assert!(approx_eq(v.position.y, 2.0));
        assert!(approx_eq(v.position.z, 3.0));
        assert!(v.normal.is_none());
        assert!(v.tag.is_none());

        let tagged = Vertex::tagged(0.0, 0.0, 0.0, 7);
        assert_eq!(tagged.tag, Some(7));
    }

    #[test]
    fn test_triangle_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );

        let normal = tri.normal().expect("non-degenerate triangle");
        assert!(approx_eq(normal.x, 0.0));
        assert!(approx_eq(normal.y, 0.0));
        assert!(approx_eq(normal.z, 1.0));
    }

    #[test]
    fn test_triangle_area_and_centroid() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        );
        assert!(approx_eq(tri.area(), 4.5));
        let c = tri.centroid();
        assert!(approx_eq(c.x, 1.0));
        assert!(approx_eq(c.y, 1.0));
        assert!(approx_eq(c.z, 0.0));
    }

    #[test]
    fn test_degenerate_triangle() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
        assert!(tri.is_degenerate(1e-12));
        assert!(approx_eq(tri.area(), 0.0));
    }

    #[test]
    fn test_mesh_bounds() {
        let mesh = make_unit_cube();
        let (min, max) = mesh.bounds().unwrap();
        assert!(approx_eq(min.x, 0.0));
        assert!(approx_eq(max.z, 1.0));
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_signed_volume_unit_cube() {
        let mesh = make_unit_cube();
        assert!(approx_eq(mesh.signed_volume(), 1.0));
        assert!(!mesh.is_inside_out());
    }

    #[test]
    fn test_signed_volume_inverted_cube() {
        let mut mesh = make_unit_cube();
        for face in &mut mesh.faces {
            face.swap(1, 2);
        }
        assert!(approx_eq(mesh.signed_volume(), -1.0));
        assert!(mesh.is_inside_out());
        assert!(approx_eq(mesh.volume(), 1.0));
    }

    #[test]
    fn test_signed_volume_about_apex_matches_origin_sum() {
        // Volume is translation invariant for closed meshes.
        let mesh = make_unit_cube();
        let apex = Point3::new(5.0, -3.0, 2.0);
        let about_apex: f64 = mesh.triangles().map(|t| t.signed_volume_about(&apex)).sum();
        assert!(approx_eq(about_apex, 1.0));
    }

    #[test]
    fn test_surface_area_unit_cube() {
        let mesh = make_unit_cube();
        assert!(approx_eq(mesh.surface_area(), 6.0));
    }

    #[test]
    fn test_positions_in_vertex_order() {
        let mesh = make_unit_cube();
        let positions = mesh.positions();
        assert_eq!(positions.len(), 8);
        assert_eq!(positions[6], [1.0, 1.0, 1.0]);
    }
}
