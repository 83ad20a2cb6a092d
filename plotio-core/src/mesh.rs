//! Mesh data structures: triangle surfaces, tetrahedral meshes and line sets

use crate::error::{Error, Result};
use crate::point::*;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A triangle mesh with optional per-vertex attributes.
///
/// A mesh without faces is a plain point set: every vertex is treated as
/// a vertex cell by the cleaning and writing code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
    pub scalars: Option<Vec<f32>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
            colors: None,
            scalars: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            ..Self::new()
        }
    }

    /// Create a face-less mesh holding only points
    pub fn from_points(vertices: Vec<Point3f>) -> Self {
        Self::from_vertices_and_faces(vertices, Vec::new())
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];
                let normal = (v1 - v0).cross(&(v2 - v0));
                normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros)
            })
            .collect()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Set per-vertex scalars
    pub fn set_scalars(&mut self, scalars: Vec<f32>) {
        if scalars.len() == self.vertices.len() {
            self.scalars = Some(scalars);
        }
    }

    /// Check that every face index is within the vertex list
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        if let Some((i, face)) = self.faces.iter().enumerate().find(|(_, f)| f.iter().any(|&v| v >= n)) {
            return Err(Error::InvalidData(format!(
                "Face {} references vertex {:?} but mesh has {} vertices",
                i, face, n
            )));
        }
        Ok(())
    }

    /// Apply a transformation to vertices and normals
    pub fn transform(&mut self, transform: &Transform3D) {
        for vertex in &mut self.vertices {
            *vertex = transform.transform_point(vertex);
        }
        if let Some(normals) = &mut self.normals {
            for normal in normals.iter_mut() {
                let n = transform.transform_vector(normal);
                *normal = n.try_normalize(f32::EPSILON).unwrap_or(n);
            }
        }
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A tetrahedral volume mesh: coordinates plus 0-indexed cells of four vertices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TetraMesh {
    pub vertices: Vec<Point3f>,
    pub cells: Vec<[usize; 4]>,
}

impl TetraMesh {
    pub fn new(vertices: Vec<Point3f>, cells: Vec<[usize; 4]>) -> Self {
        Self { vertices, cells }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check that every cell index is within the vertex list
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        if let Some((i, cell)) = self.cells.iter().enumerate().find(|(_, c)| c.iter().any(|&v| v >= n)) {
            return Err(Error::InvalidData(format!(
                "Tetrahedron {} references vertex {:?} but mesh has {} vertices",
                i, cell, n
            )));
        }
        Ok(())
    }

    /// The six edges of every tetrahedron, each edge listed once
    pub fn edges(&self) -> LineSet {
        const TET_EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (2, 0), (0, 3), (3, 1), (3, 2)];

        let mut unique = BTreeSet::new();
        for cell in &self.cells {
            for &(a, b) in &TET_EDGES {
                let (i, j) = (cell[a], cell[b]);
                if i != j {
                    unique.insert((i.min(j), i.max(j)));
                }
            }
        }

        LineSet {
            vertices: self.vertices.clone(),
            lines: unique.into_iter().map(|(i, j)| [i, j]).collect(),
        }
    }

    /// Triangles lying on the boundary, i.e. faces used by exactly one cell
    pub fn boundary_faces(&self) -> Vec<[usize; 3]> {
        const TET_FACES: [[usize; 3]; 4] = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];

        let mut counts: std::collections::HashMap<[usize; 3], (usize, [usize; 3])> =
            std::collections::HashMap::new();
        for cell in &self.cells {
            for local in &TET_FACES {
                let face = [cell[local[0]], cell[local[1]], cell[local[2]]];
                let mut key = face;
                key.sort_unstable();
                counts.entry(key).or_insert((0, face)).0 += 1;
            }
        }

        let mut faces: Vec<[usize; 3]> = counts
            .into_values()
            .filter(|(count, _)| *count == 1)
            .map(|(_, face)| face)
            .collect();
        faces.sort_unstable();
        faces
    }

    /// Surface mesh made of the boundary faces
    pub fn to_surface(&self) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(self.vertices.clone(), self.boundary_faces())
    }
}

/// A set of line segments between indexed points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSet {
    pub vertices: Vec<Point3f>,
    pub lines: Vec<[usize; 2]>,
}

impl LineSet {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> TetraMesh {
        TetraMesh::new(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_tet_edges_are_unique() {
        let mut mesh = unit_tet();
        mesh.vertices.push(Point3f::new(1.0, 1.0, 1.0));
        mesh.cells.push([1, 2, 3, 4]);

        let edges = mesh.edges();
        // 6 + 6 edges, sharing the three edges of face (1, 2, 3)
        assert_eq!(edges.line_count(), 9);
    }

    #[test]
    fn test_boundary_faces_skip_shared_face() {
        let mut mesh = unit_tet();
        assert_eq!(mesh.boundary_faces().len(), 4);

        mesh.vertices.push(Point3f::new(1.0, 1.0, 1.0));
        mesh.cells.push([1, 2, 3, 4]);
        assert_eq!(mesh.boundary_faces().len(), 6);
    }

    #[test]
    fn test_validate_out_of_range() {
        let mut mesh = unit_tet();
        assert!(mesh.validate().is_ok());
        mesh.cells.push([0, 1, 2, 7]);
        assert!(mesh.validate().is_err());

        let tri = TriangleMesh::from_vertices_and_faces(vec![Point3f::origin()], vec![[0, 0, 1]]);
        assert!(tri.validate().is_err());
    }

    #[test]
    fn test_face_normals() {
        let mesh = unit_tet().to_surface();
        let normals = mesh.calculate_face_normals();
        assert_eq!(normals.len(), 4);
        for n in normals {
            assert!((n.norm() - 1.0).abs() < 1e-6);
        }
    }
}
