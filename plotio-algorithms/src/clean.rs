//! Mesh cleaning: merge coincident points, drop degenerate faces and unused points

use plotio_core::{Point3f, TriangleMesh};
use std::collections::HashMap;
use tracing::debug;

/// Options for [`clean_mesh`]
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Merge points with identical coordinates
    pub merge_points: bool,
    /// Drop faces that reference the same point more than once
    pub remove_degenerate_faces: bool,
    /// Drop points not referenced by any face. Ignored for face-less meshes,
    /// whose points are all kept as vertex cells.
    pub remove_unused_points: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            merge_points: true,
            remove_degenerate_faces: true,
            remove_unused_points: true,
        }
    }
}

impl CleanOptions {
    /// Keep points that no face uses, e.g. the nodes of a Gmsh file
    pub fn keep_isolated_points(mut self) -> Self {
        self.remove_unused_points = false;
        self
    }
}

/// Exact-match key for a point; `-0.0` and `0.0` coincide
fn point_key(p: &Point3f) -> [u32; 3] {
    let bits = |v: f32| if v == 0.0 { 0u32 } else { v.to_bits() };
    [bits(p.x), bits(p.y), bits(p.z)]
}

/// Clean a triangle mesh.
///
/// The first occurrence of a merged point keeps its attributes. Points keep
/// their relative order.
pub fn clean_mesh(mesh: &TriangleMesh, options: &CleanOptions) -> TriangleMesh {
    let n = mesh.vertices.len();

    // Representative of each input point
    let mut representative: Vec<usize> = (0..n).collect();
    if options.merge_points {
        let mut first_seen: HashMap<[u32; 3], usize> = HashMap::with_capacity(n);
        for (i, p) in mesh.vertices.iter().enumerate() {
            representative[i] = *first_seen.entry(point_key(p)).or_insert(i);
        }
    }

    let mut faces: Vec<[usize; 3]> = mesh
        .faces
        .iter()
        .filter(|f| f.iter().all(|&v| v < n))
        .map(|f| [representative[f[0]], representative[f[1]], representative[f[2]]])
        .collect();
    if options.remove_degenerate_faces {
        faces.retain(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2]);
    }

    let mut keep = vec![false; n];
    if options.remove_unused_points && !mesh.faces.is_empty() {
        for f in &faces {
            for &v in f {
                keep[v] = true;
            }
        }
    } else {
        for (i, &r) in representative.iter().enumerate() {
            keep[i] = i == r;
        }
    }

    let mut new_index = vec![usize::MAX; n];
    let mut kept = Vec::new();
    for i in (0..n).filter(|&i| keep[i]) {
        new_index[i] = kept.len();
        kept.push(i);
    }

    let mut cleaned = TriangleMesh::from_vertices_and_faces(
        kept.iter().map(|&i| mesh.vertices[i]).collect(),
        faces
            .iter()
            .map(|f| [new_index[f[0]], new_index[f[1]], new_index[f[2]]])
            .collect(),
    );
    if let Some(normals) = &mesh.normals {
        cleaned.normals = Some(kept.iter().map(|&i| normals[i]).collect());
    }
    if let Some(colors) = &mesh.colors {
        cleaned.colors = Some(kept.iter().map(|&i| colors[i]).collect());
    }
    if let Some(scalars) = &mesh.scalars {
        cleaned.scalars = Some(kept.iter().map(|&i| scalars[i]).collect());
    }

    debug!(
        "Cleaned mesh: {} -> {} points, {} -> {} faces",
        n,
        cleaned.vertex_count(),
        mesh.face_count(),
        cleaned.face_count()
    );
    cleaned
}
