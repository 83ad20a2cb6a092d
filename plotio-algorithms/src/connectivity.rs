//! Connected region extraction for triangle meshes

use plotio_core::TriangleMesh;
use tracing::debug;

/// Union-find over point indices
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Label each face with the id of the region it belongs to.
///
/// Two faces are connected when they share a point. Returns the per-face
/// labels and the number of regions; labels are dense and ordered by first
/// appearance.
pub fn face_regions(mesh: &TriangleMesh) -> (Vec<usize>, usize) {
    let mut sets = DisjointSet::new(mesh.vertices.len());
    for f in &mesh.faces {
        sets.union(f[0], f[1]);
        sets.union(f[1], f[2]);
    }

    let mut label_of_root = vec![usize::MAX; mesh.vertices.len()];
    let mut count = 0;
    let labels = mesh
        .faces
        .iter()
        .map(|f| {
            let root = sets.find(f[0]);
            if label_of_root[root] == usize::MAX {
                label_of_root[root] = count;
                count += 1;
            }
            label_of_root[root]
        })
        .collect();
    (labels, count)
}

/// Keep only the connected region with the most faces.
///
/// Ties go to the region seen first. Points outside the region are dropped
/// and the remaining ones renumbered. A mesh without faces is returned as is.
pub fn largest_region(mesh: &TriangleMesh) -> TriangleMesh {
    if mesh.faces.is_empty() {
        return mesh.clone();
    }

    let (labels, count) = face_regions(mesh);
    let mut sizes = vec![0usize; count];
    for &l in &labels {
        sizes[l] += 1;
    }
    let mut best = 0;
    for (label, &size) in sizes.iter().enumerate() {
        if size > sizes[best] {
            best = label;
        }
    }

    let mut new_index = vec![usize::MAX; mesh.vertices.len()];
    let mut kept = Vec::new();
    let mut faces = Vec::with_capacity(sizes[best]);
    for (face, _) in mesh.faces.iter().zip(&labels).filter(|(_, l)| **l == best) {
        let mut remapped = [0; 3];
        for (slot, &v) in remapped.iter_mut().zip(face) {
            if new_index[v] == usize::MAX {
                new_index[v] = kept.len();
                kept.push(v);
            }
            *slot = new_index[v];
        }
        faces.push(remapped);
    }

    let mut region = TriangleMesh::from_vertices_and_faces(
        kept.iter().map(|&i| mesh.vertices[i]).collect(),
        faces,
    );
    if let Some(normals) = &mesh.normals {
        region.normals = Some(kept.iter().map(|&i| normals[i]).collect());
    }
    if let Some(colors) = &mesh.colors {
        region.colors = Some(kept.iter().map(|&i| colors[i]).collect());
    }
    if let Some(scalars) = &mesh.scalars {
        region.scalars = Some(kept.iter().map(|&i| scalars[i]).collect());
    }

    debug!(
        "Largest of {} regions has {} faces and {} points",
        count,
        region.face_count(),
        region.vertex_count()
    );
    region
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotio_core::Point3f;

    fn two_islands() -> TriangleMesh {
        // One triangle at the origin, a two-triangle quad far away
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(10.0, 0.0, 0.0),
                Point3f::new(11.0, 0.0, 0.0),
                Point3f::new(11.0, 1.0, 0.0),
                Point3f::new(10.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [3, 4, 5], [3, 5, 6]],
        )
    }

    #[test]
    fn test_face_regions() {
        let (labels, count) = face_regions(&two_islands());
        assert_eq!(count, 2);
        assert_eq!(labels, vec![0, 1, 1]);
    }

    #[test]
    fn test_largest_region_is_compacted() {
        let region = largest_region(&two_islands());
        assert_eq!(region.face_count(), 2);
        assert_eq!(region.vertex_count(), 4);
        assert_eq!(region.vertices[0], Point3f::new(10.0, 0.0, 0.0));
        assert_eq!(region.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_point_set_unchanged() {
        let points = TriangleMesh::from_points(vec![Point3f::origin(); 3]);
        assert_eq!(largest_region(&points).vertex_count(), 3);
    }
}
