//! OBJ format support

use crate::{MeshReader, MeshWriter};
use plotio_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub struct ObjReader;
pub struct ObjWriter;

impl MeshReader for ObjReader {
    /// All models of the file are merged into one mesh
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| Error::InvalidData(format!("OBJ {}: {}", path.display(), e)))?;

        let mut mesh = TriangleMesh::new();
        let mut normals: Vec<Vector3f> = Vec::new();
        let mut all_have_normals = true;

        for model in &models {
            let obj_mesh = &model.mesh;
            let offset = mesh.vertices.len();
            debug!("OBJ model '{}': {} positions", model.name, obj_mesh.positions.len() / 3);

            for p in obj_mesh.positions.chunks_exact(3) {
                mesh.vertices.push(Point3f::new(p[0], p[1], p[2]));
            }
            for f in obj_mesh.indices.chunks_exact(3) {
                mesh.faces.push([
                    f[0] as usize + offset,
                    f[1] as usize + offset,
                    f[2] as usize + offset,
                ]);
            }

            if obj_mesh.normals.len() == obj_mesh.positions.len() {
                normals.extend(
                    obj_mesh
                        .normals
                        .chunks_exact(3)
                        .map(|n| Vector3f::new(n[0], n[1], n[2])),
                );
            } else {
                all_have_normals = false;
            }
        }

        if all_have_normals && !normals.is_empty() {
            mesh.set_normals(normals);
        }
        debug!(
            "OBJ loaded: {} vertices, {} faces from {} models",
            mesh.vertex_count(),
            mesh.face_count(),
            models.len()
        );
        Ok(mesh)
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);

        writeln!(writer, "# Vertices: {}", mesh.vertex_count())?;
        writeln!(writer, "# Faces: {}", mesh.face_count())?;
        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }

        let normals = mesh
            .normals
            .as_ref()
            .filter(|n| n.len() == mesh.vertices.len());
        if let Some(normals) = normals {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
        }

        // OBJ uses 1-based indexing
        for face in &mesh.faces {
            let [a, b, c] = [face[0] + 1, face[1] + 1, face[2] + 1];
            if normals.is_some() {
                writeln!(writer, "f {}//{} {}//{} {}//{}", a, a, b, b, c, c)?;
            } else {
                writeln!(writer, "f {} {} {}", a, b, c)?;
            }
        }
        // Face-less meshes keep their points as vertex cells
        if mesh.faces.is_empty() && !mesh.vertices.is_empty() {
            write!(writer, "p")?;
            for i in 1..=mesh.vertices.len() {
                write!(writer, " {}", i)?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obj_mesh_roundtrip() {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
                Point3f::new(0.5, 0.5, 1.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        );
        mesh.set_normals(vec![Vector3f::z(); 4]);

        let file = tempfile::NamedTempFile::with_suffix(".obj").unwrap();
        ObjWriter::write_mesh(&mesh, file.path()).unwrap();
        let loaded = ObjReader::read_mesh(file.path()).unwrap();

        assert_eq!(loaded.vertex_count(), 4);
        assert_eq!(loaded.faces, mesh.faces);
        assert_eq!(loaded.vertices[3], Point3f::new(0.5, 0.5, 1.0));
        assert_eq!(loaded.normals.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_quads_triangulated() {
        let mut file = tempfile::NamedTempFile::with_suffix(".obj").unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4").unwrap();
        let mesh = ObjReader::read_mesh(file.path()).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert!(mesh.normals.is_none());
    }
}
