//! STL format support (binary and ASCII read, binary write)

use crate::{MeshReader, MeshWriter};
use plotio_core::{Error, Point3f, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub struct StlReader;
pub struct StlWriter;

impl MeshReader for StlReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);

        // stl_io merges coincident corners into an indexed mesh
        let stl = stl_io::read_stl(&mut reader)
            .map_err(|e| Error::InvalidData(format!("STL {}: {}", path.display(), e)))?;
        debug!(
            "STL contains {} vertices, {} triangles",
            stl.vertices.len(),
            stl.faces.len()
        );

        let vertices = stl
            .vertices
            .iter()
            .map(|v| Point3f::new(v.0[0], v.0[1], v.0[2]))
            .collect();
        let faces = stl.faces.iter().map(|face| face.vertices).collect();
        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.validate()?;
        Ok(mesh)
    }
}

impl MeshWriter for StlWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        mesh.validate()?;
        let mut writer = BufWriter::new(File::create(path)?);

        let vertex = |i: usize| {
            let v = mesh.vertices[i];
            stl_io::Vertex::new([v.x, v.y, v.z])
        };
        let triangles: Vec<stl_io::Triangle> = mesh
            .faces
            .iter()
            .zip(mesh.calculate_face_normals())
            .map(|(face, n)| stl_io::Triangle {
                normal: stl_io::Normal::new([n.x, n.y, n.z]),
                vertices: [vertex(face[0]), vertex(face[1]), vertex(face[2])],
            })
            .collect();

        stl_io::write_stl(&mut writer, triangles.iter())?;
        writer.flush()?;
        Ok(())
    }
}
