//! Movie.BYU polygon files (`.byu`, `.g`)
//!
//! Layout: a header `parts points polygons edges`, one `first last` pair per
//! part, the coordinates and then the polygon connectivity. Connectivity
//! ids are 1-based and the last id of each polygon is negated.

use crate::tokens::Tokens;
use crate::{MeshReader, MeshWriter};
use plotio_core::{Error, Point3f, Result, TriangleMesh};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub struct ByuReader;
pub struct ByuWriter;

/// Parse BYU text into a triangle mesh, fanning polygons with more than three corners
pub fn parse_byu(text: &str) -> Result<TriangleMesh> {
    let mut tokens = Tokens::new(text);
    let parts: usize = tokens.next("part count")?;
    let point_count: usize = tokens.next("point count")?;
    let polygon_count: usize = tokens.next("polygon count")?;
    let _edges: usize = tokens.next("edge count")?;
    for _ in 0..parts {
        let _first: usize = tokens.next("part start")?;
        let _last: usize = tokens.next("part end")?;
    }

    // Counts come from the file; a point spans at least 6 bytes of text
    let mut vertices = Vec::with_capacity(point_count.min(text.len() / 6));
    for _ in 0..point_count {
        let x = tokens.next("coordinate")?;
        let y = tokens.next("coordinate")?;
        let z = tokens.next("coordinate")?;
        vertices.push(Point3f::new(x, y, z));
    }

    let mut faces = Vec::with_capacity(polygon_count.min(text.len() / 2));
    let mut polygon = Vec::new();
    let mut read = 0;
    while read < polygon_count {
        let id: i64 = tokens.next("polygon index")?;
        let last = id < 0;
        let index = id.unsigned_abs() as usize;
        if index == 0 || index > point_count {
            return Err(Error::parse(
                tokens.line(),
                format!("point id {} out of range 1..={}", index, point_count),
            ));
        }
        polygon.push(index - 1);
        if last {
            for k in 1..polygon.len().saturating_sub(1) {
                faces.push([polygon[0], polygon[k], polygon[k + 1]]);
            }
            polygon.clear();
            read += 1;
        }
    }

    debug!("Parsed BYU: {} points, {} polygons", point_count, polygon_count);
    Ok(TriangleMesh::from_vertices_and_faces(vertices, faces))
}

impl MeshReader for ByuReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        parse_byu(&fs::read_to_string(path)?)
    }
}

impl MeshWriter for ByuWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        mesh.validate()?;
        let mut writer = BufWriter::new(File::create(path)?);

        let faces = mesh.face_count();
        writeln!(writer, "{} {} {} {}", 1, mesh.vertex_count(), faces, faces * 3)?;
        writeln!(writer, "{} {}", 1, faces)?;

        // Two points per coordinate line
        for pair in mesh.vertices.chunks(2) {
            let line: Vec<String> = pair
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .map(|c| format!("{:e}", c))
                .collect();
            writeln!(writer, "{}", line.join(" "))?;
        }
        for face in &mesh.faces {
            writeln!(
                writer,
                "{} {} -{}",
                face[0] + 1,
                face[1] + 1,
                face[2] + 1
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_and_triangle() {
        let text = "1 5 2 7\n1 2\n0 0 0 1 0 0\n1 1 0 0 1 0\n2 2 2\n1 2 3 -4\n1 2 -5\n";
        let mesh = parse_byu(text).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3], [0, 1, 4]]);
    }

    #[test]
    fn test_write_then_read() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.5, 0.0, 0.0),
                Point3f::new(0.0, 2.25, -1.0),
            ],
            vec![[0, 1, 2]],
        );
        let file = tempfile::NamedTempFile::with_suffix(".byu").unwrap();
        ByuWriter::write_mesh(&mesh, file.path()).unwrap();
        let loaded = ByuReader::read_mesh(file.path()).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_bad_index_reports_line() {
        let text = "1 1 1 3\n1 1\n0 0 0\n1 2 -3\n";
        match parse_byu(text).unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_huge_declared_counts_fail_cleanly() {
        assert!(parse_byu("1 18446744073709551615 1 3\n1 1\n0 0 0\n").is_err());
        assert!(parse_byu("1 3 18446744073709551615 3\n1 1\n0 0 0 1 0 0\n0 1 0\n1 2 -3\n").is_err());
    }
}
