//! Gmsh ASCII meshes
//!
//! Only the `$Nodes` and `$Elements` sections are read. Every element line
//! contributes one triangle made of its last three fields, whatever the
//! element type. Lines and points become degenerate triangles.

use plotio_core::{Error, Point3f, Result, TriangleMesh};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Locate a section marker and return the index of the line holding its count
fn section_count(lines: &[&str], marker: &str) -> Result<Option<(usize, usize)>> {
    let Some(pos) = lines.iter().position(|l| l.contains(marker)) else {
        return Ok(None);
    };
    let count_line = pos + 1;
    let text = lines
        .get(count_line)
        .ok_or_else(|| Error::parse(count_line + 1, format!("missing {} count", marker)))?;
    let count = text
        .trim()
        .parse()
        .map_err(|_| Error::parse(count_line + 1, format!("invalid {} count '{}'", marker, text.trim())))?;
    Ok(Some((count_line, count)))
}

fn entry_line<'a>(lines: &[&'a str], index: usize, what: &str) -> Result<&'a str> {
    lines
        .get(index)
        .copied()
        .ok_or_else(|| Error::parse(index + 1, format!("unexpected end of file, expected {}", what)))
}

/// Parse Gmsh text into points and triangles with 0-based indices
pub fn parse_gmsh(text: &str) -> Result<TriangleMesh> {
    let lines: Vec<&str> = text.lines().collect();

    let mut vertices = Vec::new();
    if let Some((count_line, count)) = section_count(&lines, "$Nodes")? {
        vertices.reserve(count.min(lines.len()));
        for index in count_line + 1..(count_line + 1).saturating_add(count) {
            let line = entry_line(&lines, index, "node")?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 4 {
                return Err(Error::parse(index + 1, "expected 'id x y z'"));
            }
            let mut xyz = [0.0f32; 3];
            for (value, token) in xyz.iter_mut().zip(&tokens[1..4]) {
                *value = token
                    .parse()
                    .map_err(|_| Error::parse(index + 1, format!("invalid coordinate '{}'", token)))?;
            }
            vertices.push(Point3f::new(xyz[0], xyz[1], xyz[2]));
        }
    }

    let n = vertices.len();
    let mut faces = Vec::new();
    if let Some((count_line, count)) = section_count(&lines, "$Elements")? {
        faces.reserve(count.min(lines.len()));
        for index in count_line + 1..(count_line + 1).saturating_add(count) {
            let line = entry_line(&lines, index, "element")?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 {
                return Err(Error::parse(index + 1, "element line has fewer than 3 fields"));
            }
            let mut face = [0usize; 3];
            for (slot, token) in face.iter_mut().zip(&tokens[tokens.len() - 3..]) {
                let id: usize = token
                    .parse()
                    .map_err(|_| Error::parse(index + 1, format!("invalid node id '{}'", token)))?;
                if id == 0 || id > n {
                    return Err(Error::parse(
                        index + 1,
                        format!("node id {} out of range 1..={}", id, n),
                    ));
                }
                *slot = id - 1;
            }
            faces.push(face);
        }
    }

    debug!("Parsed Gmsh mesh: {} nodes, {} elements", n, faces.len());
    Ok(TriangleMesh::from_vertices_and_faces(vertices, faces))
}

/// Read a Gmsh file from disk
pub fn read_gmsh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    parse_gmsh(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n\
$Nodes\n5\n1 0 0 0\n2 1 0 0\n3 1 1 0\n4 0 1 0\n5 5 5 5\n$EndNodes\n\
$Elements\n2\n1 2 2 0 1 1 2 3\n2 2 2 0 1 1 3 4\n$EndElements\n";

    #[test]
    fn test_parse_nodes_and_triangles() {
        let mesh = parse_gmsh(SQUARE).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.vertices[4], Point3f::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let mesh = parse_gmsh("$MeshFormat\n2.2 0 8\n$EndMeshFormat\n").unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_out_of_range_node() {
        let text = "$Nodes\n1\n1 0 0 0\n$EndNodes\n$Elements\n1\n1 2 2 0 1 1 1 2\n$EndElements\n";
        match parse_gmsh(text).unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 7),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_truncated_nodes() {
        assert!(parse_gmsh("$Nodes\n3\n1 0 0 0\n").is_err());
    }

    #[test]
    fn test_huge_declared_counts_fail_cleanly() {
        match parse_gmsh("$Nodes\n18446744073709551615\n1 0 0 0\n").unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 4),
            other => panic!("unexpected error {:?}", other),
        }
        let text = "$Nodes\n1\n1 0 0 0\n$EndNodes\n$Elements\n18446744073709551615\n";
        assert!(parse_gmsh(text).is_err());
    }
}
