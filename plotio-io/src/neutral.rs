//! Neutral tetrahedral mesh format
//!
//! ```text
//! N
//! x y z            (N lines)
//! T
//! id v0 v1 v2 v3   (T lines, 1-based vertex ids)
//! ```

use crate::dolfin::write_dolfin_cells;
use plotio_core::{Error, Point3f, Result, TetraMesh};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Cursor over the lines of a neutral file that reports 1-based line numbers
struct Lines<'a> {
    inner: std::str::Lines<'a>,
    number: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.lines(),
            number: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> Result<&'a str> {
        self.number += 1;
        self.inner
            .next()
            .ok_or_else(|| Error::parse(self.number, format!("unexpected end of file, expected {}", what)))
    }

    fn count(&mut self, what: &str) -> Result<usize> {
        let line = self.next_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| Error::parse(self.number, format!("invalid {} '{}'", what, line.trim())))
    }
}

/// A neutral mesh with coordinates kept at full `f64` precision
#[derive(Debug, Clone, PartialEq)]
pub struct NeutralMesh {
    pub vertices: Vec<[f64; 3]>,
    /// 0-based vertex indices
    pub cells: Vec<[usize; 4]>,
}

impl NeutralMesh {
    /// Parse the text of a neutral file. Vertex ids are converted to 0-based.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = Lines::new(text);

        // Declared counts are untrusted: every vertex line holds at least
        // 6 bytes and every tetrahedron line at least 10
        let n_vertices = lines.count("vertex count")?;
        let mut vertices = Vec::with_capacity(n_vertices.min(text.len() / 6));
        for _ in 0..n_vertices {
            let line = lines.next_line("vertex coordinates")?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 3 {
                return Err(Error::parse(
                    lines.number,
                    format!("expected 3 coordinates, found {}", tokens.len()),
                ));
            }
            let mut xyz = [0.0f64; 3];
            for (value, token) in xyz.iter_mut().zip(&tokens) {
                *value = token
                    .parse()
                    .map_err(|_| Error::parse(lines.number, format!("invalid coordinate '{}'", token)))?;
            }
            vertices.push(xyz);
        }

        let n_cells = lines.count("tetrahedron count")?;
        let mut cells = Vec::with_capacity(n_cells.min(text.len() / 10));
        for _ in 0..n_cells {
            let line = lines.next_line("tetrahedron")?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < 5 {
                return Err(Error::parse(
                    lines.number,
                    format!("expected an id and 4 vertex ids, found {} fields", tokens.len()),
                ));
            }
            let mut cell = [0usize; 4];
            for (slot, token) in cell.iter_mut().zip(&tokens[1..5]) {
                let id: usize = token
                    .parse()
                    .map_err(|_| Error::parse(lines.number, format!("invalid vertex id '{}'", token)))?;
                if id == 0 || id > n_vertices {
                    return Err(Error::parse(
                        lines.number,
                        format!("vertex id {} out of range 1..={}", id, n_vertices),
                    ));
                }
                *slot = id - 1;
            }
            cells.push(cell);
        }

        debug!("Parsed neutral mesh: {} vertices, {} tetrahedra", n_vertices, n_cells);
        Ok(Self { vertices, cells })
    }

    /// Read a neutral file from disk
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Single precision copy for display and the other writers
    pub fn to_tetra_mesh(&self) -> TetraMesh {
        let vertices = self
            .vertices
            .iter()
            .map(|&[x, y, z]| Point3f::new(x as f32, y as f32, z as f32))
            .collect();
        TetraMesh::new(vertices, self.cells.clone())
    }

    /// Write the mesh as Dolfin XML without losing coordinate precision
    pub fn write_dolfin_xml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_dolfin_cells(&self.vertices, &self.cells, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Parse the text of a neutral file. Vertex ids are converted to 0-based.
pub fn parse_neutral(text: &str) -> Result<TetraMesh> {
    NeutralMesh::parse(text).map(|mesh| mesh.to_tetra_mesh())
}

/// Read a neutral file from disk
pub fn read_neutral<P: AsRef<Path>>(path: P) -> Result<TetraMesh> {
    NeutralMesh::read(path).map(|mesh| mesh.to_tetra_mesh())
}

/// Read a neutral file and, if `output` is given, also write it as Dolfin XML.
///
/// Returns the parsed mesh either way.
pub fn convert_neutral_to_xml<P: AsRef<Path>>(input: P, output: Option<&Path>) -> Result<TetraMesh> {
    let mesh = NeutralMesh::read(input.as_ref())?;
    if let Some(output) = output {
        mesh.write_dolfin_xml(output)?;
        info!(
            "Converted {} to {}",
            input.as_ref().display(),
            output.display()
        );
    }
    Ok(mesh.to_tetra_mesh())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_CORNER: &str = "4\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n1\n1 1 2 3 4\n";

    #[test]
    fn test_parse_single_tet() {
        let mesh = parse_neutral(CUBE_CORNER).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.cells, vec![[0, 1, 2, 3]]);
        assert_eq!(mesh.vertices[3], Point3f::new(0.0, 0.0, 1.0));
        mesh.validate().unwrap();
    }

    #[test]
    fn test_zero_vertices_and_cells() {
        let mesh = parse_neutral("0\n0\n").unwrap();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.cell_count(), 0);
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_neutral("3\n0 0 0\n1 0 0\n0 1 0\n1\n1 1 2 3 4\n").unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 6),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(parse_neutral("4\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n1\n1 0 2 3 4\n").is_err());
    }

    #[test]
    fn test_short_and_bad_lines() {
        match parse_neutral("2\n0 0 0\n1 0\n").unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(parse_neutral("two\n").is_err());
        assert!(parse_neutral("1\n0 0 zero\n0\n").is_err());
        // Missing tetrahedron lines
        assert!(parse_neutral("4\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n2\n1 1 2 3 4\n").is_err());
    }

    #[test]
    fn test_huge_declared_counts_fail_cleanly() {
        match parse_neutral("18446744073709551615\n0 0 0\n").unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(parse_neutral("1\n0 0 0\n18446744073709551615\n").is_err());
    }

    #[test]
    fn test_xml_keeps_full_precision() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mesh.neutral");
        let output = dir.path().join("mesh.xml");
        fs::write(
            &input,
            "4\n0.123456789012 1000000.37 3.14159265358979\n1 0 0\n0 1 0\n0 0 1\n1\n1 1 2 3 4\n",
        )
        .unwrap();

        let mesh = convert_neutral_to_xml(&input, Some(&output)).unwrap();
        assert_eq!(mesh.cells, vec![[0, 1, 2, 3]]);

        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains(
            r#"<vertex index="0" x="0.123456789012" y="1000000.37" z="3.14159265358979"/>"#
        ));
        assert_eq!(NeutralMesh::read(&input).unwrap().vertices[0][1], 1000000.37);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_neutral("/nonexistent/mesh.neutral"),
            Err(Error::FileNotFound(_))
        ));
    }
}
