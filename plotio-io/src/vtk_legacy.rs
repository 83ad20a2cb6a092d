//! Legacy VTK poly data (`.vtk`)
//!
//! Reads ASCII files in both the classic cell layout (`POLYGONS n size`
//! followed by `count i0 i1 ...` rows) and the 5.1 `OFFSETS` /
//! `CONNECTIVITY` layout. Point data scalars, normals and color scalars are
//! attached to the mesh. Lines are read past and their points kept.

use crate::tokens::Tokens;
use crate::{MeshReader, MeshWriter};
use plotio_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

pub struct VtkLegacyReader;
pub struct VtkLegacyWriter;

/// Parse the text of a legacy VTK file holding a POLYDATA dataset
pub fn parse_vtk_legacy(text: &str) -> Result<TriangleMesh> {
    let mut lines = text.lines();
    let version = lines.next().unwrap_or_default();
    if !version.starts_with("# vtk DataFile") {
        return Err(Error::parse(1, "missing '# vtk DataFile' header"));
    }
    let _title = lines.next();
    let encoding = lines.next().unwrap_or_default().trim();
    if encoding.eq_ignore_ascii_case("BINARY") {
        return Err(Error::Unsupported("binary legacy VTK files".to_string()));
    }
    if !encoding.eq_ignore_ascii_case("ASCII") {
        return Err(Error::parse(3, format!("expected ASCII or BINARY, found '{}'", encoding)));
    }

    // Skip the three header lines, keeping line numbers aligned with the file
    let body = text.splitn(4, '\n').nth(3).unwrap_or_default();
    let mut tokens = Tokens::starting_at(body, 4);

    let mut mesh = TriangleMesh::new();
    // Attribute sections: whether they describe cells, and their tuple count
    let mut in_cell_data = false;
    let mut tuples = 0usize;

    while let Some(keyword) = tokens.word() {
        match keyword.to_ascii_uppercase().as_str() {
            "DATASET" => {
                let kind = tokens.expect_word("dataset type")?;
                if !kind.eq_ignore_ascii_case("POLYDATA") {
                    return Err(Error::Unsupported(format!("legacy VTK dataset {}", kind)));
                }
            }
            "POINTS" => {
                let count: usize = tokens.next("point count")?;
                let _data_type = tokens.expect_word("point data type")?;
                mesh.vertices.reserve(count.min(body.len() / 6));
                for _ in 0..count {
                    let x = tokens.next("coordinate")?;
                    let y = tokens.next("coordinate")?;
                    let z = tokens.next("coordinate")?;
                    mesh.vertices.push(Point3f::new(x, y, z));
                }
            }
            "VERTICES" | "LINES" => {
                read_cells(&mut tokens)?;
            }
            "POLYGONS" => {
                for polygon in read_cells(&mut tokens)? {
                    for k in 1..polygon.len().saturating_sub(1) {
                        mesh.faces.push([polygon[0], polygon[k], polygon[k + 1]]);
                    }
                }
            }
            "TRIANGLE_STRIPS" => {
                for strip in read_cells(&mut tokens)? {
                    for k in 0..strip.len().saturating_sub(2) {
                        // Alternate winding to keep a consistent orientation
                        if k % 2 == 0 {
                            mesh.faces.push([strip[k], strip[k + 1], strip[k + 2]]);
                        } else {
                            mesh.faces.push([strip[k + 1], strip[k], strip[k + 2]]);
                        }
                    }
                }
            }
            "POINT_DATA" => {
                tuples = tokens.next("point data count")?;
                in_cell_data = false;
            }
            "CELL_DATA" => {
                tuples = tokens.next("cell data count")?;
                in_cell_data = true;
            }
            "SCALARS" => {
                let _name = tokens.expect_word("scalars name")?;
                let _data_type = tokens.expect_word("scalars type")?;
                let components = match tokens.peek() {
                    Some(t) if t.parse::<usize>().is_ok() => tokens.next("component count")?,
                    _ => 1usize,
                }
                .max(1);
                if tokens.peek() == Some("LOOKUP_TABLE") {
                    tokens.skip(2, "lookup table")?;
                }
                let values = read_floats(&mut tokens, tuples.saturating_mul(components), "scalar")?;
                if !in_cell_data {
                    mesh.set_scalars(values.iter().step_by(components).copied().collect());
                }
            }
            "NORMALS" => {
                tokens.skip(2, "normals name and type")?;
                let values = read_floats(&mut tokens, tuples.saturating_mul(3), "normal")?;
                if !in_cell_data {
                    mesh.set_normals(
                        values
                            .chunks_exact(3)
                            .map(|c| Vector3f::new(c[0], c[1], c[2]))
                            .collect(),
                    );
                }
            }
            "COLOR_SCALARS" => {
                let _name = tokens.expect_word("color scalars name")?;
                let components: usize = tokens.next("color component count")?;
                let values = read_floats(&mut tokens, tuples.saturating_mul(components), "color")?;
                if !in_cell_data && components >= 3 {
                    mesh.set_colors(
                        values
                            .chunks_exact(components)
                            .map(|c| {
                                let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                                [byte(c[0]), byte(c[1]), byte(c[2])]
                            })
                            .collect(),
                    );
                }
            }
            "VECTORS" | "TEXTURE_COORDINATES" | "TENSORS" => {
                let upper = keyword.to_ascii_uppercase();
                let _name = tokens.expect_word("attribute name")?;
                let per_item: usize = match upper.as_str() {
                    "TEXTURE_COORDINATES" => tokens.next("texture dimension")?,
                    "TENSORS" => 9,
                    _ => 3,
                };
                let _data_type = tokens.expect_word("attribute type")?;
                tokens.skip(tuples.saturating_mul(per_item), "attribute value")?;
            }
            "FIELD" => {
                let _name = tokens.expect_word("field name")?;
                let arrays: usize = tokens.next("field array count")?;
                for _ in 0..arrays {
                    let _array = tokens.expect_word("field array name")?;
                    let components: usize = tokens.next("field component count")?;
                    let tuples: usize = tokens.next("field tuple count")?;
                    let _data_type = tokens.expect_word("field data type")?;
                    tokens.skip(components.saturating_mul(tuples), "field value")?;
                }
            }
            "LOOKUP_TABLE" => {
                let _name = tokens.expect_word("lookup table name")?;
                let size: usize = tokens.next("lookup table size")?;
                tokens.skip(size.saturating_mul(4), "lookup table entry")?;
            }
            "METADATA" => skip_metadata(&mut tokens),
            other => {
                return Err(Error::parse(
                    tokens.line(),
                    format!("unknown legacy VTK keyword '{}'", other),
                ))
            }
        }
    }

    mesh.validate()?;
    debug!(
        "Parsed legacy VTK: {} points, {} triangles",
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

fn read_floats(tokens: &mut Tokens<'_>, count: usize, what: &str) -> Result<Vec<f32>> {
    (0..count).map(|_| tokens.next(what)).collect()
}

/// Read a cell section in either the classic or the offsets layout
fn read_cells(tokens: &mut Tokens<'_>) -> Result<Vec<Vec<usize>>> {
    let first: usize = tokens.next("cell count")?;
    let size: usize = tokens.next("cell list size")?;

    if tokens.peek() == Some("OFFSETS") {
        tokens.skip(2, "offsets header")?;
        let offsets: Vec<usize> = (0..first)
            .map(|_| tokens.next("cell offset"))
            .collect::<Result<_>>()?;
        let keyword = tokens.expect_word("CONNECTIVITY")?;
        if keyword != "CONNECTIVITY" {
            return Err(Error::parse(tokens.line(), "expected CONNECTIVITY after OFFSETS"));
        }
        tokens.skip(1, "connectivity type")?;
        let connectivity: Vec<usize> = (0..size)
            .map(|_| tokens.next("cell index"))
            .collect::<Result<_>>()?;
        return offsets
            .windows(2)
            .map(|w| {
                connectivity
                    .get(w[0]..w[1])
                    .map(<[usize]>::to_vec)
                    .ok_or_else(|| Error::parse(tokens.line(), "cell offsets exceed connectivity"))
            })
            .collect();
    }

    let mut cells = Vec::with_capacity(first.min(1 << 16));
    let mut consumed: usize = 0;
    for _ in 0..first {
        let n: usize = tokens.next("cell size")?;
        let cell = (0..n)
            .map(|_| tokens.next("cell index"))
            .collect::<Result<Vec<usize>>>()?;
        consumed = consumed.saturating_add(n).saturating_add(1);
        cells.push(cell);
    }
    if consumed != size {
        warn!("Legacy VTK cell list declares {} entries but holds {}", size, consumed);
    }
    Ok(cells)
}

/// Skip a METADATA block, which runs until the next empty line
fn skip_metadata(tokens: &mut Tokens<'_>) {
    let line = tokens.line();
    while let Some(next) = tokens.peek() {
        let keyword = next.to_ascii_uppercase();
        if matches!(
            keyword.as_str(),
            "POINT_DATA" | "CELL_DATA" | "POLYGONS" | "VERTICES" | "LINES" | "TRIANGLE_STRIPS"
        ) {
            break;
        }
        tokens.word();
    }
    debug!("Skipped VTK metadata starting at line {}", line);
}

impl MeshReader for VtkLegacyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        parse_vtk_legacy(&fs::read_to_string(path)?)
    }
}

/// Write a mesh as ASCII legacy VTK poly data
pub fn write_vtk_legacy<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
    mesh.validate()?;
    writeln!(writer, "# vtk DataFile Version 3.0")?;
    writeln!(writer, "plotio output")?;
    writeln!(writer, "ASCII")?;
    writeln!(writer, "DATASET POLYDATA")?;

    let n = mesh.vertex_count();
    writeln!(writer, "POINTS {} float", n)?;
    for v in &mesh.vertices {
        writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
    }

    if mesh.faces.is_empty() {
        if n > 0 {
            writeln!(writer, "VERTICES {} {}", n, 2 * n)?;
            for i in 0..n {
                writeln!(writer, "1 {}", i)?;
            }
        }
    } else {
        let faces = mesh.face_count();
        writeln!(writer, "POLYGONS {} {}", faces, 4 * faces)?;
        for f in &mesh.faces {
            writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
        }
    }

    let scalars = mesh.scalars.as_ref().filter(|s| s.len() == n);
    let normals = mesh.normals.as_ref().filter(|v| v.len() == n);
    let colors = mesh.colors.as_ref().filter(|c| c.len() == n);
    if scalars.is_some() || normals.is_some() || colors.is_some() {
        writeln!(writer, "POINT_DATA {}", n)?;
    }
    if let Some(scalars) = scalars {
        writeln!(writer, "SCALARS scalars float 1")?;
        writeln!(writer, "LOOKUP_TABLE default")?;
        for s in scalars {
            writeln!(writer, "{}", s)?;
        }
    }
    if let Some(normals) = normals {
        writeln!(writer, "NORMALS normals float")?;
        for v in normals {
            writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
        }
    }
    if let Some(colors) = colors {
        writeln!(writer, "COLOR_SCALARS colors 3")?;
        for c in colors {
            let f = |b: u8| b as f32 / 255.0;
            writeln!(writer, "{} {} {}", f(c[0]), f(c[1]), f(c[2]))?;
        }
    }
    Ok(())
}

impl MeshWriter for VtkLegacyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_vtk_legacy(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD: &str = "# vtk DataFile Version 3.0\nquad\nASCII\nDATASET POLYDATA\n\
POINTS 4 float\n0 0 0 1 0 0\n1 1 0 0 1 0\nPOLYGONS 1 5\n4 0 1 2 3\n\
POINT_DATA 4\nSCALARS height float\nLOOKUP_TABLE default\n0 0.5 1 1.5\n";

    #[test]
    fn test_classic_layout_with_scalars() {
        let mesh = parse_vtk_legacy(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_relative_eq!(mesh.scalars.as_ref().unwrap()[3], 1.5);
    }

    #[test]
    fn test_offsets_layout() {
        let text = "# vtk DataFile Version 5.1\nv5\nASCII\nDATASET POLYDATA\n\
POINTS 3 float\n0 0 0 1 0 0 0 1 0\n\
POLYGONS 2 3\nOFFSETS vtktypeint64\n0 3\nCONNECTIVITY vtktypeint64\n0 1 2\n";
        let mesh = parse_vtk_legacy(text).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_binary_is_unsupported() {
        let text = "# vtk DataFile Version 3.0\nb\nBINARY\nDATASET POLYDATA\n";
        assert!(matches!(parse_vtk_legacy(text), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_writer_output_reads_back() {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        mesh.set_normals(vec![Vector3f::z(); 3]);
        mesh.set_colors(vec![[255, 0, 0]; 3]);

        let mut buffer = Vec::new();
        write_vtk_legacy(&mesh, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("POLYGONS 1 4\n3 0 1 2\n"));

        let loaded = parse_vtk_legacy(&text).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_points_written_as_vertices() {
        let mesh = TriangleMesh::from_points(vec![Point3f::new(1.0, 2.0, 3.0)]);
        let mut buffer = Vec::new();
        write_vtk_legacy(&mesh, &mut buffer).unwrap();
        let loaded = parse_vtk_legacy(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(loaded.vertices, mesh.vertices);
        assert!(loaded.faces.is_empty());
    }

    #[test]
    fn test_huge_declared_counts_fail_cleanly() {
        let header = "# vtk DataFile Version 3.0\ntitle\nASCII\nDATASET POLYDATA\n";
        let text = format!("{}POINTS 18446744073709551615 float\n0 0 0\n", header);
        assert!(parse_vtk_legacy(&text).is_err());

        let text = format!(
            "{}POINTS 1 float\n0 0 0\nPOLYGONS 18446744073709551615 4\n3 0 0 0\n",
            header
        );
        assert!(parse_vtk_legacy(&text).is_err());

        let text = format!(
            "{}POINTS 1 float\n0 0 0\nPOINT_DATA 18446744073709551615\nSCALARS s float 3\n1 2 3\n",
            header
        );
        assert!(parse_vtk_legacy(&text).is_err());
    }
}
