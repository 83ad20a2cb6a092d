//! VTK XML datasets: poly data (`.vtp`), structured grids (`.vts`) and
//! unstructured grids (`.vtu`)
//!
//! Only `format="ascii"` data arrays are read. Structured grids are reduced
//! to their outer surface and unstructured grids to the boundary faces of
//! their volume cells plus their surface cells.

use crate::xml::{attr_value, required};
use crate::{MeshReader, MeshWriter};
use plotio_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub struct VtkXmlReader;
pub struct VtpWriter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Section {
    #[default]
    Other,
    Points,
    PointData,
    CellData,
    Verts,
    Lines,
    Strips,
    Polys,
    Cells,
}

#[derive(Debug, Default)]
struct DataArray {
    section: Section,
    name: Option<String>,
    type_name: String,
    components: usize,
    values: Vec<f64>,
}

#[derive(Debug, Default)]
struct Piece {
    extent: Option<[i64; 6]>,
    active_scalars: Option<String>,
    active_normals: Option<String>,
    arrays: Vec<DataArray>,
}

impl Piece {
    fn array(&self, section: Section, name: &str) -> Option<&DataArray> {
        self.arrays
            .iter()
            .find(|a| a.section == section && a.name.as_deref() == Some(name))
    }

    fn points(&self) -> Result<Vec<Point3f>> {
        let Some(array) = self.arrays.iter().find(|a| a.section == Section::Points) else {
            return Ok(Vec::new());
        };
        if array.components != 3 {
            return Err(Error::InvalidData(format!(
                "Points array has {} components, expected 3",
                array.components
            )));
        }
        Ok(array
            .values
            .chunks_exact(3)
            .map(|c| Point3f::new(c[0] as f32, c[1] as f32, c[2] as f32))
            .collect())
    }

    /// Cells of a `connectivity` / `offsets` pair; offsets mark where each cell ends
    fn cells(&self, section: Section) -> Result<Vec<Vec<usize>>> {
        let (Some(connectivity), Some(offsets)) = (
            self.array(section, "connectivity"),
            self.array(section, "offsets"),
        ) else {
            return Ok(Vec::new());
        };
        let connectivity = indices(connectivity)?;
        let mut start = 0;
        let mut cells = Vec::with_capacity(offsets.values.len());
        for end in indices(offsets)? {
            let cell = connectivity.get(start..end).ok_or_else(|| {
                Error::InvalidData(format!(
                    "Cell offset {} outside connectivity of length {}",
                    end,
                    connectivity.len()
                ))
            })?;
            cells.push(cell.to_vec());
            start = end;
        }
        Ok(cells)
    }

    /// Attach point scalars, normals and 8-bit colors to `mesh`
    fn attach_point_data(&self, mesh: &mut TriangleMesh) {
        let point_data: Vec<&DataArray> = self
            .arrays
            .iter()
            .filter(|a| a.section == Section::PointData)
            .collect();
        fn is_active(a: &DataArray, active: &Option<String>) -> bool {
            active.is_some() && a.name == *active
        }

        let normals = point_data.iter().find(|a| {
            a.components == 3
                && (is_active(a, &self.active_normals)
                    || a.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case("normals")))
        });
        if let Some(normals) = normals {
            mesh.set_normals(
                normals
                    .values
                    .chunks_exact(3)
                    .map(|c| Vector3f::new(c[0] as f32, c[1] as f32, c[2] as f32))
                    .collect(),
            );
        }

        let colors = point_data
            .iter()
            .find(|a| a.type_name == "UInt8" && (a.components == 3 || a.components == 4));
        if let Some(colors) = colors {
            mesh.set_colors(
                colors
                    .values
                    .chunks_exact(colors.components)
                    .map(|c| [c[0] as u8, c[1] as u8, c[2] as u8])
                    .collect(),
            );
        }

        let scalars = point_data
            .iter()
            .find(|a| is_active(a, &self.active_scalars))
            .or_else(|| point_data.iter().find(|a| a.components == 1));
        if let Some(scalars) = scalars {
            mesh.set_scalars(
                scalars
                    .values
                    .iter()
                    .step_by(scalars.components.max(1))
                    .map(|&v| v as f32)
                    .collect(),
            );
        }
    }
}

fn indices(array: &DataArray) -> Result<Vec<usize>> {
    array
        .values
        .iter()
        .map(|&v| {
            if v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(Error::InvalidData(format!("Invalid index {} in data array", v)))
            }
        })
        .collect()
}

fn parse_extent(text: &str) -> Result<[i64; 6]> {
    let values: Vec<i64> = text
        .split_whitespace()
        .map(|t| t.parse())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| Error::InvalidData(format!("Invalid extent '{}'", text)))?;
    values
        .try_into()
        .map_err(|_| Error::InvalidData(format!("Extent '{}' needs six values", text)))
}

/// The parsed content of a VTK XML file
#[derive(Debug, Default)]
struct Document {
    kind: String,
    whole_extent: Option<[i64; 6]>,
    pieces: Vec<Piece>,
    section: Section,
    current: Option<DataArray>,
}

impl Document {
    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<()> {
        match e.local_name().as_ref() {
            b"VTKFile" => self.kind = required(e, b"type")?,
            b"StructuredGrid" | b"ImageData" | b"RectilinearGrid" => {
                if let Some(extent) = attr_value::<String>(e, b"WholeExtent")? {
                    self.whole_extent = Some(parse_extent(&extent)?);
                }
            }
            b"Piece" => {
                let extent = attr_value::<String>(e, b"Extent")?
                    .map(|text| parse_extent(&text))
                    .transpose()?;
                self.pieces.push(Piece {
                    extent,
                    ..Default::default()
                });
            }
            b"PointData" => {
                self.section = Section::PointData;
                if let Some(piece) = self.pieces.last_mut() {
                    piece.active_scalars = attr_value(e, b"Scalars")?;
                    piece.active_normals = attr_value(e, b"Normals")?;
                }
            }
            b"CellData" => self.section = Section::CellData,
            b"Points" => self.section = Section::Points,
            b"Verts" => self.section = Section::Verts,
            b"Lines" => self.section = Section::Lines,
            b"Strips" => self.section = Section::Strips,
            b"Polys" => self.section = Section::Polys,
            b"Cells" => self.section = Section::Cells,
            b"DataArray" => {
                let format: String = attr_value(e, b"format")?.unwrap_or_else(|| "ascii".to_string());
                if format != "ascii" {
                    return Err(Error::Unsupported(format!("VTK XML {} data arrays", format)));
                }
                self.current = Some(DataArray {
                    section: self.section,
                    name: attr_value(e, b"Name")?,
                    type_name: attr_value(e, b"type")?.unwrap_or_default(),
                    components: attr_value(e, b"NumberOfComponents")?.unwrap_or(1),
                    values: Vec::new(),
                });
                if empty {
                    self.finish_array()?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if let Some(array) = &mut self.current {
            for token in text.split_whitespace() {
                let value = token
                    .parse()
                    .map_err(|_| Error::InvalidData(format!("Invalid number '{}' in data array", token)))?;
                array.values.push(value);
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"DataArray" => self.finish_array()?,
            b"PointData" | b"CellData" | b"Points" | b"Verts" | b"Lines" | b"Strips" | b"Polys"
            | b"Cells" => self.section = Section::Other,
            _ => {}
        }
        Ok(())
    }

    fn finish_array(&mut self) -> Result<()> {
        let Some(array) = self.current.take() else {
            return Ok(());
        };
        let piece = self
            .pieces
            .last_mut()
            .ok_or_else(|| Error::InvalidData("DataArray outside of a Piece".to_string()))?;
        piece.arrays.push(array);
        Ok(())
    }
}

/// Parse a VTK XML document into a triangle mesh
pub fn parse_vtk_xml(xml: &str) -> Result<TriangleMesh> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut doc = Document::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => doc.open(e, false)?,
            Ok(Event::Empty(ref e)) => doc.open(e, true)?,
            Ok(Event::Text(ref t)) => doc.text(&String::from_utf8_lossy(t))?,
            Ok(Event::End(ref e)) => doc.close(e.local_name().as_ref())?,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::InvalidData(format!(
                    "XML parse error at byte {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    let mut mesh = TriangleMesh::new();
    for piece in &doc.pieces {
        let part = match doc.kind.as_str() {
            "PolyData" => poly_piece(piece)?,
            "StructuredGrid" => structured_piece(piece, doc.whole_extent)?,
            "UnstructuredGrid" => unstructured_piece(piece)?,
            other => return Err(Error::Unsupported(format!("VTK XML dataset type '{}'", other))),
        };
        part.validate()?;
        append(&mut mesh, part);
    }
    debug!(
        "Parsed VTK XML {}: {} pieces, {} points, {} triangles",
        doc.kind,
        doc.pieces.len(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// Concatenate pieces; point attributes survive only for single-piece files
fn append(target: &mut TriangleMesh, part: TriangleMesh) {
    if target.is_empty() && target.faces.is_empty() {
        *target = part;
        return;
    }
    let offset = target.vertices.len();
    target.normals = None;
    target.colors = None;
    target.scalars = None;
    target.vertices.extend(part.vertices);
    target
        .faces
        .extend(part.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
}

fn fan(polygon: &[usize], faces: &mut Vec<[usize; 3]>) {
    for k in 1..polygon.len().saturating_sub(1) {
        faces.push([polygon[0], polygon[k], polygon[k + 1]]);
    }
}

fn strip(cell: &[usize], faces: &mut Vec<[usize; 3]>) {
    for k in 0..cell.len().saturating_sub(2) {
        if k % 2 == 0 {
            faces.push([cell[k], cell[k + 1], cell[k + 2]]);
        } else {
            faces.push([cell[k + 1], cell[k], cell[k + 2]]);
        }
    }
}

fn poly_piece(piece: &Piece) -> Result<TriangleMesh> {
    let mut faces = Vec::new();
    for polygon in piece.cells(Section::Polys)? {
        fan(&polygon, &mut faces);
    }
    for cell in piece.cells(Section::Strips)? {
        strip(&cell, &mut faces);
    }
    let mut mesh = TriangleMesh::from_vertices_and_faces(piece.points()?, faces);
    piece.attach_point_data(&mut mesh);
    Ok(mesh)
}

/// Triangles covering the outer faces of an `nx * ny * nz` point lattice
fn structured_surface(dims: [usize; 3]) -> Vec<[usize; 3]> {
    let index = |p: [usize; 3]| p[0] + dims[0] * (p[1] + dims[1] * p[2]);
    let mut faces = Vec::new();

    for fixed in 0..3 {
        let (a, b) = ((fixed + 1) % 3, (fixed + 2) % 3);
        if dims[a] < 2 || dims[b] < 2 {
            continue;
        }
        let sides = if dims[fixed] > 1 {
            vec![0, dims[fixed] - 1]
        } else {
            vec![0]
        };
        for side in sides {
            for i in 0..dims[a] - 1 {
                for j in 0..dims[b] - 1 {
                    let corner = |di: usize, dj: usize| {
                        let mut p = [0; 3];
                        p[fixed] = side;
                        p[a] = i + di;
                        p[b] = j + dj;
                        index(p)
                    };
                    let (p00, p10, p11, p01) = (corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1));
                    faces.push([p00, p10, p11]);
                    faces.push([p00, p11, p01]);
                }
            }
        }
    }
    faces
}

fn structured_piece(piece: &Piece, whole_extent: Option<[i64; 6]>) -> Result<TriangleMesh> {
    let extent = piece
        .extent
        .or(whole_extent)
        .ok_or_else(|| Error::InvalidData("Structured grid without an extent".to_string()))?;
    let mut dims = [0usize; 3];
    for (axis, dim) in dims.iter_mut().enumerate() {
        let span = extent[2 * axis + 1]
            .checked_sub(extent[2 * axis])
            .and_then(|span| span.checked_add(1));
        *dim = span
            .and_then(|span| usize::try_from(span).ok())
            .ok_or_else(|| Error::InvalidData(format!("Invalid extent {:?}", extent)))?;
    }

    let points = piece.points()?;
    let expected = dims.iter().try_fold(1usize, |n, &d| n.checked_mul(d));
    if expected != Some(points.len()) {
        return Err(Error::InvalidData(format!(
            "Structured grid of {:?} points holds {} coordinates",
            dims,
            points.len()
        )));
    }
    let mut mesh = TriangleMesh::from_vertices_and_faces(points, structured_surface(dims));
    piece.attach_point_data(&mut mesh);
    Ok(mesh)
}

/// Faces of the 3D VTK cell types, in VTK corner numbering
fn cell_faces(cell_type: u8) -> &'static [&'static [usize]] {
    match cell_type {
        // tetra
        10 => &[&[0, 2, 1], &[0, 1, 3], &[1, 2, 3], &[0, 3, 2]],
        // voxel
        11 => &[
            &[0, 2, 3, 1],
            &[4, 5, 7, 6],
            &[0, 1, 5, 4],
            &[1, 3, 7, 5],
            &[3, 2, 6, 7],
            &[2, 0, 4, 6],
        ],
        // hexahedron
        12 => &[
            &[0, 3, 2, 1],
            &[4, 5, 6, 7],
            &[0, 1, 5, 4],
            &[1, 2, 6, 5],
            &[2, 3, 7, 6],
            &[3, 0, 4, 7],
        ],
        // wedge
        13 => &[&[0, 1, 2], &[3, 5, 4], &[0, 3, 4, 1], &[1, 4, 5, 2], &[2, 5, 3, 0]],
        // pyramid
        14 => &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]],
        _ => &[],
    }
}

fn unstructured_piece(piece: &Piece) -> Result<TriangleMesh> {
    let cells = piece.cells(Section::Cells)?;
    let types: Vec<u8> = piece
        .array(Section::Cells, "types")
        .map(|a| a.values.iter().map(|&t| t as u8).collect())
        .unwrap_or_default();
    if types.len() != cells.len() {
        return Err(Error::InvalidData(format!(
            "{} cells but {} cell types",
            cells.len(),
            types.len()
        )));
    }

    let mut faces = Vec::new();
    // Volume cell faces keyed by their sorted corners; a face seen once is on the boundary
    let mut volume_faces: Vec<Vec<usize>> = Vec::new();
    let mut counts: HashMap<Vec<usize>, usize> = HashMap::new();

    for (cell, &cell_type) in cells.iter().zip(&types) {
        match cell_type {
            5 | 7 | 9 => fan(cell, &mut faces),
            6 => strip(cell, &mut faces),
            // pixel corners run row by row
            8 if cell.len() == 4 => fan(&[cell[0], cell[1], cell[3], cell[2]], &mut faces),
            _ => {
                for local in cell_faces(cell_type) {
                    let Some(face) = local.iter().map(|&i| cell.get(i).copied()).collect::<Option<Vec<_>>>() else {
                        return Err(Error::InvalidData(format!(
                            "Cell of type {} has only {} points",
                            cell_type,
                            cell.len()
                        )));
                    };
                    let mut key = face.clone();
                    key.sort_unstable();
                    let count = counts.entry(key).or_insert(0);
                    if *count == 0 {
                        volume_faces.push(face);
                    }
                    *count += 1;
                }
            }
        }
    }

    for face in &volume_faces {
        let mut key = face.clone();
        key.sort_unstable();
        if counts.get(&key) == Some(&1) {
            fan(face, &mut faces);
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(piece.points()?, faces);
    piece.attach_point_data(&mut mesh);
    Ok(mesh)
}

impl MeshReader for VtkXmlReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        parse_vtk_xml(&fs::read_to_string(path)?)
    }
}

fn write_values<W: Write, T: std::fmt::Display>(
    writer: &mut W,
    indent: &str,
    values: impl IntoIterator<Item = T>,
) -> Result<()> {
    let line: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
    writeln!(writer, "{}{}", indent, line.join(" "))?;
    Ok(())
}

/// Write a mesh as ASCII VTK XML poly data
pub fn write_vtp<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
    mesh.validate()?;
    let n = mesh.vertex_count();
    let verts = if mesh.faces.is_empty() { n } else { 0 };
    let scalars = mesh.scalars.as_ref().filter(|s| s.len() == n);
    let normals = mesh.normals.as_ref().filter(|v| v.len() == n);
    let colors = mesh.colors.as_ref().filter(|c| c.len() == n);

    writeln!(writer, r#"<?xml version="1.0"?>"#)?;
    writeln!(
        writer,
        r#"<VTKFile type="PolyData" version="0.1" byte_order="LittleEndian">"#
    )?;
    writeln!(writer, "  <PolyData>")?;
    writeln!(
        writer,
        r#"    <Piece NumberOfPoints="{}" NumberOfVerts="{}" NumberOfLines="0" NumberOfStrips="0" NumberOfPolys="{}">"#,
        n,
        verts,
        mesh.face_count()
    )?;

    let mut active = String::new();
    if scalars.is_some() {
        active.push_str(r#" Scalars="scalars""#);
    }
    if normals.is_some() {
        active.push_str(r#" Normals="Normals""#);
    }
    writeln!(writer, "      <PointData{}>", active)?;
    if let Some(scalars) = scalars {
        writeln!(writer, r#"        <DataArray type="Float32" Name="scalars" format="ascii">"#)?;
        write_values(writer, "          ", scalars)?;
        writeln!(writer, "        </DataArray>")?;
    }
    if let Some(normals) = normals {
        writeln!(
            writer,
            r#"        <DataArray type="Float32" Name="Normals" NumberOfComponents="3" format="ascii">"#
        )?;
        write_values(writer, "          ", normals.iter().flat_map(|v| [v.x, v.y, v.z]))?;
        writeln!(writer, "        </DataArray>")?;
    }
    if let Some(colors) = colors {
        writeln!(
            writer,
            r#"        <DataArray type="UInt8" Name="RGB" NumberOfComponents="3" format="ascii">"#
        )?;
        write_values(writer, "          ", colors.iter().flatten())?;
        writeln!(writer, "        </DataArray>")?;
    }
    writeln!(writer, "      </PointData>")?;

    writeln!(writer, "      <Points>")?;
    writeln!(
        writer,
        r#"        <DataArray type="Float32" NumberOfComponents="3" format="ascii">"#
    )?;
    write_values(writer, "          ", mesh.vertices.iter().flat_map(|p| [p.x, p.y, p.z]))?;
    writeln!(writer, "        </DataArray>")?;
    writeln!(writer, "      </Points>")?;

    let (section, connectivity, offsets): (&str, Vec<usize>, Vec<usize>) = if verts > 0 {
        ("Verts", (0..n).collect(), (1..=n).collect())
    } else {
        (
            "Polys",
            mesh.faces.iter().flatten().copied().collect(),
            (1..=mesh.face_count()).map(|i| 3 * i).collect(),
        )
    };
    writeln!(writer, "      <{}>", section)?;
    writeln!(writer, r#"        <DataArray type="Int64" Name="connectivity" format="ascii">"#)?;
    write_values(writer, "          ", connectivity)?;
    writeln!(writer, "        </DataArray>")?;
    writeln!(writer, r#"        <DataArray type="Int64" Name="offsets" format="ascii">"#)?;
    write_values(writer, "          ", offsets)?;
    writeln!(writer, "        </DataArray>")?;
    writeln!(writer, "      </{}>", section)?;

    writeln!(writer, "    </Piece>")?;
    writeln!(writer, "  </PolyData>")?;
    writeln!(writer, "</VTKFile>")?;
    Ok(())
}

impl MeshWriter for VtpWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_vtp(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtp_roundtrip_keeps_attributes() {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        );
        mesh.set_scalars(vec![0.0, 0.25, 0.5, 1.0]);
        mesh.set_normals(vec![Vector3f::x(); 4]);
        mesh.set_colors(vec![[1, 2, 3]; 4]);

        let mut buffer = Vec::new();
        write_vtp(&mesh, &mut buffer).unwrap();
        let loaded = parse_vtk_xml(std::str::from_utf8(&buffer).unwrap()).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn test_structured_cube_surface() {
        let mut coords = String::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    coords.push_str(&format!("{} {} {} ", x, y, z));
                }
            }
        }
        let xml = format!(
            r#"<VTKFile type="StructuredGrid"><StructuredGrid WholeExtent="0 1 0 1 0 1">
<Piece Extent="0 1 0 1 0 1"><Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">{}</DataArray></Points></Piece>
</StructuredGrid></VTKFile>"#,
            coords
        );
        let mesh = parse_vtk_xml(&xml).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn test_huge_extent_fails_cleanly() {
        for extent in [
            "-9223372036854775808 9223372036854775807 0 0 0 0",
            "0 4294967296 0 4294967296 0 1",
        ] {
            let xml = format!(
                r#"<VTKFile type="StructuredGrid"><StructuredGrid>
<Piece Extent="{}"><Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">0 0 0</DataArray></Points></Piece>
</StructuredGrid></VTKFile>"#,
                extent
            );
            assert!(matches!(parse_vtk_xml(&xml), Err(Error::InvalidData(_))), "{}", extent);
        }
    }

    #[test]
    fn test_flat_structured_grid() {
        assert_eq!(structured_surface([3, 2, 1]).len(), 4);
        assert!(structured_surface([4, 1, 1]).is_empty());
    }

    #[test]
    fn test_unstructured_shared_face_is_interior() {
        let xml = r#"<VTKFile type="UnstructuredGrid"><UnstructuredGrid><Piece NumberOfPoints="5" NumberOfCells="2">
<Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">0 0 0 1 0 0 0 1 0 0 0 1 0 0 -1</DataArray></Points>
<Cells>
<DataArray type="Int64" Name="connectivity" format="ascii">0 1 2 3 0 2 1 4</DataArray>
<DataArray type="Int64" Name="offsets" format="ascii">4 8</DataArray>
<DataArray type="UInt8" Name="types" format="ascii">10 10</DataArray>
</Cells></Piece></UnstructuredGrid></VTKFile>"#;
        let mesh = parse_vtk_xml(xml).unwrap();
        assert_eq!(mesh.face_count(), 6);
    }

    #[test]
    fn test_binary_arrays_unsupported() {
        let xml = r#"<VTKFile type="PolyData"><PolyData><Piece><Points>
<DataArray type="Float32" NumberOfComponents="3" format="binary">AAAA</DataArray>
</Points></Piece></PolyData></VTKFile>"#;
        assert!(matches!(parse_vtk_xml(xml), Err(Error::Unsupported(_))));
    }
}
