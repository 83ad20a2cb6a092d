//! Dolfin (FEniCS) XML tetrahedral meshes

use flate2::read::GzDecoder;
use plotio_core::{Error, Point3f, Result, TetraMesh};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::fmt::Debug;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::format::lower_name;
use crate::xml::{attr_value, required};

/// Parse Dolfin XML text.
///
/// Every `<vertex>` and `<tetrahedron>` element is taken in document order;
/// a missing `z` attribute reads as 0.
pub fn parse_dolfin_xml(xml: &str) -> Result<TetraMesh> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut vertices = Vec::new();
    let mut cells = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"vertex" => {
                    let x: f32 = required(e, b"x")?;
                    let y: f32 = required(e, b"y")?;
                    let z: f32 = attr_value(e, b"z")?.unwrap_or(0.0);
                    vertices.push(Point3f::new(x, y, z));
                }
                b"tetrahedron" => {
                    cells.push([
                        required(e, b"v0")?,
                        required(e, b"v1")?,
                        required(e, b"v2")?,
                        required(e, b"v3")?,
                    ]);
                }
                _ => {}
            },
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

    let mesh = TetraMesh::new(vertices, cells);
    mesh.validate()?;
    debug!(
        "Dolfin mesh: {} vertices, {} tetrahedra",
        mesh.vertex_count(),
        mesh.cell_count()
    );
    Ok(mesh)
}

/// Read a Dolfin XML file; names containing `.gz` are decompressed in memory
pub fn read_dolfin_xml<P: AsRef<Path>>(path: P) -> Result<TetraMesh> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    info!("Loading {}", path.display());

    let file = File::open(path)?;
    let mut xml = String::new();
    if lower_name(path).contains(".gz") {
        GzDecoder::new(file).read_to_string(&mut xml)?;
    } else {
        std::io::BufReader::new(file).read_to_string(&mut xml)?;
    }
    parse_dolfin_xml(&xml)
}

/// Write a tetrahedral mesh as Dolfin XML
pub fn write_dolfin_xml<W: Write>(mesh: &TetraMesh, writer: &mut W) -> Result<()> {
    let vertices: Vec<[f32; 3]> = mesh.vertices.iter().map(|v| [v.x, v.y, v.z]).collect();
    write_dolfin_cells(&vertices, &mesh.cells, writer)
}

/// Write raw coordinates and cells as Dolfin XML.
///
/// Coordinates are printed with `Debug`, the shortest text that reads back
/// to the same value, so `f64` input keeps its full precision.
pub fn write_dolfin_cells<W, T>(vertices: &[[T; 3]], cells: &[[usize; 4]], writer: &mut W) -> Result<()>
where
    W: Write,
    T: Debug,
{
    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<dolfin xmlns:dolfin="http://www.fenicsproject.org">"#)?;
    writeln!(writer, r#"  <mesh celltype="tetrahedron" dim="3">"#)?;

    writeln!(writer, r#"    <vertices size="{}">"#, vertices.len())?;
    for (i, [x, y, z]) in vertices.iter().enumerate() {
        writeln!(
            writer,
            r#"      <vertex index="{}" x="{:?}" y="{:?}" z="{:?}"/>"#,
            i, x, y, z
        )?;
    }
    writeln!(writer, "    </vertices>")?;

    writeln!(writer, r#"    <cells size="{}">"#, cells.len())?;
    for (i, c) in cells.iter().enumerate() {
        writeln!(
            writer,
            r#"      <tetrahedron index="{}" v0="{}" v1="{}" v2="{}" v3="{}"/>"#,
            i, c[0], c[1], c[2], c[3]
        )?;
    }
    writeln!(writer, "    </cells>")?;

    writeln!(writer, "  </mesh>")?;
    writeln!(writer, "</dolfin>")?;
    Ok(())
}

/// Write a tetrahedral mesh to a Dolfin XML file
pub fn write_dolfin_xml_file<P: AsRef<Path>>(mesh: &TetraMesh, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_dolfin_xml(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}
