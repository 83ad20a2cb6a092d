//! PLY format support

use crate::{MeshReader, MeshWriter};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use plotio_core::{Error, Point3f, Result, TriangleMesh, Vector3f};
use ply_rs::{
    parser::Parser,
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub struct PlyReader;
pub struct PlyWriter;

/// Options for [`PlyWriter::write_mesh_with_options`]
///
/// Binary bodies are written here rather than by `ply-rs`, whose binary
/// writer omits the count prefix of list properties.
#[derive(Debug, Clone)]
pub struct PlyWriteOptions {
    pub encoding: Encoding,
    pub include_normals: bool,
    pub include_colors: bool,
    pub comments: Vec<String>,
}

impl Default for PlyWriteOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Ascii,
            include_normals: true,
            include_colors: true,
            comments: Vec::new(),
        }
    }
}

impl PlyWriteOptions {
    pub fn ascii() -> Self {
        Self {
            encoding: Encoding::Ascii,
            ..Default::default()
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_comment<S: Into<String>>(mut self, comment: S) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn with_normals(mut self, include: bool) -> Self {
        self.include_normals = include;
        self
    }

    pub fn with_colors(mut self, include: bool) -> Self {
        self.include_colors = include;
        self
    }
}

impl MeshReader for PlyReader {
    /// Polygons with more than three corners are split into triangle fans
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let empty = Vec::new();
        let vertex_elements = ply.payload.get("vertex").unwrap_or(&empty);

        let mut vertices = Vec::with_capacity(vertex_elements.len());
        for vertex in vertex_elements {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            vertices.push(Point3f::new(x, y, z));
        }

        let mut faces = Vec::new();
        if let Some(face_elements) = ply.payload.get("face") {
            for face in face_elements {
                let indices = extract_face_indices(face)?;
                for k in 1..indices.len().saturating_sub(1) {
                    faces.push([indices[0], indices[k], indices[k + 1]]);
                }
            }
        }

        // Normals and colors only count when every vertex has them
        let normals: Option<Vec<Vector3f>> = vertex_elements
            .iter()
            .map(|v| {
                Some(Vector3f::new(
                    extract_property_value(v, "nx").ok()?,
                    extract_property_value(v, "ny").ok()?,
                    extract_property_value(v, "nz").ok()?,
                ))
            })
            .collect();
        let colors: Option<Vec<[u8; 3]>> = vertex_elements
            .iter()
            .map(|v| {
                Some([
                    extract_color(v, "red")?,
                    extract_color(v, "green")?,
                    extract_color(v, "blue")?,
                ])
            })
            .collect();

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = normals.filter(|n| !n.is_empty()) {
            mesh.set_normals(normals);
        }
        if let Some(colors) = colors.filter(|c| !c.is_empty()) {
            mesh.set_colors(colors);
        }
        debug!(
            "PLY loaded: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        Self::write_mesh_with_options(mesh, path, &PlyWriteOptions::default())
    }
}

impl PlyWriter {
    pub fn write_mesh_with_options<P: AsRef<Path>>(
        mesh: &TriangleMesh,
        path: P,
        options: &PlyWriteOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = options.encoding;
        ply.header.comments.extend(options.comments.iter().cloned());

        let normals = mesh.normals.as_ref().filter(|_| options.include_normals);
        let colors = mesh.colors.as_ref().filter(|_| options.include_colors);

        let float = || PropertyType::Scalar(ScalarType::Float);
        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.vertices.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(name.to_string(), float()));
        }
        if normals.is_some() {
            for name in ["nx", "ny", "nz"] {
                vertex_element.properties.add(PropertyDef::new(name.to_string(), float()));
            }
        }
        if colors.is_some() {
            for name in ["red", "green", "blue"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            }
        }
        ply.header.elements.add(vertex_element);

        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.faces.len();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        match options.encoding {
            Encoding::Ascii => {
                ply.payload
                    .insert("vertex".to_string(), vertex_payload(mesh, normals, colors));
                ply.payload.insert("face".to_string(), face_payload(mesh));
                Writer::new().write_ply(&mut writer, &mut ply)?;
            }
            Encoding::BinaryLittleEndian => {
                Writer::<DefaultElement>::new().write_header(&mut writer, &ply.header)?;
                write_binary_body::<LittleEndian, _>(&mut writer, mesh, normals, colors)?;
            }
            Encoding::BinaryBigEndian => {
                Writer::<DefaultElement>::new().write_header(&mut writer, &ply.header)?;
                write_binary_body::<BigEndian, _>(&mut writer, mesh, normals, colors)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn vertex_payload(
    mesh: &TriangleMesh,
    normals: Option<&Vec<Vector3f>>,
    colors: Option<&Vec<[u8; 3]>>,
) -> Vec<DefaultElement> {
    let mut vertices = Vec::with_capacity(mesh.vertices.len());
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        let mut element = DefaultElement::new();
        element.insert("x".to_string(), Property::Float(vertex.x));
        element.insert("y".to_string(), Property::Float(vertex.y));
        element.insert("z".to_string(), Property::Float(vertex.z));
        if let Some(normals) = normals {
            let n = normals.get(i).copied().unwrap_or_else(Vector3f::zeros);
            element.insert("nx".to_string(), Property::Float(n.x));
            element.insert("ny".to_string(), Property::Float(n.y));
            element.insert("nz".to_string(), Property::Float(n.z));
        }
        if let Some(colors) = colors {
            let c = colors.get(i).copied().unwrap_or([255, 255, 255]);
            element.insert("red".to_string(), Property::UChar(c[0]));
            element.insert("green".to_string(), Property::UChar(c[1]));
            element.insert("blue".to_string(), Property::UChar(c[2]));
        }
        vertices.push(element);
    }
    vertices
}

fn face_payload(mesh: &TriangleMesh) -> Vec<DefaultElement> {
    mesh.faces
        .iter()
        .map(|face| {
            let mut element = DefaultElement::new();
            element.insert(
                "vertex_indices".to_string(),
                Property::ListInt(face.iter().map(|&i| i as i32).collect()),
            );
            element
        })
        .collect()
}

/// Binary body matching the header built in `write_mesh_with_options`
fn write_binary_body<B: ByteOrder, W: Write>(
    out: &mut W,
    mesh: &TriangleMesh,
    normals: Option<&Vec<Vector3f>>,
    colors: Option<&Vec<[u8; 3]>>,
) -> Result<()> {
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        for value in [vertex.x, vertex.y, vertex.z] {
            out.write_f32::<B>(value)?;
        }
        if let Some(normals) = normals {
            let n = normals.get(i).copied().unwrap_or_else(Vector3f::zeros);
            for value in [n.x, n.y, n.z] {
                out.write_f32::<B>(value)?;
            }
        }
        if let Some(colors) = colors {
            out.write_all(&colors.get(i).copied().unwrap_or([255, 255, 255]))?;
        }
    }
    for face in &mesh.faces {
        out.write_u8(3)?;
        for &index in face {
            let index = i32::try_from(index)
                .map_err(|_| Error::InvalidData(format!("Face index {} exceeds PLY int", index)))?;
            out.write_i32::<B>(index)?;
        }
    }
    Ok(())
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        Some(Property::Char(val)) => Ok(*val as f32),
        Some(Property::UChar(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

fn extract_color(element: &DefaultElement, name: &str) -> Option<u8> {
    match element.get(name)? {
        Property::UChar(val) => Some(*val),
        Property::Float(val) => Some((val.clamp(0.0, 1.0) * 255.0).round() as u8),
        Property::Double(val) => Some((val.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => None,
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> Result<Vec<usize>> {
    let to_index = |i: i64| {
        usize::try_from(i).map_err(|_| Error::InvalidData(format!("Negative face index {}", i)))
    };
    match element
        .get("vertex_indices")
        .or_else(|| element.get("vertex_index"))
    {
        Some(Property::ListInt(indices)) => indices.iter().map(|&i| to_index(i as i64)).collect(),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        Some(Property::ListShort(indices)) => indices.iter().map(|&i| to_index(i as i64)).collect(),
        Some(Property::ListUShort(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&i| i as usize).collect()),
        _ => Err(Error::InvalidData("Face indices not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_quad_is_fanned() {
        let mut file = tempfile::NamedTempFile::with_suffix(".ply").unwrap();
        write!(
            file,
            "ply\nformat ascii 1.0\nelement vertex 4\nproperty float x\nproperty float y\n\
property float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\n\
element face 1\nproperty list uchar int vertex_indices\nend_header\n\
0 0 0 255 0 0\n1 0 0 0 255 0\n1 1 0 0 0 255\n0 1 0 9 9 9\n4 0 1 2 3\n"
        )
        .unwrap();

        let mesh = PlyReader::read_mesh(file.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.colors.as_ref().unwrap()[3], [9, 9, 9]);
        assert!(mesh.normals.is_none());
    }

    fn normal_triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.5, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        mesh.set_normals(vec![Vector3f::z(); 3]);
        mesh
    }

    #[test]
    fn test_default_write_is_ascii_and_keeps_normals() {
        let mesh = normal_triangle();
        let file = tempfile::NamedTempFile::with_suffix(".ply").unwrap();
        PlyWriter::write_mesh(&mesh, file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("format ascii 1.0"));
        let loaded = PlyReader::read_mesh(file.path()).unwrap();
        assert_eq!(loaded.vertices, mesh.vertices);
        assert_eq!(loaded.faces, mesh.faces);
        assert_eq!(loaded.normals, mesh.normals);
    }

    #[test]
    fn test_binary_faces_carry_list_count() {
        let mut mesh = normal_triangle();
        mesh.set_colors(vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]]);

        for encoding in [Encoding::BinaryLittleEndian, Encoding::BinaryBigEndian] {
            let file = tempfile::NamedTempFile::with_suffix(".ply").unwrap();
            let options = PlyWriteOptions::default().with_encoding(encoding);
            PlyWriter::write_mesh_with_options(&mesh, file.path(), &options).unwrap();

            // header, 3 vertices of 6 floats and 3 colors, one face of 1 + 3 * 4 bytes
            let bytes = std::fs::read(file.path()).unwrap();
            let header_end = bytes
                .windows(11)
                .position(|w| w == b"end_header\n")
                .unwrap()
                + 11;
            assert_eq!(bytes.len() - header_end, 3 * (6 * 4 + 3) + 13);
            assert_eq!(bytes[bytes.len() - 13], 3);

            let loaded = PlyReader::read_mesh(file.path()).unwrap();
            assert_eq!(loaded.vertices, mesh.vertices, "{:?}", encoding);
            assert_eq!(loaded.faces, mesh.faces, "{:?}", encoding);
            assert_eq!(loaded.normals, mesh.normals, "{:?}", encoding);
            assert_eq!(loaded.colors, mesh.colors, "{:?}", encoding);
        }
    }

    #[test]
    fn test_ascii_options() {
        let mesh = TriangleMesh::from_points(vec![Point3f::new(1.0, 2.0, 3.0)]);
        let file = tempfile::NamedTempFile::with_suffix(".ply").unwrap();
        let options = PlyWriteOptions::ascii().with_comment("written by plotio");
        PlyWriter::write_mesh_with_options(&mesh, file.path(), &options).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.contains("format ascii 1.0"));
        assert!(text.contains("comment written by plotio"));
        assert_eq!(PlyReader::read_mesh(file.path()).unwrap().vertex_count(), 1);
    }
}
