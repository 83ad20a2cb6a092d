//! PCD (Point Cloud Data) reading
//!
//! Supports the `ascii` and `binary` data sections. Only the `x`, `y` and
//! `z` fields are kept; other fields are skipped using their declared type
//! and count.

use byteorder::{LittleEndian, ReadBytesExt};
use plotio_core::{Error, Point3f, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Upper bound on the up-front allocation for the declared point count
const MAX_RESERVED_POINTS: usize = 1 << 16;

/// PCD data section encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdDataFormat {
    Ascii,
    Binary,
    BinaryCompressed,
}

/// PCD field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdFieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl PcdFieldType {
    fn from_type_and_size(type_str: &str, size: usize) -> Result<Self> {
        Ok(match (type_str, size) {
            ("I", 1) => PcdFieldType::I8,
            ("I", 2) => PcdFieldType::I16,
            ("I", 4) => PcdFieldType::I32,
            ("U", 1) => PcdFieldType::U8,
            ("U", 2) => PcdFieldType::U16,
            ("U", 4) => PcdFieldType::U32,
            ("F", 4) => PcdFieldType::F32,
            ("F", 8) => PcdFieldType::F64,
            _ => {
                return Err(Error::InvalidData(format!(
                    "Unknown PCD field type/size combination: {}/{}",
                    type_str, size
                )))
            }
        })
    }

    fn read_le<R: Read>(self, reader: &mut R) -> std::io::Result<f64> {
        Ok(match self {
            PcdFieldType::I8 => reader.read_i8()? as f64,
            PcdFieldType::U8 => reader.read_u8()? as f64,
            PcdFieldType::I16 => reader.read_i16::<LittleEndian>()? as f64,
            PcdFieldType::U16 => reader.read_u16::<LittleEndian>()? as f64,
            PcdFieldType::I32 => reader.read_i32::<LittleEndian>()? as f64,
            PcdFieldType::U32 => reader.read_u32::<LittleEndian>()? as f64,
            PcdFieldType::F32 => reader.read_f32::<LittleEndian>()? as f64,
            PcdFieldType::F64 => reader.read_f64::<LittleEndian>()?,
        })
    }
}

/// PCD field definition
#[derive(Debug, Clone)]
pub struct PcdField {
    pub name: String,
    pub field_type: PcdFieldType,
    pub count: usize,
}

/// PCD header information
#[derive(Debug, Clone)]
pub struct PcdHeader {
    pub version: Option<String>,
    pub fields: Vec<PcdField>,
    pub width: usize,
    pub height: usize,
    pub viewpoint: [f64; 7], // tx, ty, tz, qw, qx, qy, qz
    /// Declared point count; `width * height` when `POINTS` is absent
    pub points: usize,
    pub data_format: PcdDataFormat,
}

impl PcdHeader {
    /// Offset, within one point, of the first value of each coordinate field
    fn coordinate_columns(&self) -> Result<[usize; 3]> {
        let mut columns = [None; 3];
        let mut offset: usize = 0;
        for field in &self.fields {
            match field.name.as_str() {
                "x" => columns[0] = Some(offset),
                "y" => columns[1] = Some(offset),
                "z" => columns[2] = Some(offset),
                _ => {}
            }
            offset = offset.saturating_add(field.count);
        }
        match columns {
            [Some(x), Some(y), Some(z)] => Ok([x, y, z]),
            _ => Err(Error::InvalidData("PCD file has no x, y, z fields".to_string())),
        }
    }
}

/// Point cloud read from a PCD file
#[derive(Debug, Clone)]
pub struct PcdCloud {
    pub header: PcdHeader,
    pub points: Vec<Point3f>,
}

impl PcdCloud {
    /// True when the data section held as many points as declared
    pub fn is_complete(&self) -> bool {
        self.points.len() == self.header.points
    }
}

/// PCD reader
pub struct PcdReader;

impl PcdReader {
    /// Read a PCD file
    pub fn read_pcd_file<P: AsRef<Path>>(path: P) -> Result<PcdCloud> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_pcd_data(&mut reader)
    }

    /// Read PCD data from a reader.
    ///
    /// A data section shorter than the declared point count is not an error:
    /// the points found are returned and a warning is logged.
    pub fn read_pcd_data<R: BufRead>(reader: &mut R) -> Result<PcdCloud> {
        let header = Self::read_header(reader)?;
        let points = match header.data_format {
            PcdDataFormat::Ascii => Self::read_ascii_points(reader, &header)?,
            PcdDataFormat::Binary => Self::read_binary_points(reader, &header)?,
            PcdDataFormat::BinaryCompressed => {
                return Err(Error::Unsupported(
                    "Binary compressed PCD format not supported".to_string(),
                ))
            }
        };

        let cloud = PcdCloud { header, points };
        if !cloud.is_complete() {
            warn!(
                "Mismatch in pcd file: {} points declared, {} read",
                cloud.header.points,
                cloud.points.len()
            );
        }
        debug!("PCD cloud: {} points", cloud.points.len());
        Ok(cloud)
    }

    fn read_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader> {
        let mut version = None;
        let mut names: Vec<String> = Vec::new();
        let mut sizes: Vec<usize> = Vec::new();
        let mut types: Vec<String> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        let mut width = None;
        let mut height = None;
        let mut viewpoint = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let mut points = None;

        let mut line = String::new();
        let data_format = loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(Error::InvalidData(
                    "Unexpected end of file in PCD header".to_string(),
                ));
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() || parts[0].starts_with('#') {
                continue;
            }

            let parse_usize = |s: &str, key: &str| {
                s.parse::<usize>()
                    .map_err(|_| Error::InvalidData(format!("Invalid {} value: {}", key, s)))
            };

            match parts[0] {
                "VERSION" => version = parts.get(1).map(|v| v.to_string()),
                "FIELDS" => names = parts[1..].iter().map(|s| s.to_string()).collect(),
                "SIZE" => {
                    sizes = parts[1..]
                        .iter()
                        .map(|s| parse_usize(s, "SIZE"))
                        .collect::<Result<_>>()?
                }
                "TYPE" => types = parts[1..].iter().map(|s| s.to_string()).collect(),
                "COUNT" => {
                    counts = parts[1..]
                        .iter()
                        .map(|s| parse_usize(s, "COUNT"))
                        .collect::<Result<_>>()?
                }
                "WIDTH" if parts.len() >= 2 => width = Some(parse_usize(parts[1], "WIDTH")?),
                "HEIGHT" if parts.len() >= 2 => height = Some(parse_usize(parts[1], "HEIGHT")?),
                "VIEWPOINT" if parts.len() >= 8 => {
                    for i in 0..7 {
                        viewpoint[i] = parts[i + 1].parse::<f64>().map_err(|_| {
                            Error::InvalidData(format!("Invalid VIEWPOINT value: {}", parts[i + 1]))
                        })?;
                    }
                }
                "POINTS" if parts.len() >= 2 => points = Some(parse_usize(parts[1], "POINTS")?),
                "DATA" => {
                    break match parts.get(1).copied() {
                        Some("ascii") => PcdDataFormat::Ascii,
                        Some("binary") => PcdDataFormat::Binary,
                        Some("binary_compressed") => PcdDataFormat::BinaryCompressed,
                        other => {
                            return Err(Error::InvalidData(format!(
                                "Unknown PCD DATA format: {:?}",
                                other
                            )))
                        }
                    };
                }
                _ => {
                    // Ignore unknown header fields
                }
            }
        };

        // SIZE, TYPE and COUNT are optional in ASCII files and default to F/4/1
        let mut fields = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            let size = sizes.get(i).copied().unwrap_or(4);
            let type_str = types.get(i).map(String::as_str).unwrap_or("F");
            fields.push(PcdField {
                name,
                field_type: PcdFieldType::from_type_and_size(type_str, size)?,
                count: counts.get(i).copied().unwrap_or(1),
            });
        }

        let width = width.unwrap_or(0);
        let height = height.unwrap_or(1);
        let points = match points {
            Some(points) => points,
            None => width.checked_mul(height).ok_or_else(|| {
                Error::InvalidData(format!("PCD size {}x{} overflows", width, height))
            })?,
        };
        Ok(PcdHeader {
            version,
            fields,
            width,
            height,
            viewpoint,
            points,
            data_format,
        })
    }

    fn read_ascii_points<R: BufRead>(reader: &mut R, header: &PcdHeader) -> Result<Vec<Point3f>> {
        // Header-less column layout: the first three values are x y z
        let columns = if header.fields.is_empty() {
            [0, 1, 2]
        } else {
            header.coordinate_columns()?
        };
        let mut points = Vec::with_capacity(header.points.min(MAX_RESERVED_POINTS));

        for (i, line) in reader.lines().enumerate() {
            if points.len() >= header.points {
                break;
            }
            let line = line?;
            let values: Vec<&str> = line.split_whitespace().collect();
            if values.is_empty() {
                continue;
            }
            let mut xyz = [0.0f32; 3];
            for (value, &column) in xyz.iter_mut().zip(&columns) {
                let token = values.get(column).ok_or_else(|| {
                    Error::InvalidData(format!("Not enough values in PCD data line {}", i + 1))
                })?;
                *value = token.parse().map_err(|_| {
                    Error::InvalidData(format!("Invalid PCD value '{}' in data line {}", token, i + 1))
                })?;
            }
            points.push(Point3f::new(xyz[0], xyz[1], xyz[2]));
        }
        Ok(points)
    }

    fn read_binary_points<R: Read>(reader: &mut R, header: &PcdHeader) -> Result<Vec<Point3f>> {
        header.coordinate_columns()?;
        if header.fields.iter().all(|field| field.count == 0) {
            return Err(Error::InvalidData("PCD fields hold no values".to_string()));
        }
        let mut points = Vec::with_capacity(header.points.min(MAX_RESERVED_POINTS));

        'points: for _ in 0..header.points {
            let mut xyz = [0.0f32; 3];
            for field in &header.fields {
                let slot = match field.name.as_str() {
                    "x" => Some(0),
                    "y" => Some(1),
                    "z" => Some(2),
                    _ => None,
                };
                for k in 0..field.count {
                    let value = match field.field_type.read_le(reader) {
                        Ok(v) => v,
                        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break 'points,
                        Err(e) => return Err(e.into()),
                    };
                    if let (Some(slot), 0) = (slot, k) {
                        xyz[slot] = value as f32;
                    }
                }
            }
            points.push(Point3f::new(xyz[0], xyz[1], xyz[2]));
        }
        Ok(points)
    }
}

/// Read the points of a PCD file
pub fn read_pcd<P: AsRef<Path>>(path: P) -> Result<Vec<Point3f>> {
    PcdReader::read_pcd_file(path).map(|cloud| cloud.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;

    const ASCII_HEADER: &str = "# .PCD v0.7 - Point Cloud Data file format\n\
VERSION 0.7\nFIELDS x y z rgb\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 1\n\
WIDTH 3\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS 3\nDATA ascii\n";

    #[test]
    fn test_ascii_points() {
        let text = format!("{}1 2 3 0\n4 5 6 0\n7 8 9 0\n", ASCII_HEADER);
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(text)).unwrap();
        assert!(cloud.is_complete());
        assert_eq!(cloud.header.version.as_deref(), Some("0.7"));
        assert_eq!(cloud.header.data_format, PcdDataFormat::Ascii);
        assert_eq!(
            cloud.points,
            vec![
                Point3f::new(1.0, 2.0, 3.0),
                Point3f::new(4.0, 5.0, 6.0),
                Point3f::new(7.0, 8.0, 9.0)
            ]
        );
    }

    #[test]
    fn test_ascii_mismatch_keeps_points() {
        let text = format!("{}1 2 3 0\n4 5 6 0\n", ASCII_HEADER);
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(text)).unwrap();
        assert!(!cloud.is_complete());
        assert_eq!(cloud.points.len(), 2);
    }

    #[test]
    fn test_ascii_stops_at_declared_count() {
        let text = format!("{}1 2 3 0\n4 5 6 0\n7 8 9 0\n10 11 12 0\n", ASCII_HEADER);
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(text)).unwrap();
        assert_eq!(cloud.points.len(), 3);
    }

    #[test]
    fn test_binary_points_skip_other_fields() {
        let mut data = b"VERSION 0.7\nFIELDS intensity x y z\nSIZE 2 4 4 8\nTYPE U F F F\n\
COUNT 1 1 1 1\nWIDTH 2\nHEIGHT 1\nPOINTS 2\nDATA binary\n"
            .to_vec();
        for (i, p) in [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]].iter().enumerate() {
            data.write_u16::<LittleEndian>(i as u16).unwrap();
            data.write_f32::<LittleEndian>(p[0]).unwrap();
            data.write_f32::<LittleEndian>(p[1]).unwrap();
            data.write_f64::<LittleEndian>(p[2] as f64).unwrap();
        }
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(data)).unwrap();
        assert_eq!(cloud.header.fields[3].field_type, PcdFieldType::F64);
        assert_eq!(cloud.points[1], Point3f::new(4.0, 5.0, 6.0));
        assert!(cloud.is_complete());
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nWIDTH 2\nPOINTS 2\nDATA binary\n".to_vec();
        for v in [1.0f32, 2.0, 3.0, 4.0] {
            data.write_f32::<LittleEndian>(v).unwrap();
        }
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(data)).unwrap();
        assert_eq!(cloud.points, vec![Point3f::new(1.0, 2.0, 3.0)]);
        assert!(!cloud.is_complete());
    }

    #[test]
    fn test_compressed_unsupported() {
        let text = "FIELDS x y z\nWIDTH 1\nPOINTS 1\nDATA binary_compressed\n";
        assert!(matches!(
            PcdReader::read_pcd_data(&mut Cursor::new(text)),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_huge_declared_counts_fail_cleanly() {
        let text = "FIELDS x y z\nPOINTS 18446744073709551615\nDATA ascii\n1 2 3\n";
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(text)).unwrap();
        assert_eq!(cloud.points, vec![Point3f::new(1.0, 2.0, 3.0)]);
        assert!(!cloud.is_complete());

        let text = "FIELDS x y z\nWIDTH 4294967296\nHEIGHT 4294967296\nDATA ascii\n";
        assert!(matches!(
            PcdReader::read_pcd_data(&mut Cursor::new(text)),
            Err(Error::InvalidData(_))
        ));

        let mut data =
            b"FIELDS x y z\nCOUNT 1 1 18446744073709551615\nPOINTS 18446744073709551615\nDATA binary\n"
                .to_vec();
        data.write_f32::<LittleEndian>(1.0).unwrap();
        let cloud = PcdReader::read_pcd_data(&mut Cursor::new(data)).unwrap();
        assert!(cloud.points.is_empty());

        let text = "FIELDS x y z\nCOUNT 0 0 0\nPOINTS 18446744073709551615\nDATA binary\n";
        assert!(PcdReader::read_pcd_data(&mut Cursor::new(text)).is_err());
    }
}
