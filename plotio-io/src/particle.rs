//! Particle text files (`.txt`, `.xyz`): one `x y z [scalar]` point per line
//!
//! Fields may be separated by whitespace or commas. Blank lines and lines
//! starting with `#` or `%` are skipped.

use crate::MeshReader;
use plotio_core::{Error, Point3f, Result, TriangleMesh};
use std::fs;
use std::path::Path;
use tracing::debug;

pub struct ParticleReader;

/// Parse particle text into a face-less mesh; scalars are kept when every point has one
pub fn parse_particles(text: &str) -> Result<TriangleMesh> {
    let mut vertices = Vec::new();
    let mut scalars = Vec::new();
    let mut all_scalars = true;

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        let values = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f32>()
                    .map_err(|_| Error::parse(index + 1, format!("invalid number '{}'", t)))
            })
            .collect::<Result<Vec<_>>>()?;
        if values.len() < 3 {
            return Err(Error::parse(index + 1, "expected at least 'x y z'"));
        }
        vertices.push(Point3f::new(values[0], values[1], values[2]));
        match values.get(3) {
            Some(&s) => scalars.push(s),
            None => all_scalars = false,
        }
    }

    debug!("Parsed {} particles", vertices.len());
    let mut mesh = TriangleMesh::from_points(vertices);
    if all_scalars && !scalars.is_empty() {
        mesh.set_scalars(scalars);
    }
    Ok(mesh)
}

impl MeshReader for ParticleReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        parse_particles(&fs::read_to_string(path)?)
    }
}
