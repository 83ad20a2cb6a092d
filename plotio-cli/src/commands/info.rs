//! plotio info command - load files and describe the resulting actors.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use plotio_core::{Actor, Drawable, Geometry};
use plotio_io::{load_dir, load_file, LoadOptions};
use plotio_visualization::{ProgressBar, TermColor};
use tracing::debug;

use crate::Cli;

pub fn run(inputs: &[PathBuf], options: &LoadOptions, cli: &Cli) -> Result<()> {
    let mut actors = Vec::new();
    let mut progress = (inputs.len() > 1 && !cli.quiet)
        .then(|| ProgressBar::new(0, inputs.len() as i64).with_color(TermColor::Cyan));

    for input in inputs {
        actors.extend(load_input(input, options)?);
        if let Some(pb) = progress.as_mut() {
            pb.print(&format!("loaded {}", input.display()));
        }
    }

    debug!("Loaded {} actors from {} inputs", actors.len(), inputs.len());
    if !cli.quiet {
        for (actor, source) in actors {
            print_actor(&actor, &source, 0);
        }
    }
    Ok(())
}

/// Load a file, or every loadable file in a directory
fn load_input(input: &Path, options: &LoadOptions) -> Result<Vec<(Actor, PathBuf)>> {
    if input.is_dir() {
        let actors = load_dir(input, options)
            .with_context(|| format!("Failed to load directory {:?}", input))?;
        Ok(actors.into_iter().map(|a| (a, input.to_path_buf())).collect())
    } else {
        let actor = load_file(input, options)
            .with_context(|| format!("Failed to load {:?}", input))?;
        Ok(vec![(actor, input.to_path_buf())])
    }
}

pub(crate) fn describe(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Surface(mesh) if mesh.faces.is_empty() => {
            format!("points ({} vertices)", mesh.vertex_count())
        }
        Geometry::Surface(mesh) => format!(
            "surface ({} vertices, {} faces)",
            mesh.vertex_count(),
            mesh.face_count()
        ),
        Geometry::Lines(lines) => format!(
            "lines ({} vertices, {} segments)",
            lines.vertices.len(),
            lines.line_count()
        ),
        Geometry::Tetrahedra(tets) => format!(
            "tetrahedra ({} vertices, {} cells)",
            tets.vertex_count(),
            tets.cell_count()
        ),
        Geometry::Image(image) => format!("image ({} x {})", image.width, image.height),
        Geometry::Assembly(parts) => format!("assembly ({} parts)", parts.len()),
    }
}

fn print_actor(actor: &Actor, source: &Path, depth: usize) {
    let indent = "  ".repeat(depth);
    if depth == 0 {
        let title = actor.legend.clone().unwrap_or_else(|| source.display().to_string());
        println!("{}", title.bold().underline());
    }
    println!("{}  {}: {}", indent, "Geometry".cyan(), describe(&actor.geometry));
    println!(
        "{}  {}: {:?} alpha {:.2}",
        indent,
        "Color".cyan(),
        actor.properties.color.to_rgb8(),
        actor.properties.alpha
    );
    if !matches!(actor.geometry, Geometry::Image(_)) {
        let (min, max) = actor.bounding_box();
        println!(
            "{}  {}: ({:.2}, {:.2}, {:.2}) - ({:.2}, {:.2}, {:.2})",
            indent,
            "Bounds".cyan(),
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        );
    }
    if let Geometry::Assembly(parts) = &actor.geometry {
        for part in parts {
            print_actor(part, source, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotio_core::{Point3f, TetraMesh};

    #[test]
    fn test_describe_geometry() {
        let tets = TetraMesh::new(
            vec![
                Point3f::origin(),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2, 3]],
        );
        assert_eq!(
            describe(&Geometry::Lines(tets.edges())),
            "lines (4 vertices, 6 segments)"
        );
        assert_eq!(
            describe(&Geometry::Tetrahedra(tets)),
            "tetrahedra (4 vertices, 1 cells)"
        );
        let points = Actor::points(vec![Point3f::origin()], 4.0);
        assert_eq!(describe(&points.geometry), "points (1 vertices)");
    }

    #[test]
    fn test_load_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.xyz"), "0 0 0\n1 1 1\n").unwrap();
        let loaded = load_input(dir.path(), &LoadOptions::default()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0.point_count(), 2);
    }
}
