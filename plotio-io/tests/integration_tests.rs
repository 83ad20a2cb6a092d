//! Integration tests for plotio-io
//!
//! These tests go through the public entry points: loading by file name,
//! converting neutral meshes, and writing actors in every output format.

use approx::assert_relative_eq;
use flate2::write::GzEncoder;
use flate2::Compression;
use plotio_core::{Actor, Geometry, Point3f, Transform3D, TriangleMesh, Vector3};
use plotio_io::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const TWO_TETS: &str = "5\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n1 1 1\n2\n1 1 2 3 4\n2 2 3 4 5\n";

/// Closed tetrahedron surface
fn create_tetra_surface() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
        ],
        vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
    )
}

fn write_text(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_neutral_to_dolfin_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_text(dir.path(), "mesh.neutral", TWO_TETS);
    let output = dir.path().join("mesh.xml");

    let converted = convert_neutral_to_xml(&input, Some(&output)).unwrap();
    assert_eq!(converted.vertex_count(), 5);
    assert_eq!(converted.cells, vec![[0, 1, 2, 3], [1, 2, 3, 4]]);

    let reloaded = read_dolfin_xml(&output).unwrap();
    assert_eq!(reloaded.vertices, converted.vertices);
    assert_eq!(reloaded.cells, converted.cells);
}

#[test]
fn test_gzipped_dolfin_with_edges() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = parse_neutral(TWO_TETS).unwrap();
    let mut xml = Vec::new();
    write_dolfin_xml(&mesh, &mut xml).unwrap();

    let path = dir.path().join("mesh.xml.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(&xml).unwrap();
    encoder.finish().unwrap();

    let options = LoadOptions::default().with_edges(true).with_alpha(0.8);
    let actor = load_file(&path, &options).unwrap();
    let Geometry::Assembly(parts) = &actor.geometry else {
        panic!("expected an assembly");
    };
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].properties.point_size, 4.0);
    assert!(matches!(parts[1].geometry, Geometry::Tetrahedra(_)));
    assert!(parts[1].properties.flat_shading);
    assert_relative_eq!(parts[1].properties.alpha, 0.4);

    // Without edges only the points are returned
    let points = load_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(points.point_count(), 5);
    assert!(!points.is_assembly());
}

#[test]
fn test_write_and_reload_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let actor = Actor::surface(create_tetra_surface());

    for name in ["out.vtk", "out.ply", "out.obj", "out.stl", "out.byu", "out.vtp"] {
        let path = dir.path().join(name);
        write(&actor, &path).unwrap();

        let mesh = load_poly(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 4, "{}", name);
        assert_eq!(mesh.face_count(), 4, "{}", name);

        let reloaded = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(reloaded.point_count(), 4, "{}", name);
    }
}

#[test]
fn test_write_applies_actor_transform() {
    let dir = tempfile::tempdir().unwrap();
    let mut actor = Actor::surface(create_tetra_surface());
    actor.transform = Transform3D::scaling(Vector3::new(3.0, 1.0, 1.0));

    let path = dir.path().join("scaled.vtk");
    write(&actor, &path).unwrap();
    let mesh = load_poly(&path).unwrap();
    let max_x = mesh.vertices.iter().map(|p| p.x).fold(f32::MIN, f32::max);
    assert_relative_eq!(max_x, 3.0);
}

#[test]
fn test_unsupported_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let actor = Actor::surface(create_tetra_surface());
    let err = write(&actor, dir.path().join("out.xyz")).unwrap_err();
    assert!(matches!(err, plotio_core::Error::UnsupportedFormat(_)));
}

#[test]
fn test_load_dir_sorted_and_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    write_text(dir.path(), "b.xyz", "0 0 0\n1 0 0\n");
    write_text(dir.path(), "a.xyz", "0 0 0\n");
    write_text(dir.path(), "c.gmsh", "$Nodes\n2\n1 0 0 0\n$EndNodes\n");
    fs::create_dir(dir.path().join("nested")).unwrap();

    let options = LoadOptions::default().with_legend(Legend::FileName);
    let actors = load_dir(dir.path(), &options).unwrap();
    let legends: Vec<_> = actors.iter().map(|a| a.legend.clone().unwrap_or_default()).collect();
    assert_eq!(legends, vec!["a.xyz", "b.xyz"]);
    assert_eq!(actors[1].point_count(), 2);

    assert!(load_dir(dir.path().join("missing"), &options).is_err());
}

#[test]
fn test_slc_volume_through_load_file() {
    // 4x4x4 volume with a bright 2x2x2 core, uncompressed
    let dims = 4;
    let mut data = format!("11111\n{d} {d} {d} 8\n1.0 1.0 1.0\n0 0 0 0\n1 1 X", d = dims).into_bytes();
    data.extend([0u8; 3]);
    for z in 0..dims {
        data.extend(format!("{} X", dims * dims).into_bytes());
        for y in 0..dims {
            for x in 0..dims {
                let inside = (1..3).contains(&x) && (1..3).contains(&y) && (1..3).contains(&z);
                data.push(if inside { 200 } else { 0 });
            }
        }
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("core.slc");
    fs::write(&path, data).unwrap();

    let actor = load_file(&path, &LoadOptions::default().with_connectivity(true)).unwrap();
    let mesh = actor.world_surface().unwrap();
    assert!(mesh.face_count() > 0);
    assert!(mesh.vertices.iter().all(|p| p.x > 0.0 && p.x < 3.0));
}

#[test]
fn test_image_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pixel.png");
    image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])).save(&path).unwrap();

    let actor = load_file(&path, &LoadOptions::default().with_alpha(0.5)).unwrap();
    assert!(matches!(actor.geometry, Geometry::Image(_)));
    assert_eq!(actor.properties.alpha, 0.5);

    let err = load_file(dir.path().join("nothing.stl"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, plotio_core::Error::FileNotFound(_)));
}
