//! Writing actors back to disk

use crate::format::WriteFormat;
use crate::{
    byu::ByuWriter, obj::ObjWriter, ply::PlyWriter, stl::StlWriter, vtk_legacy::VtkLegacyWriter,
    vtk_xml::VtpWriter, MeshWriter,
};
use plotio_core::{Actor, Error, Result, TriangleMesh};
use std::path::Path;
use tracing::info;

/// Write a mesh in the format named by `path`
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = WriteFormat::from_path(path).ok_or_else(|| {
        Error::UnsupportedFormat(format!("Unavailable format in file {}", path.display()))
    })?;

    match format {
        WriteFormat::VtkLegacy => VtkLegacyWriter::write_mesh(mesh, path)?,
        WriteFormat::Ply => PlyWriter::write_mesh(mesh, path)?,
        WriteFormat::Obj => ObjWriter::write_mesh(mesh, path)?,
        WriteFormat::Stl => StlWriter::write_mesh(mesh, path)?,
        WriteFormat::Byu => ByuWriter::write_mesh(mesh, path)?,
        WriteFormat::VtkPolyData => VtpWriter::write_mesh(mesh, path)?,
    }
    info!("Saved file: {}", path.display());
    Ok(())
}

/// Write the world-space surface of an actor.
///
/// Assemblies are merged, tetrahedral meshes contribute their boundary and
/// line sets their points. Image actors cannot be written.
pub fn write<P: AsRef<Path>>(actor: &Actor, path: P) -> Result<()> {
    let path = path.as_ref();
    if WriteFormat::from_path(path).is_none() {
        return Err(Error::UnsupportedFormat(format!(
            "Unavailable format in file {}",
            path.display()
        )));
    }
    let mesh = actor
        .world_surface()
        .ok_or_else(|| Error::Unsupported("image actors have no surface to write".to_string()))?;
    write_mesh(&mesh, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotio_core::{Geometry, ImageData, Point3f};

    #[test]
    fn test_unknown_extension() {
        let actor = Actor::points(vec![Point3f::origin()], 4.0);
        let err = write(&actor, "out.xyz").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_image_actor_rejected() {
        let image = ImageData::new(1, 1, vec![0, 0, 0, 255]).unwrap();
        let actor = Actor::new(Geometry::Image(image));
        let dir = tempfile::tempdir().unwrap();
        let err = write(&actor, dir.path().join("pic.vtk")).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }
}
