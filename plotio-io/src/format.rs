//! File kind detection from file names
//!
//! Kinds are matched by substring on the lower-cased file name, not by the
//! extension alone, so `mesh.xml.gz` is a Dolfin file and `scan.tiff` is a
//! volume. Checks run in a fixed order and the first match wins.

use std::path::Path;

/// What [`crate::load_file`] does with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Dolfin/FEniCS tetrahedral mesh, optionally gzipped
    DolfinXml,
    /// Neutral tetrahedral mesh
    Neutral,
    Gmsh,
    /// PCL point cloud
    Pcd,
    /// TIFF stack or SLC volume, iso-surfaced on load
    Volume,
    /// PNG or JPEG picture
    Image,
    /// Anything else is read as poly data
    Poly(PolyFormat),
}

/// Surface formats handled by [`crate::load_poly`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyFormat {
    VtkLegacy,
    Ply,
    Obj,
    Stl,
    Byu,
    VtkPolyData,
    VtkStructuredGrid,
    VtkUnstructuredGrid,
    /// Whitespace separated `x y z [scalar]` text
    Particles,
    /// No recognized marker; read as legacy VTK
    Generic,
}

/// Surface formats accepted by [`crate::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFormat {
    VtkLegacy,
    Ply,
    Obj,
    Stl,
    Byu,
    VtkPolyData,
}

/// Lower-cased final path component, or the whole path if there is none
pub(crate) fn lower_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| path.to_string_lossy().to_lowercase())
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let name = lower_name(path);
        if name.contains(".xml") {
            FileKind::DolfinXml
        } else if name.contains(".neutral") {
            FileKind::Neutral
        } else if name.contains(".gmsh") {
            FileKind::Gmsh
        } else if name.contains(".pcd") {
            FileKind::Pcd
        } else if name.contains(".tif") || name.contains(".slc") {
            FileKind::Volume
        } else if is_image_name(&name) {
            FileKind::Image
        } else {
            FileKind::Poly(PolyFormat::from_path(path))
        }
    }
}

pub(crate) fn is_image_name(name: &str) -> bool {
    name.contains(".png") || name.contains(".jpg") || name.contains(".jpeg")
}

impl PolyFormat {
    pub fn from_path(path: &Path) -> Self {
        let name = lower_name(path);
        if name.contains(".vtk") {
            PolyFormat::VtkLegacy
        } else if name.contains(".ply") {
            PolyFormat::Ply
        } else if name.contains(".obj") {
            PolyFormat::Obj
        } else if name.contains(".stl") {
            PolyFormat::Stl
        } else if name.contains(".byu") || name.contains(".g") {
            PolyFormat::Byu
        } else if name.contains(".vtp") {
            PolyFormat::VtkPolyData
        } else if name.contains(".vts") {
            PolyFormat::VtkStructuredGrid
        } else if name.contains(".vtu") {
            PolyFormat::VtkUnstructuredGrid
        } else if name.contains(".txt") || name.contains(".xyz") {
            PolyFormat::Particles
        } else {
            PolyFormat::Generic
        }
    }
}

impl WriteFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = lower_name(path);
        if name.contains(".vtk") {
            Some(WriteFormat::VtkLegacy)
        } else if name.contains(".ply") {
            Some(WriteFormat::Ply)
        } else if name.contains(".obj") {
            Some(WriteFormat::Obj)
        } else if name.contains(".stl") {
            Some(WriteFormat::Stl)
        } else if name.contains(".byu") || name.contains(".g") {
            Some(WriteFormat::Byu)
        } else if name.contains(".vtp") {
            Some(WriteFormat::VtkPolyData)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> FileKind {
        FileKind::from_path(Path::new(name))
    }

    #[test]
    fn test_load_dispatch_order() {
        assert_eq!(kind("mesh.xml"), FileKind::DolfinXml);
        assert_eq!(kind("mesh.XML.GZ"), FileKind::DolfinXml);
        assert_eq!(kind("heart.neutral"), FileKind::Neutral);
        assert_eq!(kind("part.gmsh"), FileKind::Gmsh);
        assert_eq!(kind("scan.pcd"), FileKind::Pcd);
        assert_eq!(kind("embryo.tiff"), FileKind::Volume);
        assert_eq!(kind("head.slc"), FileKind::Volume);
        assert_eq!(kind("photo.JPEG"), FileKind::Image);
        assert_eq!(kind("bunny.ply"), FileKind::Poly(PolyFormat::Ply));
        assert_eq!(kind("notes"), FileKind::Poly(PolyFormat::Generic));
    }

    #[test]
    fn test_substring_not_extension() {
        // ".vtk" wins over ".ply" because it is checked first
        assert_eq!(
            PolyFormat::from_path(Path::new("a.ply.vtk")),
            PolyFormat::VtkLegacy
        );
        // ".g" matches anywhere in the name, e.g. ".gz"
        assert_eq!(PolyFormat::from_path(Path::new("x.gz")), PolyFormat::Byu);
        assert_eq!(PolyFormat::from_path(Path::new("grid.vts")), PolyFormat::VtkStructuredGrid);
        assert_eq!(PolyFormat::from_path(Path::new("cells.vtu")), PolyFormat::VtkUnstructuredGrid);
        assert_eq!(PolyFormat::from_path(Path::new("pts.xyz")), PolyFormat::Particles);
    }

    #[test]
    fn test_directory_names_ignored() {
        assert_eq!(
            PolyFormat::from_path(Path::new("/data/run.g/bunny.stl")),
            PolyFormat::Stl
        );
    }

    #[test]
    fn test_write_formats() {
        assert_eq!(WriteFormat::from_path(Path::new("out.STL")), Some(WriteFormat::Stl));
        assert_eq!(WriteFormat::from_path(Path::new("out.g")), Some(WriteFormat::Byu));
        assert_eq!(WriteFormat::from_path(Path::new("out.vtp")), Some(WriteFormat::VtkPolyData));
        assert_eq!(WriteFormat::from_path(Path::new("out.xyz")), None);
    }
}
