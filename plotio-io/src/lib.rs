//! Readers and writers for meshes, volumes, point clouds and pictures
//!
//! The entry points are [`load_file`], which picks a reader from the file
//! name and returns a styled [`plotio_core::Actor`], [`load_poly`] for the
//! surface formats, and [`write`] for saving an actor's surface. The
//! per-format readers and writers are public as well.
//!
//! | format | read | write |
//! |--------|------|-------|
//! | Dolfin XML (`.xml`, `.xml.gz`) | tetrahedra | yes, from neutral |
//! | neutral, Gmsh, PCD | yes | |
//! | TIFF stack, SLC volume | iso-surfaced | |
//! | PNG, JPEG | yes | |
//! | legacy VTK, PLY, OBJ, STL, BYU, VTP | yes | yes |
//! | VTS, VTU | outer surface | |
//! | particle text (`.txt`, `.xyz`) | yes | |

pub mod byu;
pub mod dolfin;
pub mod format;
pub mod gmsh;
pub mod loader;
pub mod neutral;
pub mod obj;
pub mod particle;
pub mod pcd;
pub mod picture;
pub mod ply;
pub mod stl;
pub mod volume;
pub mod vtk_legacy;
pub mod vtk_xml;
pub mod writer;

mod tokens;
mod xml;

pub use dolfin::{
    parse_dolfin_xml, read_dolfin_xml, write_dolfin_cells, write_dolfin_xml, write_dolfin_xml_file,
};
pub use format::{FileKind, PolyFormat, WriteFormat};
pub use gmsh::{parse_gmsh, read_gmsh};
pub use loader::{load_dir, load_file, load_poly, Legend, LoadOptions};
pub use neutral::{convert_neutral_to_xml, parse_neutral, read_neutral, NeutralMesh};
pub use pcd::{read_pcd, PcdReader};
pub use picture::read_image;
pub use ply::PlyWriteOptions;
pub use volume::{read_volume, volume_to_surface};
pub use writer::{write, write_mesh};

use plotio_core::{Result, TriangleMesh};
use std::path::Path;

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}
