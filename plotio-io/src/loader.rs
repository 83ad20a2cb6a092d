//! Turning files into actors
//!
//! [`load_file`] picks a reader from the file name, builds the geometry and
//! wraps it in an [`Actor`] styled by [`LoadOptions`]. [`load_poly`] is the
//! lower level entry point for the surface formats and returns the cleaned
//! mesh itself.

use crate::dolfin::read_dolfin_xml;
use crate::format::{FileKind, PolyFormat};
use crate::gmsh::read_gmsh;
use crate::neutral::read_neutral;
use crate::pcd::read_pcd;
use crate::picture::read_image;
use crate::volume::{read_volume, volume_to_surface};
use crate::{
    byu::ByuReader, obj::ObjReader, particle::ParticleReader, ply::PlyReader, stl::StlReader,
    vtk_legacy::VtkLegacyReader, vtk_xml::VtkXmlReader, MeshReader,
};
use plotio_algorithms::{clean_mesh, CleanOptions};
use plotio_core::{Actor, Color, DisplayProperties, Error, Geometry, Result, TriangleMesh};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Point size of point-cloud style actors
const POINT_SIZE: f32 = 4.0;

/// Legend attached to a loaded actor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Legend {
    #[default]
    None,
    /// The file name without its directory
    FileName,
    Text(String),
}

impl Legend {
    fn resolve(&self, path: &Path) -> Option<String> {
        match self {
            Legend::None => None,
            Legend::FileName => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            Legend::Text(text) => Some(text.clone()),
        }
    }
}

/// Display and processing settings applied while loading
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub color: Color,
    pub alpha: f32,
    pub wireframe: bool,
    pub backface_color: Option<Color>,
    /// Show mesh edges; for tetrahedral meshes, add the cells or their wireframe
    pub edges: bool,
    pub legend: Legend,
    pub texture: Option<String>,
    /// Gaussian smoothing of volumes, standard deviation in voxels
    pub smoothing: Option<f32>,
    /// Iso level for volumes, automatic when unset
    pub threshold: Option<f32>,
    /// Keep only the largest connected region of volume surfaces
    pub connectivity: bool,
    /// Per-axis scaling of volume surfaces
    pub scaling: Option<[f32; 3]>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            color: Color::default(),
            alpha: 1.0,
            wireframe: false,
            backface_color: None,
            edges: false,
            legend: Legend::None,
            texture: None,
            smoothing: None,
            threshold: None,
            connectivity: false,
            scaling: None,
        }
    }
}

impl LoadOptions {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_backface_color(mut self, color: Color) -> Self {
        self.backface_color = Some(color);
        self
    }

    pub fn with_edges(mut self, edges: bool) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_legend(mut self, legend: Legend) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_texture<S: Into<String>>(mut self, texture: S) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn with_smoothing(mut self, sigma: f32) -> Self {
        self.smoothing = Some(sigma);
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_connectivity(mut self, connectivity: bool) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_scaling(mut self, scaling: [f32; 3]) -> Self {
        self.scaling = Some(scaling);
        self
    }

    /// Plain color and opacity
    fn base_properties(&self) -> DisplayProperties {
        DisplayProperties {
            color: self.color,
            alpha: self.alpha,
            ..Default::default()
        }
    }

    /// Every surface setting: wireframe, back face, edges and texture
    fn surface_properties(&self) -> DisplayProperties {
        DisplayProperties {
            wireframe: self.wireframe,
            backface_color: self.backface_color,
            show_edges: self.edges,
            texture: self.texture.clone(),
            ..self.base_properties()
        }
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound(path.to_path_buf()))
    }
}

/// Load any supported file into an actor, choosing the reader from the file name
pub fn load_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Actor> {
    let path = path.as_ref();
    ensure_exists(path)?;
    let legend = options.legend.resolve(path);

    let actor = match FileKind::from_path(path) {
        FileKind::DolfinXml => load_dolfin(path, options)?,
        FileKind::Neutral => load_neutral(path, options)?,
        FileKind::Gmsh => load_gmsh(path, options)?,
        FileKind::Pcd => {
            let points = read_pcd(path)?;
            Actor::points(points, POINT_SIZE).with_properties(DisplayProperties {
                point_size: POINT_SIZE,
                ..options.base_properties()
            })
        }
        FileKind::Volume => {
            info!("Reading volume {}", path.display());
            let grid = read_volume(path)?;
            let surface = volume_to_surface(&grid, options)?;
            Actor::surface(surface).with_properties(options.surface_properties())
        }
        FileKind::Image => {
            let image = read_image(path)?;
            Actor::new(Geometry::Image(image)).with_properties(DisplayProperties {
                alpha: options.alpha,
                ..Default::default()
            })
        }
        FileKind::Poly(format) => {
            let mesh = load_poly(path)?;
            let mut properties = options.surface_properties();
            if format == PolyFormat::Particles {
                properties.point_size = POINT_SIZE;
            }
            Actor::surface(mesh).with_properties(properties)
        }
    };

    debug!("Loaded {} ({} points)", path.display(), actor.point_count());
    Ok(actor.with_legend(legend))
}

/// Load every file of a directory, in file name order.
///
/// Entries that are not files, or that fail to load, are skipped with a
/// warning.
pub fn load_dir<P: AsRef<Path>>(dir: P, options: &LoadOptions) -> Result<Vec<Actor>> {
    let dir = dir.as_ref();
    ensure_exists(dir)?;

    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let mut actors = Vec::with_capacity(entries.len());
    for path in entries.iter().filter(|p| p.is_file()) {
        match load_file(path, options) {
            Ok(actor) => actors.push(actor),
            Err(e) => warn!("Unable to load {}: {}", path.display(), e),
        }
    }
    info!("Loaded {} files from {}", actors.len(), dir.display());
    Ok(actors)
}

/// Read a surface file into a cleaned mesh.
///
/// Structured grids come back as their outer surface and unstructured grids
/// as their boundary. Names matching no known format are tried as legacy VTK.
pub fn load_poly<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let mesh = match PolyFormat::from_path(path) {
        PolyFormat::VtkLegacy | PolyFormat::Generic => VtkLegacyReader::read_mesh(path)?,
        PolyFormat::Ply => PlyReader::read_mesh(path)?,
        PolyFormat::Obj => ObjReader::read_mesh(path)?,
        PolyFormat::Stl => StlReader::read_mesh(path)?,
        PolyFormat::Byu => ByuReader::read_mesh(path)?,
        PolyFormat::VtkPolyData
        | PolyFormat::VtkStructuredGrid
        | PolyFormat::VtkUnstructuredGrid => VtkXmlReader::read_mesh(path)?,
        PolyFormat::Particles => ParticleReader::read_mesh(path)?,
    };
    Ok(clean_mesh(&mesh, &CleanOptions::default()))
}

fn load_dolfin(path: &Path, options: &LoadOptions) -> Result<Actor> {
    let mesh = read_dolfin_xml(path)?;
    let points = Actor::points(mesh.vertices.clone(), POINT_SIZE).with_properties(DisplayProperties {
        point_size: POINT_SIZE,
        ..options.base_properties()
    });
    if !options.edges {
        return Ok(points);
    }

    let cells = Actor::new(Geometry::Tetrahedra(mesh)).with_properties(DisplayProperties {
        alpha: options.alpha / 2.0,
        wireframe: options.wireframe,
        flat_shading: true,
        ..options.base_properties()
    });
    Ok(Actor::assembly(vec![points, cells]))
}

fn load_neutral(path: &Path, options: &LoadOptions) -> Result<Actor> {
    let mesh = read_neutral(path)?;
    let points = Actor::points(mesh.vertices.clone(), POINT_SIZE).with_properties(DisplayProperties {
        point_size: POINT_SIZE,
        ..options.base_properties()
    });
    if !options.edges {
        return Ok(points);
    }

    let lines = Actor::new(Geometry::Lines(mesh.edges())).with_properties(DisplayProperties {
        alpha: options.alpha / 5.0,
        ..options.base_properties()
    });
    Ok(Actor::assembly(vec![points, lines]))
}

fn load_gmsh(path: &Path, options: &LoadOptions) -> Result<Actor> {
    let mesh = read_gmsh(path)?;
    let mesh = clean_mesh(&mesh, &CleanOptions::default().keep_isolated_points());
    Ok(Actor::surface(mesh).with_properties(DisplayProperties {
        backface_color: options.backface_color,
        ..options.base_properties()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_TETS: &str = "5\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n1 1 1\n2\n1 1 2 3 4\n2 2 3 4 5\n";

    fn write_temp(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_file() {
        let err = load_file("/definitely/not/here.ply", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_neutral_edges_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(dir.path(), "mesh.neutral", TWO_TETS);

        let plain = load_file(&path, &LoadOptions::default()).unwrap();
        assert!(!plain.is_assembly());
        assert_eq!(plain.properties.point_size, POINT_SIZE);

        let options = LoadOptions::default()
            .with_edges(true)
            .with_alpha(0.5)
            .with_legend(Legend::FileName);
        let actor = load_file(&path, &options).unwrap();
        assert_eq!(actor.legend.as_deref(), Some("mesh.neutral"));
        match &actor.geometry {
            Geometry::Assembly(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1].properties.alpha, 0.1);
                match &parts[1].geometry {
                    // 6 edges per tet, 1 shared face contributes 3 shared edges
                    Geometry::Lines(lines) => assert_eq!(lines.line_count(), 9),
                    other => panic!("expected lines, got {:?}", other),
                }
            }
            other => panic!("expected assembly, got {:?}", other),
        }
    }

    #[test]
    fn test_particles_get_point_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(dir.path(), "cloud.xyz", "0 0 0\n1 1 1\n1 1 1\n");
        let actor = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(actor.properties.point_size, POINT_SIZE);
        // duplicate points are merged by cleaning
        assert_eq!(actor.point_count(), 2);
    }

    #[test]
    fn test_gmsh_keeps_isolated_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let text = "$Nodes\n4\n1 0 0 0\n2 1 0 0\n3 0 1 0\n4 9 9 9\n$EndNodes\n\
$Elements\n1\n1 2 2 0 1 1 2 3\n$EndElements\n";
        let path = write_temp(dir.path(), "tri.gmsh", text);
        let actor = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(actor.point_count(), 4);
    }
}
