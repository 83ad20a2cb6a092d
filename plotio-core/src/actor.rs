//! Renderable scene objects
//!
//! An [`Actor`] pairs a piece of geometry with the display properties a
//! renderer needs (color, opacity, wireframe, point size, ...). Loaders
//! produce actors; writers consume their world-space geometry. Assemblies
//! group several actors under one legend.

use crate::color::Color;
use crate::mesh::{LineSet, TetraMesh, TriangleMesh};
use crate::point::Point3f;
use crate::traits::Drawable;
use crate::transform::Transform3D;
use crate::volume::ImageData;
use serde::{Deserialize, Serialize};

/// How the surface of an actor is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayProperties {
    pub color: Color,
    pub alpha: f32,
    pub wireframe: bool,
    pub backface_color: Option<Color>,
    pub show_edges: bool,
    pub texture: Option<String>,
    pub point_size: f32,
    pub flat_shading: bool,
}

impl Default for DisplayProperties {
    fn default() -> Self {
        Self {
            color: Color::default(),
            alpha: 1.0,
            wireframe: false,
            backface_color: None,
            show_edges: false,
            texture: None,
            point_size: 1.0,
            flat_shading: false,
        }
    }
}

/// The geometry carried by an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Triangle surface, or a point set when it has no faces
    Surface(TriangleMesh),
    Lines(LineSet),
    Tetrahedra(TetraMesh),
    Image(ImageData),
    Assembly(Vec<Actor>),
}

/// A renderable object: geometry, display properties, placement and legend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub geometry: Geometry,
    pub properties: DisplayProperties,
    pub transform: Transform3D,
    pub legend: Option<String>,
}

impl Actor {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: DisplayProperties::default(),
            transform: Transform3D::identity(),
            legend: None,
        }
    }

    pub fn surface(mesh: TriangleMesh) -> Self {
        Self::new(Geometry::Surface(mesh))
    }

    /// A point set drawn as dots of the given size
    pub fn points(vertices: Vec<Point3f>, point_size: f32) -> Self {
        let mut actor = Self::surface(TriangleMesh::from_points(vertices));
        actor.properties.point_size = point_size;
        actor
    }

    pub fn assembly(parts: Vec<Actor>) -> Self {
        Self::new(Geometry::Assembly(parts))
    }

    pub fn with_properties(mut self, properties: DisplayProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_legend(mut self, legend: Option<String>) -> Self {
        self.legend = legend;
        self
    }

    pub fn is_assembly(&self) -> bool {
        matches!(self.geometry, Geometry::Assembly(_))
    }

    /// Number of points across all nested geometry
    pub fn point_count(&self) -> usize {
        match &self.geometry {
            Geometry::Surface(mesh) => mesh.vertex_count(),
            Geometry::Lines(lines) => lines.vertices.len(),
            Geometry::Tetrahedra(tets) => tets.vertex_count(),
            Geometry::Image(image) => image.width as usize * image.height as usize,
            Geometry::Assembly(parts) => parts.iter().map(Actor::point_count).sum(),
        }
    }

    /// World-space surface of the actor.
    ///
    /// Tetrahedra contribute their boundary, lines their end points and
    /// assemblies the concatenation of their parts. Images have no surface.
    pub fn world_surface(&self) -> Option<TriangleMesh> {
        let mut mesh = match &self.geometry {
            Geometry::Surface(mesh) => mesh.clone(),
            Geometry::Lines(lines) => TriangleMesh::from_points(lines.vertices.clone()),
            Geometry::Tetrahedra(tets) => tets.to_surface(),
            Geometry::Image(_) => return None,
            Geometry::Assembly(parts) => {
                let mut merged = TriangleMesh::new();
                for part in parts.iter().filter_map(Actor::world_surface) {
                    append_mesh(&mut merged, part);
                }
                merged
            }
        };
        if !self.transform.is_identity(f32::EPSILON) {
            mesh.transform(&self.transform);
        }
        Some(mesh)
    }
}

/// Append `other` to `target`, dropping per-vertex attributes that only one side has
fn append_mesh(target: &mut TriangleMesh, other: TriangleMesh) {
    let offset = target.vertices.len();
    let target_was_empty = target.vertices.is_empty();

    target.normals = match (target.normals.take(), other.normals) {
        (Some(mut a), Some(b)) => {
            a.extend(b);
            Some(a)
        }
        (None, Some(b)) if target_was_empty => Some(b),
        _ => None,
    };
    target.scalars = match (target.scalars.take(), other.scalars) {
        (Some(mut a), Some(b)) => {
            a.extend(b);
            Some(a)
        }
        (None, Some(b)) if target_was_empty => Some(b),
        _ => None,
    };
    target.colors = None;

    target.vertices.extend(other.vertices);
    target
        .faces
        .extend(other.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
}

impl Drawable for Actor {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        match self.world_surface() {
            Some(mesh) => mesh.bounding_box(),
            None => (Point3f::origin(), Point3f::origin()),
        }
    }
}
