//! Core data structures and traits for plotio
//!
//! This crate provides the geometry types produced by the plotio loaders
//! (points, triangle and tetrahedral meshes, scalar volumes, pictures), the
//! [`Actor`] scene object that wraps them for display, and the shared
//! error type.

pub mod actor;
pub mod color;
pub mod error;
pub mod mesh;
pub mod point;
pub mod traits;
pub mod transform;
pub mod volume;

pub use actor::*;
pub use color::*;
pub use error::*;
pub use mesh::*;
pub use point::*;
pub use traits::*;
pub use transform::*;
pub use volume::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
