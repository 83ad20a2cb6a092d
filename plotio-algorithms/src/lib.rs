//! # plotio algorithms
//!
//! Geometry filters used by the plotio loaders.
//!
//! This crate provides mesh cleaning (point merging, degenerate and unused
//! element removal), connected region extraction, Gaussian smoothing of
//! scalar volumes and marching-cubes iso-surface extraction.

pub mod clean;
pub mod connectivity;
pub mod marching_cubes;
pub mod smoothing;

// Re-export commonly used items
pub use clean::*;
pub use connectivity::*;
pub use marching_cubes::*;
pub use smoothing::*;
