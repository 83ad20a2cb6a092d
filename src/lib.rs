//! # plotio
//!
//! Load, wrap and write 3D meshes, volumes, point clouds and images.
//!
//! This is the umbrella crate that provides convenient access to all plotio
//! functionality. Use it to get everything in one place, or depend on the
//! individual crates for finer control over dependencies.
//!
//! ## Features
//!
//! - **Core**: geometry types, transforms, colors and the `Actor` scene object
//! - **Algorithms**: mesh cleaning, connectivity, smoothing and marching cubes
//! - **I/O**: readers and writers for a dozen mesh, volume and image formats
//! - **Visualization**: colored printing, progress bars, screenshots and video
//!
//! ## Quick Start
//!
//! ```no_run
//! use plotio::prelude::*;
//!
//! let actor = load_file("bunny.ply", &LoadOptions::default().with_alpha(0.5))?;
//! write(&actor, "bunny.vtk")?;
//! # Ok::<(), plotio::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: enables algorithms, io and visualization
//! - `algorithms`: mesh and volume filters
//! - `io`: file format support
//! - `visualization`: terminal output and frame capture
//! - `all`: enables all features

// Re-export core functionality
pub use plotio_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use plotio_algorithms as algorithms;

#[cfg(feature = "io")]
pub use plotio_io as io;

#[cfg(feature = "visualization")]
pub use plotio_visualization as visualization;

/// Convenient imports for common use cases
pub mod prelude {
    pub use plotio_core::{
        Actor, Color, DisplayProperties, Error, Geometry, ImageData, LineSet, Point3f, Result,
        TetraMesh, Transform3D, TriangleMesh, VolumeGrid,
    };

    #[cfg(feature = "algorithms")]
    pub use plotio_algorithms::{
        clean_mesh, gaussian_smooth, largest_region, marching_cubes, CleanOptions,
    };

    #[cfg(feature = "io")]
    pub use plotio_io::{load_dir, load_file, load_poly, write, write_mesh, Legend, LoadOptions};

    #[cfg(feature = "visualization")]
    pub use plotio_visualization::{
        printc, screenshot, FrameSource, PrintOptions, ProgressBar, TermColor, Video, VideoOptions,
    };
}
