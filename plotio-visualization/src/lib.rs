//! Terminal and capture utilities for plotio
//!
//! This crate provides:
//! - [`printc`]: colored printing to the terminal
//! - [`ProgressBar`]: a one-line progress bar with ETA
//! - [`screenshot`] and [`Video`]: PNG frames and `ffmpeg` videos captured
//!   from any [`FrameSource`]

pub mod printc;
pub mod progress;
pub mod video;

pub use printc::{printc, printc_to, terminal_has_colors, PrintOptions, TermColor};
pub use progress::ProgressBar;
pub use video::{screenshot, FrameSource, Video, VideoOptions};
