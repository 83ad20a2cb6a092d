//! Screenshots and video capture from a frame source
//!
//! Frames are written as numbered PNG files into a scratch directory and
//! assembled by `ffmpeg` when the video is closed.

use plotio_core::{Error, ImageData, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Anything that can render an RGBA frame, typically a render window
pub trait FrameSource {
    fn capture_frame(&mut self) -> Result<ImageData>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Result<ImageData>,
{
    fn capture_frame(&mut self) -> Result<ImageData> {
        self()
    }
}

/// Capture one frame and save it as PNG
pub fn screenshot<S, P>(source: &mut S, path: P) -> Result<()>
where
    S: FrameSource + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let frame = source.capture_frame()?;
    let (width, height) = (frame.width, frame.height);
    let image = image::RgbaImage::from_raw(width, height, frame.pixels)
        .ok_or_else(|| Error::InvalidData(format!("Frame is not {}x{} RGBA", width, height)))?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::Codec(format!("{}: {}", path.display(), e)))?;
    debug!("Screenshot {}x{} saved to {}", width, height, path.display());
    Ok(())
}

/// Settings for [`Video`]
#[derive(Debug, Clone, PartialEq)]
pub struct VideoOptions {
    pub fps: f32,
    /// Target length in seconds; when set the frame rate is recomputed on close
    pub duration: Option<f32>,
    /// Scratch directory for the numbered frames
    pub frame_dir: PathBuf,
    /// Encoder executable
    pub encoder: String,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            fps: 12.0,
            duration: None,
            frame_dir: std::env::temp_dir().join("vpvid"),
            encoder: "ffmpeg".to_string(),
        }
    }
}

impl VideoOptions {
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_frame_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.frame_dir = dir.into();
        self
    }

    pub fn with_encoder<S: Into<String>>(mut self, encoder: S) -> Self {
        self.encoder = encoder.into();
        self
    }
}

/// A video recorded frame by frame from a [`FrameSource`]
pub struct Video<S: FrameSource> {
    source: S,
    name: PathBuf,
    options: VideoOptions,
    frames: Vec<PathBuf>,
}

impl<S: FrameSource> Video<S> {
    /// Prepare the frame directory, removing PNG files left by earlier runs
    pub fn new<P: Into<PathBuf>>(source: S, name: P, options: VideoOptions) -> Result<Self> {
        let name = name.into();
        fs::create_dir_all(&options.frame_dir)?;
        for entry in fs::read_dir(&options.frame_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                fs::remove_file(&path)?;
            }
        }
        info!("Video {} is open...", name.display());
        Ok(Self {
            source,
            name,
            options,
            frames: Vec::new(),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[PathBuf] {
        &self.frames
    }

    fn next_frame_path(&self) -> PathBuf {
        self.options.frame_dir.join(format!("{}.png", self.frames.len()))
    }

    /// Capture the current frame
    pub fn add_frame(&mut self) -> Result<()> {
        let path = self.next_frame_path();
        screenshot(&mut self.source, &path)?;
        self.frames.push(path);
        Ok(())
    }

    /// Hold the last frame for `seconds` by repeating it `fps * seconds` times
    pub fn pause(&mut self, seconds: f32) -> Result<()> {
        let last = self
            .frames
            .last()
            .cloned()
            .ok_or_else(|| Error::Video("cannot pause before the first frame".to_string()))?;
        let repeats = (self.options.fps * seconds).max(0.0) as usize;
        for _ in 0..repeats {
            let path = self.next_frame_path();
            fs::copy(&last, &path)?;
            self.frames.push(path);
        }
        Ok(())
    }

    /// Frame rate passed to the encoder
    pub fn output_fps(&self) -> f32 {
        match self.options.duration {
            Some(duration) if duration > 0.0 => {
                let fps = self.frames.len() as f32 / duration;
                info!("Recalculated video FPS to {:.3}", fps);
                fps
            }
            _ => self.options.fps.trunc(),
        }
    }

    /// Output file: the given name with an `.mp4` extension
    pub fn output_path(&self) -> PathBuf {
        self.name.with_extension("mp4")
    }

    /// Encode the frames and return the path of the video
    pub fn close(self) -> Result<PathBuf> {
        let output = self.output_path();
        let fps = self.output_fps();
        let pattern = self.options.frame_dir.join("%01d.png");

        let status = Command::new(&self.options.encoder)
            .args(["-loglevel", "panic", "-y", "-r"])
            .arg(fps.to_string())
            .arg("-i")
            .arg(&pattern)
            .arg(&output)
            .status()
            .map_err(|e| Error::Video(format!("failed to run {}: {}", self.options.encoder, e)))?;
        if !status.success() {
            warn!("{} returned {}", self.options.encoder, status);
            return Err(Error::Video(format!(
                "{} returned {}",
                self.options.encoder, status
            )));
        }
        info!("Video saved as {}", output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame() -> Result<ImageData> {
        ImageData::new(2, 2, [10u8, 20, 30, 255].repeat(4))
    }

    #[test]
    fn test_screenshot_from_closure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let mut source = solid_frame;
        screenshot(&mut source, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_frames_and_pause() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stale.png"), b"old").unwrap();
        let options = VideoOptions::default()
            .with_frame_dir(dir.path())
            .with_fps(4.0);

        let mut video = Video::new(solid_frame, "movie.avi", options).unwrap();
        assert!(!dir.path().join("stale.png").exists());

        assert!(video.pause(1.0).is_err());
        video.add_frame().unwrap();
        video.pause(0.5).unwrap();
        assert_eq!(video.frame_count(), 3);
        assert!(dir.path().join("2.png").exists());
        assert_eq!(video.output_path(), PathBuf::from("movie.mp4"));
        assert_eq!(video.output_fps(), 4.0);
    }

    #[test]
    fn test_duration_sets_fps_and_encoder_failure() {
        let dir = tempfile::tempdir().unwrap();
        let options = VideoOptions::default()
            .with_frame_dir(dir.path())
            .with_duration(2.0)
            .with_encoder("plotio-no-such-encoder");
        let mut video = Video::new(solid_frame, dir.path().join("clip.avi"), options).unwrap();
        for _ in 0..5 {
            video.add_frame().unwrap();
        }
        assert_eq!(video.output_fps(), 2.5);
        assert!(matches!(video.close(), Err(Error::Video(_))));
    }
}
