//! PNG and JPEG pictures

use crate::format::{is_image_name, lower_name};
use plotio_core::{Error, ImageData, Result};
use std::path::Path;
use tracing::debug;

/// Decode a `.png`, `.jpg` or `.jpeg` file into RGBA pixels
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<ImageData> {
    let path = path.as_ref();
    if !is_image_name(&lower_name(path)) {
        return Err(Error::UnsupportedFormat(format!(
            "File must end with .png or .jpg: {}",
            path.display()
        )));
    }
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let rgba = image::open(path)
        .map_err(|e| Error::Codec(format!("{}: {}", path.display(), e)))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("Decoded {}x{} image {}", width, height, path.display());
    ImageData::new(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.png");
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let data = read_image(&path).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        let last = &data.pixels[data.pixels.len() - 4..];
        assert_eq!(last, &[10, 20, 30, 255]);
    }

    #[test]
    fn test_rejects_other_names() {
        assert!(matches!(
            read_image("picture.bmp"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            read_image("/nonexistent/picture.png"),
            Err(Error::FileNotFound(_))
        ));
    }
}
