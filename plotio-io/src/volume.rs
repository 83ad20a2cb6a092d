//! Scalar volumes: TIFF stacks, SLC files and iso-surfacing
//!
//! A volume is turned into a surface by optional Gaussian smoothing,
//! marching cubes at a threshold, cleaning, optional largest-region
//! extraction and optional per-axis scaling.

use crate::format::lower_name;
use crate::loader::LoadOptions;
use nalgebra::Vector3;
use plotio_algorithms::{
    clean_mesh, gaussian_smooth, largest_region, CleanOptions, MarchingCubes, MarchingCubesConfig,
    DEFAULT_RADIUS_FACTOR,
};
use plotio_core::{Error, Result, Transform3D, TriangleMesh, VolumeGrid};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::{debug, info};

/// Magic number opening every SLC file
pub const SLC_MAGIC: u32 = 11111;

/// Byte cursor over the mixed ASCII/binary layout of an SLC file
struct SlcCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SlcCursor<'a> {
    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn token(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.data.len() && !self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(bad_slc("unexpected end of header"));
        }
        std::str::from_utf8(&self.data[start..self.pos]).map_err(|_| bad_slc("non-ASCII header"))
    }

    fn number<T: std::str::FromStr>(&mut self) -> Result<T> {
        let token = self.token()?;
        token
            .parse()
            .map_err(|_| bad_slc(&format!("invalid header value '{}'", token)))
    }

    /// Skip past the next `X` separator
    fn skip_past_x(&mut self) -> Result<()> {
        let offset = self.data[self.pos..]
            .iter()
            .position(|&b| b == b'X')
            .ok_or_else(|| bad_slc("missing 'X' separator"))?;
        self.pos += offset + 1;
        Ok(())
    }

    fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len());
        let end = end.ok_or_else(|| bad_slc("truncated voxel data"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

fn bad_slc(detail: &str) -> Error {
    Error::InvalidData(format!("Bad SLC file: {}", detail))
}

/// Expand one run-length encoded 8-bit slice.
///
/// Each run starts with a byte whose low 7 bits are the run length (0 ends
/// the slice). With the high bit set the run is that many literal bytes,
/// otherwise the next byte is repeated.
pub fn decode_slc_rle(input: &[u8], expected: usize) -> Result<Vec<u8>> {
    // A two byte run expands to at most 127 voxels
    let mut out = Vec::with_capacity(expected.min(input.len().saturating_mul(64)));
    let mut bytes = input.iter().copied();
    while let Some(code) = bytes.next() {
        let run = (code & 0x7f) as usize;
        if run == 0 {
            break;
        }
        if code & 0x80 != 0 {
            for _ in 0..run {
                out.push(bytes.next().ok_or_else(|| bad_slc("truncated literal run"))?);
            }
        } else {
            let value = bytes.next().ok_or_else(|| bad_slc("truncated repeat run"))?;
            out.extend(std::iter::repeat(value).take(run));
        }
    }
    if out.len() != expected {
        return Err(bad_slc(&format!(
            "slice decoded to {} voxels, expected {}",
            out.len(),
            expected
        )));
    }
    Ok(out)
}

/// Parse the bytes of an SLC volume
pub fn parse_slc(data: &[u8]) -> Result<VolumeGrid> {
    let mut cursor = SlcCursor { data, pos: 0 };
    let magic: u32 = cursor.number().map_err(|_| bad_slc("missing magic number"))?;
    if magic != SLC_MAGIC {
        return Err(bad_slc(&format!("magic number {} is not {}", magic, SLC_MAGIC)));
    }

    let dims: [usize; 3] = [cursor.number()?, cursor.number()?, cursor.number()?];
    let bits: u32 = cursor.number()?;
    if bits != 8 {
        return Err(Error::Unsupported(format!(
            "SLC with {} bits per voxel, only 8 is supported",
            bits
        )));
    }
    let spacing: [f32; 3] = [cursor.number()?, cursor.number()?, cursor.number()?];
    // units, data origin, data modification
    for _ in 0..3 {
        cursor.token()?;
    }
    let compression: u32 = cursor.number()?;

    // Icon: width, height, separator, then three planes of width*height bytes
    let icon_width: usize = cursor.number()?;
    let icon_height: usize = cursor.number()?;
    cursor.skip_past_x()?;
    let icon_size = icon_width
        .checked_mul(icon_height)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| bad_slc("icon size overflows"))?;
    cursor.bytes(icon_size)?;

    let plane = dims[0]
        .checked_mul(dims[1])
        .ok_or_else(|| bad_slc("slice size overflows"))?;
    let total = plane
        .checked_mul(dims[2])
        .ok_or_else(|| bad_slc("volume size overflows"))?;
    let mut values = Vec::with_capacity(total.min(data.len()));
    for z in 0..dims[2] {
        let size: usize = cursor.number()?;
        cursor.skip_whitespace();
        if cursor.bytes(1)? != b"X" {
            return Err(bad_slc(&format!("missing 'X' after slice {} size", z)));
        }
        let slice = match compression {
            0 => cursor.bytes(plane)?.to_vec(),
            1 => decode_slc_rle(cursor.bytes(size)?, plane)?,
            other => {
                return Err(Error::Unsupported(format!(
                    "SLC compression type {}",
                    other
                )))
            }
        };
        values.extend(slice.into_iter().map(f32::from));
    }

    debug!(
        "SLC volume {}x{}x{}, spacing {:?}, compression {}",
        dims[0], dims[1], dims[2], spacing, compression
    );
    Ok(VolumeGrid::from_values(dims, values)?.with_spacing(spacing))
}

/// Read an SLC volume from disk
pub fn read_slc<P: AsRef<Path>>(path: P) -> Result<VolumeGrid> {
    parse_slc(&fs::read(path)?)
}

fn tiff_error(e: tiff::TiffError) -> Error {
    Error::Codec(format!("TIFF: {}", e))
}

/// Samples of one decoded page as floats
fn page_samples(result: DecodingResult) -> Result<Vec<f32>> {
    Ok(match result {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|s| s as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|s| s as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err(Error::Unsupported("TIFF sample format".to_string())),
    })
}

/// Read a TIFF stack, one page per z slice.
///
/// Multi-channel pages are reduced to one scalar per pixel by averaging the
/// channels. All pages must share the first page's size.
pub fn read_tiff_stack<P: AsRef<Path>>(path: P) -> Result<VolumeGrid> {
    let file = BufReader::new(File::open(path)?);
    let mut decoder = Decoder::new(file).map_err(tiff_error)?;
    let (width, height) = decoder.dimensions().map_err(tiff_error)?;
    let (width, height) = (width as usize, height as usize);
    let pixels = width * height;
    if pixels == 0 {
        return Err(Error::InvalidData("TIFF page has no pixels".to_string()));
    }

    let mut values = Vec::new();
    let mut depth = 0;
    loop {
        let (w, h) = decoder.dimensions().map_err(tiff_error)?;
        if (w as usize, h as usize) != (width, height) {
            return Err(Error::InvalidData(format!(
                "TIFF page {} is {}x{}, expected {}x{}",
                depth, w, h, width, height
            )));
        }
        let samples = page_samples(decoder.read_image().map_err(tiff_error)?)?;
        let channels = samples.len() / pixels;
        if channels == 0 || samples.len() % pixels != 0 {
            return Err(Error::InvalidData(format!(
                "TIFF page {} has {} samples for {} pixels",
                depth,
                samples.len(),
                pixels
            )));
        }
        if channels == 1 {
            values.extend(samples);
        } else {
            values.extend(
                samples
                    .chunks_exact(channels)
                    .map(|px| px.iter().sum::<f32>() / channels as f32),
            );
        }
        depth += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(tiff_error)?;
    }

    debug!("TIFF stack {}x{}x{}", width, height, depth);
    VolumeGrid::from_values([width, height, depth], values)
}

/// Read a `.tif`/`.tiff` stack or an `.slc` volume
pub fn read_volume<P: AsRef<Path>>(path: P) -> Result<VolumeGrid> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    info!("Reading volume {}", path.display());
    let name = lower_name(path);
    if name.contains(".tif") {
        read_tiff_stack(path)
    } else if name.contains(".slc") {
        read_slc(path)
    } else {
        Err(Error::UnsupportedFormat(format!(
            "Not a volume file: {}",
            path.display()
        )))
    }
}

/// Iso-surface a volume with the smoothing, threshold, connectivity and
/// scaling settings of `options`.
///
/// Without an explicit threshold the level is `(2 * min + max) / 3` of the
/// (possibly smoothed) scalar range. A smoothing width of zero or less
/// leaves the volume as is.
pub fn volume_to_surface(grid: &VolumeGrid, options: &LoadOptions) -> Result<TriangleMesh> {
    let smoothed;
    let grid = match options.smoothing {
        Some(sigma) if sigma > 0.0 => {
            info!("Gaussian smoothing volume with standard deviation {}", sigma);
            smoothed = gaussian_smooth(grid, sigma, DEFAULT_RADIUS_FACTOR)?;
            &smoothed
        }
        _ => grid,
    };

    let (min, max) = grid.scalar_range();
    let threshold = match options.threshold {
        Some(t) => {
            info!("Isosurfacing volume with iso threshold {:.2}, range ({}, {})", t, min, max);
            t
        }
        None => {
            let t = (2.0 * min + max) / 3.0;
            info!(
                "Isosurfacing volume with automatic iso threshold {:.2}, range ({}, {})",
                t, min, max
            );
            t
        }
    };

    let config = MarchingCubesConfig::default().with_iso_level(threshold);
    let surface = MarchingCubes::new(config).extract_isosurface(grid)?;
    let mut surface = clean_mesh(&surface, &CleanOptions::default());

    if options.connectivity {
        info!("Applying connectivity filter, selecting largest region");
        surface = largest_region(&surface);
    }

    if let Some(scale) = options.scaling {
        info!("Scaling xyz by factors {:?}", scale);
        surface.transform(&Transform3D::scaling(Vector3::new(scale[0], scale[1], scale[2])));
    }

    info!(
        "Volume surface: {} points, {} triangles",
        surface.vertex_count(),
        surface.face_count()
    );
    Ok(surface)
}
