//! Separable Gaussian smoothing of scalar volumes

use plotio_core::{Error, Result, VolumeGrid};
use rayon::prelude::*;
use tracing::debug;

/// Kernel radius as a multiple of the standard deviation
pub const DEFAULT_RADIUS_FACTOR: f32 = 1.5;

/// Unnormalized weights for offsets `-radius..=radius`
fn gaussian_kernel(sigma: f32, radius: usize) -> Vec<f32> {
    let two_sigma_sq = 2.0 * sigma * sigma;
    (0..=2 * radius)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect()
}

/// Convolve one axis of the volume.
///
/// Near the borders the kernel is truncated and renormalized over the taps
/// that fall inside the grid.
fn smooth_axis(grid: &VolumeGrid, kernel: &[f32], axis: usize) -> Vec<f32> {
    let [nx, ny, _] = grid.dimensions;
    let len = grid.dimensions[axis];
    let stride = match axis {
        0 => 1,
        1 => nx,
        _ => nx * ny,
    };
    let radius = kernel.len() / 2;
    let values = &grid.values;

    let mut out = vec![0.0f32; values.len()];
    out.par_chunks_mut(nx * ny).enumerate().for_each(|(z, slab)| {
        for y in 0..ny {
            for x in 0..nx {
                let idx = z * nx * ny + y * nx + x;
                let pos = [x, y, z][axis];
                let lo = pos.saturating_sub(radius);
                let hi = (pos + radius).min(len - 1);

                let mut sum = 0.0;
                let mut weight = 0.0;
                for p in lo..=hi {
                    let w = kernel[p + radius - pos];
                    let sample = idx + p * stride - pos * stride;
                    sum += w * values[sample];
                    weight += w;
                }
                slab[y * nx + x] = sum / weight;
            }
        }
    });
    out
}

/// Smooth a volume with a 3D Gaussian of standard deviation `sigma` voxels.
///
/// The kernel extends `sigma * radius_factor` voxels (truncated toward zero)
/// on each side. A radius of zero leaves the values unchanged.
pub fn gaussian_smooth(grid: &VolumeGrid, sigma: f32, radius_factor: f32) -> Result<VolumeGrid> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(Error::Algorithm(format!(
            "Gaussian standard deviation must be positive, got {}",
            sigma
        )));
    }
    if !(radius_factor.is_finite() && radius_factor >= 0.0) {
        return Err(Error::Algorithm(format!(
            "Invalid kernel radius factor {}",
            radius_factor
        )));
    }

    let radius = (sigma * radius_factor) as usize;
    let mut smoothed = grid.clone();
    if radius == 0 || grid.values.is_empty() {
        return Ok(smoothed);
    }

    let kernel = gaussian_kernel(sigma, radius);
    for axis in 0..3 {
        if smoothed.dimensions[axis] > 1 {
            smoothed.values = smooth_axis(&smoothed, &kernel, axis);
        }
    }
    debug!(
        "Gaussian smoothing: sigma {}, radius {} voxels, {} voxels",
        sigma,
        radius,
        smoothed.voxel_count()
    );
    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_volume_unchanged() {
        let grid = VolumeGrid::from_values([4, 5, 6], vec![3.0; 120]).unwrap();
        let smoothed = gaussian_smooth(&grid, 2.0, DEFAULT_RADIUS_FACTOR).unwrap();
        for v in smoothed.values {
            assert_relative_eq!(v, 3.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_spike_spreads_and_keeps_mass() {
        let mut grid = VolumeGrid::new([9, 9, 9]);
        grid.set(4, 4, 4, 1.0).unwrap();
        let smoothed = gaussian_smooth(&grid, 1.0, DEFAULT_RADIUS_FACTOR).unwrap();

        let center = smoothed.get(4, 4, 4).unwrap();
        let neighbor = smoothed.get(5, 4, 4).unwrap();
        assert!(center < 1.0);
        assert!(neighbor > 0.0 && neighbor < center);
        assert_eq!(smoothed.get(7, 4, 4), Some(0.0));

        let total: f32 = smoothed.values.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_small_sigma_is_identity() {
        let mut grid = VolumeGrid::new([3, 3, 3]);
        grid.set(1, 1, 1, 5.0).unwrap();
        let smoothed = gaussian_smooth(&grid, 0.5, DEFAULT_RADIUS_FACTOR).unwrap();
        assert_eq!(smoothed.values, grid.values);
    }

    #[test]
    fn test_rejects_bad_sigma() {
        let grid = VolumeGrid::new([2, 2, 2]);
        assert!(gaussian_smooth(&grid, 0.0, DEFAULT_RADIUS_FACTOR).is_err());
        assert!(gaussian_smooth(&grid, f32::NAN, DEFAULT_RADIUS_FACTOR).is_err());
    }
}
