//! Regular scalar volumes and 2D pictures

use crate::error::{Error, Result};
use crate::point::Point3f;
use serde::{Deserialize, Serialize};

/// A scalar field sampled on a regular grid.
///
/// Values are stored x-fastest: `index = x + nx * (y + ny * z)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeGrid {
    pub dimensions: [usize; 3],
    pub spacing: [f32; 3],
    pub origin: Point3f,
    pub values: Vec<f32>,
}

impl VolumeGrid {
    /// Create a zero-filled grid with unit spacing at the origin
    pub fn new(dimensions: [usize; 3]) -> Self {
        Self {
            dimensions,
            spacing: [1.0; 3],
            origin: Point3f::origin(),
            values: vec![0.0; dimensions[0] * dimensions[1] * dimensions[2]],
        }
    }

    /// Wrap existing samples, checking that their count matches the dimensions
    pub fn from_values(dimensions: [usize; 3], values: Vec<f32>) -> Result<Self> {
        let expected = dimensions[0]
            .checked_mul(dimensions[1])
            .and_then(|n| n.checked_mul(dimensions[2]));
        if expected != Some(values.len()) {
            return Err(Error::InvalidData(format!(
                "Volume of dimensions {:?} needs {} samples, got {}",
                dimensions,
                expected.map_or_else(|| "too many".to_string(), |n| n.to_string()),
                values.len()
            )));
        }
        Ok(Self {
            dimensions,
            spacing: [1.0; 3],
            origin: Point3f::origin(),
            values,
        })
    }

    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_origin(mut self, origin: Point3f) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dimensions[0] * (y + self.dimensions[1] * z)
    }

    /// Sample at grid coordinates, `None` outside the grid
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        if x < self.dimensions[0] && y < self.dimensions[1] && z < self.dimensions[2] {
            Some(self.values[self.index(x, y, z)])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, value: f32) -> Result<()> {
        if x < self.dimensions[0] && y < self.dimensions[1] && z < self.dimensions[2] {
            let i = self.index(x, y, z);
            self.values[i] = value;
            Ok(())
        } else {
            Err(Error::InvalidData(format!(
                "Grid coordinates ({}, {}, {}) out of bounds for dimensions {:?}",
                x, y, z, self.dimensions
            )))
        }
    }

    /// World position of a grid node
    pub fn grid_to_world(&self, x: usize, y: usize, z: usize) -> Point3f {
        Point3f::new(
            self.origin.x + x as f32 * self.spacing[0],
            self.origin.y + y as f32 * self.spacing[1],
            self.origin.z + z as f32 * self.spacing[2],
        )
    }

    /// Minimum and maximum sample, `(0, 0)` for an empty grid
    pub fn scalar_range(&self) -> (f32, f32) {
        let mut iter = self.values.iter().copied().filter(|v| v.is_finite());
        match iter.next() {
            Some(first) => iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
            None => (0.0, 0.0),
        }
    }

    pub fn voxel_count(&self) -> usize {
        self.values.len()
    }
}

/// A decoded 2D picture in RGBA8, rows top to bottom
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return Err(Error::InvalidData(format!(
                "RGBA image {}x{} needs {} bytes, got {}",
                width,
                height,
                width as usize * height as usize * 4,
                pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_layout_and_range() {
        let mut grid = VolumeGrid::new([3, 2, 2]);
        grid.set(2, 1, 1, 5.0).unwrap();
        grid.set(0, 0, 0, -1.0).unwrap();
        assert_eq!(grid.values[11], 5.0);
        assert_eq!(grid.get(2, 1, 1), Some(5.0));
        assert_eq!(grid.get(3, 0, 0), None);
        assert_eq!(grid.scalar_range(), (-1.0, 5.0));
        assert!(grid.set(0, 2, 0, 1.0).is_err());
    }

    #[test]
    fn test_from_values_checks_size() {
        assert!(VolumeGrid::from_values([2, 2, 2], vec![0.0; 7]).is_err());
        assert!(VolumeGrid::from_values([usize::MAX, 2, 1], vec![]).is_err());
        let grid = VolumeGrid::from_values([2, 2, 2], vec![1.0; 8])
            .unwrap()
            .with_spacing([0.5, 0.5, 2.0]);
        assert_eq!(grid.grid_to_world(1, 1, 1), Point3f::new(0.5, 0.5, 2.0));
    }
}
