//! Shared types used throughout the library.

mod color;
mod direction;

pub use color::{chebyshev_distance, Rgb8};
pub use direction::Direction;

use crate::error::{AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A raw voxel sample as produced by voxelization: a cube center and the
/// surface color sampled there, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelSample {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl VoxelSample {
    pub fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// A voxel sample enriched with its palette index once the palette is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    pub position: [f32; 3],
    pub color: [f32; 3],
    /// Index into the palette (and atlas tile). `None` until assigned.
    pub palette_index: Option<usize>,
}

impl From<VoxelSample> for Voxel {
    fn from(sample: VoxelSample) -> Self {
        Self {
            position: sample.position,
            color: sample.color,
            palette_index: None,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Trait for voxel sample providers (the voxelization side of the boundary).
pub trait VoxelSource {
    /// Iterate over samples in voxelization order. The order is significant:
    /// it decides which color founds each palette entry.
    fn iter_samples(&self) -> Box<dyn Iterator<Item = VoxelSample> + '_>;

    /// Number of samples, if cheaply known.
    fn sample_count(&self) -> usize {
        self.iter_samples().count()
    }
}

impl VoxelSource for [VoxelSample] {
    fn iter_samples(&self) -> Box<dyn Iterator<Item = VoxelSample> + '_> {
        Box::new(self.iter().copied())
    }

    fn sample_count(&self) -> usize {
        self.len()
    }
}

impl VoxelSource for Vec<VoxelSample> {
    fn iter_samples(&self) -> Box<dyn Iterator<Item = VoxelSample> + '_> {
        self.as_slice().iter_samples()
    }

    fn sample_count(&self) -> usize {
        self.len()
    }
}

/// A named set of voxel samples, the JSON document exchanged with voxelizers.
///
/// ```json
/// { "name": "teapot", "voxel_size": 0.25,
///   "voxels": [ { "position": [0, 0, 0], "color": [1, 0, 0] } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoxelCloud {
    /// Name of the source object; used in output file names.
    #[serde(default = "default_cloud_name")]
    pub name: String,
    /// Edge length of one voxel cube, if the voxelizer reports it.
    #[serde(default)]
    pub voxel_size: Option<f32>,
    pub voxels: Vec<VoxelSample>,
}

fn default_cloud_name() -> String {
    "voxels".to_string()
}

impl VoxelCloud {
    pub fn new(name: impl Into<String>, voxels: Vec<VoxelSample>) -> Self {
        Self {
            name: name.into(),
            voxel_size: None,
            voxels,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Bounding box of all voxel centers.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.voxels.iter().map(|v| v.position))
    }
}

impl VoxelSource for VoxelCloud {
    fn iter_samples(&self) -> Box<dyn Iterator<Item = VoxelSample> + '_> {
        self.voxels.iter_samples()
    }

    fn sample_count(&self) -> usize {
        self.voxels.len()
    }
}

/// Convert sample colors to 8-bit palette colors, rejecting invalid channels.
pub(crate) fn sample_colors(samples: &[VoxelSample]) -> Result<Vec<Rgb8>> {
    samples
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            Rgb8::try_from_unit(sample.color)
                .map_err(|reason| AtlasError::InvalidSample { index, reason })
        })
        .collect()
}
