//! Voxel scene authoring.
//!
//! Builds one textured cube per voxel. Every face of a cube samples the
//! voxel's atlas tile, so the whole scene shares a single material.

pub mod geometry;

pub use geometry::{Mesh, Vertex};

use crate::atlas::AtlasImage;
use crate::error::{AtlasError, Result};
use crate::pipeline::{atlas_file_name, file_stem, AtlasConfig, VoxelAtlas};
use crate::types::BoundingBox;

/// Vertices emitted per voxel cube.
pub const CUBE_VERTICES: usize = 24;
/// Triangles emitted per voxel cube.
pub const CUBE_TRIANGLES: usize = 12;

/// Cube geometry for every voxel plus the atlas they sample.
#[derive(Debug, Clone)]
pub struct VoxelScene {
    /// Group name; also the stem of exported file and material names.
    pub name: String,
    /// All cubes, voxel `i` owning vertices `[24i, 24i + 24)`.
    pub mesh: Mesh,
    pub voxel_count: usize,
    pub bounds: BoundingBox,
    pub atlas: AtlasImage,
    /// Atlas file name referenced by exported materials.
    pub atlas_file_name: String,
}

impl VoxelScene {
    /// Build cubes of edge `config.voxel_size` at every voxel position.
    ///
    /// With `config.uv_inset == 0` every vertex of a cube gets the tile-center
    /// UV. A positive inset spreads each face over the tile shrunk by that
    /// fraction instead.
    pub fn from_atlas(atlas: &VoxelAtlas, config: &AtlasConfig) -> Result<Self> {
        config.validate()?;
        let mapper = atlas.uv_mapper();
        let size = config.voxel_size;
        let count = atlas.voxel_count();
        let mut mesh = Mesh::with_capacity(count * CUBE_VERTICES, count * CUBE_TRIANGLES * 3);

        for (i, voxel) in atlas.voxels.iter().enumerate() {
            let index = voxel.palette_index.ok_or_else(|| {
                AtlasError::Export(format!("voxel {} has no palette index", i))
            })?;
            let color = atlas
                .palette
                .get(index)
                .ok_or(AtlasError::ContractViolation {
                    index,
                    tile_count: atlas.palette.len(),
                })?
                .to_unit();
            let color = [color[0], color[1], color[2], 1.0];
            let uvs = if config.uv_inset > 0.0 {
                let region = mapper.tile_region(index, config.uv_inset)?;
                [
                    region.transform_uv(0.0, 0.0),
                    region.transform_uv(1.0, 0.0),
                    region.transform_uv(1.0, 1.0),
                    region.transform_uv(0.0, 1.0),
                ]
            } else {
                [mapper.tile_center(index)?; 4]
            };

            mesh.add_cube(voxel.position, size, uvs, color);
        }

        let half = size * 0.5;
        let bounds = BoundingBox::from_points(atlas.voxels.iter().map(|v| v.position))
            .map(|b| {
                BoundingBox::new(
                    [b.min[0] - half, b.min[1] - half, b.min[2] - half],
                    [b.max[0] + half, b.max[1] + half, b.max[2] + half],
                )
            })
            .unwrap_or_else(|| BoundingBox::new([0.0; 3], [0.0; 3]));

        log::debug!(
            "built {} voxel cubes ({} vertices) for '{}'",
            count,
            mesh.vertex_count(),
            atlas.name
        );

        Ok(Self {
            name: file_stem(&atlas.name),
            mesh,
            voxel_count: count,
            bounds,
            atlas: atlas.image.clone(),
            atlas_file_name: atlas_file_name(&atlas.name, atlas.threshold),
        })
    }

    /// Name of the group holding voxel `i`.
    pub fn voxel_name(&self, i: usize) -> String {
        format!("{}_voxel_{}", self.name, i)
    }

    /// Name of the shared atlas material.
    pub fn material_name(&self) -> String {
        format!("{}_tex", self.name)
    }
}
