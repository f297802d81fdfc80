//! Flat attribute arrays for custom renderers.

use crate::scene::VoxelScene;

/// A scene as tightly packed arrays, ready to upload as vertex buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMeshData {
    /// `[x, y, z]` per vertex.
    pub positions: Vec<f32>,
    /// `[x, y, z]` per vertex.
    pub normals: Vec<f32>,
    /// `[u, v]` per vertex, v = 1 at the top of the atlas.
    pub uvs: Vec<f32>,
    /// `[r, g, b, a]` per vertex.
    pub colors: Vec<f32>,
    pub indices: Vec<u32>,
    /// Atlas pixels, RGB, rows top to bottom.
    pub texture_rgb: Vec<u8>,
    pub texture_width: u32,
    pub texture_height: u32,
}

/// Export a scene as raw arrays.
pub fn export_raw(scene: &VoxelScene) -> RawMeshData {
    let vertices = &scene.mesh.vertices;
    let n = vertices.len();
    let mut raw = RawMeshData {
        positions: Vec::with_capacity(n * 3),
        normals: Vec::with_capacity(n * 3),
        uvs: Vec::with_capacity(n * 2),
        colors: Vec::with_capacity(n * 4),
        indices: scene.mesh.indices.clone(),
        texture_rgb: scene.atlas.pixels.clone(),
        texture_width: scene.atlas.width,
        texture_height: scene.atlas.height,
    };
    for v in vertices {
        raw.positions.extend_from_slice(&v.position);
        raw.normals.extend_from_slice(&v.normal);
        raw.uvs.extend_from_slice(&v.uv);
        raw.colors.extend_from_slice(&v.color);
    }
    raw
}

impl RawMeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{AtlasConfig, AtlasPipeline, Session};
    use crate::scene::{CUBE_TRIANGLES, CUBE_VERTICES};
    use crate::types::VoxelSample;

    #[test]
    fn test_export_raw() {
        let config = AtlasConfig::default().with_tile_scale(2);
        let atlas = AtlasPipeline::new(config.clone())
            .unwrap()
            .run(&Session::new("raw"), &[VoxelSample::new([0.0; 3], [0.5, 0.5, 0.5])])
            .unwrap()
            .completed()
            .unwrap();
        let scene = VoxelScene::from_atlas(&atlas, &config).unwrap();

        let raw = export_raw(&scene);

        assert_eq!(raw.vertex_count(), CUBE_VERTICES);
        assert_eq!(raw.triangle_count(), CUBE_TRIANGLES);
        assert_eq!(raw.uvs.len(), CUBE_VERTICES * 2);
        assert_eq!(&raw.uvs[0..2], &[0.5, 0.5]);
        assert_eq!((raw.texture_width, raw.texture_height), (2, 2));
        // 0.5 * 255 = 127.5 rounds half to even
        assert_eq!(raw.texture_rgb, vec![128; 12]);
    }
}
