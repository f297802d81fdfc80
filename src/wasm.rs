//! WASM bindings for voxel-atlas.
//!
//! This module provides JavaScript-friendly APIs for use in the browser.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// Atlas configuration options.
#[wasm_bindgen]
pub struct AtlasOptions {
    uv_inset: f32,
    voxel_size: f32,
    with_glb: bool,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        let config = crate::AtlasConfig::default();
        AtlasOptions {
            uv_inset: config.uv_inset,
            voxel_size: config.voxel_size,
            with_glb: false,
        }
    }
}

#[wasm_bindgen]
impl AtlasOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> AtlasOptions {
        AtlasOptions::default()
    }

    #[wasm_bindgen(setter)]
    pub fn set_uv_inset(&mut self, value: f32) {
        self.uv_inset = value;
    }

    #[wasm_bindgen(setter)]
    pub fn set_voxel_size(&mut self, value: f32) {
        self.voxel_size = value;
    }

    /// Also export the voxel cubes as GLB.
    #[wasm_bindgen(setter)]
    pub fn set_with_glb(&mut self, value: bool) {
        self.with_glb = value;
    }
}

/// Atlas result for one voxel set.
#[wasm_bindgen]
pub struct AtlasResult {
    palette_indices: Vec<u32>,
    uvs: Vec<f32>,
    palette: Vec<u8>,
    dimension: usize,
    png_data: Vec<u8>,
    glb_data: Option<Vec<u8>>,
}

#[wasm_bindgen]
impl AtlasResult {
    /// Palette index per voxel, in input order.
    #[wasm_bindgen(getter)]
    pub fn palette_indices(&self) -> Vec<u32> {
        self.palette_indices.clone()
    }

    /// Tile-center UV per voxel, flattened `[u0, v0, u1, v1, ...]`.
    #[wasm_bindgen(getter)]
    pub fn uvs(&self) -> js_sys::Float32Array {
        js_sys::Float32Array::from(self.uvs.as_slice())
    }

    /// Palette colors, flattened `[r0, g0, b0, ...]`.
    #[wasm_bindgen(getter)]
    pub fn palette(&self) -> Vec<u8> {
        self.palette.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn palette_size(&self) -> usize {
        self.palette.len() / 3
    }

    /// Tiles per atlas side.
    #[wasm_bindgen(getter)]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The atlas as PNG bytes. Empty when there were no voxels.
    #[wasm_bindgen(getter)]
    pub fn png_data(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.png_data.as_slice())
    }

    /// GLB bytes, when requested through `AtlasOptions.with_glb`.
    #[wasm_bindgen(getter)]
    pub fn glb_data(&self) -> Option<Vec<u8>> {
        self.glb_data.clone()
    }
}

/// Build the palette, atlas and UVs for a voxel set.
///
/// `positions` and `colors` are flat `[x, y, z, ...]` and `[r, g, b, ...]`
/// arrays of equal length, colors in `[0, 1]`.
#[wasm_bindgen]
pub fn build_atlas(
    positions: &[f32],
    colors: &[f32],
    threshold: u32,
    tile_scale: u32,
    options: Option<AtlasOptions>,
) -> Result<AtlasResult, JsError> {
    if positions.len() != colors.len() || positions.len() % 3 != 0 {
        return Err(JsError::new(&format!(
            "positions ({}) and colors ({}) must be equal-length multiples of 3",
            positions.len(),
            colors.len()
        )));
    }

    let options = options.unwrap_or_default();
    let config = crate::AtlasConfig::default()
        .with_threshold(threshold)
        .with_tile_scale(tile_scale)
        .with_uv_inset(options.uv_inset)
        .with_voxel_size(options.voxel_size);

    let samples: Vec<crate::VoxelSample> = positions
        .chunks_exact(3)
        .zip(colors.chunks_exact(3))
        .map(|(p, c)| crate::VoxelSample::new([p[0], p[1], p[2]], [c[0], c[1], c[2]]))
        .collect();

    let atlas = crate::build_atlas(&samples, config.clone())
        .map_err(|e| JsError::new(&e.to_string()))?
        .completed()
        .ok_or_else(|| JsError::new("atlas build was cancelled"))?;

    let png_data = if atlas.image.is_empty() {
        Vec::new()
    } else {
        atlas.image.to_png().map_err(|e| JsError::new(&e.to_string()))?
    };

    let glb_data = if options.with_glb && atlas.voxel_count() > 0 {
        let scene = crate::VoxelScene::from_atlas(&atlas, &config)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Some(crate::export_glb(&scene).map_err(|e| JsError::new(&e.to_string()))?)
    } else {
        None
    };

    Ok(AtlasResult {
        palette_indices: atlas.placements().map(|(_, index)| index as u32).collect(),
        uvs: atlas.uvs.iter().flatten().copied().collect(),
        palette: atlas.palette.iter().flat_map(|c| c.to_array()).collect(),
        dimension: atlas.grid.dimension(),
        png_data,
        glb_data,
    })
}
