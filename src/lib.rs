//! # Voxel Atlas
//!
//! A Rust library for texturing voxelized meshes from a shared color atlas.
//!
//! ## Overview
//!
//! Voxel colors are deduplicated into a small palette, the palette is painted
//! into a square atlas of flat color tiles, and every voxel gets the UV of its
//! tile center. The result can be written as a PNG or exported as cube meshes
//! (OBJ/MTL or GLB) that all share the one atlas material.
//!
//! ## Quick Start
//!
//! ```ignore
//! use voxel_atlas::{load_voxels, AtlasConfig, AtlasPipeline, Session};
//!
//! // Load voxel samples produced by a voxelizer
//! let cloud = load_voxels("teapot.json")?;
//!
//! // Merge colors closer than 5 (on the 0-255 scale)
//! let pipeline = AtlasPipeline::new(AtlasConfig::default().with_threshold(5))?;
//!
//! // Writes out/teapot_5.png
//! let session = Session::new(&cloud.name).with_output_dir("out");
//! if let Some(atlas) = pipeline.run_source(&session, &cloud)?.completed() {
//!     println!("{} colors on a {}x{} grid", atlas.palette.len(),
//!         atlas.grid.dimension(), atlas.grid.dimension());
//! }
//! ```
//!
//! ## Scene Export
//!
//! ```ignore
//! use voxel_atlas::{export_glb, VoxelScene};
//!
//! let scene = VoxelScene::from_atlas(&atlas, pipeline.config())?;
//! let glb_bytes = export_glb(&scene)?;
//! ```

pub mod error;
pub mod types;
pub mod cancel;
pub mod palette;
pub mod atlas;
pub mod pipeline;
pub mod scene;
pub mod export;

// Re-export main types for convenience
pub use error::{AtlasError, Completion, Result};
pub use types::{chebyshev_distance, BoundingBox, Direction, Rgb8, Voxel, VoxelCloud, VoxelSample, VoxelSource};
pub use cancel::{CancellationToken, Progress, Stage};
pub use palette::{build_palette, Palette, PaletteAssignment, PaletteBuilder};
pub use atlas::{tile_center_uv, AtlasCompositor, AtlasGrid, AtlasImage, AtlasRegion, UvMapper};
pub use pipeline::{atlas_file_name, AtlasConfig, AtlasPipeline, Session, VoxelAtlas};
pub use scene::{Mesh, Vertex, VoxelScene};
pub use export::gltf::export_glb;
pub use export::obj::{export_obj, ObjExport, ObjLayout};
pub use export::raw::{export_raw, RawMeshData};

/// Load a voxel cloud from a JSON file.
pub fn load_voxels<P: AsRef<std::path::Path>>(path: P) -> Result<VoxelCloud> {
    VoxelCloud::from_json_file(path)
}

/// Run the pipeline once without an output directory.
///
/// The session gets a fresh token that nothing else holds, so the result is
/// always [`Completion::Completed`] in practice.
pub fn build_atlas(samples: &[VoxelSample], config: AtlasConfig) -> Result<Completion<VoxelAtlas>> {
    AtlasPipeline::new(config)?.run(&Session::new("voxels"), samples)
}

#[cfg(feature = "wasm")]
pub mod wasm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_atlas_completes() {
        let samples = [
            VoxelSample::new([0.0; 3], [1.0, 0.0, 0.0]),
            VoxelSample::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let result = build_atlas(&samples, AtlasConfig::default()).unwrap();
        assert!(!result.is_cancelled());

        let atlas = result.completed().unwrap();
        assert_eq!(atlas.palette.len(), 2);
        assert_eq!(atlas.atlas_path, None);
    }

    #[test]
    fn test_build_atlas_rejects_bad_config() {
        let result = build_atlas(&[], AtlasConfig::default().with_tile_scale(0));
        assert!(matches!(result, Err(AtlasError::InvalidConfiguration(_))));
    }
}
